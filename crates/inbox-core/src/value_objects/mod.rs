//! Value objects - immutable types that represent domain concepts

mod media;
mod operating_hours;
mod permissions;
mod phone;
mod plan;

pub use media::{media_object_path, MediaKind};
pub use operating_hours::OperatingHours;
pub use permissions::Permissions;
pub use phone::PhoneNumber;
pub use plan::PlanQuota;
