mod operation;
mod requirement;
mod version;

pub use operation::Operation;
pub use requirement::{ConstraintOp, Requirement, VersionConstraint};
pub use version::{parse_version, PkgVersion};
