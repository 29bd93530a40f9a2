//! Dependency planning for Debian binary packages.
//!
//! Feed a `Packages` index into a [`PackageIndex`], then call
//! [`install_graph`](PackageIndex::install_graph) to obtain an
//! [`Operation`] tree whose [`unroll`](Operation::unroll) is the install
//! sequence for a target package: dependencies before dependents,
//! pre-depends before everything else at their level.

pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod fetcher;
pub mod index;
mod resolver;
pub mod types;

pub use config::ResolverConfig;
pub use control::relation::parse_relations;
pub use control::{Decoder, Paragraph};
pub use error::ResolverError;
pub use fetcher::Fetcher;
pub use index::PackageIndex;
pub use types::{ConstraintOp, Operation, PkgVersion, Requirement, VersionConstraint};

use lazy_static::lazy_static;

lazy_static! {
    /// Process-wide console writer backing the output macros.
    pub static ref WRITER: cli::Writer = cli::Writer::new();
}
