use crate::types::VersionConstraint;
use thiserror::Error;

/// Errors surfaced by the parsers, the package index and the resolver.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("expected colon in line {0:?}")]
    MalformedLine(String),
    #[error("malformed package relation {0:?}")]
    MalformedRelation(String),
    #[error("malformed version {0:?}")]
    MalformedVersion(String),
    #[error("package {0:?} carries no parseable Version field")]
    MissingVersion(String),
    #[error("not found")]
    NotFound,
    #[error("only relation requirements can be checked against an index")]
    UnsupportedKind,
    #[error("{}", dependency_missing_msg(.package, .required_by, .constraint))]
    DependencyMissing {
        package: String,
        /// Name of the requiring package, or empty when the target itself
        /// asked for the dependency.
        required_by: String,
        constraint: Option<VersionConstraint>,
    },
    #[error("no alternative in the or-group could be satisfied")]
    UnsatisfiableOr,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn dependency_missing_msg(
    package: &str,
    required_by: &str,
    constraint: &Option<VersionConstraint>,
) -> String {
    let mut msg = if required_by.is_empty() {
        format!("required package {:?}", package)
    } else {
        format!("package {:?} required {:?}", required_by, package)
    };
    match constraint {
        Some(c) => msg.push_str(&format!(
            " with version {} {:?}, but it was not found",
            c.op, c.version
        )),
        None => msg.push_str(" was not found"),
    }
    msg
}
