use std::fmt;

/// Operators a version constraint can carry. `>>` and `<<` are the strict
/// comparisons; `>` and `<` do not occur in control files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintOp {
    StrictlyGreater,
    StrictlyLess,
    Equal,
    GreaterEq,
    LessEq,
}

impl ConstraintOp {
    pub fn parse(s: &str) -> Option<ConstraintOp> {
        match s {
            ">>" => Some(ConstraintOp::StrictlyGreater),
            "<<" => Some(ConstraintOp::StrictlyLess),
            "=" => Some(ConstraintOp::Equal),
            ">=" => Some(ConstraintOp::GreaterEq),
            "<=" => Some(ConstraintOp::LessEq),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self {
            ConstraintOp::StrictlyGreater => ">>",
            ConstraintOp::StrictlyLess => "<<",
            ConstraintOp::Equal => "=",
            ConstraintOp::GreaterEq => ">=",
            ConstraintOp::LessEq => "<=",
        };
        write!(f, "{}", op)
    }
}

/// One version relation bounding a package requirement. The version is kept
/// as written; the index parses it when a lookup needs the ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionConstraint {
    pub op: ConstraintOp,
    pub version: String,
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// A tree of requirements over packages, as parsed from a `Depends`,
/// `Pre-Depends` or `Breaks` field.
///
/// Structural equality (`PartialEq`) is what the resolver's covered-set
/// memo uses to detect re-entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// All children must hold. The top-level group of comma-separated
    /// clauses; never nested directly inside another `And`.
    And(Vec<Requirement>),
    /// At least one child must hold (pipe-separated alternatives).
    Or(Vec<Requirement>),
    /// A single package, optionally bounded by one version relation.
    Relation {
        package: String,
        constraint: Option<VersionConstraint>,
    },
}

impl Requirement {
    /// True for the empty `And` produced by an absent or blank field.
    pub fn is_empty(&self) -> bool {
        matches!(self, Requirement::And(children) if children.is_empty())
    }
}
