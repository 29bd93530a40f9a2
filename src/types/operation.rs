use super::PkgVersion;
use std::io::{self, Write};

/// A node in the install graph. The post-order flattening of the tree is
/// the install plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Ordered grouping with no package binding of its own. Children run
    /// before whatever follows the composite in the parent.
    Composite(Vec<Operation>),
    /// Install one concrete package version. `pre_dep` marks installs that
    /// participate in a Pre-Depends chain.
    Install {
        package: String,
        version: PkgVersion,
        pre_dep: bool,
    },
}

impl Operation {
    /// The empty composite doubles as the no-op sentinel.
    pub(crate) fn noop() -> Operation {
        Operation::Composite(Vec::new())
    }

    /// True when the node performs no work at all.
    pub fn is_noop(&self) -> bool {
        matches!(self, Operation::Composite(children) if children.is_empty())
    }

    /// A composite holding a single child is replaced by that child.
    pub(crate) fn collapse(self) -> Operation {
        match self {
            Operation::Composite(children) if children.len() == 1 => {
                children.into_iter().next().unwrap_or_else(Operation::noop)
            }
            other => other,
        }
    }

    /// Flatten the tree into the install sequence, dependencies first.
    pub fn unroll(&self) -> Vec<&Operation> {
        let mut out = Vec::new();
        self.unroll_into(&mut out);
        out
    }

    fn unroll_into<'a>(&'a self, out: &mut Vec<&'a Operation>) {
        match self {
            Operation::Install { .. } => out.push(self),
            Operation::Composite(children) => {
                for child in children {
                    child.unroll_into(out);
                }
            }
        }
    }

    /// Render the tree, one space of indentation per level. Pre-depends
    /// installs are starred.
    pub fn pretty_write<W: Write>(&self, w: &mut W, depth: usize) -> io::Result<()> {
        for _ in 0..depth {
            write!(w, " ")?;
        }
        match self {
            Operation::Composite(children) => {
                writeln!(w, "composite:")?;
                for child in children {
                    child.pretty_write(w, depth + 1)?;
                }
            }
            Operation::Install {
                package,
                version,
                pre_dep,
            } => {
                let marker = if *pre_dep { '*' } else { ' ' };
                writeln!(w, "install: [{}] {} ({})", marker, package, version)?;
            }
        }
        Ok(())
    }
}
