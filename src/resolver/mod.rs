use crate::control::Paragraph;
use crate::error::ResolverError;
use crate::index::PackageIndex;
use crate::types::{Operation, Requirement, VersionConstraint};

/// Requirements and package selections already visited during one
/// resolution. Re-entry on either list short-circuits to a no-op, which is
/// what breaks dependency cycles.
#[derive(Default)]
struct CoveredSet {
    requirements: Vec<Requirement>,
    packages: Vec<CoveredPackage>,
}

#[derive(PartialEq, Eq)]
struct CoveredPackage {
    name: String,
    version: String,
    provides: Vec<String>,
}

impl CoveredSet {
    /// True if the requirement was already visited verbatim; records it
    /// otherwise.
    fn check_set_requirement(&mut self, req: &Requirement) -> bool {
        if self.requirements.iter().any(|covered| covered == req) {
            return true;
        }
        self.requirements.push(req.clone());
        false
    }

    /// True if this package selection was already made; records it
    /// otherwise.
    fn check_set_package(&mut self, entry: CoveredPackage) -> bool {
        if self.packages.contains(&entry) {
            return true;
        }
        self.packages.push(entry);
        false
    }
}

impl PackageIndex {
    /// Compute the install graph for `target` against a set of already
    /// installed packages. Flatten the result with
    /// [`Operation::unroll`] to obtain the install sequence.
    pub fn install_graph(
        &self,
        target: &str,
        installed: &PackageIndex,
    ) -> Result<Operation, ResolverError> {
        let mut covered = CoveredSet::default();
        self.build_install_graph(target, &mut covered, installed)
    }

    fn build_install_graph(
        &self,
        target: &str,
        covered: &mut CoveredSet,
        installed: &PackageIndex,
    ) -> Result<Operation, ResolverError> {
        let pkg = self.find_latest(target)?;
        let version = pkg.version()?;

        let mut children = Vec::new();

        // Pre-depends lead the graph, and their installs are marked.
        let pre_depends = pkg.pre_depends()?;
        if !pre_depends.is_empty() {
            children.push(self.build_requirement(covered, installed, &pre_depends, None, true)?);
        }
        let depends = pkg.depends()?;
        children.push(self.build_requirement(covered, installed, &depends, None, false)?);
        children.push(Operation::Install {
            package: pkg.name().to_string(),
            version,
            pre_dep: false,
        });
        Ok(Operation::Composite(children))
    }

    fn build_requirement(
        &self,
        covered: &mut CoveredSet,
        installed: &PackageIndex,
        req: &Requirement,
        parent: Option<&Requirement>,
        is_pre_dep: bool,
    ) -> Result<Operation, ResolverError> {
        self.build_requirement_uncollapsed(covered, installed, req, parent, is_pre_dep)
            .map(Operation::collapse)
    }

    fn build_requirement_uncollapsed(
        &self,
        covered: &mut CoveredSet,
        installed: &PackageIndex,
        req: &Requirement,
        parent: Option<&Requirement>,
        is_pre_dep: bool,
    ) -> Result<Operation, ResolverError> {
        // A requirement satisfied verbatim earlier contributes nothing new.
        if covered.check_set_requirement(req) {
            return Ok(Operation::noop());
        }

        match req {
            Requirement::And(children) => {
                let mut ops = Vec::new();
                for child in children {
                    ops.push(self.build_requirement(covered, installed, child, Some(req), is_pre_dep)?);
                }
                Ok(Operation::Composite(ops))
            }

            Requirement::Or(alternatives) => {
                // The first alternative that resolves wins. Only a missing
                // dependency sends us on to the next candidate.
                for candidate in alternatives {
                    match self.build_requirement(covered, installed, candidate, Some(req), is_pre_dep)
                    {
                        Ok(op) => return Ok(op),
                        Err(ResolverError::DependencyMissing { .. }) => continue,
                        Err(e) => return Err(e),
                    }
                }
                Err(ResolverError::UnsatisfiableOr)
            }

            Requirement::Relation { .. } => {
                self.build_relation(covered, installed, req, parent, is_pre_dep)
            }
        }
    }

    fn build_relation(
        &self,
        covered: &mut CoveredSet,
        installed: &PackageIndex,
        req: &Requirement,
        parent: Option<&Requirement>,
        is_pre_dep: bool,
    ) -> Result<Operation, ResolverError> {
        let (package, constraint) = match req {
            Requirement::Relation {
                package,
                constraint,
            } => (package.as_str(), constraint.as_ref()),
            _ => return Err(ResolverError::UnsupportedKind),
        };

        // Already present on the target system: nothing to do.
        if installed.has_package(req)? {
            return Ok(Operation::noop());
        }

        let selected = self.select_paragraph(package, constraint, parent)?;
        let version = selected.version()?;

        if covered.check_set_package(CoveredPackage {
            name: selected.name().to_string(),
            version: version.to_string(),
            provides: selected.provides(),
        }) {
            return Ok(Operation::noop());
        }

        let pre_depends = selected.pre_depends()?;
        let pre_op = if pre_depends.is_empty() {
            None
        } else {
            Some(self.build_requirement(covered, installed, &pre_depends, Some(req), true)?)
        };
        let depends = selected.depends()?;
        let dep_op = if depends.is_empty() {
            None
        } else {
            Some(self.build_requirement(covered, installed, &depends, Some(req), false)?)
        };

        let install = Operation::Install {
            package: selected.name().to_string(),
            version,
            pre_dep: is_pre_dep,
        };

        // Sub-graphs precede the package itself: pre-depends first, then
        // depends, then the install.
        let mut children: Vec<Operation> = [pre_op, dep_op]
            .into_iter()
            .flatten()
            .filter(|op| !op.is_noop())
            .collect();
        if children.is_empty() {
            return Ok(install);
        }
        children.push(install);
        Ok(Operation::Composite(children))
    }

    /// Pick the paragraph a relation binds to: the latest version, the
    /// constraint-satisfying version, or the first provider of a virtual
    /// package.
    fn select_paragraph(
        &self,
        package: &str,
        constraint: Option<&VersionConstraint>,
        parent: Option<&Requirement>,
    ) -> Result<&Paragraph, ResolverError> {
        let missing = || {
            let required_by = match parent {
                Some(Requirement::Relation {
                    package: parent_pkg,
                    ..
                }) => parent_pkg.clone(),
                _ => String::new(),
            };
            ResolverError::DependencyMissing {
                package: package.to_string(),
                required_by,
                constraint: constraint.cloned(),
            }
        };

        match constraint {
            None => match self.find_latest(package) {
                Ok(paragraph) => Ok(paragraph),
                Err(ResolverError::NotFound) => match self.find_provides(package) {
                    Ok(providers) => providers.into_iter().next().ok_or_else(missing),
                    Err(ResolverError::NotFound) => Err(missing()),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            },
            Some(c) => match self.find_by_constraint(package, c) {
                Ok(paragraph) => Ok(paragraph),
                Err(ResolverError::NotFound) => Err(missing()),
                Err(e) => Err(e),
            },
        }
    }
}
