use crate::control::{Decoder, Paragraph};
use crate::error::ResolverError;
use crate::types::{ConstraintOp, PkgVersion, Requirement, VersionConstraint};

use std::collections::{BTreeMap, HashMap};
use std::convert::TryFrom;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// In-memory index of binary packages: name to version-sorted paragraphs,
/// plus a secondary index of virtual packages declared via `Provides`.
///
/// The index owns its paragraphs. The virtual buckets hold `(name, version)`
/// handles into the primary map, resolved on lookup.
#[derive(Default)]
pub struct PackageIndex {
    packages: HashMap<String, BTreeMap<PkgVersion, Paragraph>>,
    virtuals: HashMap<String, Vec<(String, PkgVersion)>>,
}

impl PackageIndex {
    pub fn new() -> PackageIndex {
        PackageIndex::default()
    }

    /// Consume package paragraphs from a Packages index stream.
    pub fn from_reader<R: Read>(r: R) -> Result<PackageIndex, ResolverError> {
        let mut index = PackageIndex::new();
        let mut decoder = Decoder::new(r);
        while let Some(paragraph) = decoder.decode()? {
            index.add_package(paragraph)?;
        }
        Ok(index)
    }

    /// Read a Packages index from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<PackageIndex, ResolverError> {
        Self::from_reader(File::open(path)?)
    }

    /// Number of distinct package names known to the index.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Insert a paragraph, overwriting any identical name+version entry.
    pub fn add_package(&mut self, paragraph: Paragraph) -> Result<(), ResolverError> {
        let version = paragraph.version()?;
        let name = paragraph.name().to_string();
        for virtual_name in paragraph.provides() {
            self.virtuals
                .entry(virtual_name)
                .or_default()
                .push((name.clone(), version.clone()));
        }
        self.packages
            .entry(name)
            .or_default()
            .insert(version, paragraph);
        Ok(())
    }

    /// All available versions of a package, in ascending version order.
    pub fn find_all(
        &self,
        name: &str,
    ) -> Result<&BTreeMap<PkgVersion, Paragraph>, ResolverError> {
        self.packages.get(name).ok_or(ResolverError::NotFound)
    }

    /// The greatest available version of a package.
    pub fn find_latest(&self, name: &str) -> Result<&Paragraph, ResolverError> {
        self.find_all(name)?
            .values()
            .next_back()
            .ok_or(ResolverError::NotFound)
    }

    /// The paragraphs providing a virtual package, in insertion order.
    pub fn find_provides(&self, name: &str) -> Result<Vec<&Paragraph>, ResolverError> {
        let handles = self.virtuals.get(name).ok_or(ResolverError::NotFound)?;
        Ok(handles
            .iter()
            .filter_map(|(pkg, version)| self.packages.get(pkg)?.get(version))
            .collect())
    }

    /// The greatest version of `name` satisfying `constraint`.
    pub fn find_by_constraint(
        &self,
        name: &str,
        constraint: &VersionConstraint,
    ) -> Result<&Paragraph, ResolverError> {
        let versions = self.find_all(name)?;
        let bound = PkgVersion::try_from(constraint.version.as_str())
            .map_err(|_| ResolverError::MalformedVersion(constraint.version.clone()))?;

        let satisfied: fn(&PkgVersion, &PkgVersion) -> bool = match constraint.op {
            ConstraintOp::Equal => {
                return versions.get(&bound).ok_or(ResolverError::NotFound);
            }
            ConstraintOp::StrictlyGreater => |v, bound| v > bound,
            ConstraintOp::StrictlyLess => |v, bound| v < bound,
            ConstraintOp::GreaterEq => |v, bound| v >= bound,
            ConstraintOp::LessEq => |v, bound| v <= bound,
        };
        versions
            .iter()
            .rev()
            .find_map(|(version, paragraph)| {
                if satisfied(version, &bound) {
                    Some(paragraph)
                } else {
                    None
                }
            })
            .ok_or(ResolverError::NotFound)
    }

    /// Whether a package meeting the given requirement is present. Virtual
    /// packages stand in for missing concrete names, but cannot satisfy a
    /// version constraint.
    pub fn has_package(&self, req: &Requirement) -> Result<bool, ResolverError> {
        let (package, constraint) = match req {
            Requirement::Relation {
                package,
                constraint,
            } => (package, constraint),
            _ => return Err(ResolverError::UnsupportedKind),
        };
        if !self.packages.contains_key(package.as_str()) {
            return Ok(constraint.is_none() && self.virtuals.contains_key(package.as_str()));
        }
        match constraint {
            None => Ok(true),
            Some(c) => match self.find_by_constraint(package, c) {
                Ok(_) => Ok(true),
                Err(ResolverError::NotFound) => Ok(false),
                Err(e) => Err(e),
            },
        }
    }

    /// Names whose latest paragraph carries the given priority.
    pub fn get_all_by_priority(&self, priority: &str) -> Vec<&str> {
        self.scan_latest(|p| p.priority() == priority)
    }

    /// Names whose latest paragraph is marked essential.
    pub fn get_all_essential(&self) -> Vec<&str> {
        self.scan_latest(|p| p.essential())
    }

    fn scan_latest(&self, keep: impl Fn(&Paragraph) -> bool) -> Vec<&str> {
        self.packages
            .iter()
            .filter_map(|(name, versions)| {
                let latest = versions.values().next_back()?;
                if keep(latest) {
                    Some(name.as_str())
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pkg(name: &str, version: &str) -> Paragraph {
        let mut p = Paragraph::new();
        p.set("Package", name);
        p.set("Version", version);
        p
    }

    fn index_of(paragraphs: Vec<Paragraph>) -> PackageIndex {
        let mut index = PackageIndex::new();
        for p in paragraphs {
            index.add_package(p).unwrap();
        }
        index
    }

    fn constraint(op: ConstraintOp, version: &str) -> VersionConstraint {
        VersionConstraint {
            op,
            version: version.to_string(),
        }
    }

    #[test]
    fn add_and_find_latest() {
        let index = index_of(vec![pkg("base", "1.3.2"), pkg("base", "1.9.2")]);
        assert_eq!(index.len(), 1);
        let latest = index.find_latest("base").unwrap();
        assert_eq!(latest.version().unwrap().to_string(), "1.9.2");
        assert!(matches!(
            index.find_latest("missing"),
            Err(ResolverError::NotFound)
        ));
    }

    #[test]
    fn add_requires_version() {
        let mut index = PackageIndex::new();
        let mut p = Paragraph::new();
        p.set("Package", "base");
        assert!(matches!(
            index.add_package(p),
            Err(ResolverError::MissingVersion(name)) if name == "base"
        ));
    }

    #[test]
    fn reinsertion_overwrites() {
        let mut index = PackageIndex::new();
        index.add_package(pkg("base", "1.9.2")).unwrap();
        let mut replacement = pkg("base", "1.9.2");
        replacement.set("Priority", "required");
        index.add_package(replacement).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.find_all("base").unwrap().len(), 1);
        assert_eq!(index.find_latest("base").unwrap().priority(), "required");
    }

    #[test]
    fn find_by_constraint_selects_greatest_satisfying() {
        let index = index_of(vec![
            pkg("meep", "1.3.2"),
            pkg("meep", "1.9.2"),
            pkg("meep", "2.0.0"),
        ]);
        let version_of = |c: &VersionConstraint| {
            index
                .find_by_constraint("meep", c)
                .unwrap()
                .version()
                .unwrap()
                .to_string()
        };

        assert_eq!(version_of(&constraint(ConstraintOp::Equal, "1.3.2")), "1.3.2");
        assert_eq!(
            version_of(&constraint(ConstraintOp::StrictlyLess, "1.7")),
            "1.3.2"
        );
        assert_eq!(
            version_of(&constraint(ConstraintOp::StrictlyGreater, "1.3.2")),
            "2.0.0"
        );
        assert_eq!(version_of(&constraint(ConstraintOp::LessEq, "1.9.2")), "1.9.2");
        assert_eq!(
            version_of(&constraint(ConstraintOp::GreaterEq, "1.9.2")),
            "2.0.0"
        );

        assert!(matches!(
            index.find_by_constraint("meep", &constraint(ConstraintOp::StrictlyGreater, "2.0.0")),
            Err(ResolverError::NotFound)
        ));
        assert!(matches!(
            index.find_by_constraint("meep", &constraint(ConstraintOp::Equal, "1.5")),
            Err(ResolverError::NotFound)
        ));
    }

    #[test]
    fn find_by_constraint_rejects_bad_bound() {
        let index = index_of(vec![pkg("meep", "1.3.2")]);
        assert!(matches!(
            index.find_by_constraint("meep", &constraint(ConstraintOp::Equal, "garbage")),
            Err(ResolverError::MalformedVersion(v)) if v == "garbage"
        ));
    }

    #[test]
    fn find_provides_keeps_insertion_order() {
        let mut vim = pkg("vim", "8.1");
        vim.set("Provides", "editor");
        let mut nano = pkg("nano", "3.2");
        nano.set("Provides", "editor");
        let index = index_of(vec![vim, nano]);

        let providers = index.find_provides("editor").unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["vim", "nano"]);

        assert!(matches!(
            index.find_provides("browser"),
            Err(ResolverError::NotFound)
        ));
    }

    #[test]
    fn has_package_rules() {
        let mut vim = pkg("vim", "8.1");
        vim.set("Provides", "editor");
        let index = index_of(vec![pkg("base", "1.9.2"), vim]);

        let plain = |name: &str| Requirement::Relation {
            package: name.to_string(),
            constraint: None,
        };
        let bounded = |name: &str, op, version: &str| Requirement::Relation {
            package: name.to_string(),
            constraint: Some(constraint(op, version)),
        };

        assert!(index.has_package(&plain("base")).unwrap());
        assert!(index
            .has_package(&bounded("base", ConstraintOp::GreaterEq, "1.3.2"))
            .unwrap());
        assert!(!index
            .has_package(&bounded("base", ConstraintOp::StrictlyGreater, "2.0"))
            .unwrap());
        // Virtual names satisfy unconstrained requirements only.
        assert!(index.has_package(&plain("editor")).unwrap());
        assert!(!index
            .has_package(&bounded("editor", ConstraintOp::GreaterEq, "1"))
            .unwrap());
        assert!(!index.has_package(&plain("missing")).unwrap());

        assert!(matches!(
            index.has_package(&Requirement::And(Vec::new())),
            Err(ResolverError::UnsupportedKind)
        ));
    }

    #[test]
    fn priority_and_essential_scans() {
        let mut base = pkg("base", "1.9.2");
        base.set("Priority", "required");
        base.set("Essential", "yes");
        let mut old_base = pkg("base", "1.3.2");
        old_base.set("Priority", "optional");
        let mut kek = pkg("kek", "1.3.2");
        kek.set("Priority", "optional");
        let index = index_of(vec![base, old_base, kek]);

        assert_eq!(index.get_all_by_priority("required"), vec!["base"]);
        assert_eq!(index.get_all_by_priority("optional"), vec!["kek"]);
        assert_eq!(index.get_all_essential(), vec!["base"]);
    }

    #[test]
    fn from_reader_streams_paragraphs() {
        let input = "Package: base\nVersion: 1.9.2\nDepends: kek\n\nPackage: kek\nVersion: 1.3.2\n";
        let index = PackageIndex::from_reader(input.as_bytes()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.find_latest("base").unwrap().field("Depends"),
            Some("kek")
        );
    }
}
