mod decoder;
pub mod relation;

pub use decoder::Decoder;

use crate::error::ResolverError;
use crate::types::{PkgVersion, Requirement};

use std::collections::HashMap;
use std::convert::TryFrom;

/// One block of control-file metadata describing a binary package.
///
/// Field names are case-sensitive as they appear in the source index. A
/// paragraph becomes dirty once any field is inserted, which is how a
/// zero-field paragraph is told apart from one the decoder never filled.
#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    dirty: bool,
    values: HashMap<String, String>,
}

impl Paragraph {
    pub fn new() -> Paragraph {
        Paragraph::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.dirty
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.dirty = true;
        self.values.insert(name.to_string(), value.to_string());
    }

    pub(crate) fn append(&mut self, name: &str, extra: &str) {
        self.values.entry(name.to_string()).or_default().push_str(extra);
    }

    /// The package name, or the empty string.
    pub fn name(&self) -> &str {
        self.field("Package").unwrap_or("")
    }

    /// The package version, parsed by the version algebra.
    pub fn version(&self) -> Result<PkgVersion, ResolverError> {
        let raw = self
            .field("Version")
            .ok_or_else(|| ResolverError::MissingVersion(self.name().to_string()))?;
        PkgVersion::try_from(raw)
            .map_err(|_| ResolverError::MissingVersion(self.name().to_string()))
    }

    /// The binary dependencies of the package as a requirement tree.
    pub fn depends(&self) -> Result<Requirement, ResolverError> {
        self.relation_field("Depends")
    }

    /// Dependencies that must be configured before this package unpacks.
    pub fn pre_depends(&self) -> Result<Requirement, ResolverError> {
        self.relation_field("Pre-Depends")
    }

    /// Packages this package breaks.
    pub fn breaks(&self) -> Result<Requirement, ResolverError> {
        self.relation_field("Breaks")
    }

    fn relation_field(&self, name: &str) -> Result<Requirement, ResolverError> {
        match self.field(name) {
            Some(raw) => relation::parse_relations(raw),
            None => Ok(Requirement::And(Vec::new())),
        }
    }

    /// Virtual package names this concrete package provides.
    pub fn provides(&self) -> Vec<String> {
        match self.field("Provides") {
            Some(raw) => raw
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn arch(&self) -> &str {
        self.field("Architecture").unwrap_or("")
    }

    pub fn priority(&self) -> &str {
        self.field("Priority").unwrap_or("")
    }

    pub fn essential(&self) -> bool {
        self.field("Essential") == Some("yes")
    }

    /// Repository-relative path of the `.deb` archive.
    pub fn filename(&self) -> Option<&str> {
        self.field("Filename")
    }
}
