use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::index::PackageIndex;
use crate::types::PkgVersion;

/// Computes repository URLs for packages and index files. Retrieval itself
/// happens outside this crate.
pub struct Fetcher<'a> {
    config: &'a ResolverConfig,
    index: &'a PackageIndex,
}

impl<'a> Fetcher<'a> {
    pub fn new(config: &'a ResolverConfig, index: &'a PackageIndex) -> Fetcher<'a> {
        Fetcher { config, index }
    }

    /// URL of the `.deb` archive for a concrete package version.
    pub fn package_url(&self, name: &str, version: &PkgVersion) -> Result<String, ResolverError> {
        let paragraph = self
            .index
            .find_all(name)?
            .get(version)
            .ok_or(ResolverError::NotFound)?;
        let filename = paragraph.filename().ok_or(ResolverError::NotFound)?;
        Ok(format!("{}/{}", self.config.base_url, filename))
    }

    /// URL of the binary Packages index for the configured repository.
    pub fn packages_url(&self) -> String {
        format!("{}/Packages.gz", self.dist_url())
    }

    /// URL of the Release file for the configured repository.
    pub fn release_url(&self) -> String {
        format!("{}/Release", self.dist_url())
    }

    fn dist_url(&self) -> String {
        format!(
            "{}/dists/{}/{}/binary-{}",
            self.config.base_url, self.config.codename, self.config.component, self.config.arch
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::control::Paragraph;
    use std::convert::TryFrom;

    #[test]
    fn package_url_joins_base_and_filename() {
        let mut p = Paragraph::new();
        p.set("Package", "base");
        p.set("Version", "1.9.2");
        p.set("Filename", "pool/main/b/base/base_1.9.2_amd64.deb");
        let mut index = PackageIndex::new();
        index.add_package(p).unwrap();

        let config = ResolverConfig::default();
        let fetcher = Fetcher::new(&config, &index);
        let version = PkgVersion::try_from("1.9.2").unwrap();
        assert_eq!(
            fetcher.package_url("base", &version).unwrap(),
            "https://cdn-aws.deb.debian.org/debian/pool/main/b/base/base_1.9.2_amd64.deb"
        );

        let unknown = PkgVersion::try_from("9.9").unwrap();
        assert!(matches!(
            fetcher.package_url("base", &unknown),
            Err(ResolverError::NotFound)
        ));
    }

    #[test]
    fn index_urls_follow_repository_layout() {
        let config = ResolverConfig::default();
        let index = PackageIndex::new();
        let fetcher = Fetcher::new(&config, &index);
        assert_eq!(
            fetcher.packages_url(),
            "https://cdn-aws.deb.debian.org/debian/dists/buster/main/binary-amd64/Packages.gz"
        );
        assert_eq!(
            fetcher.release_url(),
            "https://cdn-aws.deb.debian.org/debian/dists/buster/main/binary-amd64/Release"
        );
    }
}
