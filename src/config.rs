use serde::Deserialize;

/// Repository settings threaded through URL computation. The resolver core
/// never reads these; they feed the fetcher and the driver.
#[derive(Clone, Debug, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_codename")]
    pub codename: String,
    #[serde(default = "default_distribution")]
    pub distribution: String,
    #[serde(default = "default_component")]
    pub component: String,
    #[serde(default = "default_arch")]
    pub arch: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            base_url: default_base_url(),
            codename: default_codename(),
            distribution: default_distribution(),
            component: default_component(),
            arch: default_arch(),
        }
    }
}

#[inline]
fn default_base_url() -> String {
    "https://cdn-aws.deb.debian.org/debian".to_string()
}

#[inline]
fn default_codename() -> String {
    "buster".to_string()
}

#[inline]
fn default_distribution() -> String {
    "testing".to_string()
}

#[inline]
fn default_component() -> String {
    "main".to_string()
}

#[inline]
fn default_arch() -> String {
    "amd64".to_string()
}
