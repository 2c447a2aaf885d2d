use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use terradep_scanner::ScanOptions;
use terradep_state::S3ResolverConfig;

/// Settings read from a `terradep.toml` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub scan: ScanOptions,
    pub backends: BackendsConfig,
}

/// Per-backend resolver settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendsConfig {
    pub s3: S3ResolverConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(FileConfig::parse("").unwrap(), FileConfig::default());
    }

    #[test]
    fn reads_scan_and_backend_sections() {
        let config = FileConfig::parse(
            r#"
[scan]
exclude = [".terraform", "modules"]

[backends.s3]
region = true
"#,
        )
        .unwrap();

        assert_eq!(config.scan.excluded_dirs, vec![".terraform", "modules"]);
        assert!(config.backends.s3.region);
        assert!(!config.backends.s3.encryption);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[scan]\nexcluded = []\n").is_err());
        assert!(FileConfig::parse("[backends.gcs]\nprefix = true\n").is_err());
        assert!(FileConfig::parse("verbose = true\n").is_err());
    }
}
