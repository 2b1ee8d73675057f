use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vellum_chunk::ChunkerConfig;

use crate::error::{SdkError, SdkResult};

/// Settings for opening an on-disk Vellum instance.
///
/// ```toml
/// store_path = "/var/lib/vellum/objects"
/// head_path = "/var/lib/vellum/HEAD"
///
/// [chunker]
/// average_size = 65536
/// min_size = 16384
/// max_size = 262144
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VellumConfig {
    /// Directory holding one file per stored object.
    pub store_path: PathBuf,
    /// File holding the chain head.
    pub head_path: PathBuf,
    pub chunker: ChunkerConfig,
}

impl Default for VellumConfig {
    fn default() -> Self {
        Self::with_data_dir(".vellum")
    }
}

impl VellumConfig {
    /// Default layout under one data directory.
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            store_path: dir.join("objects"),
            head_path: dir.join("HEAD"),
            chunker: ChunkerConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))?;
        config.chunker.validate()?;
        Ok(config)
    }

    /// Read a TOML config file. An empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SdkError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string(self).map_err(|e| SdkError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_lives_under_dot_vellum() {
        let c = VellumConfig::default();
        assert_eq!(c.store_path, PathBuf::from(".vellum/objects"));
        assert_eq!(c.head_path, PathBuf::from(".vellum/HEAD"));
        assert_eq!(c.chunker, ChunkerConfig::default());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = VellumConfig::from_toml_str(
            r#"
            store_path = "/data/objects"

            [chunker]
            average_size = 8192
            min_size = 2048
            max_size = 32768
            "#,
        )
        .unwrap();
        assert_eq!(c.store_path, PathBuf::from("/data/objects"));
        assert_eq!(c.head_path, VellumConfig::default().head_path);
        assert_eq!(c.chunker.average_size, 8192);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(VellumConfig::from_toml_str("").unwrap(), VellumConfig::default());
    }

    #[test]
    fn invalid_chunker_is_rejected() {
        let err = VellumConfig::from_toml_str(
            r#"
            [chunker]
            average_size = 1024
            min_size = 4096
            max_size = 2048
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SdkError::Chunk(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            VellumConfig::from_toml_str("stor_path = \"x\""),
            Err(SdkError::Config(_))
        ));
    }

    #[test]
    fn toml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vellum.toml");
        let config = VellumConfig::with_data_dir(dir.path());
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(VellumConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = VellumConfig::load("/nonexistent/vellum.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vellum.toml"));
    }
}
