use crate::{edit::StudioUrl, error::CsmError, perspective::Perspective, stega::StegaConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// Settings shared by the edit-link, patching and stega operations.
///
/// ```toml
/// studio_url = "https://example.sanity.studio"
/// perspective = "drafts"
///
/// [stega]
/// enabled = true
/// studioUrl = "https://example.sanity.studio"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studio_url: Option<StudioUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Perspective>,
    #[serde(default)]
    pub stega: StegaConfig,
}

impl CsmConfig {
    /// The perspective to patch with, [Perspective::Raw] when unset.
    pub fn perspective(&self) -> Perspective {
        self.perspective.clone().unwrap_or_default()
    }

    /// The studio used for stega links: the stega table's own, falling back to `studio_url`.
    pub fn stega_studio_url(&self) -> Option<&StudioUrl> {
        self.stega.studio_url.as_ref().or(self.studio_url.as_ref())
    }
}

pub trait ConfigProvider {
    fn get_config(&self) -> Result<CsmConfig, CsmError>;
    fn set_config(&self, config: &CsmConfig) -> Result<(), CsmError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        TomlConfigProvider { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<CsmConfig, CsmError> {
        tracing::debug!("Attempting to read config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(CsmConfig::default());
        }
        let content = read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn set_config(&self, config: &CsmConfig) -> Result<(), CsmError> {
        tracing::debug!("Attempting to write config to: {:?}", &self.path);
        let toml_string = toml::to_string(config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}

pub fn get_content<P: AsRef<Path>>(path: P) -> Result<String, CsmError> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::StudioBaseRoute;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let provider = TomlConfigProvider::new(dir.path().join("csm.toml"));
        assert_eq!(provider.get_config().unwrap(), CsmConfig::default());
        assert_eq!(CsmConfig::default().perspective(), Perspective::Raw);
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("csm.toml");
        std::fs::write(
            &path,
            r#"
perspective = ["rABC", "drafts"]

[studio_url]
baseUrl = "/studio"
workspace = "staging"

[stega]
enabled = true
"#,
        )
        .unwrap();
        let config = TomlConfigProvider::new(&path).get_config().unwrap();
        assert_eq!(
            config.perspective(),
            Perspective::Stack(vec!["rABC".to_string(), "drafts".to_string()])
        );
        assert_eq!(
            config.stega_studio_url(),
            Some(&StudioUrl::Route(StudioBaseRoute {
                base_url: "/studio".to_string(),
                workspace: Some("staging".to_string()),
                tool: None,
            }))
        );
        assert!(config.stega.enabled);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let provider = TomlConfigProvider::new(dir.path().join("csm.toml"));
        let config = CsmConfig {
            studio_url: Some("https://example.sanity.studio".into()),
            perspective: Some(Perspective::Drafts),
            stega: StegaConfig {
                enabled: true,
                studio_url: None,
                omit_cross_dataset_reference_data: true,
            },
        };
        provider.set_config(&config).unwrap();
        assert_eq!(provider.get_config().unwrap(), config);
    }

    #[test]
    fn test_bad_perspective_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("csm.toml");
        std::fs::write(&path, "perspective = \"preview\"\n").unwrap();
        assert!(matches!(
            TomlConfigProvider::new(&path).get_config(),
            Err(CsmError::Serialization(_))
        ));
    }
}
