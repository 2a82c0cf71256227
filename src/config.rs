//! Project configuration: the labeling project's `config.yaml`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Everything a labeling session needs to know about its project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Name of the annotator whose coordinate columns are stored.
    pub scorer: String,
    /// Ordered bodypart labels; this order is also the column order on save.
    pub bodyparts: Vec<String>,
    #[serde(default)]
    pub project_path: PathBuf,
    /// Video name to source video file.
    #[serde(default)]
    pub video_sets: BTreeMap<String, PathBuf>,
    /// Marker radius in pixels.
    #[serde(default = "default_dotsize")]
    pub dotsize: u32,
    /// Marker opacity, 0.0 to 1.0.
    #[serde(default = "default_alphavalue")]
    pub alphavalue: f64,
    /// Named palette used to color one marker per bodypart.
    #[serde(default = "default_colormap")]
    pub colormap: String,
    /// Image extensions considered during frame discovery.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

// Default value functions
fn default_dotsize() -> u32 {
    8
}

fn default_alphavalue() -> f64 {
    0.7
}

fn default_colormap() -> String {
    "jet".to_string()
}

fn default_image_extensions() -> Vec<String> {
    vec!["png".to_string()]
}

impl ProjectConfig {
    /// Load and validate a project configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: ProjectConfig =
            serde_yaml::from_str(&content).map_err(|e| Error::ConfigYaml {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a YAML file.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let yaml = serde_yaml::to_string(self).map_err(|e| Error::ConfigYaml {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, yaml).map_err(|e| Error::ConfigIo {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Bodypart labels must be non-empty and unique; a session must not
    /// start otherwise.
    pub fn validate(&self) -> Result<(), Error> {
        if self.bodyparts.is_empty() {
            return Err(Error::NoBodyparts);
        }
        let mut seen = HashSet::new();
        for bp in &self.bodyparts {
            if !seen.insert(bp.as_str()) {
                return Err(Error::DuplicateBodypart(bp.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        "scorer: alice\nbodyparts:\n  - snout\n  - tailbase\n"
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let config: ProjectConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert_eq!(config.scorer, "alice");
        assert_eq!(config.bodyparts, ["snout", "tailbase"]);
        assert_eq!(config.dotsize, 8);
        assert_eq!(config.colormap, "jet");
        assert_eq!(config.image_extensions, ["png"]);
        assert!(config.video_sets.is_empty());
    }

    #[test]
    fn duplicate_bodyparts_rejected() {
        let config: ProjectConfig =
            serde_yaml::from_str("scorer: alice\nbodyparts: [snout, snout]\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::DuplicateBodypart(bp)) if bp == "snout"
        ));
    }

    #[test]
    fn empty_bodyparts_rejected() {
        let config: ProjectConfig =
            serde_yaml::from_str("scorer: alice\nbodyparts: []\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::NoBodyparts)));
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let config: ProjectConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let reread: ProjectConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reread.scorer, config.scorer);
        assert_eq!(reread.bodyparts, config.bodyparts);
        assert_eq!(reread.dotsize, config.dotsize);
    }
}
