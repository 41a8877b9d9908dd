use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CliSettings {
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileSettings>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProfileSettings {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CliSettings {
    /// Profile selected by `--profile`, falling back to the configured
    /// default profile.
    pub fn profile(&self, name: Option<&str>) -> Option<&ProfileSettings> {
        let name = name.or(self.default_profile.as_deref())?;
        self.profiles.get(name)
    }
}

pub fn load_settings() -> anyhow::Result<CliSettings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(CliSettings::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    let settings: CliSettings = serde_yaml_bw::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings(settings: &CliSettings) -> anyhow::Result<()> {
    let path = settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_yaml_bw::to_string(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("MEDIALIVECTL_CONFIG_DIR") {
        return Ok(Path::new(&value).join("settings.yaml"));
    }
    let dirs = ProjectDirs::from("", "medialivectl", "medialivectl")
        .ok_or_else(|| anyhow::anyhow!("unable to determine config directory"))?;
    Ok(dirs.config_dir().join("settings.yaml"))
}
