use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use textsense_client::{ClientConfig, DEFAULT_BASE_URL};
use textsense_core::GenerationParameters;

pub const SETTINGS_DIRECTORY_NAME: &str = "textsense";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// `TEXTSENSE_BASE_URL`, `TEXTSENSE_DEFAULTS__TONE`, ...
pub const ENV_PREFIX: &str = "TEXTSENSE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Initial generation selection for new sessions.
    #[serde(default)]
    pub defaults: GenerationParameters,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            defaults: GenerationParameters::default(),
        }
    }
}

impl AppSettings {
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url)
    }

    pub fn normalized(mut self) -> Self {
        self.base_url = if self.base_url.trim().is_empty() {
            default_base_url()
        } else {
            self.base_url.trim().trim_end_matches('/').to_string()
        };
        self.defaults = self.defaults.normalized();
        // A stored modifier would silently change every plain generation.
        self.defaults.intensify = None;
        self
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<AppSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".textsense"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from(Self::figment(&config_path), &config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<AppSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: AppSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn load_from(figment: Figment, path: &Path) -> AppSettings {
        match figment.extract::<AppSettings>() {
            Ok(settings) => {
                tracing::debug!(path = ?path, "settings loaded");
                settings.normalized()
            }
            Err(error) => {
                tracing::warn!(path = ?path, error = %error, "ignoring unreadable settings");
                AppSettings::default()
            }
        }
    }

    fn persist(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings).context(EncodeSettingsSnafu {
            stage: "save-settings",
        })?;
        write_replacing(&self.config_path, &json)?;
        tracing::info!(path = ?self.config_path, "settings saved");
        Ok(())
    }
}

/// Writes `json` next to `target` first so readers never see a half-written file.
fn write_replacing(target: &Path, json: &str) -> Result<(), SettingsError> {
    if let Some(dir) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).context(PrepareConfigDirSnafu {
            stage: "save-settings",
            dir: dir.to_path_buf(),
        })?;
    }

    let staged = target.with_extension("json.tmp");
    std::fs::write(&staged, json).context(StageSettingsSnafu {
        stage: "save-settings",
        staged: staged.clone(),
    })?;
    std::fs::rename(&staged, target).context(CommitSettingsSnafu {
        stage: "save-settings",
        target: target.to_path_buf(),
    })
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("cannot create config directory {dir:?}: {source}"))]
    PrepareConfigDir {
        stage: &'static str,
        dir: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot encode settings as JSON: {source}"))]
    EncodeSettings {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("cannot write settings to {staged:?}: {source}"))]
    StageSettings {
        stage: &'static str,
        staged: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot move saved settings into {target:?}: {source}"))]
    CommitSettings {
        stage: &'static str,
        target: PathBuf,
        source: std::io::Error,
    },
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use textsense_core::{Intensify, Relationship, Scenario, Tone};

    use super::*;

    fn file_only(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppSettings::default())).merge(Json::file(path))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);

        let settings = SettingsStore::load_from(file_only(&path), &path);
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn file_values_override_defaults_and_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(
            &path,
            r#"{
                "base_url": " http://localhost:7860/ ",
                "defaults": {"relationship": "coworker", "language": "auto", "intensify": "edgier"}
            }"#,
        )
        .unwrap();

        let settings = SettingsStore::load_from(file_only(&path), &path);
        assert_eq!(settings.base_url, "http://localhost:7860");
        assert_eq!(settings.defaults.relationship, Relationship::Coworker);
        assert_eq!(settings.defaults.tone, Tone::Friendly);
        assert_eq!(settings.defaults.language, None);
        assert_eq!(settings.defaults.intensify, None);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{"defaults": {"personalness": 400}}"#).unwrap();

        let settings = SettingsStore::load_from(file_only(&path), &path);
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn environment_overrides_the_settings_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE_NAME,
                r#"{"defaults": {"tone": "playful", "scenario": "flirt"}}"#,
            )?;
            jail.set_env("TEXTSENSE_DEFAULTS__TONE", "formal");
            jail.set_env("TEXTSENSE_BASE_URL", "http://localhost:7860/");

            let path = jail.directory().join(SETTINGS_FILE_NAME);
            let settings = SettingsStore::load_from(SettingsStore::figment(&path), &path);
            assert_eq!(settings.defaults.tone, Tone::Formal);
            assert_eq!(settings.defaults.scenario, Scenario::Flirt);
            assert_eq!(settings.base_url, "http://localhost:7860");
            Ok(())
        });
    }

    #[test]
    fn save_reports_the_directory_it_could_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let error = write_replacing(&blocker.join(SETTINGS_FILE_NAME), "{}").unwrap_err();
        assert!(matches!(
            error,
            SettingsError::PrepareConfigDir { ref dir, .. } if *dir == blocker
        ));
    }

    #[test]
    fn update_persists_and_swaps_current_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let store = SettingsStore {
            settings: Arc::new(ArcSwap::from_pointee(AppSettings::default())),
            config_path: path.clone(),
        };

        let mut changed = AppSettings::default();
        changed.base_url = "http://127.0.0.1:9000/".to_string();
        changed.defaults.intensify = Some(Intensify::Softer);
        store.update(changed).unwrap();

        assert_eq!(store.settings().base_url, "http://127.0.0.1:9000");
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = SettingsStore::load_from(file_only(&path), &path);
        assert_eq!(reloaded, *store.settings());
    }
}
