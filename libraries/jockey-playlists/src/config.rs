/// Playlist engine configuration
use crate::error::{PlaylistError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistsConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_generation")]
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory holding auto playlist configuration files
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Extension of auto playlist configuration files, including the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Play count file name, relative to `config_dir`
    #[serde(default = "default_play_count_file")]
    pub play_count_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationSettings {
    /// Evaluate an auto playlist's rules concurrently
    #[serde(default = "default_concurrent_rules")]
    pub concurrent_rules: bool,
}

impl Default for PlaylistsConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            generation: default_generation(),
        }
    }
}

impl PlaylistsConfig {
    /// Load configuration from `jockey.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("jockey.toml")
    }

    /// Load configuration from a file (if present) and the environment
    ///
    /// Environment variables use the `JOCKEY_` prefix with `__` between
    /// sections, e.g. `JOCKEY_STORAGE__CONFIG_DIR`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let path = path.as_ref();
        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("JOCKEY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| PlaylistError::Config(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| PlaylistError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Configuration rooted at `dir`, everything else default
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.storage.config_dir = dir.into();
        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let extension = &self.storage.extension;
        if extension.len() < 2 || !extension.starts_with('.') {
            return Err(PlaylistError::Config(format!(
                "auto playlist extension must start with a dot, got {:?}",
                extension
            )));
        }

        if self.storage.play_count_file.trim().is_empty() {
            return Err(PlaylistError::Config(
                "play count file name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn play_count_path(&self) -> PathBuf {
        self.storage.config_dir.join(&self.storage.play_count_file)
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        config_dir: default_config_dir(),
        extension: default_extension(),
        play_count_file: default_play_count_file(),
    }
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("./data/playlists")
}

fn default_extension() -> String {
    ".jpl".to_string()
}

fn default_play_count_file() -> String {
    "play_counts.json".to_string()
}

fn default_generation() -> GenerationSettings {
    GenerationSettings {
        concurrent_rules: default_concurrent_rules(),
    }
}

fn default_concurrent_rules() -> bool {
    true
}
