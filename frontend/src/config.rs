//! Optional TOML config file providing defaults the CLI can override.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Nearest,
    Linear,
}

impl Quality {
    /// SDL render scale quality hint value.
    pub fn hint(self) -> &'static str {
        match self {
            Quality::Nearest => "nearest",
            Quality::Linear => "linear",
        }
    }
}

#[derive(Default, Deserialize)]
pub struct Config {
    pub scale: Option<u32>,
    pub quality: Option<Quality>,
}

impl Config {
    /// Read `vermilion.toml` from the user config directory. Absent or
    /// malformed files fall back to defaults (malformed with a warning).
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vermilion").join("vermilion.toml"))
    }
}
