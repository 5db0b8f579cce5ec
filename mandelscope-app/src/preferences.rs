use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use mandelscope_core::{ColorTheme, EscapeParams};
use mandelscope_engine::SessionDefaults;

// ---------------------------------------------------------------------------
// Application preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_max_iterations")]
    pub default_max_iterations: u32,
    #[serde(default = "default_radius_squared")]
    pub default_radius_squared: f64,
    #[serde(default)]
    pub default_theme: ColorTheme,
    /// Custom sessions directory. When empty, the platform data directory is used.
    #[serde(default)]
    pub sessions_dir: String,
    /// Custom export directory. When empty, an `images/` folder next to the executable is used.
    #[serde(default)]
    pub export_dir: String,
    /// Log how long each action's recomputation took.
    #[serde(default)]
    pub log_recompute_timings: bool,
}

fn default_max_iterations() -> u32 {
    EscapeParams::DEFAULT_MAX_ITERATIONS
}
fn default_radius_squared() -> f64 {
    EscapeParams::DEFAULT_RADIUS_SQUARED
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_max_iterations: default_max_iterations(),
            default_radius_squared: default_radius_squared(),
            default_theme: ColorTheme::default(),
            sessions_dir: String::new(),
            export_dir: String::new(),
            log_recompute_timings: false,
        }
    }
}

impl Preferences {
    /// Load preferences from next to the executable, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No preferences file at {}", path.display());
            let prefs = Self::default();
            prefs.save_to(&path);
            prefs
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Preferences>(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    return prefs;
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Err(e) => error!("Failed to read preferences file: {e}"),
        }
        Self::default()
    }

    /// Persist preferences to disk.
    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create preferences directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences");
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }

    /// What a session resets to. Out-of-range values fall back to the
    /// built-in defaults.
    pub fn session_defaults(&self) -> SessionDefaults {
        let params = EscapeParams::new(self.default_max_iterations, self.default_radius_squared)
            .unwrap_or_else(|e| {
                warn!("Ignoring preferred escape parameters: {e}");
                EscapeParams::default()
            });
        SessionDefaults {
            params,
            color_theme: self.default_theme,
        }
    }

    pub fn sessions_directory(&self) -> PathBuf {
        if self.sessions_dir.is_empty() {
            crate::app_dir::sessions_directory()
        } else {
            PathBuf::from(&self.sessions_dir)
        }
    }

    pub fn export_directory(&self) -> PathBuf {
        if self.export_dir.is_empty() {
            crate::app_dir::images_directory()
        } else {
            PathBuf::from(&self.export_dir)
        }
    }
}

fn config_path() -> PathBuf {
    crate::app_dir::exe_directory().join("preferences.json")
}
