use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use smoothbrot_core::View;
use smoothbrot_render::{BackendKind, ColorRanges};

// ---------------------------------------------------------------------------
// Render settings
// ---------------------------------------------------------------------------

/// Everything the preview binary needs to produce one render.
///
/// Every field has a default, so a settings file only has to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub view: View,
    #[serde(default)]
    pub colors: ColorRanges,
    #[serde(default)]
    pub backend: BackendKind,
    /// CPU worker threads; 0 picks one per core.
    #[serde(default)]
    pub workers: usize,
    /// Leave one core free for the calling thread when `workers` is 0.
    #[serde(default = "default_true")]
    pub reserve_orchestrator: bool,
    /// Terminal columns used by the preview.
    #[serde(default = "default_preview_width")]
    pub preview_width: u16,
}

fn default_true() -> bool {
    true
}
fn default_preview_width() -> u16 {
    80
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            view: View::default(),
            colors: ColorRanges::default(),
            backend: BackendKind::default(),
            workers: 0,
            reserve_orchestrator: default_true(),
            preview_width: default_preview_width(),
        }
    }
}

impl RenderSettings {
    /// Load settings from `path`, falling back to defaults.
    ///
    /// A missing file is not an error. An unreadable or invalid file is
    /// logged and ignored.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<RenderSettings>(&json) {
                    Ok(settings) => {
                        info!("Loaded settings from {}", path.display());
                        return settings;
                    }
                    Err(e) => {
                        error!("Failed to parse settings {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    error!("Failed to read settings file: {e}");
                }
            }
        } else {
            debug!("No settings file at {}", path.display());
        }
        Self::default()
    }

    /// Write settings to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create settings directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write settings: {e}");
                } else {
                    debug!("Saved settings to {}", path.display());
                }
            }
            Err(e) => error!("Failed to serialize settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RenderSettings::load(&dir.path().join("absent.json"));
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"workers": 3, "colors": {"saturation": [0.2, 0.6]}}"#,
        )
        .unwrap();

        let settings = RenderSettings::load(&path);
        assert_eq!(settings.workers, 3);
        assert_eq!(settings.colors.saturation.min(), 0.2);
        assert_eq!(settings.colors.saturation.max(), 0.6);
        assert_eq!(settings.view, View::default());
        assert_eq!(settings.backend, BackendKind::Cpu);
        assert!(settings.reserve_orchestrator);
        assert_eq!(settings.preview_width, 80);
    }

    #[test]
    fn invalid_view_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"view": {"re_min": 1.0, "re_max": -1.0, "im_min": -1.0, "im_max": 1.0,
                         "resolution": 8, "iteration_cap": 10, "escape_radius": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(RenderSettings::load(&path), RenderSettings::default());
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(RenderSettings::load(&path), RenderSettings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = RenderSettings {
            view: View::default().with_resolution(64).unwrap(),
            backend: BackendKind::Gpu,
            workers: 2,
            reserve_orchestrator: false,
            preview_width: 40,
            ..RenderSettings::default()
        };
        settings.save(&path);
        assert_eq!(RenderSettings::load(&path), settings);
    }
}
