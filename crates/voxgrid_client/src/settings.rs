use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_PATH: &str = "settings.toml";
const MAX_WORKER_THREADS: usize = 32;
const MIN_VIEW_RADIUS: i32 = 0;
const MAX_VIEW_RADIUS: i32 = 16;
const MIN_VIEW_HEIGHT: i32 = 1;
const MAX_VIEW_HEIGHT: i32 = 8;
const MIN_SUBMITS_PER_FRAME: usize = 1;
const MAX_SUBMITS_PER_FRAME: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Mesh worker threads; absent means "derive from the CPU count".
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Optional TOML voxel table; the built-in table is used when absent.
    #[serde(default)]
    pub voxel_table: Option<PathBuf>,
    #[serde(default = "default_world_seed")]
    pub world_seed: u64,
    /// Chunks loaded in each horizontal direction around the origin.
    #[serde(default = "default_view_radius")]
    pub view_radius: i32,
    /// Vertical chunk layers starting at y = 0.
    #[serde(default = "default_view_height")]
    pub view_height: i32,
    #[serde(default = "default_max_submits_per_frame")]
    pub max_submits_per_frame: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            worker_threads: None,
            voxel_table: None,
            world_seed: default_world_seed(),
            view_radius: default_view_radius(),
            view_height: default_view_height(),
            max_submits_per_frame: default_max_submits_per_frame(),
        }
    }
}

impl ClientSettings {
    pub fn sanitize(mut self) -> Self {
        self.worker_threads = self
            .worker_threads
            .map(|threads| threads.clamp(1, MAX_WORKER_THREADS));
        self.view_radius = self.view_radius.clamp(MIN_VIEW_RADIUS, MAX_VIEW_RADIUS);
        self.view_height = self.view_height.clamp(MIN_VIEW_HEIGHT, MAX_VIEW_HEIGHT);
        self.max_submits_per_frame = self
            .max_submits_per_frame
            .clamp(MIN_SUBMITS_PER_FRAME, MAX_SUBMITS_PER_FRAME);
        self
    }

    pub fn from_toml_str(contents: &str) -> io::Result<Self> {
        let parsed = toml::from_str::<Self>(contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize settings: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let settings = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&settings).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize settings: {e}"),
            )
        })?;
        fs::write(path, serialized)
    }
}

/// Loads settings, writing defaults back when the file is missing or unreadable.
pub fn load_or_create_settings(path: &Path) -> ClientSettings {
    match ClientSettings::load(path) {
        Ok(settings) => settings,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let settings = ClientSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to create default settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
        Err(err) => {
            warn!("Failed to load settings from {}: {err}", path.display());
            ClientSettings::default()
        }
    }
}

fn default_world_seed() -> u64 {
    0x5EED
}

fn default_view_radius() -> i32 {
    2
}

fn default_view_height() -> i32 {
    2
}

fn default_max_submits_per_frame() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::{load_or_create_settings, ClientSettings};

    #[test]
    fn empty_file_uses_defaults() {
        let settings = ClientSettings::from_toml_str("").expect("empty settings parse");
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let settings = ClientSettings::from_toml_str(
            r#"
            worker_threads = 0
            view_radius = 99
            view_height = -3
            max_submits_per_frame = 0
            "#,
        )
        .expect("settings parse");

        assert_eq!(settings.worker_threads, Some(1));
        assert_eq!(settings.view_radius, 16);
        assert_eq!(settings.view_height, 1);
        assert_eq!(settings.max_submits_per_frame, 1);
    }

    #[test]
    fn malformed_settings_report_invalid_data() {
        let err = ClientSettings::from_toml_str("view_radius = \"far\"").expect_err("bad type");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = std::env::temp_dir().join(format!("voxgrid-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("settings.toml");

        let settings = ClientSettings {
            worker_threads: Some(3),
            voxel_table: Some(PathBuf::from("content/voxels.toml")),
            world_seed: 99,
            view_radius: 4,
            view_height: 3,
            max_submits_per_frame: 8,
        };
        settings.save(&path).expect("save settings");
        let loaded = ClientSettings::load(&path).expect("load settings");
        assert_eq!(loaded, settings);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_settings_file_is_created_with_defaults() {
        let dir = std::env::temp_dir().join(format!("voxgrid-settings-new-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("settings.toml");
        let _ = std::fs::remove_file(&path);

        let settings = load_or_create_settings(&path);
        assert_eq!(settings, ClientSettings::default());
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
