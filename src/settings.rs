//! Application settings persisted as JSON in the platform config directory.
//!
//! Unlike the Tomcat files, `settings.json` belongs to this tool, so there is
//! no backup step and a missing or empty file simply means defaults.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TomcatKitError};
use crate::instance::TomcatInstance;

const MAX_RECENT: usize = 5;

/// Persisted user preferences and instance history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub last_catalina_home: Option<PathBuf>,
    pub last_catalina_base: Option<PathBuf>,
    pub recent_paths: Vec<TomcatInstance>,
    pub language: Option<String>,
}

/// Loads and saves [`Settings`] at a fixed path.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// A store at the platform-conventional location
    /// (e.g. `~/.config/tomcatkit/settings.json` on Linux).
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "tomcatkit").ok_or_else(|| {
            TomcatKitError::Io {
                path: PathBuf::from("settings.json"),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no home directory available",
                ),
            }
        })?;
        Self::open_at(dirs.config_dir().join("settings.json"))
    }

    /// A store at an explicit path. Missing file means defaults.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| TomcatKitError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, using defaults", path.display());
                Settings::default()
            }
            Err(e) => return Err(TomcatKitError::io(&path, e)),
        };
        Ok(SettingsStore { path, settings })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TomcatKitError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            TomcatKitError::Parse {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        std::fs::write(&self.path, json).map_err(|e| TomcatKitError::io(&self.path, e))?;
        debug!("wrote {}", self.path.display());
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Record `instance` as the most recently used one: moved (or inserted)
    /// at the front of the history, which is capped at five entries, and
    /// mirrored into the `last_*` fields.
    pub fn set_last_instance(&mut self, instance: TomcatInstance) {
        self.settings
            .recent_paths
            .retain(|known| !known.same_installation(&instance));
        self.settings.recent_paths.insert(0, instance.clone());
        self.settings.recent_paths.truncate(MAX_RECENT);

        self.settings.last_catalina_home = Some(instance.catalina_home.clone());
        self.settings.last_catalina_base = Some(instance.catalina_base.clone());
    }

    pub fn recent_instances(&self) -> &[TomcatInstance] {
        &self.settings.recent_paths
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn instance(n: u32) -> TomcatInstance {
        let mut inst = TomcatInstance::at(format!("/opt/tomcat{n}"), "10.1.20");
        inst.catalina_base = PathBuf::from(format!("/var/tomcat{n}"));
        inst
    }

    fn store(dir: &TempDir) -> SettingsStore {
        SettingsStore::open_at(dir.path().join("settings.json")).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = SettingsStore::open_at(&path).unwrap_err();
        assert!(matches!(err, TomcatKitError::Parse { .. }));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config/settings.json");
        let mut store = SettingsStore::open_at(&path).unwrap();
        store.settings_mut().language = Some("de".to_string());
        store.save().unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn save_round_trips_through_open() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        store.set_last_instance(instance(1));
        store.settings_mut().language = Some("en".to_string());
        store.save().unwrap();

        let reopened = SettingsStore::open_at(store.path()).unwrap();
        assert_eq!(reopened.settings(), store.settings());
    }

    #[test]
    fn json_field_names_are_stable() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        store.set_last_instance(instance(1));
        store.save().unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\"last_catalina_home\""));
        assert!(text.contains("\"recent_paths\""));
        assert!(text.contains("\"CatalinaHome\""));
    }

    // --- recent instance ring ---

    #[test]
    fn last_instance_moves_to_front_and_syncs_last_fields() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        store.set_last_instance(instance(1));
        store.set_last_instance(instance(2));
        store.set_last_instance(instance(1));

        assert_eq!(store.recent_instances().len(), 2);
        assert_eq!(
            store.recent_instances()[0].catalina_home,
            PathBuf::from("/opt/tomcat1")
        );
        assert_eq!(
            store.settings().last_catalina_base,
            Some(PathBuf::from("/var/tomcat1"))
        );
    }

    #[test]
    fn history_is_capped_at_five() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        for n in 1..=6 {
            store.set_last_instance(instance(n));
        }
        assert_eq!(store.recent_instances().len(), 5);
        assert_eq!(
            store.recent_instances()[0].catalina_home,
            PathBuf::from("/opt/tomcat6")
        );
        // oldest entry dropped
        assert!(store
            .recent_instances()
            .iter()
            .all(|i| i.catalina_home != PathBuf::from("/opt/tomcat1")));
    }

    #[test]
    fn same_installation_ignores_runtime_fields() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut running = instance(1);
        running.is_running = true;
        running.pid = Some(4242);
        store.set_last_instance(instance(1));
        store.set_last_instance(running);
        assert_eq!(store.recent_instances().len(), 1);
        assert!(store.recent_instances()[0].is_running);
    }
}
