//! The detected-installation value type shared between the persistence
//! services (which take its `catalina_base` as the root directory) and the
//! settings file (which records recently used instances).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One local Tomcat installation as reported by detection.
///
/// `catalina_home` is the installation directory; `catalina_base` is the
/// runtime instance directory holding `conf/`, `logs/`, and `webapps/`. For a
/// plain single-instance install the two are the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomcatInstance {
    #[serde(rename = "CatalinaHome")]
    pub catalina_home: PathBuf,
    #[serde(rename = "CatalinaBase")]
    pub catalina_base: PathBuf,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "IsRunning")]
    pub is_running: bool,
    #[serde(rename = "PID")]
    pub pid: Option<u32>,
}

impl TomcatInstance {
    /// An instance where home and base are the same directory, not running.
    pub fn at(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        let path = path.into();
        TomcatInstance {
            catalina_home: path.clone(),
            catalina_base: path,
            version: version.into(),
            is_running: false,
            pid: None,
        }
    }

    /// The `conf/` directory of this instance.
    pub fn conf_dir(&self) -> PathBuf {
        self.catalina_base.join("conf")
    }

    /// Two instances are the same installation if home and base match;
    /// version and run state are observations, not identity.
    pub fn same_installation(&self, other: &TomcatInstance) -> bool {
        self.catalina_home == other.catalina_home && self.catalina_base == other.catalina_base
    }

    pub fn base(&self) -> &Path {
        &self.catalina_base
    }
}
