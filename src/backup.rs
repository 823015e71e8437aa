//! Backup copies taken before a configuration file is overwritten.
//!
//! Backups land in `<CATALINA_BASE>/conf/backup/`, created on demand. A
//! source file that does not exist yet is silently skipped — first save of a
//! freshly defaulted config produces no backup and no error.
//!
//! Two naming schemes are in use:
//!
//! - [`backup_fixed`] — a single rolling copy (`context.xml.bak`), overwritten
//!   on every save.
//! - [`backup_timestamped`] — one copy per save (`web.xml.20260823_141503`),
//!   so earlier revisions stay recoverable.

use std::path::{Path, PathBuf};

use chrono::Local;
use log::debug;

use crate::error::{Result, TomcatKitError};

/// Copy `source` into the backup directory under a fixed `.bak` name.
///
/// Returns the backup path, or `None` when `source` does not exist.
pub fn backup_fixed(source: &Path) -> Result<Option<PathBuf>> {
    let Some(file_name) = source.file_name() else {
        return Ok(None);
    };
    let mut name = file_name.to_os_string();
    name.push(".bak");
    copy_to_backup(source, name.into())
}

/// Copy `source` into the backup directory under a timestamped name
/// (`<file>.<YYYYMMDD_HHMMSS>`).
///
/// Returns the backup path, or `None` when `source` does not exist.
pub fn backup_timestamped(source: &Path) -> Result<Option<PathBuf>> {
    let Some(file_name) = source.file_name() else {
        return Ok(None);
    };
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut name = file_name.to_os_string();
    name.push(format!(".{stamp}"));
    copy_to_backup(source, name.into())
}

fn copy_to_backup(source: &Path, backup_name: PathBuf) -> Result<Option<PathBuf>> {
    if !source.exists() {
        debug!("no existing file at {}, skipping backup", source.display());
        return Ok(None);
    }

    // Backups live in a `backup/` directory next to the source file, which
    // for all callers is `<base>/conf/backup/`.
    let backup_dir = source
        .parent()
        .map(|p| p.join("backup"))
        .unwrap_or_else(|| PathBuf::from("backup"));
    std::fs::create_dir_all(&backup_dir).map_err(|e| TomcatKitError::io(&backup_dir, e))?;

    let target = backup_dir.join(backup_name);
    std::fs::copy(source, &target).map_err(|e| TomcatKitError::io(&target, e))?;
    debug!("backed up {} to {}", source.display(), target.display());
    Ok(Some(target))
}
