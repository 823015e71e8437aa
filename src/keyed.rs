//! Linear-scan CRUD over name-keyed collections.
//!
//! Every name-keyed collection in the configuration models (resources,
//! environments, servlets, filters, roles, ...) follows the same contract:
//! names are unique, `add` fails on a duplicate, `update`/`remove` fail when
//! the name is absent, and declaration order is preserved otherwise. The
//! collections are small (a handful of entries in a real `conf/`), so a
//! linear scan is the right tool.

use crate::error::{Result, TomcatKitError};

pub(crate) fn get<'a, T>(items: &'a [T], name: &str, key: fn(&T) -> &str) -> Option<&'a T> {
    items.iter().find(|item| key(item) == name)
}

pub(crate) fn add<T>(
    items: &mut Vec<T>,
    item: T,
    key: fn(&T) -> &str,
    kind: &'static str,
) -> Result<()> {
    let name = key(&item);
    if items.iter().any(|existing| key(existing) == name) {
        return Err(TomcatKitError::duplicate(kind, name));
    }
    items.push(item);
    Ok(())
}

/// Replace the entry whose key matches `item`'s key, keeping its position.
pub(crate) fn update<T>(
    items: &mut [T],
    item: T,
    key: fn(&T) -> &str,
    kind: &'static str,
) -> Result<()> {
    let name = key(&item);
    match items.iter_mut().find(|existing| key(existing) == name) {
        Some(slot) => {
            *slot = item;
            Ok(())
        }
        None => Err(TomcatKitError::not_found(kind, name)),
    }
}

pub(crate) fn remove<T>(
    items: &mut Vec<T>,
    name: &str,
    key: fn(&T) -> &str,
    kind: &'static str,
) -> Result<T> {
    match items.iter().position(|item| key(item) == name) {
        Some(idx) => Ok(items.remove(idx)),
        None => Err(TomcatKitError::not_found(kind, name)),
    }
}

/// Remove by position; subsequent elements shift down.
pub(crate) fn remove_at<T>(items: &mut Vec<T>, index: usize, kind: &'static str) -> Result<T> {
    if index >= items.len() {
        return Err(TomcatKitError::IndexOutOfRange {
            kind,
            index,
            len: items.len(),
        });
    }
    Ok(items.remove(index))
}

pub(crate) fn replace_at<T>(
    items: &mut [T],
    index: usize,
    item: T,
    kind: &'static str,
) -> Result<()> {
    match items.get_mut(index) {
        Some(slot) => {
            *slot = item;
            Ok(())
        }
        None => Err(TomcatKitError::IndexOutOfRange {
            kind,
            index,
            len: items.len(),
        }),
    }
}
