//! Named failure points for fault-injection tests.
//!
//! A point armed with [`activate`] makes the code path that checks it
//! fail with [`IndexError::Debug`] until [`clear`]ed. Checks against
//! unarmed points cost one mutex acquisition and are otherwise inert.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use crate::error::IndexError;

fn registry() -> &'static Mutex<HashSet<&'static str>> {
    static POINTS: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    POINTS.get_or_init(|| Mutex::new(HashSet::new()))
}

pub fn activate(name: &'static str) {
    registry().lock().unwrap().insert(name);
}

pub fn clear(name: &'static str) {
    registry().lock().unwrap().remove(name);
}

pub fn clear_all() {
    registry().lock().unwrap().clear();
}

pub(crate) fn check(name: &'static str) -> Result<(), IndexError> {
    if registry().lock().unwrap().contains(name) {
        return Err(IndexError::Debug(name));
    }
    Ok(())
}
