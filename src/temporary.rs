//! Tracking of partially written outputs, deleted if the run is interrupted.
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

static TEMPS: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(<_>::default);

/// Add a file as temporary so it can be deleted later.
pub fn add(file: impl Into<PathBuf>) {
    TEMPS.lock().unwrap().insert(file.into());
}

/// Remove a previously added file so that it won't be deleted later,
/// if it hasn't already.
pub fn unadd(file: &Path) -> bool {
    TEMPS.lock().unwrap().remove(file)
}

/// Delete a temporary file now.
pub async fn remove(file: &Path) {
    unadd(file);
    let _ = tokio::fs::remove_file(file).await;
}

/// Delete all added temporary files.
pub async fn clean() {
    let temps = std::mem::take(&mut *TEMPS.lock().unwrap());
    for file in temps {
        let _ = tokio::fs::remove_file(file).await;
    }
}
