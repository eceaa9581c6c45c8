//! The execution-directory wrapper: some Locators only
//! examine the process-wide current working directory, so invoking
//! them safely means temporarily chdir-ing into the target file's
//! directory and restoring the original directory on every exit path,
//! including an unwinding panic. This is the single source of
//! process-wide mutation in the Loader and must be serialized —
//! nested use is forbidden.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::Lazy;

static WORKDIR_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Restores the previous working directory when dropped, so a panic
/// unwinding through `with_working_dir` still leaves the process in a
/// sane state.
struct RestoreOnDrop(PathBuf);

impl Drop for RestoreOnDrop {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.0);
    }
}

/// Runs `f` with the process working directory set to `dir`,
/// restoring the previous directory afterward regardless of how `f`
/// returns (including panicking).
pub fn with_working_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> std::io::Result<T> {
    let _lock = WORKDIR_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = std::env::current_dir()?;
    std::env::set_current_dir(dir)?;
    let _restore = RestoreOnDrop(previous);
    Ok(f())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_previous_directory() {
        let before = std::env::current_dir().unwrap();
        let tmp = std::env::temp_dir();
        with_working_dir(&tmp, || {}).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn restores_directory_when_closure_panics() {
        let before = std::env::current_dir().unwrap();
        let tmp = std::env::temp_dir();
        let result = std::panic::catch_unwind(|| {
            let _ = with_working_dir(&tmp, || panic!("boom"));
        });
        assert!(result.is_err());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
