//! Stylesheet warnings with colored terminal output.
//!
//! Provides deduplication so that a stylesheet reloaded many times (or a
//! value repeated across hundreds of rules) reports each problem once.
//! Used by the LESS parser to echo recoverable warnings and value fallbacks.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Upper bound on remembered messages. A full set is emptied before the
/// next insert, so long-running hosts may see an old warning again.
pub const MAX_RECORDED_WARNINGS: usize = 4096;

/// When set, warnings are still recorded but nothing is printed.
static QUIET: AtomicBool = AtomicBool::new(false);

/// Warn about a recoverable problem (prints once per unique message).
///
/// Returns `true` if this message had not been reported before.
///
/// # Example
/// ```ignore
/// warn_once("LESS", "undefined variable @accent in color");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let first_time = {
        let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
        let set = guard.get_or_insert_with(HashSet::new);
        if set.len() >= MAX_RECORDED_WARNINGS && !set.contains(&key) {
            set.clear();
        }
        set.insert(key)
    };

    if first_time && !QUIET.load(Ordering::Relaxed) {
        eprintln!("{YELLOW}[reflekt {component}] ⚠ {message}{RESET}");
    }
    first_time
}

/// Silence (or re-enable) terminal output for warnings.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

/// Clear all recorded warnings (call when loading a new stylesheet)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: `clear_warnings` touches the shared set, so the checks must
    // not interleave with each other.
    #[test]
    fn test_warn_once_deduplicates_until_cleared() {
        set_quiet(true);
        assert!(warn_once("TEST", "dedup-check message"));
        assert!(!warn_once("TEST", "dedup-check message"));
        assert!(warn_once("OTHER", "dedup-check message"));

        clear_warnings();
        assert!(warn_once("TEST", "dedup-check message"));

        // The set never grows past the cap.
        for i in 1..MAX_RECORDED_WARNINGS {
            assert!(warn_once("TEST", &format!("filler {i}")));
        }
        assert!(!warn_once("TEST", "dedup-check message"));
        assert!(warn_once("TEST", "one past the cap"));
        assert!(warn_once("TEST", "dedup-check message"));
        let recorded = WARNED
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, HashSet::len);
        assert_eq!(recorded, 2);
        clear_warnings();
    }
}
