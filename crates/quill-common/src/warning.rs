//! Layout warnings with colored terminal output.
//!
//! Layout never fails on a value it does not support; it falls back to a
//! documented default instead. These fallbacks are reported here, once per
//! unique message, so a page with a thousand justified paragraphs prints a
//! single line.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use strum_macros::{Display, IntoStaticStr};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// The subsystem a warning originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Component {
    /// Style facade: unknown keywords, unresolvable values.
    Style,
    /// Block and inline layout.
    Layout,
    /// Text measurement and boundary lookup.
    Text,
    /// Scene loading in the command line tool.
    Scene,
}

/// Warn about an unsupported feature (prints once per unique message).
///
/// # Example
/// ```ignore
/// warn_once(Component::Layout, "text-align: justify is treated as left");
/// ```
pub fn warn_once(component: Component, message: &str) {
    if record(component, message) {
        eprintln!("{YELLOW}[Quill {component}] ⚠ {message}{RESET}");
    }
}

/// Returns `true` the first time a `(component, message)` pair is seen.
///
/// A poisoned lock only means another thread panicked while printing; the
/// set itself is still usable.
fn record(component: Component, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Clear all recorded warnings (call before laying out a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deduplicates_per_component() {
        assert!(record(Component::Text, "repeated message"));
        assert!(!record(Component::Text, "repeated message"));
        assert!(record(Component::Style, "repeated message"));
    }
}
