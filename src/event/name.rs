//! Event name and listener pattern rules.

use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// The global wildcard. Listeners registered under it see every publish.
pub const WILDCARD: &str = "*";

static EVENT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").expect("valid event name regex"));

static GROUP_PATTERN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*\.\*$").expect("valid group pattern regex")
});

/// Validate an event name and return it trimmed.
///
/// Names must start with an ASCII letter, followed by letters, digits,
/// `_`, `.` or `-`.
pub fn check_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_name(name, "the event name cannot be empty"));
    }

    if !EVENT_NAME_RE.is_match(trimmed) {
        return Err(Error::invalid_name(
            name,
            "must match '^[A-Za-z][A-Za-z0-9_.-]*$'",
        ));
    }

    Ok(trimmed)
}

/// Validate a listener registration key and return it trimmed.
///
/// Accepts an event name, a group pattern such as `app.user.*`, or the
/// global [`WILDCARD`].
pub fn check_pattern(pattern: &str) -> Result<&str> {
    let trimmed = pattern.trim();
    if trimmed == WILDCARD || GROUP_PATTERN_RE.is_match(trimmed) {
        return Ok(trimmed);
    }

    check_name(pattern)
}

/// The group pattern that covers `name`: `"aa.bb.cc"` gives `"aa.bb.*"`.
///
/// Returns `None` when the name has no `.` or ends with one.
pub fn group_pattern(name: &str) -> Option<String> {
    let pos = name.rfind('.')?;
    if pos + 1 == name.len() {
        return None;
    }

    let mut group = String::with_capacity(pos + 2);
    group.push_str(&name[..=pos]);
    group.push_str(WILDCARD);
    Some(group)
}
