//! Markup stripping for user-supplied free text.
//!
//! Fields are cleaned once before transmission/storage; the email renderer
//! additionally HTML-escapes whatever it interpolates (see notify.rs).

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^<>]*>").expect("tag pattern")
});

/// Remove HTML/script-bearing tag constructs from `input`.
///
/// Strips to a fixpoint so fragments reassembled by one removal pass
/// (`<scr<b>ipt>`) do not survive. Plain text without angle-bracket pairs
/// comes back unchanged, and cleaning already-clean text is a no-op.
pub fn clean(input: &str) -> String {
    let mut out = input.to_string();
    loop {
        let next = TAG_RE.replace_all(&out, "").into_owned();
        if next == out {
            return out;
        }
        out = next;
    }
}
