//! Console-output cleanup applied before any parsing

use regex::Regex;
use std::sync::LazyLock;

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[a-zA-Z]").expect("static regex must compile"));
static DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{3,}$").expect("static regex must compile"));
static DASH_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{3,}").expect("static regex must compile"));
static BLANKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("static regex must compile"));

/// Timestamped echo the kvas wrapper prints ahead of the real report,
/// e.g. `2025/02/13 19:51:47 Output:`
const LOG_ECHO_MARKER: &str = "Output:";

/// Interactive question kvas asks when it wants to restore a backup list
/// instead of printing data
const RESTORE_PROMPT: &str = "? Восстановить";

/// Gap left between a label and its value after normalization
const COLUMN_GAP: &str = "  ";

/// Remove ANSI escape sequences and surrounding whitespace
pub fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").trim().to_string()
}

/// A line made of three or more dashes and nothing else
pub fn is_divider(line: &str) -> bool {
    DIVIDER_RE.is_match(line.trim())
}

pub fn has_restore_prompt(text: &str) -> bool {
    text.contains(RESTORE_PROMPT)
}

/// Prepare the status report for section splitting.
///
/// Line structure is kept intact: divider lines survive verbatim, dash runs
/// embedded in other text are dropped, and whitespace runs are canonicalized
/// so that a wide label/value gap stays wide (two spaces) while a single
/// separator stays single.
pub fn normalize_report(raw: &str) -> String {
    let stripped = ANSI_RE.replace_all(raw, "");

    let mut lines = Vec::new();
    for line in stripped.lines() {
        if line.contains(LOG_ECHO_MARKER) {
            continue;
        }
        let trimmed = line.trim();
        if is_divider(trimmed) {
            lines.push(trimmed.to_string());
            continue;
        }

        let without_dashes = DASH_RUN_RE.replace_all(trimmed, "");
        let canonical = BLANKS_RE.replace_all(&without_dashes, |caps: &regex::Captures| {
            if caps[0].chars().count() >= 2 {
                COLUMN_GAP
            } else {
                " "
            }
        });
        lines.push(canonical.trim().to_string());
    }

    lines.join("\n").trim().to_string()
}

/// Squash output into a single-spaced blob for keyword matching
pub fn compact(raw: &str) -> String {
    let stripped = ANSI_RE.replace_all(raw, "");
    let without_dashes = DASH_RUN_RE.replace_all(&stripped, "");
    BLANKS_RE
        .replace_all(&without_dashes, " ")
        .trim()
        .to_string()
}
