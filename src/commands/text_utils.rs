use std::path::Path;

pub(super) fn normalize_to_lf(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

pub(super) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Seconds as AppleScript `delay` expects them, without a trailing `.0`.
pub(super) fn millis_to_seconds_literal(millis: u64) -> String {
    format!("{}", millis as f64 / 1000.0)
}
