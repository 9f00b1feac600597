//! Human-readable byte sizes for user-facing messages.

/// Format a byte count with one decimal place and a binary unit.
///
/// ```
/// use jotter_core::size::humanize_size;
///
/// assert_eq!(humanize_size(10 * 1024 * 1024), "10.0 MB");
/// assert_eq!(humanize_size(1536), "1.5 KB");
/// assert_eq!(humanize_size(512), "512 B");
/// ```
pub fn humanize_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    let sign = if bytes < 0 { "-" } else { "" };
    let magnitude = bytes.unsigned_abs();

    if (magnitude as f64) < KB {
        return format!("{}{} B", sign, magnitude);
    }

    let mut value = magnitude as f64 / KB;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < KB {
            break;
        }
        value /= KB;
        unit = next;
    }

    format!("{}{:.1} {}", sign, value, unit)
}
