//! Byte-count rendering for log lines and completion summaries.

/// Formats a byte count with the nearest of `B`, `KB`, `MB`, or `GB`.
///
/// Thresholds are 1024, 1024·1000, and 1024·1024·1000; plain bytes print as
/// an integer, everything else with one decimal. The format is frozen
/// because it appears in log files that other tooling may parse.
///
/// # Examples
///
/// ```
/// use pdumpfs_engine::format_bytes;
///
/// assert_eq!(format_bytes(0), "0B");
/// assert_eq!(format_bytes(2048), "2.0KB");
/// assert_eq!(format_bytes(1536), "1.5KB");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else if bytes < 1024 * 1000 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1000 {
        format!("{:.1}MB", bytes as f64 / 1024.0 / 1024.0)
    } else {
        format!("{:.1}GB", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_below_1024_print_as_integers() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(1023), "1023B");
    }

    #[test]
    fn kilobytes_start_at_1024() {
        assert_eq!(format_bytes(1024), "1.0KB");
        assert_eq!(format_bytes(1536), "1.5KB");
        assert_eq!(format_bytes(1024 * 1000 - 1), "1000.0KB");
    }

    #[test]
    fn megabytes_start_at_1024_x_1000() {
        assert_eq!(format_bytes(1024 * 1000), "1.0MB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0MB");
    }

    #[test]
    fn gigabytes_start_at_1024_x_1024_x_1000() {
        assert_eq!(format_bytes(1024 * 1024 * 1000), "1.0GB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0GB");
    }
}
