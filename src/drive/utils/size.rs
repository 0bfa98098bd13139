/// Format a byte count in human-readable form, using 1024 base and units B, KB, MB, GB, TB, PB.
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    const THRESHOLD: f64 = 1024.0;
    let mut size_f = size as f64;
    let mut unit_index = 0;
    while size_f >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size_f /= THRESHOLD;
        unit_index += 1;
    }
    format!("{size_f:.2} {}", UNITS[unit_index])
}

/// Format a byte count as gigabytes, as shown in the capacity report.
pub fn format_gib(size: u64) -> String {
    format!("{:.2} GB", size as f64 / (1024.0 * 1024.0 * 1024.0))
}
