//! Human-readable progress reporting.
//!
//! Thin helpers over the `log` facade so run output keeps one layout.

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a step in a process
pub fn step(step_num: u32, total: u32, message: &str) {
    log::info!("[STEP {}/{}] {}", step_num, total, message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

/// Estimated minutes for a run, padded for one exhausted retry budget.
pub fn estimated_minutes(pages: u32, interval_secs: u64, retry_buffer_secs: u64) -> f64 {
    u64::from(pages)
        .saturating_mul(interval_secs)
        .saturating_add(retry_buffer_secs) as f64
        / 60.0
}
