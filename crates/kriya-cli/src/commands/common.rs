/// Format milliseconds as `M:SS` for countdown display.
pub fn format_mmss(ms: u64) -> String {
    let total_secs = ms.div_ceil(1000);
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format a phase duration in minutes as a friendly length.
pub fn format_minutes(minutes: f64) -> String {
    let secs = (minutes * 60.0).round() as u64;
    if secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else if secs < 60 {
        format!("{secs} sec")
    } else {
        format!("{} min {} sec", secs / 60, secs % 60)
    }
}
