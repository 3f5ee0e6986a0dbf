/// Minutes until something, as "Xh Ym" or "Ym".
pub fn format_countdown(mins: u32) -> String {
    if mins == 0 {
        return "now".to_string();
    }
    let hours = mins / 60;
    let minutes = mins % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

pub fn check_mark(done: bool) -> &'static str {
    if done { "✓" } else { "·" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_formats() {
        assert_eq!(format_countdown(0), "now");
        assert_eq!(format_countdown(45), "45m");
        assert_eq!(format_countdown(60), "1h 0m");
        assert_eq!(format_countdown(135), "2h 15m");
    }

    #[test]
    fn progress_bar_clamps() {
        assert_eq!(progress_bar(0, 0, 4), "░░░░");
        assert_eq!(progress_bar(2, 4, 4), "██░░");
        assert_eq!(progress_bar(9, 4, 4), "████");
    }
}
