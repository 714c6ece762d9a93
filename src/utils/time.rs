//! Time formatting helpers for log output

/// Format seconds as `MM:SS.ms`, or `HH:MM:SS.ms` past the hour mark.
pub fn format_seconds(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    let milliseconds = ((seconds % 1.0) * 1000.0) as u32;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, milliseconds)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sub_hour_times() {
        assert_eq!(format_seconds(90.5), "01:30.500");
    }

    #[test]
    fn formats_times_past_the_hour() {
        assert_eq!(format_seconds(3723.456), "01:02:03.456");
    }
}
