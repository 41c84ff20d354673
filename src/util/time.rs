// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback position formatting.

/// Format a playback position as `HH:MM:SS`. Negative positions clamp to zero.
pub fn ms_to_time_string(milliseconds: i64) -> String {
    if milliseconds < 0 {
        return "00:00:00".to_string();
    }
    let seconds = milliseconds / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Parse `HH:MM:SS` or `MM:SS` into milliseconds. Anything else yields 0.
pub fn time_string_to_ms(time: &str) -> i64 {
    let parts: Result<Vec<i64>, _> = time.split(':').map(|part| part.trim().parse::<i64>()).collect();
    let Ok(parts) = parts else {
        return 0;
    };
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0, *minutes, *seconds),
        [hours, minutes, seconds] => (*hours, *minutes, *seconds),
        _ => return 0,
    };
    (hours * 3600 + minutes * 60 + seconds) * 1000
}

/// Wall-clock timestamp as `YYYY-MM-DD_HH-MM-SS`.
pub fn current_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_time_string() {
        assert_eq!(ms_to_time_string(0), "00:00:00");
        assert_eq!(ms_to_time_string(125_000), "00:02:05");
        assert_eq!(ms_to_time_string(3_661_000), "01:01:01");
        assert_eq!(ms_to_time_string(7_323_999), "02:02:03");
        assert_eq!(ms_to_time_string(-1000), "00:00:00");
    }

    #[test]
    fn test_time_string_to_ms() {
        assert_eq!(time_string_to_ms("01:01:01"), 3_661_000);
        assert_eq!(time_string_to_ms("02:05"), 125_000);
        assert_eq!(time_string_to_ms("10:30"), 630_000);
        assert_eq!(time_string_to_ms("invalid"), 0);
        assert_eq!(time_string_to_ms("1:2:3:4"), 0);
        assert_eq!(time_string_to_ms(""), 0);
    }

    #[test]
    fn test_current_timestamp_shape() {
        let stamp = current_timestamp();
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[10..11], "_");
        assert_eq!(stamp.matches('-').count(), 4);
    }
}
