//! Display labels for tree rows

use super::Timestamp;
use chrono::NaiveDate;

/// `YYYY.MM.DD HH:MM:SS.mmm`
///
/// Invalid calendar values (the plugin zero-fills unknown timestamps) are
/// still printed, just without going through chrono.
pub fn format_timestamp(ts: &Timestamp) -> String {
    let valid = NaiveDate::from_ymd_opt(ts.year, ts.month, ts.day)
        .and_then(|d| d.and_hms_milli_opt(ts.hour, ts.minute, ts.second, ts.milli_second));

    match valid {
        Some(dt) if (0..=9999).contains(&ts.year) => dt.format("%Y.%m.%d %H:%M:%S%.3f").to_string(),
        _ => format!(
            "{}.{:02}.{:02} {:02}:{:02}:{:02}.{:03}",
            ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second, ts.milli_second
        ),
    }
}

/// Zeta is persisted as hundredths: 15 → `0.15`
pub fn format_zeta(zeta_em2: f64) -> String {
    format_number(zeta_em2 / 100.0)
}

/// Shortest decimal form, no trailing `.0` for whole numbers
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn sequence_label(sequence_id: &str) -> String {
    format!("seq={}", sequence_id)
}

pub fn stream_label(axis: &str, frequency_hz: f64, zeta_em2: f64) -> String {
    format!(
        "{}-Axis f={}Hz zeta={}",
        axis.to_uppercase(),
        format_number(frequency_hz),
        format_zeta(zeta_em2)
    )
}

pub fn fft_label(axis: &str, frequency_hz: f64, zeta_em2: f64) -> String {
    format!(
        "{} f={}Hz zeta={}",
        axis.to_uppercase(),
        format_number(frequency_hz),
        format_zeta(zeta_em2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32, ms: u32) -> Timestamp {
        Timestamp { year, month, day, hour, minute, second, milli_second: ms }
    }

    #[test]
    fn test_timestamp_reference_value() {
        let label = format_timestamp(&ts(2023, 11, 27, 23, 56, 25, 233));
        assert_eq!(label, "2023.11.27 23:56:25.233");
    }

    #[test]
    fn test_timestamp_zero_padding() {
        assert_eq!(format_timestamp(&ts(2024, 1, 2, 3, 4, 5, 6)), "2024.01.02 03:04:05.006");
    }

    #[test]
    fn test_timestamp_invalid_date_still_formatted() {
        // zero-filled timestamp, not a calendar date
        assert_eq!(format_timestamp(&Timestamp::default()), "0.00.00 00:00:00.000");
        assert_eq!(format_timestamp(&ts(2023, 13, 40, 0, 0, 0, 0)), "2023.13.40 00:00:00.000");
    }

    #[test]
    fn test_zeta_display() {
        assert_eq!(format_zeta(15.0), "0.15");
        assert_eq!(format_zeta(10.0), "0.1");
        assert_eq!(format_zeta(100.0), "1");
        assert_eq!(format_zeta(0.0), "0");
    }

    #[test]
    fn test_stream_and_fft_labels() {
        assert_eq!(stream_label("x", 10.0, 15.0), "X-Axis f=10Hz zeta=0.15");
        assert_eq!(fft_label("z", 42.5, 60.0), "Z f=42.5Hz zeta=0.6");
        assert_eq!(sequence_label("3"), "seq=3");
    }
}
