use crate::model::Timestamp;

/// Format a millisecond duration as seconds with three decimals: `1.500s`.
pub fn elapsed_secs(ms: f64) -> String {
    format!("{:.3}s", ms / 1000.0)
}

/// Milliseconds from `start` to `end`, with sub-millisecond precision.
///
/// Negative when `end` precedes `start`.
pub fn millis_between(start: Timestamp, end: Timestamp) -> f64 {
    let delta = end - start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1000.0,
        None => delta.num_milliseconds() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::process::from_epoch_millis;

    #[test]
    fn three_decimals_with_suffix() {
        assert_eq!(elapsed_secs(1500.0), "1.500s");
        assert_eq!(elapsed_secs(0.0), "0.000s");
        assert_eq!(elapsed_secs(61_234.0), "61.234s");
        assert_eq!(elapsed_secs(0.4), "0.000s");
    }

    #[test]
    fn millis_keep_fractions() {
        let a = from_epoch_millis(10.0).expect("timestamp in range");
        let b = from_epoch_millis(10.1).expect("timestamp in range");
        assert!((millis_between(a, b) - 0.1).abs() < 1e-9);
        assert!((millis_between(b, a) + 0.1).abs() < 1e-9);
    }
}
