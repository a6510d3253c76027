//! Duration formatting shared by every timer display.

/// `HH:MM:SS`; hours are not wrapped at 24. Negative input renders as zero.
pub fn hms(seconds: i64) -> String {
    let total = seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// `MM:SS`; minutes are not wrapped at 60.
pub fn ms(seconds: i64) -> String {
    let total = seconds.max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hms_over_24_hours() {
        assert_eq!(hms(95 * 3600 + 59 * 60 + 7), "95:59:07");
    }

    #[test]
    fn ms_last_second_of_hour() {
        assert_eq!(ms(59 * 60 + 59), "59:59");
    }

    #[test]
    fn negative_clamps_to_zero() {
        assert_eq!(hms(-5), "00:00:00");
        assert_eq!(ms(-5), "00:00");
    }

    proptest! {
        #[test]
        fn hms_parses_back(secs in 0i64..10_000_000) {
            let text = hms(secs);
            let parts: Vec<i64> = text.split(':').map(|p| p.parse().unwrap()).collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert!(parts[1] < 60 && parts[2] < 60);
            prop_assert_eq!(parts[0] * 3600 + parts[1] * 60 + parts[2], secs);
        }

        #[test]
        fn ms_parses_back(secs in 0i64..1_000_000) {
            let text = ms(secs);
            let (m, s) = text.split_once(':').unwrap();
            let (m, s): (i64, i64) = (m.parse().unwrap(), s.parse().unwrap());
            prop_assert!(s < 60);
            prop_assert_eq!(m * 60 + s, secs);
        }
    }
}
