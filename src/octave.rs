//! Decibel arithmetic for combining third octave bands into octave bands.

use crate::error::{ConvertError, Result};

/// Energy sum of sound levels given in decibels.
///
/// Each level is converted to linear power, the powers are added and the total
/// is converted back: `10 * log10(sum(10^(L/10)))`.
pub fn db_sum(levels: &[f64]) -> f64 {
    let power: f64 = levels.iter().map(|l| 10f64.powf(l / 10.0)).sum();
    10.0 * power.log10()
}

/// Parses band level tokens as decibel values.
pub fn parse_levels<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<f64>> {
    tokens
        .iter()
        .map(|t| {
            let t = t.as_ref();
            t.parse::<f64>()
                .map_err(|_| ConvertError::MalformedNumber(t.to_string()))
        })
        .collect()
}

/// Octave band levels from third octave band levels.
///
/// Every consecutive triple of third octave levels becomes one octave level,
/// in order. The input length must be a multiple of 3.
pub fn octave_band(third_octave: &[f64]) -> Result<Vec<f64>> {
    if third_octave.len() % 3 != 0 {
        return Err(ConvertError::NotTriples(third_octave.len()));
    }

    third_octave
        .chunks_exact(3)
        .map(|triple| {
            let level = db_sum(triple);
            if level.is_finite() {
                Ok(level)
            } else {
                Err(ConvertError::MalformedNumber(format!("{level:?} from {triple:?}")))
            }
        })
        .collect()
}

/// Formats a level the way it is written to the octave table.
///
/// Shortest representation that reads back to the same value, always with a
/// decimal point.
pub fn format_level(level: f64) -> String {
    format!("{level:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_octave_band_matches_energy_sum() {
        let (a, b, c) = (40.1, 38.2, 41.0);
        let expected =
            10.0 * (10f64.powf(a / 10.0) + 10f64.powf(b / 10.0) + 10f64.powf(c / 10.0)).log10();

        let bands = octave_band(&[a, b, c]).unwrap();

        assert_eq!(bands.len(), 1);
        assert!(close(bands[0], expected));
    }

    #[test]
    fn test_equal_levels_add_ten_log_three() {
        for level in [0.0, 20.0, 44.0, 93.7] {
            let bands = octave_band(&[level, level, level]).unwrap();
            assert!(close(bands[0], level + 10.0 * 3f64.log10()));
        }
    }

    #[test]
    fn test_output_length_is_a_third() {
        for n in 1..=10 {
            let levels: Vec<f64> = (0..n * 3).map(|i| 30.0 + i as f64).collect();
            assert_eq!(octave_band(&levels).unwrap().len(), n);
        }
        assert!(octave_band(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let bands = octave_band(&[10.0, 10.0, 10.0, 60.0, 60.0, 60.0]).unwrap();
        assert!(bands[0] < bands[1]);
    }

    #[test]
    fn test_non_multiple_of_three_rejected() {
        for len in [1, 2, 4, 5, 7] {
            let levels = vec![40.0; len];
            assert!(matches!(
                octave_band(&levels),
                Err(ConvertError::NotTriples(n)) if n == len
            ));
        }
    }

    #[test]
    fn test_non_finite_octave_level_rejected() {
        // 10^(-400/10) underflows to zero power
        let silent = octave_band(&[-4000.0, -4000.0, -4000.0]);
        assert!(matches!(silent, Err(ConvertError::MalformedNumber(_))));

        let overflow = octave_band(&[40.0, f64::INFINITY, 40.0]);
        assert!(matches!(overflow, Err(ConvertError::MalformedNumber(_))));
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(parse_levels(&["40.1", "-3", "0"][..]).unwrap(), vec![40.1, -3.0, 0.0]);
        assert!(matches!(
            parse_levels(&["40.1", "n/a"][..]),
            Err(ConvertError::MalformedNumber(t)) if t == "n/a"
        ));
    }

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(41.0), "41.0");
        assert_eq!(format_level(44.5), "44.5");
    }
}
