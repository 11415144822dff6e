//! Feed volume normalization
//!
//! Converts recorded bottle amounts into the caller's display unit.
//! Only liquid volumes (OZ, ML) take part; spoon and weight measures do not.

use crate::types::{AmountUnit, FeedEvent, VolumeUnit};

/// Millilitres in one US fluid ounce
pub const ML_PER_OZ: f64 = 29.5735;

/// Convert `amount` between volume units
pub fn convert_volume(amount: f64, from: VolumeUnit, to: VolumeUnit) -> f64 {
    match (from, to) {
        (VolumeUnit::Oz, VolumeUnit::Ml) => amount * ML_PER_OZ,
        (VolumeUnit::Ml, VolumeUnit::Oz) => amount / ML_PER_OZ,
        _ => amount,
    }
}

/// The feed's recorded amount in `display`, if it carries a liquid volume
pub fn normalized_volume(feed: &FeedEvent, display: VolumeUnit) -> Option<f64> {
    let amount = feed.amount?;
    let unit = feed.amount_unit.as_ref().and_then(AmountUnit::as_volume)?;
    Some(convert_volume(amount, unit, display))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedKind;
    use chrono::{FixedOffset, TimeZone};

    fn feed(amount: Option<f64>, unit: Option<AmountUnit>) -> FeedEvent {
        FeedEvent {
            subject_id: "s".to_string(),
            time: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
                .unwrap(),
            feed_kind: FeedKind::Bottle,
            amount,
            amount_unit: unit,
        }
    }

    #[test]
    fn test_oz_to_ml() {
        assert!((convert_volume(1.0, VolumeUnit::Oz, VolumeUnit::Ml) - 29.5735).abs() < 1e-9);
        assert!((convert_volume(4.0, VolumeUnit::Oz, VolumeUnit::Ml) - 118.294).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        for amount in [0.5, 3.0, 7.25, 120.0] {
            let ml = convert_volume(amount, VolumeUnit::Oz, VolumeUnit::Ml);
            let back = convert_volume(ml, VolumeUnit::Ml, VolumeUnit::Oz);
            assert!((back - amount).abs() < 1e-9);
        }
    }

    #[test]
    fn test_identity_conversion() {
        assert_eq!(convert_volume(90.0, VolumeUnit::Ml, VolumeUnit::Ml), 90.0);
    }

    #[test]
    fn test_non_volume_units_are_skipped() {
        assert_eq!(normalized_volume(&feed(Some(2.0), Some(AmountUnit::Tbsp)), VolumeUnit::Oz), None);
        assert_eq!(normalized_volume(&feed(Some(30.0), Some(AmountUnit::G)), VolumeUnit::Ml), None);
        assert_eq!(normalized_volume(&feed(None, Some(AmountUnit::Oz)), VolumeUnit::Oz), None);
        assert_eq!(normalized_volume(&feed(Some(4.0), None), VolumeUnit::Oz), None);
    }

    #[test]
    fn test_normalized_volume_converts() {
        let ml = normalized_volume(&feed(Some(59.147), Some(AmountUnit::Ml)), VolumeUnit::Oz).unwrap();
        assert!((ml - 2.0).abs() < 1e-9);
    }
}
