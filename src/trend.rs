//! Period-over-period comparison
//!
//! Pairs a "main" and a "compare" summary and qualifies each metric's movement.
//! Ties favor the main period.

use std::collections::BTreeMap;

use crate::types::{MetricDirection, MetricName, StatsSummary, Trend};

/// Qualify how `metric` moved from `compare` to `main`
pub fn trend_for(main: &StatsSummary, compare: &StatsSummary, metric: MetricName) -> Trend {
    let (current, previous) = (main.value(metric), compare.value(metric));
    match metric.direction() {
        MetricDirection::HigherIsBetter if current >= previous => Trend::Positive,
        MetricDirection::LowerIsBetter if current <= previous => Trend::Positive,
        MetricDirection::HigherIsBetter | MetricDirection::LowerIsBetter => Trend::Negative,
        MetricDirection::Undirected => Trend::Neutral,
    }
}

/// Qualify every metric
pub fn compare_stats(main: &StatsSummary, compare: &StatsSummary) -> BTreeMap<MetricName, Trend> {
    MetricName::ALL
        .iter()
        .map(|metric| (*metric, trend_for(main, compare, *metric)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(value: f64) -> StatsSummary {
        StatsSummary {
            avg_wake_window_minutes: value,
            avg_nap_minutes: value,
            avg_night_sleep_minutes: value,
            avg_night_wakings: value,
            avg_feedings_per_day: value,
            avg_feed_amount: value,
            avg_diaper_changes_per_day: value,
            avg_poops_per_day: value,
        }
    }

    #[test]
    fn test_identical_summaries() {
        let a = summary(3.0);
        let trends = compare_stats(&a, &a);

        assert_eq!(trends.len(), MetricName::ALL.len());
        for (metric, trend) in &trends {
            let expected = match metric.direction() {
                MetricDirection::Undirected => Trend::Neutral,
                _ => Trend::Positive,
            };
            assert_eq!(*trend, expected, "{metric:?}");
        }
    }

    #[test]
    fn test_higher_main_period() {
        let trends = compare_stats(&summary(5.0), &summary(2.0));
        assert_eq!(trends[&MetricName::WakeWindow], Trend::Positive);
        assert_eq!(trends[&MetricName::Nap], Trend::Positive);
        assert_eq!(trends[&MetricName::NightSleep], Trend::Positive);
        assert_eq!(trends[&MetricName::FeedAmount], Trend::Positive);
        assert_eq!(trends[&MetricName::NightWakings], Trend::Negative);
    }

    #[test]
    fn test_lower_main_period() {
        let trends = compare_stats(&summary(1.0), &summary(2.0));
        assert_eq!(trends[&MetricName::NightSleep], Trend::Negative);
        assert_eq!(trends[&MetricName::FeedAmount], Trend::Negative);
        assert_eq!(trends[&MetricName::NightWakings], Trend::Positive);
    }

    #[test]
    fn test_count_metrics_always_neutral() {
        for (main, compare) in [(summary(9.0), summary(1.0)), (summary(1.0), summary(9.0))] {
            assert_eq!(trend_for(&main, &compare, MetricName::FeedingsPerDay), Trend::Neutral);
            assert_eq!(trend_for(&main, &compare, MetricName::DiaperChangesPerDay), Trend::Neutral);
            assert_eq!(trend_for(&main, &compare, MetricName::PoopsPerDay), Trend::Neutral);
        }
    }

    #[test]
    fn test_serializes_as_named_map() {
        let trends = compare_stats(&summary(1.0), &summary(1.0));
        let json = serde_json::to_value(&trends).unwrap();
        assert_eq!(json["night_wakings"], "positive");
        assert_eq!(json["poops_per_day"], "neutral");
    }
}
