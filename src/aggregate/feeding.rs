//! Feeding frequency and bottle volume

use tracing::trace;

use crate::bucket::DayBuckets;
use crate::normalizer::normalized_volume;
use crate::types::{round1, ActivityRecord, VolumeUnit};

/// Feeding counts and normalized volume totals for a period
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedingStats {
    /// Every feed, whatever its kind
    pub feedings: u32,
    /// Sum of liquid volumes, in the display unit
    pub total_amount: f64,
    /// Feeds that contributed to `total_amount`
    pub amount_count: u32,
}

impl FeedingStats {
    /// Feeds per nominal period day, rounded to one decimal
    pub fn per_day(&self, days: u32) -> f64 {
        if days == 0 {
            return 0.0;
        }
        round1(f64::from(self.feedings) / f64::from(days))
    }

    /// Mean volume per qualifying feed, rounded to one decimal
    pub fn average_amount(&self) -> f64 {
        if self.amount_count == 0 {
            return 0.0;
        }
        round1(self.total_amount / f64::from(self.amount_count))
    }
}

/// Count feeds and total their volumes in `display` units.
///
/// Feeds recorded in TBSP or G count toward frequency only.
pub fn aggregate_feedings(buckets: &DayBuckets<'_>, display: VolumeUnit) -> FeedingStats {
    let mut stats = FeedingStats::default();

    for (_, group) in buckets.iter() {
        for feed in group.iter().copied().filter_map(ActivityRecord::as_feed) {
            stats.feedings += 1;

            match normalized_volume(feed, display) {
                Some(amount) => {
                    stats.total_amount += amount;
                    stats.amount_count += 1;
                }
                None => trace!(
                    kind = ?feed.feed_kind,
                    unit = feed.amount_unit.map(|u| u.as_str()),
                    "feed without liquid volume"
                ),
            }
        }
    }

    stats
}
