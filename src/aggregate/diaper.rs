//! Diaper change frequency and composition

use crate::bucket::DayBuckets;
use crate::types::{round1, ActivityRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiaperStats {
    pub changes: u32,
    /// Changes marked dirty or both
    pub poops: u32,
}

impl DiaperStats {
    /// Changes per nominal period day, rounded to one decimal
    pub fn changes_per_day(&self, days: u32) -> f64 {
        per_day(self.changes, days)
    }

    /// Dirty changes per nominal period day, rounded to one decimal
    pub fn poops_per_day(&self, days: u32) -> f64 {
        per_day(self.poops, days)
    }
}

fn per_day(count: u32, days: u32) -> f64 {
    if days == 0 {
        return 0.0;
    }
    round1(f64::from(count) / f64::from(days))
}

pub fn aggregate_diapers(buckets: &DayBuckets<'_>) -> DiaperStats {
    let mut stats = DiaperStats::default();
    for (_, group) in buckets.iter() {
        for change in group.iter().copied().filter_map(ActivityRecord::as_diaper) {
            stats.changes += 1;
            if change.diaper_kind.is_poop() {
                stats.poops += 1;
            }
        }
    }
    stats
}
