//! Collaborator interfaces
//!
//! The engine never fetches data itself. Callers hand it a snapshot obtained
//! from an [`ActivitySource`] and a display unit from a [`SettingsSource`].

use serde::{Deserialize, Serialize};

use crate::error::InsightsError;
use crate::types::{ActivityRecord, DateRange, LocalTime, PeriodSelector, VolumeUnit};

/// Supplies a subject's recent activity records
pub trait ActivitySource {
    /// All of `subject_id`'s records whose defining timestamp falls within the
    /// widest supported period ending on the day of `now`
    fn fetch_recent(
        &self,
        subject_id: &str,
        now: LocalTime,
    ) -> Result<Vec<ActivityRecord>, InsightsError>;
}

/// Supplies the caller's display preferences
pub trait SettingsSource {
    /// Unit bottle volumes are shown in
    fn bottle_unit(&self) -> VolumeUnit;
}

/// Caller preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub bottle_unit: VolumeUnit,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, InsightsError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl SettingsSource for Settings {
    fn bottle_unit(&self) -> VolumeUnit {
        self.bottle_unit
    }
}

/// An [`ActivitySource`] over records already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<ActivityRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<ActivityRecord>) -> Self {
        Self { records }
    }
}

impl ActivitySource for InMemorySource {
    fn fetch_recent(
        &self,
        subject_id: &str,
        now: LocalTime,
    ) -> Result<Vec<ActivityRecord>, InsightsError> {
        let window = DateRange::resolve(PeriodSelector::WIDEST, now);
        Ok(self
            .records
            .iter()
            .filter(|r| r.subject_id() == subject_id && window.contains(&r.defining_time()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::{at, diaper, SUBJECT};
    use crate::types::{DiaperEvent, DiaperKind};

    #[test]
    fn test_fetch_recent_keeps_thirty_days() {
        let other = ActivityRecord::Diaper(DiaperEvent {
            subject_id: "other".to_string(),
            time: at(20, 8, 0),
            diaper_kind: DiaperKind::Wet,
        });
        let source = InMemorySource::new(vec![
            diaper(at(1, 8, 0), DiaperKind::Wet),
            diaper(at(20, 8, 0), DiaperKind::Dirty),
            other,
        ]);

        // June 1 is 30 days before July 1 and falls out of the window.
        let now = at(30, 12, 0) + chrono::Duration::days(1);
        let fetched = source.fetch_recent(SUBJECT, now).unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].defining_time(), at(20, 8, 0));
    }

    #[test]
    fn test_settings_default_and_json() {
        assert_eq!(Settings::default().bottle_unit(), VolumeUnit::Oz);

        let settings = Settings::from_json(r#"{"bottle_unit": "ML"}"#).unwrap();
        assert_eq!(settings.bottle_unit(), VolumeUnit::Ml);

        let empty = Settings::from_json("{}").unwrap();
        assert_eq!(empty.bottle_unit(), VolumeUnit::Oz);
    }
}
