//! End-to-end behavior of the statistics engine through the public API

use chrono::{FixedOffset, NaiveDate, TimeZone, Timelike};
use pretty_assertions::assert_eq;

use cradle_insights::aggregate::night::night_key;
use cradle_insights::aggregate::aggregate_nights;
use cradle_insights::aggregate::nap::MAX_NAP_MINUTES;
use cradle_insights::bucket::bucket_by_day;
use cradle_insights::normalizer::convert_volume;
use cradle_insights::types::{
    AmountUnit, DiaperEvent, DiaperKind, FeedEvent, FeedKind, MetricDirection, SleepSession,
};
use cradle_insights::{
    activities_to_report, compare_stats, compute_stats, ActivityRecord, ActivitySource, InMemorySource,
    InsightsProcessor, LocalTime, MetricName, PeriodSelector, RawActivityAdapter, StatsSummary,
    Trend, VolumeUnit,
};

const SUBJECT: &str = "baby-1";

/// Local time in August 2024 at a -04:00 offset
fn at(day: u32, hour: u32, minute: u32) -> LocalTime {
    FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 8, day, hour, minute, 0)
        .unwrap()
}

fn now() -> LocalTime {
    at(20, 18, 0)
}

fn sleep(start: LocalTime, end: LocalTime) -> ActivityRecord {
    ActivityRecord::Sleep(SleepSession {
        subject_id: SUBJECT.to_string(),
        start_time: start,
        end_time: Some(end),
        duration_minutes: None,
    })
}

fn feed(time: LocalTime, amount: Option<f64>, unit: Option<AmountUnit>) -> ActivityRecord {
    ActivityRecord::Feed(FeedEvent {
        subject_id: SUBJECT.to_string(),
        time,
        feed_kind: FeedKind::Bottle,
        amount,
        amount_unit: unit,
    })
}

fn diaper(time: LocalTime, kind: DiaperKind) -> ActivityRecord {
    ActivityRecord::Diaper(DiaperEvent {
        subject_id: SUBJECT.to_string(),
        time,
        diaper_kind: kind,
    })
}

fn stats(records: &[ActivityRecord], period: PeriodSelector) -> StatsSummary {
    compute_stats(records, SUBJECT, period, now(), VolumeUnit::Oz)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
}

#[test]
fn feedings_per_day_is_zero_without_feeds() {
    let sleeps_only = vec![sleep(at(19, 9, 0), at(19, 10, 0)), diaper(at(19, 11, 0), DiaperKind::Wet)];
    let with_feeds = vec![
        feed(at(19, 8, 0), Some(4.0), Some(AmountUnit::Oz)),
        feed(at(10, 8, 0), None, None),
    ];

    for period in PeriodSelector::ALL {
        assert_eq!(stats(&sleeps_only, period).avg_feedings_per_day, 0.0);
        assert_eq!(stats(&[], period).avg_feedings_per_day, 0.0);
        assert!(stats(&with_feeds, period).avg_feedings_per_day >= 0.0);
    }
    assert_eq!(stats(&with_feeds, PeriodSelector::TwoDays).avg_feedings_per_day, 0.5);
    assert_eq!(stats(&with_feeds, PeriodSelector::FourteenDays).avg_feedings_per_day, 0.1);
}

#[test]
fn volume_round_trip_is_stable() {
    for amount in [0.5, 2.0, 4.25, 8.0, 13.7] {
        let ml = convert_volume(amount, VolumeUnit::Oz, VolumeUnit::Ml);
        let back = convert_volume(ml, VolumeUnit::Ml, VolumeUnit::Oz);
        assert!((back - amount).abs() < 1e-9, "{amount} -> {ml} -> {back}");
    }
}

#[test]
fn late_evening_session_belongs_to_start_date_night() {
    let records = vec![sleep(at(15, 23, 30), at(16, 0, 10))];

    let summary = stats(&records, PeriodSelector::SevenDays);
    assert_eq!(summary.avg_night_sleep_minutes, 40.0);
    assert_eq!(summary.avg_nap_minutes, 0.0);

    let refs: Vec<&ActivityRecord> = records.iter().collect();
    let nights = aggregate_nights(&bucket_by_day(&refs));
    assert_eq!(nights.nights.keys().copied().collect::<Vec<_>>(), vec![date(15)]);
    assert_eq!(nights.nights[&date(15)].minutes, 40.0);
}

#[test]
fn early_morning_session_belongs_to_previous_night() {
    assert_eq!(night_key(at(16, 6, 50)), Some(date(15)));

    let records = vec![sleep(at(16, 6, 50), at(16, 7, 40))];
    let refs: Vec<&ActivityRecord> = records.iter().collect();
    let nights = aggregate_nights(&bucket_by_day(&refs));
    assert_eq!(nights.nights[&date(15)].minutes, 50.0);

    let summary = stats(&records, PeriodSelector::SevenDays);
    assert_eq!(summary.avg_night_sleep_minutes, 50.0);
    assert_eq!(summary.avg_nap_minutes, 0.0);
}

#[test]
fn wakings_count_once_per_night_key() {
    let records = vec![
        // Day group Aug 16: two night sessions, both keyed to the night of Aug 15
        sleep(at(16, 0, 30), at(16, 2, 0)),
        sleep(at(16, 3, 0), at(16, 6, 0)),
        // Day group Aug 17: one more session for the night of Aug 16
        sleep(at(17, 1, 0), at(17, 5, 0)),
    ];
    let refs: Vec<&ActivityRecord> = records.iter().collect();
    let nights = aggregate_nights(&bucket_by_day(&refs));

    let first = nights.nights[&date(15)];
    assert_eq!(first.sessions, 2);
    assert_eq!(first.wakings, 1);
    assert_eq!(first.minutes, 270.0);

    assert_eq!(nights.nights[&date(16)].wakings, 0);
    assert_eq!(nights.total_wakings(), 1);
    assert_eq!(nights.average_wakings(), 0.5);
}

#[test]
fn wake_window_between_two_sleeps() {
    let records = vec![sleep(at(19, 10, 0), at(19, 11, 0)), sleep(at(19, 13, 0), at(19, 14, 0))];
    assert_eq!(stats(&records, PeriodSelector::TwoDays).avg_wake_window_minutes, 120.0);
}

#[test]
fn wake_window_spans_day_boundaries() {
    let records = vec![sleep(at(18, 20, 0), at(18, 23, 0)), sleep(at(19, 1, 0), at(19, 5, 0))];
    assert_eq!(stats(&records, PeriodSelector::SevenDays).avg_wake_window_minutes, 120.0);
}

#[test]
fn nap_discard_boundary() {
    assert_eq!(MAX_NAP_MINUTES, 360.0);

    let six_hours = vec![sleep(at(19, 8, 0), at(19, 14, 0))];
    assert_eq!(stats(&six_hours, PeriodSelector::TwoDays).avg_nap_minutes, 0.0);

    let just_under = vec![sleep(at(19, 8, 0), at(19, 13, 59))];
    assert_eq!(stats(&just_under, PeriodSelector::TwoDays).avg_nap_minutes, 359.0);
}

#[test]
fn poops_per_day_over_seven_days() {
    let kinds = [
        DiaperKind::Dirty,
        DiaperKind::Wet,
        DiaperKind::Both,
        DiaperKind::Wet,
        DiaperKind::Dirty,
        DiaperKind::Wet,
        DiaperKind::Wet,
        DiaperKind::Both,
        DiaperKind::Dirty,
        DiaperKind::Wet,
    ];
    let records: Vec<ActivityRecord> = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| diaper(at(14 + (i as u32 % 7), 9 + i as u32, 0), *kind))
        .collect();

    let summary = stats(&records, PeriodSelector::SevenDays);
    assert_eq!(summary.avg_poops_per_day, 0.7);
    assert_eq!(summary.avg_diaper_changes_per_day, 1.4);
}

#[test]
fn identical_summaries_trend_positive_or_neutral() {
    let records = vec![
        sleep(at(18, 20, 0), at(19, 2, 0)),
        sleep(at(19, 9, 0), at(19, 10, 30)),
        feed(at(19, 11, 0), Some(5.0), Some(AmountUnit::Oz)),
        diaper(at(19, 12, 0), DiaperKind::Dirty),
    ];
    let summary = stats(&records, PeriodSelector::SevenDays);

    for (a, b) in [(summary, summary), (StatsSummary::default(), StatsSummary::default())] {
        let trends = compare_stats(&a, &b);
        assert_eq!(trends.len(), MetricName::ALL.len());
        for metric in MetricName::ALL {
            let expected = match metric.direction() {
                MetricDirection::Undirected => Trend::Neutral,
                _ => Trend::Positive,
            };
            assert_eq!(trends[&metric], expected, "{metric:?}");
        }
    }

    let busier = StatsSummary {
        avg_feedings_per_day: 9.0,
        avg_diaper_changes_per_day: 9.0,
        avg_poops_per_day: 9.0,
        ..summary
    };
    let trends = compare_stats(&busier, &summary);
    assert_eq!(trends[&MetricName::FeedingsPerDay], Trend::Neutral);
    assert_eq!(trends[&MetricName::DiaperChangesPerDay], Trend::Neutral);
    assert_eq!(trends[&MetricName::PoopsPerDay], Trend::Neutral);
}

#[test]
fn records_outside_period_or_subject_are_ignored() {
    let mut other = diaper(at(19, 9, 0), DiaperKind::Dirty);
    if let ActivityRecord::Diaper(d) = &mut other {
        d.subject_id = "baby-2".to_string();
    }
    let records = vec![
        other,
        // Aug 18 is outside a 2-day period ending Aug 20
        diaper(at(18, 23, 59), DiaperKind::Dirty),
        diaper(at(19, 0, 0), DiaperKind::Dirty),
        // Later today still counts
        diaper(at(20, 23, 0), DiaperKind::Wet),
    ];

    let summary = stats(&records, PeriodSelector::TwoDays);
    assert_eq!(summary.avg_diaper_changes_per_day, 1.0);
    assert_eq!(summary.avg_poops_per_day, 0.5);
}

#[test]
fn mixed_units_convert_to_display_unit() {
    let records = vec![
        feed(at(19, 8, 0), Some(4.0), Some(AmountUnit::Oz)),
        feed(at(19, 11, 0), Some(120.0), Some(AmountUnit::Ml)),
        feed(at(19, 14, 0), Some(2.0), Some(AmountUnit::Tbsp)),
        feed(at(19, 17, 0), None, None),
    ];

    let oz = compute_stats(&records, SUBJECT, PeriodSelector::TwoDays, now(), VolumeUnit::Oz);
    assert_eq!(oz.avg_feed_amount, 4.0);
    assert_eq!(oz.avg_feedings_per_day, 2.0);

    let ml = compute_stats(&records, SUBJECT, PeriodSelector::TwoDays, now(), VolumeUnit::Ml);
    assert_eq!(ml.avg_feed_amount, 119.1);
}

#[test]
fn empty_input_yields_empty_summary() {
    let summary = stats(&[], PeriodSelector::ThirtyDays);
    assert!(summary.is_empty());
    assert_eq!(summary, StatsSummary::default());
}

#[test]
fn localized_export_uses_subject_clock() {
    // Denver switched to MDT (-06:00) on 2024-03-10; 13:00Z the next day is 07:00 local
    let export = r#"
{"babyId": "baby-1", "startTime": "2024-03-11T13:00:00Z", "endTime": "2024-03-11T14:00:00Z"}
{"babyId": "baby-1", "time": "2024-03-11T15:00:00Z", "type": "BOTTLE", "amount": 90, "unitAbbr": "ML"}
"#;
    let raw = RawActivityAdapter::parse_ndjson(export).unwrap();
    let records = RawActivityAdapter::localize(RawActivityAdapter::to_records(&raw).unwrap(), "America/Denver").unwrap();
    assert_eq!(records[0].defining_time().hour(), 7);

    let now = chrono::DateTime::parse_from_rfc3339("2024-03-11T12:00:00-06:00").unwrap();
    let summary = compute_stats(&records, SUBJECT, PeriodSelector::TwoDays, now, VolumeUnit::Ml);
    assert_eq!(summary.avg_nap_minutes, 60.0);
    assert_eq!(summary.avg_night_sleep_minutes, 0.0);
    assert_eq!(summary.avg_feed_amount, 90.0);
}

#[test]
fn period_days_follow_the_local_calendar_across_dst() {
    // Denver left MDT (-06:00) for MST (-07:00) on 2024-11-03
    let export = r#"
{"babyId": "baby-1", "time": "2024-10-31T06:30:00Z", "type": "WET"}
{"babyId": "baby-1", "time": "2024-10-31T05:30:00Z", "type": "WET"}
{"babyId": "baby-1", "time": "2024-10-08T06:30:00Z", "type": "WET"}
{"babyId": "baby-1", "time": "2024-10-08T05:30:00Z", "type": "WET"}
"#;
    let raw = RawActivityAdapter::parse_ndjson(export).unwrap();
    let records = RawActivityAdapter::localize(RawActivityAdapter::to_records(&raw).unwrap(), "America/Denver").unwrap();
    assert_eq!(records[0].defining_time().date_naive(), date_ymd(2024, 10, 31));
    assert_eq!(records[1].defining_time().date_naive(), date_ymd(2024, 10, 30));

    let now = chrono::DateTime::parse_from_rfc3339("2024-11-06T12:00:00-07:00").unwrap();

    // Oct 31 00:30 MDT is the first day of the week ending Nov 6; Oct 30 23:30 MDT is not
    let week = compute_stats(&records, SUBJECT, PeriodSelector::SevenDays, now, VolumeUnit::Oz);
    assert_eq!(week.avg_diaper_changes_per_day, 0.1);

    // Same boundary for the thirty-day fetch window starting Oct 8
    let fetched = InMemorySource::new(records).fetch_recent(SUBJECT, now).unwrap();
    assert_eq!(fetched.len(), 3);
    assert!(fetched.iter().all(|r| r.defining_time().date_naive() >= date_ymd(2024, 10, 8)));
}

fn date_ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn processor_recomputes_per_period() {
    let source = InMemorySource::new(vec![
        feed(at(19, 8, 0), Some(4.0), Some(AmountUnit::Oz)),
        feed(at(8, 8, 0), Some(6.0), Some(AmountUnit::Oz)),
    ]);
    let mut processor = InsightsProcessor::new();
    processor.refresh(&source, SUBJECT, now()).unwrap();

    let comparison = processor.compare(PeriodSelector::SevenDays, PeriodSelector::FourteenDays, now());
    assert_eq!(comparison.main.avg_feed_amount, 4.0);
    assert_eq!(comparison.compare.avg_feed_amount, 5.0);
    assert_eq!(comparison.trends[&MetricName::FeedAmount], Trend::Negative);

    let report: serde_json::Value =
        serde_json::from_str(&processor.report(PeriodSelector::SevenDays, PeriodSelector::FourteenDays, now()).unwrap()).unwrap();
    assert_eq!(report["main"]["period_days"], 7);
    assert_eq!(report["trends"]["feed_amount"], "negative");
}

#[test]
fn one_shot_report_from_json() {
    let export = r#"[
        {"kind": "sleep", "babyId": "baby-1", "startTime": "2024-08-19T09:00:00-04:00", "endTime": "2024-08-19T10:00:00-04:00"},
        {"kind": "sleep", "babyId": "baby-1", "startTime": "2024-08-19T12:00:00-04:00"}
    ]"#;
    let json = activities_to_report(
        export,
        SUBJECT,
        PeriodSelector::TwoDays,
        PeriodSelector::ThirtyDays,
        now(),
        VolumeUnit::Oz,
    )
    .unwrap();

    let report: serde_json::Value = serde_json::from_str(&json).unwrap();
    // The open session is ignored everywhere
    assert_eq!(report["main"]["stats"]["avg_nap_minutes"], 60.0);
    assert_eq!(report["main"]["stats"]["avg_wake_window_minutes"], 0.0);
    assert_eq!(report["quality"]["activity_count"], 2);
    assert_eq!(report["main"]["end"], "2024-08-20T23:59:59.999-04:00");
}
