use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Calendar dates (no time component) a dynamic target may never land on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HolidaySet(BTreeSet<NaiveDate>);

impl HolidaySet {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Zone whose wall clock a school time is read in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchoolZone {
    /// The viewer's own zone.
    #[default]
    Local,
    Named(Tz),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CountdownTarget {
    Fixed(DateTime<FixedOffset>),
    /// Next `at` wall-clock time in `zone` on a weekday that is not a holiday.
    School {
        at: NaiveTime,
        holidays: HolidaySet,
        zone: SchoolZone,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationStyle {
    /// `1d 01h 01m 01s`, the day segment dropped when zero.
    DaysAndHours,
    /// `25h 01m 01s`, never a day segment.
    TotalHours,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountdownSettings {
    pub target: CountdownTarget,
    pub style: DurationStyle,
    pub arrived_message: String,
    pub hold_ms: i64,
}

/// Earliest `at` wall-clock time strictly after `now` in `now`'s zone that falls
/// on a weekday outside `holidays`. Days where `at` does not exist (a DST gap)
/// are skipped; an ambiguous `at` resolves to its earlier instant.
pub fn next_qualifying_instant<Z: TimeZone>(
    now: DateTime<Z>,
    at: NaiveTime,
    holidays: &HolidaySet,
) -> DateTime<Z> {
    let zone = now.timezone();
    let local_now = now.naive_local();
    let mut day = local_now.date();
    if local_now >= day.and_time(at) {
        day += Duration::days(1);
    }
    loop {
        if !is_weekend(day.weekday()) && !holidays.contains(day) {
            if let Some(instant) = zone.from_local_datetime(&day.and_time(at)).earliest() {
                if instant > now {
                    return instant;
                }
            }
        }
        day += Duration::days(1);
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

pub fn format_remaining(distance_ms: i64, style: DurationStyle) -> String {
    let distance_ms = distance_ms.max(0);
    let minutes = (distance_ms % HOUR_MS) / MINUTE_MS;
    let seconds = (distance_ms % MINUTE_MS) / SECOND_MS;
    match style {
        DurationStyle::DaysAndHours => {
            let days = distance_ms / DAY_MS;
            let hours = (distance_ms % DAY_MS) / HOUR_MS;
            if days > 0 {
                format!("{days}d {hours:02}h {minutes:02}m {seconds:02}s")
            } else {
                format!("{hours:02}h {minutes:02}m {seconds:02}s")
            }
        }
        DurationStyle::TotalHours => {
            let hours = distance_ms / HOUR_MS;
            format!("{hours:02}h {minutes:02}m {seconds:02}s")
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    Remaining(String),
    /// Show the arrived message. Emitted once per arrival.
    Arrived(String),
    Unchanged,
    /// Fixed target reached; the periodic tick can be cancelled.
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Counting(DateTime<FixedOffset>),
    Holding { until_ms: i64 },
    Halted,
}

#[derive(Debug)]
pub struct Countdown {
    settings: CountdownSettings,
    phase: Phase,
    showing_arrived: bool,
}

impl Countdown {
    pub fn new(settings: CountdownSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            showing_arrived: false,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    #[cfg(test)]
    pub fn target(&self) -> Option<DateTime<FixedOffset>> {
        match self.phase {
            Phase::Counting(target) => Some(target),
            _ => None,
        }
    }

    pub fn tick(&mut self, now: DateTime<FixedOffset>) -> Tick {
        let now_ms = now.timestamp_millis();
        let target = match self.phase {
            Phase::Halted => return Tick::Halted,
            Phase::Holding { until_ms } if now_ms < until_ms => return Tick::Unchanged,
            Phase::Counting(target) => target,
            Phase::Idle | Phase::Holding { .. } => self.compute_target(now),
        };

        let distance = target.timestamp_millis() - now_ms;
        if distance >= 0 {
            self.phase = Phase::Counting(target);
            self.showing_arrived = false;
            return Tick::Remaining(format_remaining(distance, self.settings.style));
        }

        self.phase = match self.settings.target {
            CountdownTarget::Fixed(_) => Phase::Halted,
            CountdownTarget::School { .. } => Phase::Holding {
                until_ms: now_ms + self.settings.hold_ms,
            },
        };
        if self.showing_arrived {
            return Tick::Unchanged;
        }
        self.showing_arrived = true;
        tracing::debug!("countdown: target reached");
        Tick::Arrived(self.settings.arrived_message.clone())
    }

    fn compute_target(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match &self.settings.target {
            CountdownTarget::Fixed(target) => *target,
            CountdownTarget::School {
                at,
                holidays,
                zone: SchoolZone::Local,
            } => next_qualifying_instant(now.with_timezone(&Local), *at, holidays).fixed_offset(),
            CountdownTarget::School {
                at,
                holidays,
                zone: SchoolZone::Named(tz),
            } => next_qualifying_instant(now.with_timezone(tz), *at, holidays).fixed_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use pretty_assertions::assert_eq;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        ist().with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn school_time() -> NaiveTime {
        NaiveTime::from_hms_opt(11, 30, 0).unwrap()
    }

    fn holidays() -> HolidaySet {
        [
            NaiveDate::from_ymd_opt(2025, 7, 6).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    fn school_settings() -> CountdownSettings {
        CountdownSettings {
            target: CountdownTarget::School {
                at: school_time(),
                holidays: holidays(),
                zone: SchoolZone::Named(chrono_tz::Asia::Kolkata),
            },
            style: DurationStyle::TotalHours,
            arrived_message: "It's time!".to_string(),
            hold_ms: 5_000,
        }
    }

    #[test]
    fn saturday_noon_skips_weekend_and_holiday() {
        let next = next_qualifying_instant(at(2025, 7, 5, 12, 0, 0), school_time(), &holidays());
        assert_eq!(next, at(2025, 7, 7, 11, 30, 0));
    }

    #[test]
    fn holiday_on_a_weekday_is_skipped() {
        let next = next_qualifying_instant(at(2025, 7, 14, 12, 0, 0), school_time(), &holidays());
        assert_eq!(next, at(2025, 7, 16, 11, 30, 0));
    }

    #[test]
    fn weekday_morning_targets_today() {
        let next = next_qualifying_instant(at(2025, 7, 8, 9, 15, 0), school_time(), &holidays());
        assert_eq!(next, at(2025, 7, 8, 11, 30, 0));
    }

    #[test]
    fn exactly_at_school_time_moves_to_next_day() {
        let next = next_qualifying_instant(at(2025, 7, 8, 11, 30, 0), school_time(), &holidays());
        assert_eq!(next, at(2025, 7, 9, 11, 30, 0));
    }

    #[test]
    fn next_instant_is_always_later_and_qualifying() {
        let holidays = holidays();
        let start = at(2025, 6, 28, 0, 0, 0);
        for step in 0..(24 * 30) {
            let now = start + Duration::minutes(step * 61);
            let next = next_qualifying_instant(now, school_time(), &holidays);
            assert!(next > now, "{next} should be after {now}");
            assert!(!is_weekend(next.weekday()), "{next} is a weekend");
            assert!(!holidays.contains(next.date_naive()), "{next} is a holiday");
            assert_eq!((next.hour(), next.minute(), next.second()), (11, 30, 0));
        }
    }

    #[test]
    fn school_time_keeps_wall_clock_across_dst_change() {
        let berlin = chrono_tz::Europe::Berlin;
        // Friday before the spring-forward Sunday 2025-03-30.
        let now = berlin.with_ymd_and_hms(2025, 3, 28, 12, 0, 0).unwrap();
        let next = next_qualifying_instant(now, school_time(), &HolidaySet::default());

        assert_eq!(next, berlin.with_ymd_and_hms(2025, 3, 31, 11, 30, 0).unwrap());
        assert_eq!(next.naive_local().time(), school_time());
        assert_eq!(next.fixed_offset().offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn named_zone_countdown_spans_the_dst_change() {
        let mut countdown = Countdown::new(CountdownSettings {
            target: CountdownTarget::School {
                at: school_time(),
                holidays: HolidaySet::default(),
                zone: SchoolZone::Named(chrono_tz::Europe::Berlin),
            },
            ..school_settings()
        });
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 28, 12, 0, 0)
            .unwrap();
        // Fri 12:00 CET to Mon 11:30 CEST is 71h30m minus the lost hour.
        assert_eq!(
            countdown.tick(now),
            Tick::Remaining("70h 30m 00s".to_string())
        );
    }

    #[test]
    fn formats_days_segment_only_when_present() {
        assert_eq!(format_remaining(90_061_000, DurationStyle::DaysAndHours), "1d 01h 01m 01s");
        assert_eq!(format_remaining(3_661_000, DurationStyle::DaysAndHours), "01h 01m 01s");
        assert_eq!(format_remaining(90_061_000, DurationStyle::TotalHours), "25h 01m 01s");
        assert_eq!(format_remaining(999, DurationStyle::TotalHours), "00h 00m 00s");
    }

    #[test]
    fn fixed_target_shows_arrived_once_then_halts() {
        let mut countdown = Countdown::new(CountdownSettings {
            target: CountdownTarget::Fixed(at(2025, 7, 4, 11, 30, 0)),
            style: DurationStyle::DaysAndHours,
            arrived_message: "It's time!".to_string(),
            hold_ms: 5_000,
        });

        assert_eq!(
            countdown.tick(at(2025, 7, 3, 10, 29, 59)),
            Tick::Remaining("1d 01h 00m 01s".to_string())
        );
        assert_eq!(
            countdown.tick(at(2025, 7, 4, 11, 30, 0)),
            Tick::Remaining("00h 00m 00s".to_string())
        );
        assert_eq!(
            countdown.tick(at(2025, 7, 4, 11, 30, 1)),
            Tick::Arrived("It's time!".to_string())
        );
        assert!(countdown.is_halted());
        assert_eq!(countdown.tick(at(2025, 7, 4, 11, 30, 2)), Tick::Halted);
    }

    #[test]
    fn school_target_holds_arrived_message_then_recomputes() {
        let mut countdown = Countdown::new(school_settings());

        assert_eq!(
            countdown.tick(at(2025, 7, 8, 11, 29, 59)),
            Tick::Remaining("00h 00m 01s".to_string())
        );
        assert_eq!(
            countdown.tick(at(2025, 7, 8, 11, 30, 1)),
            Tick::Arrived("It's time!".to_string())
        );
        for second in 2..6 {
            assert_eq!(countdown.tick(at(2025, 7, 8, 11, 30, second)), Tick::Unchanged);
        }
        assert_eq!(
            countdown.tick(at(2025, 7, 8, 11, 30, 6)),
            Tick::Remaining("23h 59m 54s".to_string())
        );
        assert_eq!(countdown.target(), Some(at(2025, 7, 9, 11, 30, 0)));
        assert!(!countdown.is_halted());
    }

    #[test]
    fn school_countdown_renders_total_hours_across_a_weekend() {
        let mut countdown = Countdown::new(school_settings());
        assert_eq!(
            countdown.tick(at(2025, 7, 4, 12, 0, 0)),
            Tick::Remaining("71h 30m 00s".to_string())
        );
    }
}
