use chrono::{Datelike, NaiveDateTime, Weekday};
use log::debug;
use serde::Serialize;

use crate::models::{PrayerSlot, Schedule};
use crate::utils::clock::{MINUTES_PER_DAY, minutes_of_day, parse_hhmm};

/// Whole hours and minutes until the next prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Countdown {
    pub hours: u32,
    pub minutes: u32,
}

impl Countdown {
    pub fn from_minutes(total: u32) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextPrayer {
    pub slot: PrayerSlot,
    /// Congregation time as it appears in the schedule.
    pub time: String,
    /// True when every prayer today has passed and this is tomorrow's Fajr.
    pub tomorrow: bool,
    pub remaining: Countdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NextPrayerState {
    Upcoming(NextPrayer),
    /// Nothing in the schedule could be placed on the clock.
    Unavailable,
}

impl NextPrayerState {
    pub fn upcoming(&self) -> Option<&NextPrayer> {
        match self {
            NextPrayerState::Upcoming(next) => Some(next),
            NextPrayerState::Unavailable => None,
        }
    }

    pub fn slot(&self) -> Option<PrayerSlot> {
        self.upcoming().map(|n| n.slot)
    }
}

struct Candidate<'a> {
    slot: PrayerSlot,
    time: &'a str,
    minutes: u32,
}

/// Finds the next congregation time after `now` and how long until it.
///
/// Recomputed from scratch on every call, seconds are ignored. When every slot
/// has passed the answer is tomorrow's Fajr. Slots with unparseable times are
/// skipped. On Fridays a Jumuah entry stands in for Dhuhr; on other days it is
/// not considered.
pub fn next_occurrence(schedule: &Schedule, now: NaiveDateTime) -> NextPrayerState {
    let now_minutes = minutes_of_day(&now);
    let friday = now.weekday() == Weekday::Fri;
    let jumuah_today = friday && schedule.contains(PrayerSlot::Jumuah);

    let candidates: Vec<Candidate<'_>> = schedule
        .entries
        .iter()
        .filter(|e| match e.slot {
            PrayerSlot::Jumuah => jumuah_today,
            PrayerSlot::Dhuhr => !jumuah_today,
            _ => true,
        })
        .filter_map(|e| match parse_hhmm(&e.times.prayer) {
            Ok(minutes) => Some(Candidate {
                slot: e.slot,
                time: &e.times.prayer,
                minutes,
            }),
            Err(err) => {
                debug!("skipping {}: {}", e.slot, err);
                None
            }
        })
        .collect();

    if let Some(next) = candidates
        .iter()
        .filter(|c| c.minutes > now_minutes)
        .min_by_key(|c| c.minutes)
    {
        return NextPrayerState::Upcoming(NextPrayer {
            slot: next.slot,
            time: next.time.to_string(),
            tomorrow: false,
            remaining: Countdown::from_minutes(next.minutes - now_minutes),
        });
    }

    let first = candidates
        .iter()
        .find(|c| c.slot == PrayerSlot::Fajr)
        .or_else(|| candidates.iter().min_by_key(|c| c.minutes));

    match first {
        Some(first) => NextPrayerState::Upcoming(NextPrayer {
            slot: first.slot,
            time: first.time.to_string(),
            tomorrow: true,
            remaining: Countdown::from_minutes(MINUTES_PER_DAY - now_minutes + first.minutes),
        }),
        None => NextPrayerState::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{ScheduleEntry, SlotTimes};

    // 2024-06-12 is a Wednesday, 2024-06-14 a Friday.
    fn wednesday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn friday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn five_slot_defaults() -> Schedule {
        let mut defaults = Schedule::builtin_default();
        defaults.entries.retain(|e| e.slot.is_canonical());
        defaults
    }

    fn expect_upcoming(state: NextPrayerState) -> NextPrayer {
        match state {
            NextPrayerState::Upcoming(next) => next,
            NextPrayerState::Unavailable => panic!("expected an upcoming prayer"),
        }
    }

    #[test]
    fn morning_points_at_dhuhr() {
        let next = expect_upcoming(next_occurrence(&five_slot_defaults(), wednesday_at(6, 0)));
        assert_eq!(next.slot, PrayerSlot::Dhuhr);
        assert_eq!(next.time, "12:30");
        assert!(!next.tomorrow);
        assert_eq!(next.remaining, Countdown { hours: 6, minutes: 30 });
    }

    #[test]
    fn after_isha_rolls_over_to_fajr() {
        let next = expect_upcoming(next_occurrence(&five_slot_defaults(), wednesday_at(20, 0)));
        assert_eq!(next.slot, PrayerSlot::Fajr);
        assert!(next.tomorrow);
        assert_eq!(next.remaining.total_minutes(), (1440 - 1200) + 330);
        assert_eq!(next.remaining, Countdown { hours: 9, minutes: 30 });
    }

    #[test]
    fn uses_prayer_time_not_azan() {
        // Fajr azan 05:00 has passed, congregation at 05:30 has not.
        let next = expect_upcoming(next_occurrence(&five_slot_defaults(), wednesday_at(5, 10)));
        assert_eq!(next.slot, PrayerSlot::Fajr);
        assert_eq!(next.remaining.total_minutes(), 20);
    }

    #[test]
    fn exact_prayer_minute_counts_as_passed() {
        let next = expect_upcoming(next_occurrence(&five_slot_defaults(), wednesday_at(12, 30)));
        assert_eq!(next.slot, PrayerSlot::Asr);
    }

    #[test]
    fn seconds_are_ignored() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(6, 0, 59)
            .unwrap();
        let next = expect_upcoming(next_occurrence(&five_slot_defaults(), now));
        assert_eq!(next.remaining.total_minutes(), 390);
    }

    #[test]
    fn empty_schedule_is_unavailable() {
        let state = next_occurrence(&Schedule::default(), wednesday_at(6, 0));
        assert_eq!(state, NextPrayerState::Unavailable);
        assert_eq!(state.slot(), None);
    }

    #[test]
    fn malformed_slot_is_skipped() {
        let mut schedule = five_slot_defaults();
        schedule.entries[1].times.prayer = "half past noon".into();

        let next = expect_upcoming(next_occurrence(&schedule, wednesday_at(6, 0)));
        assert_eq!(next.slot, PrayerSlot::Asr);
    }

    #[test]
    fn all_malformed_is_unavailable() {
        let schedule = Schedule::from_entries(vec![ScheduleEntry {
            slot: PrayerSlot::Fajr,
            times: SlotTimes::new("x", "y", "z"),
        }]);
        assert_eq!(
            next_occurrence(&schedule, wednesday_at(3, 0)),
            NextPrayerState::Unavailable
        );
    }

    #[test]
    fn rollover_without_fajr_uses_earliest_slot() {
        let mut schedule = five_slot_defaults();
        schedule.entries.retain(|e| e.slot != PrayerSlot::Fajr);

        let next = expect_upcoming(next_occurrence(&schedule, wednesday_at(22, 0)));
        assert_eq!(next.slot, PrayerSlot::Dhuhr);
        assert!(next.tomorrow);
        assert_eq!(next.remaining.total_minutes(), 120 + 750);
    }

    #[test]
    fn friday_jumuah_replaces_dhuhr() {
        let defaults = Schedule::builtin_default();

        let next = expect_upcoming(next_occurrence(&defaults, friday_at(12, 0)));
        assert_eq!(next.slot, PrayerSlot::Jumuah);
        assert_eq!(next.remaining.total_minutes(), 75);

        let next = expect_upcoming(next_occurrence(&defaults, wednesday_at(12, 0)));
        assert_eq!(next.slot, PrayerSlot::Dhuhr);
    }

    #[test]
    fn friday_without_jumuah_keeps_dhuhr() {
        let next = expect_upcoming(next_occurrence(&five_slot_defaults(), friday_at(12, 0)));
        assert_eq!(next.slot, PrayerSlot::Dhuhr);
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn countdown_shrinks_until_rollover(start in 0u32..1439) {
                let schedule = five_slot_defaults();
                let at = |m: u32| wednesday_at(m / 60, m % 60);

                let before = expect_upcoming(next_occurrence(&schedule, at(start)));
                let after = expect_upcoming(next_occurrence(&schedule, at(start + 1)));

                if before.slot == after.slot && before.tomorrow == after.tomorrow {
                    prop_assert_eq!(
                        after.remaining.total_minutes() + 1,
                        before.remaining.total_minutes()
                    );
                } else {
                    prop_assert!(after.remaining > before.remaining);
                }
            }

            #[test]
            fn after_isha_remaining_wraps_past_midnight(now in 1186u32..1440) {
                let schedule = five_slot_defaults();
                let next = expect_upcoming(
                    next_occurrence(&schedule, wednesday_at(now / 60, now % 60)),
                );
                prop_assert_eq!(next.slot, PrayerSlot::Fajr);
                prop_assert_eq!(next.remaining.total_minutes(), (1440 - now) + 330);
            }
        }
    }
}
