use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

/// Timezone the backend renders calendar weeks in.
pub const TZ: Tz = chrono_tz::Europe::Istanbul;

/// Slot 0 starts at 08:00.
pub const DAY_START_MINUTES: u32 = 8 * 60;
pub const SLOT_MINUTES: u32 = 30;
/// 08:00 through 25:00, which leaves room for late-evening slots.
pub const DEFAULT_SLOTS_PER_DAY: usize = 35;
pub const MINUTES_PER_DAY: u32 = 24 * 60;

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn now() -> chrono::DateTime<Tz> {
    chrono::Utc::now().with_timezone(&TZ)
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Minutes since midnight at which `slot` begins. May exceed one day for
/// the trailing slots.
pub fn slot_start_minutes(slot: usize) -> u32 {
    DAY_START_MINUTES + slot as u32 * SLOT_MINUTES
}

/// Wall-clock label for a minute offset, wrapping past midnight.
pub fn clock_label(minutes: u32) -> String {
    let m = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", m / 60, m % 60)
}

pub fn slot_label(slot: usize) -> String {
    clock_label(slot_start_minutes(slot))
}

/// Parse "HH:MM" or "HH:MM:SS" into minutes since midnight.
pub fn parse_clock(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()?;
    Some(time.hour() * 60 + time.minute())
}

/// Slot containing a start time. Times before 08:00 have no slot.
pub fn slot_for_start(minutes: u32) -> Option<usize> {
    let offset = minutes.checked_sub(DAY_START_MINUTES)?;
    Some((offset / SLOT_MINUTES) as usize)
}

/// Last slot touched by a range ending at `minutes` (exclusive end), so a
/// lesson ending at 08:45 still covers the 08:30 slot.
pub fn last_slot_for_end(minutes: u32) -> Option<usize> {
    let offset = minutes.checked_sub(DAY_START_MINUTES)?;
    let covered = offset.div_ceil(SLOT_MINUTES);
    covered.checked_sub(1).map(|s| s as usize)
}

/// Map a platform-native weekday (Sunday = 0) onto the grid's day index
/// (Monday = 0 … Sunday = 6).
pub fn canonical_day(native_weekday: u32) -> u8 {
    let shifted = native_weekday as i64 - 1;
    if shifted < 0 {
        6
    } else {
        (shifted % 7) as u8
    }
}

pub fn canonical_day_of(date: NaiveDate) -> u8 {
    canonical_day(date.weekday().num_days_from_sunday())
}

/// Parse a day name into a grid day. Accepts English and Turkish names
/// (with or without diacritics) and bare indices 0-6.
pub fn parse_day(day: &str) -> Option<u8> {
    let lowered = day.trim().to_lowercase();
    if let Ok(n) = lowered.parse::<u8>() {
        return (n < 7).then_some(n);
    }
    match lowered.as_str() {
        "monday" | "mon" | "pazartesi" => Some(0),
        "tuesday" | "tue" | "salı" | "sali" => Some(1),
        "wednesday" | "wed" | "çarşamba" | "carsamba" => Some(2),
        "thursday" | "thu" | "perşembe" | "persembe" => Some(3),
        "friday" | "fri" | "cuma" => Some(4),
        "saturday" | "sat" | "cumartesi" => Some(5),
        "sunday" | "sun" | "pazar" => Some(6),
        _ => None,
    }
}

pub fn day_name(day: u8) -> &'static str {
    DAY_NAMES.get(day as usize).copied().unwrap_or("?")
}

/// Monday of the week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn date_for_day(monday: NaiveDate, day: u8) -> NaiveDate {
    monday + Duration::days(day as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_day_sunday_and_monday() {
        assert_eq!(canonical_day(0), 6);
        assert_eq!(canonical_day(1), 0);
        assert_eq!(canonical_day(6), 5);
    }

    #[test]
    fn test_canonical_day_of_date() {
        // 2024-01-07 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(canonical_day_of(sunday), 6);
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(canonical_day_of(monday), 0);
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(slot_label(0), "08:00");
        assert_eq!(slot_label(3), "09:30");
        assert_eq!(slot_label(32), "00:00");
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("09:30"), Some(570));
        assert_eq!(parse_clock("09:30:00"), Some(570));
        assert_eq!(parse_clock("9h"), None);
    }

    #[test]
    fn test_slot_bounds() {
        assert_eq!(slot_for_start(480), Some(0));
        assert_eq!(slot_for_start(525), Some(1));
        assert_eq!(slot_for_start(420), None);
        // 08:00-09:00 covers slots 0 and 1
        assert_eq!(last_slot_for_end(540), Some(1));
        // 08:00-08:45 covers slots 0 and 1
        assert_eq!(last_slot_for_end(525), Some(1));
        assert_eq!(last_slot_for_end(480), None);
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("monday"), Some(0));
        assert_eq!(parse_day("Salı"), Some(1));
        assert_eq!(parse_day("carsamba"), Some(2));
        assert_eq!(parse_day("PAZAR"), Some(6));
        assert_eq!(parse_day("4"), Some(4));
        assert_eq!(parse_day("7"), None);
        assert_eq!(parse_day("someday"), None);
    }

    #[test]
    fn test_week_monday() {
        let thu = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let mon = week_monday(thu);
        assert_eq!(mon, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(date_for_day(mon, 6), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }
}
