//! Time handling for forecast series: epoch timestamps to local time, the
//! 12-hour display window, and clock/day labels.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

pub const HOURLY_WINDOW_HOURS: i64 = 12;

/// Epoch seconds to local time in `tz`. `None` for out-of-range values.
pub fn local_time(ts: i64, tz: Tz) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|utc| utc.with_timezone(&tz))
}

/// `now` in `tz`, floored to the start of the local hour.
///
/// Stays in the offset `now` is in, including the repeated hour at DST
/// fall-back and zones with half-hour offsets.
pub fn current_hour(now: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    let local = now.with_timezone(&tz);
    let elapsed = Duration::seconds(i64::from(local.minute() * 60 + local.second()))
        + Duration::nanoseconds(i64::from(local.nanosecond()));
    local - elapsed
}

/// Half-open window `[current hour, current hour + 12h)`.
pub fn hourly_window(now: DateTime<Utc>, tz: Tz) -> (DateTime<Tz>, DateTime<Tz>) {
    let start = current_hour(now, tz);
    (start, start + Duration::hours(HOURLY_WINDOW_HOURS))
}

/// "2:00 PM": 12-hour clock without a leading zero on the hour.
pub fn clock_label(time: &DateTime<Tz>) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Local calendar date of `now` in `tz`.
pub fn today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// "Monday", "Tuesday", ...
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::{America::Chicago, Australia::Adelaide};

    fn utc(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .expect("rfc3339")
            .with_timezone(&Utc)
    }

    fn chicago(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Chicago
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("unambiguous local time")
            .with_timezone(&Utc)
    }

    #[test]
    fn window_starts_at_the_floored_local_hour() {
        let now = chicago(2026, 10, 17, 14, 37);
        let (start, end) = hourly_window(now, Chicago);

        assert_eq!(start.hour(), 14);
        assert_eq!(start.minute(), 0);
        assert_eq!(end - start, Duration::hours(12));
        assert_eq!(clock_label(&end), "2:00 AM");
    }

    #[test]
    fn repeated_hour_at_fall_back_floors_within_its_own_offset() {
        // 2026-11-01: 01:00-02:00 happens twice in Chicago (CDT, then CST).
        let first = current_hour(utc("2026-11-01T06:30:00Z"), Chicago);
        assert_eq!(first.with_timezone(&Utc), utc("2026-11-01T06:00:00Z"));
        assert_eq!(clock_label(&first), "1:00 AM");

        let second = current_hour(utc("2026-11-01T07:30:00Z"), Chicago);
        assert_eq!(second.with_timezone(&Utc), utc("2026-11-01T07:00:00Z"));
        assert_eq!(clock_label(&second), "1:00 AM");
    }

    #[test]
    fn half_hour_offset_fall_back_keeps_the_current_hour() {
        // 2026-04-05: Adelaide goes from +10:30 to +9:30 at 03:00 local.
        let start = current_hour(utc("2026-04-04T17:15:00Z"), Adelaide);
        assert_eq!(start.with_timezone(&Utc), utc("2026-04-04T16:30:00Z"));
        assert_eq!((start.hour(), start.minute()), (2, 0));

        let earlier = current_hour(utc("2026-04-04T16:15:00Z"), Adelaide);
        assert_eq!(earlier.with_timezone(&Utc), utc("2026-04-04T15:30:00Z"));
        assert_eq!((earlier.hour(), earlier.minute()), (2, 0));

        let (window_start, _) = hourly_window(utc("2026-04-04T17:15:00Z"), Adelaide);
        assert!(window_start.with_timezone(&Utc) <= utc("2026-04-04T17:15:00Z"));
        assert_eq!(clock_label(&window_start), "2:00 AM");
    }

    #[test]
    fn clock_label_has_no_leading_zero() {
        let t = Chicago.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).single().expect("time");
        assert_eq!(clock_label(&t), "9:00 AM");

        let t = Chicago.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).single().expect("time");
        assert_eq!(clock_label(&t), "12:00 AM");

        let t = Chicago.with_ymd_and_hms(2026, 10, 17, 14, 0, 0).single().expect("time");
        assert_eq!(clock_label(&t), "2:00 PM");
    }

    #[test]
    fn local_time_converts_from_epoch() {
        // 2026-10-17T19:00:00Z is 2 PM in Chicago (CDT, UTC-5).
        let t = local_time(1_792_263_600, Chicago).expect("in range");
        assert_eq!(t.hour(), 14);
        assert_eq!(t.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 17).expect("date"));
    }

    #[test]
    fn today_uses_the_location_timezone() {
        // 03:30 UTC on the 18th is still the evening of the 17th in Chicago.
        let now = DateTime::parse_from_rfc3339("2026-10-18T03:30:00Z")
            .expect("rfc3339")
            .with_timezone(&Utc);
        assert_eq!(today(now, Chicago), NaiveDate::from_ymd_opt(2026, 10, 17).expect("date"));
    }

    #[test]
    fn weekday_names() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).expect("date");
        assert_eq!(weekday_name(date), "Saturday");
    }
}
