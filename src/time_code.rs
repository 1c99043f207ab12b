use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

/// Round to the nearest minute: 30 seconds or more carries into the next one.
pub fn round_to_minute(now: NaiveDateTime) -> NaiveDateTime {
    let target = if now.second() >= 30 {
        now.checked_add_signed(Duration::minutes(1)).unwrap_or(now)
    } else {
        now
    };
    target
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(target)
}

/// Digits of month, day, hour and minute read as one number.
///
/// The month is unpadded and the rest are two digits each, so
/// 3/7 14:46 reads as `3` `07` `14` `46` = 3071446.
pub fn time_code(now: NaiveDateTime) -> i64 {
    let t = round_to_minute(now);
    i64::from(t.month()) * 1_000_000
        + i64::from(t.day()) * 10_000
        + i64::from(t.hour()) * 100
        + i64::from(t.minute())
}
