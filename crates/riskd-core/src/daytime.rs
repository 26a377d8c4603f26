//! Trading-day and session-hours boundary math shared by the P&L Tracker
//! (§4.4) and rules 003/009/013. All of it is computed against an IANA
//! timezone (via `chrono-tz`), never a fixed UTC offset, so daylight-saving
//! transitions fall out correctly (§4.11 rule 009 detail).

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

/// The trading day `now` belongs to, given a daily reset wall-time in `tz`.
///
/// If the local time-of-day is at or past `reset_time`, `now` belongs to
/// today's trading day; otherwise it still belongs to yesterday's (the
/// reset hasn't happened yet today).
pub fn current_trading_day(tz: Tz, reset_time: NaiveTime, now: DateTime<Utc>) -> NaiveDate {
    let local = now.with_timezone(&tz);
    if local.time() >= reset_time {
        local.date_naive()
    } else {
        local.date_naive() - chrono::Duration::days(1)
    }
}

/// The UTC instant the current trading day (per `current_trading_day`)
/// started at — the most recent daily reset at or before `now` (§4.11
/// rule 006 detail: the per-session trade count is scoped to this boundary,
/// not a rolling 24h window).
pub fn current_trading_day_start(tz: Tz, reset_time: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let day = current_trading_day(tz, reset_time, now);
    tz.from_local_datetime(&day.and_time(reset_time))
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&day.and_time(reset_time).and_utc().naive_utc()))
        .with_timezone(&Utc)
}

/// The next UTC instant at which the daily reset wall-time in `tz` occurs,
/// strictly after `now`.
pub fn next_daily_reset(tz: Tz, reset_time: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let today_reset = tz
        .from_local_datetime(&local.date_naive().and_time(reset_time))
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&local.date_naive().and_time(reset_time).and_utc().naive_utc()));
    let candidate = if today_reset > local {
        today_reset
    } else {
        let tomorrow = local.date_naive() + chrono::Duration::days(1);
        tz.from_local_datetime(&tomorrow.and_time(reset_time))
            .single()
            .unwrap_or_else(|| tz.from_utc_datetime(&tomorrow.and_time(reset_time).and_utc().naive_utc()))
    };
    candidate.with_timezone(&Utc)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// §4.11 rule 009 next-session calculation: if current wall time is before
/// `session_start` on a weekday (and not a blocked weekend/holiday day),
/// next_start is today's `session_start`; otherwise roll forward a day,
/// skipping weekends (if `block_weekends`) and `holidays`.
pub fn next_session_start(
    tz: Tz,
    session_start: NaiveTime,
    block_weekends: bool,
    holidays: &[NaiveDate],
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let today = local.date_naive();

    let is_open_day = |d: NaiveDate| -> bool {
        if block_weekends && is_weekend(d) {
            return false;
        }
        !holidays.contains(&d)
    };

    let today_start = |d: NaiveDate| -> DateTime<Tz> {
        tz.from_local_datetime(&d.and_time(session_start))
            .single()
            .unwrap_or_else(|| tz.from_utc_datetime(&d.and_time(session_start).and_utc().naive_utc()))
    };

    if is_open_day(today) && local < today_start(today) {
        return today_start(today).with_timezone(&Utc);
    }

    let mut candidate = today + chrono::Duration::days(1);
    while !is_open_day(candidate) {
        candidate += chrono::Duration::days(1);
    }
    today_start(candidate).with_timezone(&Utc)
}

/// Whether `now` (in `tz`) falls within `[session_start, session_end)`,
/// accounting for weekend/holiday blocking.
pub fn is_within_session(
    tz: Tz,
    session_start: NaiveTime,
    session_end: NaiveTime,
    block_weekends: bool,
    respect_holidays: bool,
    holidays: &[NaiveDate],
    now: DateTime<Utc>,
) -> bool {
    let local = now.with_timezone(&tz);
    let today = local.date_naive();

    if block_weekends && is_weekend(today) {
        return false;
    }
    if respect_holidays && holidays.contains(&today) {
        return false;
    }

    let t = local.time();
    if session_start <= session_end {
        t >= session_start && t < session_end
    } else {
        // Overnight session wrapping past midnight.
        t >= session_start || t < session_end
    }
}
