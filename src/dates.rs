use chrono::{DateTime, Local, NaiveDate, Utc};

/// Parses a `YYYY-MM-DD` string as midnight of that calendar day in the
/// server's local timezone, returned as the equivalent UTC instant.
///
/// The input must be exactly three hyphen-separated numeric components and
/// must name a real calendar date (`2024-13-01` or `2024-02-30` are
/// rejected, not rolled over). Anything else yields `None`; callers treat
/// that as "no date given".
pub fn parse_local_date(input: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = input.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;

    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    // On DST transitions local midnight may not exist; take the earliest
    // valid instant of that day.
    let local = midnight.and_local_timezone(Local).earliest()?;
    Some(local.with_timezone(&Utc))
}

/// Last representable millisecond (23:59:59.999) of the given instant's
/// local calendar day, as a UTC instant. Used for inclusive range ends.
pub fn end_of_local_day(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let end = instant
        .with_timezone(&Local)
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)?;
    let local = end.and_local_timezone(Local).latest()?;
    Some(local.with_timezone(&Utc))
}

/// `YYYY-MM-DD` of the instant's local calendar day. Inverse of
/// [`parse_local_date`]: round-tripping a parsed string returns the same
/// (zero-padded) string.
pub fn format_local_date(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD` of the instant's UTC calendar day. Stored due dates are
/// local midnights, so rendering them in UTC keeps the wire value stable
/// regardless of the server's timezone at read time.
pub fn format_storage_date(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Utc).format("%Y-%m-%d").to_string()
}
