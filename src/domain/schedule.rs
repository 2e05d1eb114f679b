use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

// Returns the half-hour boundaries surrounding the given time: the previous
// boundary (inclusive) and the next one. Seconds are dropped before snapping.
pub fn surrounding_half_hours(time: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let minute = if time.minute() < 30 { 0 } else { 30 };
    let floored = time
        .date()
        .and_hms_opt(time.hour(), minute, 0)
        .unwrap_or(time);

    (floored, floored + Duration::minutes(30))
}

// Parses a venue's working hours string, e.g. "09:00 - 23:30".
pub fn parse_working_hours(value: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (opens, closes) = value.split_once('-')?;
    let opens = NaiveTime::parse_from_str(opens.trim(), "%H:%M").ok()?;
    let closes = NaiveTime::parse_from_str(closes.trim(), "%H:%M").ok()?;

    if opens < closes {
        Some((opens, closes))
    } else {
        None
    }
}

// Whether a reservation time falls inside the venue's opening window.
pub fn is_within_working_hours(time: NaiveDateTime, working_hours: &str) -> bool {
    match parse_working_hours(working_hours) {
        Some((opens, closes)) => {
            let t = time.time();
            t >= opens && t <= closes
        }
        // Unparseable hours never block a booking; venue creation validates
        // the format up front.
        None => true,
    }
}
