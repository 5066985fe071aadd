use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone};

use crate::error::{SchedulerError, SchedulerResult};

pub fn add_minutes(dt: DateTime<FixedOffset>, minutes: i64) -> SchedulerResult<DateTime<FixedOffset>> {
    dt.checked_add_signed(Duration::minutes(minutes))
        .ok_or_else(|| SchedulerError::bad_input("time computation overflowed"))
}

pub fn duration_minutes(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> SchedulerResult<i64> {
    let total = (end - start).num_minutes();
    if total < 0 {
        Err(SchedulerError::bad_input("end must be after start"))
    } else {
        Ok(total)
    }
}

pub fn overlaps(
    a_start: DateTime<FixedOffset>,
    a_end: DateTime<FixedOffset>,
    b_start: DateTime<FixedOffset>,
    b_end: DateTime<FixedOffset>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Builds an absolute datetime on `day_offset` days from `anchor`'s date, at
/// `time_of_day`, in `anchor`'s offset.
pub fn on_day(
    anchor: DateTime<FixedOffset>,
    day_offset: u32,
    time_of_day: NaiveTime,
) -> DateTime<FixedOffset> {
    let date = anchor.date_naive() + Duration::days(day_offset as i64);
    let naive = date.and_time(time_of_day);
    anchor
        .offset()
        .from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| anchor.offset().from_utc_datetime(&naive))
}

pub fn midnight(anchor: DateTime<FixedOffset>, day_offset: u32) -> DateTime<FixedOffset> {
    on_day(anchor, day_offset, NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}

pub fn end_of_day(anchor: DateTime<FixedOffset>, day_offset: u32) -> DateTime<FixedOffset> {
    on_day(
        anchor,
        day_offset,
        NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
    )
}
