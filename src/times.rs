//! Time coordinates for AMOF files
//!
//! Every AMOF file carries `time` as unix seconds alongside `day_of_year`,
//! `year`, `month`, `day`, `hour`, `minute` and `second` variables. These
//! are all derived from one series of UTC timestamps.

use crate::errors::{Result, TemplateError};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Every time variable of an AMOF file, one entry per timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct TimeCoordinates {
    pub unix_times: Vec<f64>,
    /// Fractional day of year, 1.0 at midnight on 1 January
    pub day_of_year: Vec<f64>,
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub days: Vec<u32>,
    pub hours: Vec<u32>,
    pub minutes: Vec<u32>,
    /// Seconds including the fractional part
    pub seconds: Vec<f64>,
    /// Unix time of the first timestamp
    pub time_coverage_start: f64,
    /// Unix time of the last timestamp
    pub time_coverage_end: f64,
    /// Date part of the file name
    pub file_date: String,
}

/// Two-digit rendering of single-digit numbers, others unchanged
pub fn zero_pad_number(n: u32) -> String {
    format!("{:02}", n)
}

fn fractional_seconds(time: &NaiveDateTime) -> f64 {
    f64::from(time.second()) + f64::from(time.nanosecond() / 1_000) / 1e6
}

/// File name date covering the span from `first` to `last`
///
/// Starts with the year and adds month, day, `-hour`, minute and second for
/// as long as both ends agree on them.
pub fn file_date(first: &NaiveDateTime, last: &NaiveDateTime) -> Result<String> {
    if first.year() != last.year() {
        return Err(TemplateError::InvalidTimes {
            reason: "Incompatible dates - data from over 2 years".to_string(),
        });
    }

    let mut date = first.year().to_string();
    if first.month() != last.month() {
        return Ok(date);
    }
    date.push_str(&zero_pad_number(first.month()));
    if first.day() != last.day() {
        return Ok(date);
    }
    date.push_str(&zero_pad_number(first.day()));
    if first.hour() != last.hour() {
        return Ok(date);
    }
    date.push('-');
    date.push_str(&zero_pad_number(first.hour()));
    if first.minute() != last.minute() {
        return Ok(date);
    }
    date.push_str(&zero_pad_number(first.minute()));
    if first.second() == last.second() {
        date.push_str(&zero_pad_number(first.second()));
    }
    Ok(date)
}

/// Time variables and coverage for a series of UTC timestamps
pub fn get_times(times: &[NaiveDateTime]) -> Result<TimeCoordinates> {
    let (Some(first), Some(last)) = (times.first(), times.last()) else {
        return Err(TemplateError::InvalidTimes {
            reason: "no times given".to_string(),
        });
    };
    let file_date = file_date(first, last)?;

    let unix_times: Vec<f64> = times
        .iter()
        .map(|t| {
            let utc = t.and_utc();
            utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_micros()) / 1e6
        })
        .collect();
    let seconds: Vec<f64> = times.iter().map(fractional_seconds).collect();
    let day_of_year = times
        .iter()
        .zip(&seconds)
        .map(|(t, s)| {
            f64::from(t.ordinal())
                + f64::from(t.hour()) / 24.0
                + f64::from(t.minute()) / (24.0 * 60.0)
                + s / (24.0 * 60.0 * 60.0)
        })
        .collect();

    Ok(TimeCoordinates {
        time_coverage_start: unix_times[0],
        time_coverage_end: unix_times[unix_times.len() - 1],
        unix_times,
        day_of_year,
        years: times.iter().map(|t| t.year()).collect(),
        months: times.iter().map(|t| t.month()).collect(),
        days: times.iter().map(|t| t.day()).collect(),
        hours: times.iter().map(|t| t.hour()).collect(),
        minutes: times.iter().map(|t| t.minute()).collect(),
        seconds,
        file_date,
    })
}
