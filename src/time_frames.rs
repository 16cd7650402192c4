use std::{fmt::Display, slice::Iter, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

use crate::data_table::{DataTable, TableError};

/// The time windows the dashboard dropdown offers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeFrame {
    Day7,
    Day30,
    Day90,
    Day365,
    YearToDate,
    All,
}

use TimeFrame::*;

static TIME_FRAMES: [TimeFrame; 6] = [Day7, Day30, Day90, Day365, YearToDate, All];

#[derive(Debug, Error)]
pub enum ParseTimeFrameError {
    #[error("failed to parse time frame {0}")]
    UnknownTimeFrame(String),
}

impl FromStr for TimeFrame {
    type Err = ParseTimeFrameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d7" | "Last 7 days" => Ok(Day7),
            "d30" | "Last month" => Ok(Day30),
            "d90" | "Last 3 months" => Ok(Day90),
            "d365" | "Last year" => Ok(Day365),
            "ytd" | "This year" => Ok(YearToDate),
            "all" | "All time" => Ok(All),
            unknown_time_frame => Err(ParseTimeFrameError::UnknownTimeFrame(
                unknown_time_frame.to_string(),
            )),
        }
    }
}

impl Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Day7 => write!(f, "d7"),
            Day30 => write!(f, "d30"),
            Day90 => write!(f, "d90"),
            Day365 => write!(f, "d365"),
            YearToDate => write!(f, "ytd"),
            All => write!(f, "all"),
        }
    }
}

impl TimeFrame {
    pub fn iterator() -> Iter<'static, TimeFrame> {
        TIME_FRAMES.iter()
    }

    /// The dropdown label the dashboard shows for this window.
    pub fn label(&self) -> &'static str {
        match self {
            Day7 => "Last 7 days",
            Day30 => "Last month",
            Day90 => "Last 3 months",
            Day365 => "Last year",
            YearToDate => "This year",
            All => "All time",
        }
    }

    /// Rows strictly after the cutoff fall inside the window. `None` means
    /// unfiltered.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Day7 => Some(today - Duration::days(7)),
            Day30 => Some(today - Duration::days(30)),
            Day90 => Some(today - Duration::days(90)),
            Day365 => Some(today - Duration::days(365)),
            YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            All => None,
        }
    }
}

// Query timestamps come back as `2024-01-05 00:00:00.000`, the date prefix is
// enough for day-granular windows.
fn parse_date_cell(column: &str, value: &str) -> Result<NaiveDate, TableError> {
    let prefix = value.get(..10).unwrap_or(value);
    prefix
        .parse::<NaiveDate>()
        .map_err(|_| TableError::BadDate {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Keeps the rows whose date falls inside the selected window, relative to
/// `today`.
pub fn filter_by_time_frame(
    table: &DataTable,
    date_column: &str,
    time_frame: TimeFrame,
    today: NaiveDate,
) -> Result<DataTable, TableError> {
    let Some(cutoff) = time_frame.cutoff(today) else {
        return Ok(table.clone());
    };

    let date_index = table.column_index(date_column)?;

    let mut rows = Vec::new();
    for row in table.rows() {
        let date = parse_date_cell(date_column, &row[date_index])?;
        if date > cutoff {
            rows.push(row.clone());
        }
    }

    Ok(DataTable::new(table.columns().to_vec(), rows))
}
