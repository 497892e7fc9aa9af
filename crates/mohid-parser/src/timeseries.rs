//! MOHID time-series text files.
//!
//! A time-series file is a free-form header, a column-name row, and a data
//! block between `<BeginTimeSerie>` and `<EndTimeSerie>`:
//!
//! ```text
//! NAME                    : Sagres
//!      Seconds   YY  MM  DD  hh  mm       ss  OpenPoint  temperature
//! <BeginTimeSerie>
//!    0.0000000E+00  2025.   4.  25.  12.   0.   0.0000  1  18.25
//! <EndTimeSerie>
//! ```
//!
//! The elapsed-seconds and OpenPoint columns are dropped; the six calendar
//! columns become the time axis and every other column is kept as `f64`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use mohid_common::time_from_record;
use tracing::debug;

use crate::error::{MohidError, MohidResult};

const COLUMN_MARKER: &str = "YY  MM  DD  hh  mm";
const BEGIN_MARKER: &str = "<BeginTimeSerie>";
const END_MARKER: &str = "<EndTimeSerie>";

const TIME_COLUMNS: [&str; 6] = ["YY", "MM", "DD", "hh", "mm", "ss"];
const DROPPED_COLUMNS: [&str; 2] = ["Seconds", "OpenPoint"];

/// A parsed time series: one timestamp per row and one value per row for
/// every retained column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl TimeSeries {
    pub fn from_path(path: impl AsRef<Path>) -> MohidResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let series = Self::parse(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            rows = series.len(),
            columns = series.columns.len(),
            "Parsed time series"
        );
        Ok(series)
    }

    pub fn parse<R: BufRead>(reader: R) -> MohidResult<Self> {
        let mut lines = reader.lines();
        let mut line_no = 0;

        let mut header: Option<Vec<String>> = None;
        let mut begun = false;
        for line in lines.by_ref() {
            let line = line?;
            line_no += 1;
            if line.contains(COLUMN_MARKER) {
                header = Some(line.split_whitespace().map(String::from).collect());
            } else if line.contains(BEGIN_MARKER) {
                begun = true;
                break;
            }
        }

        let header = header.ok_or_else(|| error(line_no, "column header row not found"))?;
        if !begun {
            return Err(error(line_no, format!("'{}' not found", BEGIN_MARKER)));
        }

        let mut time_idx = [0usize; 6];
        for (slot, name) in time_idx.iter_mut().zip(TIME_COLUMNS) {
            *slot = header
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| error(line_no, format!("column '{}' missing from header", name)))?;
        }

        let value_idx: Vec<usize> = (0..header.len())
            .filter(|i| !time_idx.contains(i) && !DROPPED_COLUMNS.contains(&header[*i].as_str()))
            .collect();
        let columns: Vec<String> = value_idx.iter().map(|&i| header[i].clone()).collect();

        let mut times = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
        let mut ended = false;

        for line in lines {
            let line = line?;
            line_no += 1;
            if line.contains(END_MARKER) {
                ended = true;
                break;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != header.len() {
                return Err(error(
                    line_no,
                    format!("expected {} values, found {}", header.len(), tokens.len()),
                ));
            }

            let number = |i: usize| -> MohidResult<f64> {
                tokens[i]
                    .parse::<f64>()
                    .map_err(|_| error(line_no, format!("'{}' is not a number", tokens[i])))
            };

            let mut record = [0.0; 6];
            for (slot, &i) in record.iter_mut().zip(&time_idx) {
                *slot = number(i)?;
            }
            times.push(row_time(record).map_err(|message| error(line_no, message))?);

            for (column, &i) in values.iter_mut().zip(&value_idx) {
                column.push(number(i)?);
            }
        }

        if !ended {
            return Err(error(line_no, format!("'{}' not found", END_MARKER)));
        }

        Ok(Self {
            times,
            columns,
            values,
        })
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Names of the retained value columns, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(&self.values[idx])
    }

    /// `(min, max)` of a column, ignoring NaN.
    pub fn column_range(&self, name: &str) -> Option<(f64, f64)> {
        self.column(name)?
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Seconds may carry a fraction; it is kept to the nearest millisecond.
fn row_time(record: [f64; 6]) -> Result<NaiveDateTime, String> {
    let seconds = record[5];
    if !seconds.is_finite() {
        return Err(format!("second = {} is not finite", seconds));
    }
    let whole = seconds.floor();
    let millis = ((seconds - whole) * 1000.0).round() as i64;

    let mut whole_record = record;
    whole_record[5] = whole;
    let base = time_from_record(&whole_record).map_err(|e| e.to_string())?;
    Ok(base + Duration::milliseconds(millis))
}

fn error(line: usize, message: impl Into<String>) -> MohidError {
    MohidError::TimeSeries {
        line,
        message: message.into(),
    }
}
