//! Time-bucketer: dense calendar series
//!
//! Every series enumerates all of its buckets, including empty ones, in
//! chronological order. Dates are read in one fixed reporting offset for the
//! whole computation.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Dated, Measure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Month,
    Quarter,
}

/// A calendar month, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// Move by `months`, wrapping across year boundaries
    pub fn shift(self, months: i32) -> Self {
        Self::from_ordinal(self.ordinal() + months as i64)
    }

    pub fn quarter(&self) -> u32 {
        (self.month - 1) / 3 + 1
    }

    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Aggregate for one calendar bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// `YYYY-MM` for months, `YYYY-Qn` for quarters
    pub label: String,
    pub year: i32,
    /// Month (1-12) or quarter (1-4)
    pub period: u32,
    pub count: u64,
    pub total: f64,
    pub incomplete_count: u64,
}

impl TimeBucket {
    fn empty(label: String, year: i32, period: u32) -> Self {
        Self {
            label,
            year,
            period,
            count: 0,
            total: 0.0,
            incomplete_count: 0,
        }
    }
}

/// Dense, chronologically ordered series of buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub granularity: Granularity,
    pub buckets: Vec<TimeBucket>,
    /// Rows without a usable date
    pub undated: u64,
    /// Dated rows that fall outside the series window
    pub out_of_range: u64,
}

impl TimeSeries {
    pub fn totals(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.total).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.count).collect()
    }

    /// The last two buckets as `(previous, current)`
    pub fn tail_pair(&self) -> Option<(&TimeBucket, &TimeBucket)> {
        match self.buckets.as_slice() {
            [.., previous, current] => Some((previous, current)),
            _ => None,
        }
    }
}

/// Groups rows into calendar buckets in a fixed reporting offset
#[derive(Debug, Clone, Copy)]
pub struct TimeBucketer {
    offset: FixedOffset,
}

impl Default for TimeBucketer {
    fn default() -> Self {
        Self::utc()
    }
}

impl TimeBucketer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar date of an instant in the reporting offset
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Reporting date of a row in this bucketer's offset
    pub fn reporting_date<R: Dated>(&self, row: &R) -> Option<NaiveDate> {
        row.reporting_date(self.offset)
    }

    pub fn current_month(&self, now: DateTime<Utc>) -> YearMonth {
        YearMonth::of(self.local_date(now))
    }

    /// Months 1 through 12 of `year`
    pub fn calendar_year<T, D, M>(&self, rows: &[T], year: i32, date: D, measure: M) -> TimeSeries
    where
        D: Fn(&T) -> Option<NaiveDate>,
        M: Fn(&T) -> Measure,
    {
        let buckets = (1..=12)
            .map(|month| TimeBucket::empty(format!("{:04}-{:02}", year, month), year, month))
            .collect();
        fill(
            Granularity::Month,
            buckets,
            rows,
            |d| (d.year() == year).then(|| d.month0() as usize),
            date,
            measure,
        )
    }

    /// Quarters 1 through 4 of `year`
    pub fn quarters<T, D, M>(&self, rows: &[T], year: i32, date: D, measure: M) -> TimeSeries
    where
        D: Fn(&T) -> Option<NaiveDate>,
        M: Fn(&T) -> Measure,
    {
        let buckets = (1..=4)
            .map(|quarter| TimeBucket::empty(format!("{:04}-Q{}", year, quarter), year, quarter))
            .collect();
        fill(
            Granularity::Quarter,
            buckets,
            rows,
            |d| (d.year() == year).then(|| (d.month0() / 3) as usize),
            date,
            measure,
        )
    }

    /// The `months` calendar months ending with the month containing `now`
    pub fn trailing_months<T, D, M>(
        &self,
        rows: &[T],
        now: DateTime<Utc>,
        months: u32,
        date: D,
        measure: M,
    ) -> TimeSeries
    where
        D: Fn(&T) -> Option<NaiveDate>,
        M: Fn(&T) -> Measure,
    {
        let current = self.current_month(now);
        let first = current.shift(1 - months as i32);
        let buckets = (0..months as i32)
            .map(|i| {
                let ym = first.shift(i);
                TimeBucket::empty(ym.label(), ym.year, ym.month)
            })
            .collect();
        let window = months as i64;
        fill(
            Granularity::Month,
            buckets,
            rows,
            |d| {
                let index = YearMonth::of(d).ordinal() - first.ordinal();
                (0..window).contains(&index).then_some(index as usize)
            },
            date,
            measure,
        )
    }

    /// Row counts per trailing month, for rows that carry no measure
    pub fn trailing_counts<T, D>(
        &self,
        rows: &[T],
        now: DateTime<Utc>,
        months: u32,
        date: D,
    ) -> TimeSeries
    where
        D: Fn(&T) -> Option<NaiveDate>,
    {
        self.trailing_months(rows, now, months, date, |_| Measure::Value(0.0))
    }
}

fn fill<T, L, D, M>(
    granularity: Granularity,
    mut buckets: Vec<TimeBucket>,
    rows: &[T],
    locate: L,
    date: D,
    measure: M,
) -> TimeSeries
where
    L: Fn(NaiveDate) -> Option<usize>,
    D: Fn(&T) -> Option<NaiveDate>,
    M: Fn(&T) -> Measure,
{
    let mut undated = 0;
    let mut out_of_range = 0;

    for row in rows {
        let Some(day) = date(row) else {
            undated += 1;
            continue;
        };
        match locate(day).and_then(|index| buckets.get_mut(index)) {
            Some(bucket) => {
                let value = measure(row);
                bucket.count += 1;
                bucket.total += value.value_or_zero();
                if !value.is_complete() {
                    bucket.incomplete_count += 1;
                }
            }
            None => out_of_range += 1,
        }
    }

    TimeSeries {
        granularity,
        buckets,
        undated,
        out_of_range,
    }
}
