//! Publication counts per year.
//!
//! Produces the `(year, count)` series a chart needs. Years are ordered
//! numerically by default; [`YearOrder::Lexical`] sorts the year labels as
//! text, which is only correct while every year has the same number of
//! digits (it puts `999` after `2021`).
//!
//! ```
//! use bibrecords::aggregate::{YearOrder, YearSeries, aggregate_years};
//!
//! let buckets = aggregate_years([Some(2021), Some(2019), None, Some(2019)], YearOrder::Numeric);
//! let series = YearSeries::from(buckets.as_slice());
//! assert_eq!(series.labels, vec!["2019", "2021"]);
//! assert_eq!(series.counts, vec![2, 1]);
//! ```

use crate::loader::StoredRecord;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordering of the buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearOrder {
    /// Ascending by year value
    #[default]
    Numeric,
    /// Ascending by the year's decimal text
    Lexical,
}

/// Number of publications in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBucket {
    pub year: i32,
    pub count: usize,
}

/// Parallel label and count sequences, aligned by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSeries {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

/// Count years, dropping entries without one.
pub fn aggregate_years<I>(years: I, order: YearOrder) -> Vec<YearBucket>
where
    I: IntoIterator<Item = Option<i32>>,
{
    let counts: HashMap<i32, usize> = years.into_iter().flatten().counts();

    let buckets = counts
        .into_iter()
        .map(|(year, count)| YearBucket { year, count });

    match order {
        YearOrder::Numeric => buckets.sorted_by_key(|bucket| bucket.year).collect(),
        YearOrder::Lexical => buckets
            .sorted_by_cached_key(|bucket| bucket.year.to_string())
            .collect(),
    }
}

/// Count stored records by year.
pub fn aggregate_records(records: &[StoredRecord], order: YearOrder) -> Vec<YearBucket> {
    aggregate_years(records.iter().map(|record| record.year), order)
}

impl From<&[YearBucket]> for YearSeries {
    fn from(buckets: &[YearBucket]) -> Self {
        Self {
            labels: buckets.iter().map(|b| b.year.to_string()).collect(),
            counts: buckets.iter().map(|b| b.count).collect(),
        }
    }
}

impl YearSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Write the buckets as `year,count` CSV.
#[cfg(feature = "csv")]
pub fn write_csv<W: std::io::Write>(buckets: &[YearBucket], writer: W) -> crate::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["year", "count"])?;
    for bucket in buckets {
        csv_writer.serialize((bucket.year, bucket.count))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn bucket(year: i32, count: usize) -> YearBucket {
        YearBucket { year, count }
    }

    #[test]
    fn test_aggregate_numeric() {
        let buckets = aggregate_years([Some(2019), Some(2019), Some(2021)], YearOrder::Numeric);
        assert_eq!(buckets, vec![bucket(2019, 2), bucket(2021, 1)]);
    }

    #[test]
    fn test_aggregate_skips_missing_years() {
        let buckets = aggregate_years([None, Some(2020), None], YearOrder::Numeric);
        assert_eq!(buckets, vec![bucket(2020, 1)]);
        assert!(aggregate_years([None], YearOrder::Numeric).is_empty());
    }

    #[test]
    fn test_mixed_digit_lengths() {
        let years = [Some(2021), Some(999), Some(2021), Some(1500)];
        assert_eq!(
            aggregate_years(years, YearOrder::Numeric),
            vec![bucket(999, 1), bucket(1500, 1), bucket(2021, 2)]
        );
        assert_eq!(
            aggregate_years(years, YearOrder::Lexical),
            vec![bucket(1500, 1), bucket(2021, 2), bucket(999, 1)]
        );
    }

    #[test]
    fn test_aggregate_records() {
        let record = |year| StoredRecord {
            title: "T".to_string(),
            authors: Vec::new(),
            year,
            venue: None,
            publication_type: None,
            links: Default::default(),
            description: None,
            featured: false,
            path: PathBuf::new(),
        };
        let records = vec![record(Some(2018)), record(None), record(Some(2018))];
        assert_eq!(
            aggregate_records(&records, YearOrder::Numeric),
            vec![bucket(2018, 2)]
        );
    }

    #[test]
    fn test_series_alignment() {
        let series = YearSeries::from([bucket(2019, 2), bucket(2021, 1)].as_slice());
        assert_eq!(series.labels, vec!["2019", "2021"]);
        assert_eq!(series.counts, vec![2, 1]);
        assert_eq!(series.len(), 2);
        assert!(YearSeries::default().is_empty());
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_csv(&[bucket(2019, 2), bucket(2021, 1)], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "year,count\n2019,2\n2021,1\n");
    }
}
