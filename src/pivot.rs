//! Long-to-wide reshape of metric series.
//!
//! Every distinct timestamp across all series becomes one [`WideRow`] holding
//! a cell for every metric of the run. Rows and columns are ordered by explicit
//! sorts so the output depends only on the input content.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::{ConvertError, Result};
use crate::series::{MetricSeries, Timestamp};

/// Title of the leading timestamp column.
pub const TIMESTAMP_TITLE: &str = "UNIX Timestamp";

/// How row timestamps are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampOrder {
    /// Numeric when every timestamp of the run is an integer, text otherwise.
    #[default]
    Auto,
    /// Byte-wise comparison of the timestamp text (`"10"` before `"9"`).
    Lexical,
}

impl TimestampOrder {
    fn sort(self, rows: &mut [WideRow]) {
        let numeric = self == Self::Auto
            && rows.iter().all(|row| row.timestamp.as_integer().is_some());
        if numeric {
            rows.sort_by(|a, b| a.timestamp.cmp_numeric(&b.timestamp));
        } else {
            rows.sort_by(|a, b| a.timestamp.cmp_lexical(&b.timestamp));
        }
    }
}

/// Identifies what a column holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnId {
    Timestamp,
    Metric(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
}

/// Ordered output columns: the timestamp column, then metrics sorted
/// case-insensitively with ties broken by the original string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    columns: Vec<Column>,
}

impl ColumnSpec {
    /// Builds the column order for the given metric names.
    pub fn for_metrics<S: AsRef<str>>(names: &[S]) -> Self {
        let mut sorted: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        sorted.sort_by(|a, b| compare_names(a, b));

        let mut columns = Vec::with_capacity(sorted.len() + 1);
        columns.push(Column {
            id: ColumnId::Timestamp,
            title: TIMESTAMP_TITLE.to_string(),
        });
        columns.extend(sorted.into_iter().map(|name| Column {
            id: ColumnId::Metric(name.to_string()),
            title: name.to_string(),
        }));
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.title.as_str())
    }

    /// Metric names in column order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(|c| match &c.id {
            ColumnId::Metric(name) => Some(name.as_str()),
            ColumnId::Timestamp => None,
        })
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// One output row: a timestamp and a cell for every metric of the run.
///
/// A cell is `None` when the metric has no sample at this timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    timestamp: Timestamp,
    cells: HashMap<String, Option<Value>>,
}

impl WideRow {
    /// A fresh row with every metric cell set to the missing marker.
    pub fn empty<S: AsRef<str>>(timestamp: Timestamp, metrics: &[S]) -> Self {
        let cells = metrics
            .iter()
            .map(|name| (name.as_ref().to_string(), None))
            .collect();
        Self { timestamp, cells }
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// The value of `metric` at this row, `None` when missing or unknown.
    pub fn get(&self, metric: &str) -> Option<&Value> {
        self.cells.get(metric).and_then(Option::as_ref)
    }

    /// Whether `metric` is one of this row's columns.
    pub fn has_metric(&self, metric: &str) -> bool {
        self.cells.contains_key(metric)
    }

    /// Number of entries including the timestamp.
    pub fn width(&self) -> usize {
        self.cells.len() + 1
    }

    fn set(&mut self, metric: &str, value: Value) {
        if let Some(cell) = self.cells.get_mut(metric) {
            *cell = Some(value);
        }
    }
}

/// Rows in ascending timestamp order, one per distinct timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WideTable {
    rows: Vec<WideRow>,
}

impl WideTable {
    pub fn rows(&self) -> &[WideRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pivots metric series into a wide table and its column order.
///
/// A later sample for the same `(name, timestamp)` overwrites an earlier one.
/// Two series sharing a name fail with [`ConvertError::DuplicateMetricName`].
pub fn build_wide_table(
    series: &[MetricSeries],
    order: TimestampOrder,
) -> Result<(WideTable, ColumnSpec)> {
    let mut seen = HashSet::with_capacity(series.len());
    let mut names = Vec::with_capacity(series.len());
    for s in series {
        if !seen.insert(s.name.as_str()) {
            return Err(ConvertError::DuplicateMetricName(s.name.clone()));
        }
        names.push(s.name.as_str());
    }

    let mut by_timestamp: HashMap<&Timestamp, WideRow> = HashMap::new();
    for s in series {
        for sample in &s.samples {
            by_timestamp
                .entry(&sample.timestamp)
                .or_insert_with(|| WideRow::empty(sample.timestamp.clone(), &names))
                .set(&s.name, sample.value.clone());
        }
    }

    let mut rows: Vec<WideRow> = by_timestamp.into_values().collect();
    order.sort(&mut rows);

    Ok((WideTable { rows }, ColumnSpec::for_metrics(&names)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Sample;
    use serde_json::json;

    fn series(name: &str, samples: &[(i64, i64)]) -> MetricSeries {
        MetricSeries::new(
            name,
            samples.iter().map(|&(t, v)| Sample::new(t, v)).collect(),
        )
    }

    fn timestamps(table: &WideTable) -> Vec<&str> {
        table.rows().iter().map(|r| r.timestamp().as_str()).collect()
    }

    #[test]
    fn columns_sort_case_insensitively() {
        let input = [series("b", &[]), series("A", &[]), series("c", &[])];
        let (_, columns) = build_wide_table(&input, TimestampOrder::Auto).unwrap();

        let titles: Vec<_> = columns.titles().collect();
        assert_eq!(titles, ["UNIX Timestamp", "A", "b", "c"]);
    }

    #[test]
    fn case_ties_fall_back_to_original_order() {
        let columns = ColumnSpec::for_metrics(&["a", "B", "A", "b"]);
        let names: Vec<_> = columns.metric_names().collect();
        assert_eq!(names, ["A", "a", "B", "b"]);
    }

    #[test]
    fn rows_sort_ascending() {
        let input = [series("x", &[(300, 3), (100, 1)]), series("y", &[(200, 2)])];
        let (table, _) = build_wide_table(&input, TimestampOrder::Auto).unwrap();
        assert_eq!(timestamps(&table), ["100", "200", "300"]);
    }

    #[test]
    fn auto_order_is_numeric_for_integers() {
        let input = [series("x", &[(10, 1), (9, 2), (-1, 3)])];

        let (table, _) = build_wide_table(&input, TimestampOrder::Auto).unwrap();
        assert_eq!(timestamps(&table), ["-1", "9", "10"]);

        let (table, _) = build_wide_table(&input, TimestampOrder::Lexical).unwrap();
        assert_eq!(timestamps(&table), ["-1", "10", "9"]);
    }

    #[test]
    fn auto_order_falls_back_to_text() {
        let input = [MetricSeries::new(
            "x",
            vec![
                Sample::new(Timestamp::from_text("b"), 1),
                Sample::new(10i64, 2),
                Sample::new(9i64, 3),
            ],
        )];
        let (table, _) = build_wide_table(&input, TimestampOrder::Auto).unwrap();
        assert_eq!(timestamps(&table), ["10", "9", "b"]);
    }

    #[test]
    fn missing_values_stay_empty() {
        let input = [series("X", &[(1, 10)]), series("Y", &[(2, 20)])];
        let (table, _) = build_wide_table(&input, TimestampOrder::Auto).unwrap();

        let first = &table.rows()[0];
        assert_eq!(first.get("X"), Some(&json!(10)));
        assert_eq!(first.get("Y"), None);
        assert!(first.has_metric("Y"));

        let second = &table.rows()[1];
        assert_eq!(second.get("X"), None);
        assert_eq!(second.get("Y"), Some(&json!(20)));
    }

    #[test]
    fn every_row_has_every_metric() {
        let input = [
            series("a", &[(1, 1), (2, 2)]),
            series("b", &[(3, 3)]),
            series("c", &[]),
        ];
        let (table, columns) = build_wide_table(&input, TimestampOrder::Auto).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(columns.columns().len(), 4);
        for row in table.rows() {
            assert_eq!(row.width(), columns.columns().len());
            assert!(columns.metric_names().all(|m| row.has_metric(m)));
        }
    }

    #[test]
    fn later_duplicate_sample_wins() {
        let input = [series("a", &[(1, 1), (1, 2)])];
        let (table, _) = build_wide_table(&input, TimestampOrder::Auto).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("a"), Some(&json!(2)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let input = [series("a", &[(1, 1)]), series("a", &[(2, 2)])];
        let err = build_wide_table(&input, TimestampOrder::Auto).unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateMetricName(name) if name == "a"));
    }

    #[test]
    fn pivot_is_deterministic() {
        let input = [
            series("m", &[(5, 1), (3, 2), (8, 3)]),
            series("M", &[(3, 4), (1, 5)]),
        ];
        let first = build_wide_table(&input, TimestampOrder::Auto).unwrap();
        let second = build_wide_table(&input, TimestampOrder::Auto).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_header_only() {
        let (table, columns) = build_wide_table(&[], TimestampOrder::Auto).unwrap();
        assert!(table.is_empty());
        assert_eq!(columns.titles().collect::<Vec<_>>(), ["UNIX Timestamp"]);
    }
}
