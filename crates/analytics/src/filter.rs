use crate::record::MetricType;
use crate::record::Period;
use crate::record::RawRecord;

/// Selects the yearly, category-wide records of one metric type.
///
/// This is the view shared by the recent/mean aggregations and the historical plots:
/// only records whose category is `all` and whose period is a year are kept.
#[derive(Debug, Clone, Copy)]
pub struct RecordFilter {
    pub(crate) kind: MetricType,
    pub(crate) excluded_year: Option<i32>,
}

impl RecordFilter {
    pub fn new(kind: MetricType) -> Self {
        Self {
            kind,
            excluded_year: None,
        }
    }

    /// Drops the records of the given year, typically the current, still incomplete one.
    pub fn excluding_year(mut self, year: i32) -> Self {
        self.excluded_year = Some(year);
        self
    }

    pub fn apply<'a>(self, records: &'a [RawRecord]) -> impl Iterator<Item = &'a RawRecord> {
        records.iter().filter(move |record| self.matches(record))
    }

    pub(crate) fn matches(&self, record: &RawRecord) -> bool {
        record.kind == self.kind && record.is_global() && self.by_period(record.period)
    }

    fn by_period(&self, period: Period) -> bool {
        match (period, self.excluded_year) {
            (Period::All, _) => false,
            (Period::Year(year), Some(excluded)) => year != excluded,
            (Period::Year(_), None) => true,
        }
    }
}

/// Returns the `(year, absolute value)` points of the past years, sorted by year.
pub fn historical(records: &[RawRecord], kind: MetricType, current_year: i32) -> Vec<(i32, f64)> {
    let mut points: Vec<(i32, f64)> = RecordFilter::new(kind)
        .excluding_year(current_year)
        .apply(records)
        .filter_map(|record| Some((record.period.year()?, record.absolute_value)))
        .collect();

    points.sort_by_key(|(year, _)| *year);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: MetricType, category: &str, period: Period, value: f64) -> RawRecord {
        RawRecord {
            ranking: 10,
            percentile: 90,
            normalized_value: 50,
            kind,
            category: category.to_owned(),
            period,
            absolute_value: value,
        }
    }

    #[test]
    fn keeps_yearly_global_records_of_one_type() {
        let records = vec![
            record(MetricType::Conflict, "all", Period::Year(2019), 1.0),
            record(MetricType::Conflict, "all", Period::All, 2.0),
            record(MetricType::Conflict, "History", Period::Year(2019), 3.0),
            record(MetricType::Polemic, "all", Period::Year(2019), 4.0),
            record(MetricType::Conflict, "all", Period::Year(2020), 5.0),
        ];

        let values: Vec<f64> = RecordFilter::new(MetricType::Conflict)
            .apply(&records)
            .map(|r| r.absolute_value)
            .collect();

        assert_eq!(values, vec![1.0, 5.0]);
    }

    #[test]
    fn historical_points_skip_current_year_and_sort() {
        let records = vec![
            record(MetricType::Polemic, "all", Period::Year(2024), 9.0),
            record(MetricType::Polemic, "all", Period::Year(2021), 3.0),
            record(MetricType::Polemic, "all", Period::Year(2019), 1.5),
        ];

        assert_eq!(
            historical(&records, MetricType::Polemic, 2024),
            vec![(2019, 1.5), (2021, 3.0)]
        );
    }

    #[test]
    fn historical_points_of_current_year_only_are_empty() {
        let records = vec![record(MetricType::Conflict, "all", Period::Year(2024), 9.0)];

        assert!(historical(&records, MetricType::Conflict, 2024).is_empty());
    }
}
