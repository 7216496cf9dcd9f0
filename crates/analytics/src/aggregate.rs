//! Derived metrics of one topic: the most recent level, the mean level and the awards
//! earned per category.
//!
//! None of the aggregations fail. Missing data yields `None` or an empty map, which
//! the rendering side treats as an omitted field.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::filter::RecordFilter;
use crate::record::MetricType;
use crate::record::Period;
use crate::record::RawRecord;

/// Awards of one metric type, keyed by category.
pub type Awards = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    AllTime,
    Yearly,
}

struct AwardRule {
    label: &'static str,
    scope: Scope,
    qualifies: fn(&RawRecord) -> bool,
}

// Evaluation order is also the retention order when the awards are truncated.
const AWARD_RULES: [AwardRule; 9] = [
    AwardRule {
        label: "Top 1000 of all time",
        scope: Scope::AllTime,
        qualifies: |r| r.ranking <= 1000,
    },
    AwardRule {
        label: "Top 100 of all time",
        scope: Scope::AllTime,
        qualifies: |r| r.ranking <= 100,
    },
    AwardRule {
        label: "Top 1% of all time",
        scope: Scope::AllTime,
        qualifies: |r| r.percentile == 100,
    },
    AwardRule {
        label: "First place of the year",
        scope: Scope::Yearly,
        qualifies: |r| r.ranking == 1,
    },
    AwardRule {
        label: "Third place of the year",
        scope: Scope::Yearly,
        qualifies: |r| r.ranking <= 3,
    },
    AwardRule {
        label: "Top Ten of the year",
        scope: Scope::Yearly,
        qualifies: |r| r.ranking <= 10,
    },
    AwardRule {
        label: "Top 100 of the year",
        scope: Scope::Yearly,
        qualifies: |r| r.ranking <= 100,
    },
    AwardRule {
        label: "Top 1000 of the year",
        scope: Scope::Yearly,
        qualifies: |r| r.ranking <= 1000,
    },
    AwardRule {
        label: "Top 1% of the year",
        scope: Scope::Yearly,
        qualifies: |r| r.percentile == 100,
    },
];

/// Returns the normalized value of the latest yearly record covering every category.
pub fn recent(records: &[RawRecord], kind: MetricType) -> Option<String> {
    RecordFilter::new(kind)
        .apply(records)
        .max_by_key(|record| record.period)
        .map(|record| record.normalized_value.to_string())
}

/// Returns the mean absolute value of the yearly records covering every category,
/// formatted with two decimals.
pub fn mean(records: &[RawRecord], kind: MetricType) -> Option<String> {
    let (sum, count) = RecordFilter::new(kind)
        .apply(records)
        .fold((0.0, 0usize), |(sum, count), record| {
            (sum + record.absolute_value, count + 1)
        });

    if count == 0 {
        return None;
    }

    Some(format!("{:.2}", sum / count as f64))
}

/// Returns the awards earned by the topic for one metric type, per category.
///
/// All-time awards are bare labels, yearly awards carry the sorted list of years they
/// were earned in, e.g. `Top Ten of the year (2016, 2019)`. Every category keeps at most
/// `limit` awards, in rule evaluation order. Categories without awards are omitted.
pub fn awards(records: &[RawRecord], kind: MetricType, limit: usize) -> Awards {
    let mut by_category: BTreeMap<&str, Vec<&RawRecord>> = BTreeMap::new();

    for record in records.iter().filter(|r| r.kind == kind) {
        by_category
            .entry(record.category.as_str())
            .or_default()
            .push(record);
    }

    by_category
        .into_iter()
        .filter_map(|(category, records)| {
            let awards: Vec<String> = AWARD_RULES
                .iter()
                .filter_map(|rule| rule.evaluate(&records))
                .take(limit)
                .collect();

            (!awards.is_empty()).then(|| (category.to_owned(), awards))
        })
        .collect()
}

impl AwardRule {
    fn evaluate(&self, records: &[&RawRecord]) -> Option<String> {
        match self.scope {
            Scope::AllTime => records
                .iter()
                .any(|r| r.period == Period::All && (self.qualifies)(r))
                .then(|| self.label.to_owned()),
            Scope::Yearly => {
                let years: BTreeSet<i32> = records
                    .iter()
                    .filter(|r| (self.qualifies)(r))
                    .filter_map(|r| r.period.year())
                    .collect();

                if years.is_empty() {
                    return None;
                }

                let years = years
                    .iter()
                    .map(i32::to_string)
                    .collect::<Vec<String>>()
                    .join(", ");

                Some(format!("{} ({years})", self.label))
            }
        }
    }
}
