//! Parser for the inline data the analytics source embeds in its page scripts.
//!
//! The records are assigned to a script variable as a bracketed list of bracketed tuples:
//!
//! ```text
//! var NEGARANKS = [[12, 99, 87, "conflict", "all", "2019", 154.2], [...], ];
//! ```
//!
//! Each tuple holds seven positional fields: ranking, percentile, normalized value,
//! type, category, period and absolute value.

mod raw;

use std::fmt::Write;

use crate::error::FieldResultExt;
use crate::error::ParseError;
use crate::error::Result;
use crate::parse::raw::TupleParser;
use crate::parse::raw::find_unquoted;
use crate::parse::raw::unquote;
use crate::record::MetricType;
use crate::record::Period;
use crate::record::RawRecord;

const RECORD_FIELDS: usize = 7;
const WORD_FIELDS: usize = 2;

const RANKING_FIELD: usize = 0;
const PERCENTILE_FIELD: usize = 1;
const NORMALIZED_VALUE_FIELD: usize = 2;
const TYPE_FIELD: usize = 3;
const CATEGORY_FIELD: usize = 4;
const PERIOD_FIELD: usize = 5;
const ABSOLUTE_VALUE_FIELD: usize = 6;

/// Returns the text assigned to the `name` variable, without the statement terminator.
pub fn assignment<'a>(script: &'a str, name: &str) -> Result<&'a str> {
    let value_start = script
        .match_indices(name)
        .filter(|(idx, _)| !preceded_by_identifier(script, *idx))
        .find_map(|(idx, _)| {
            let rest = &script[idx + name.len()..];
            let trimmed = rest.trim_start();
            let after_eq = trimmed.strip_prefix('=')?;

            if after_eq.starts_with('=') {
                return None;
            }

            Some(script.len() - after_eq.len())
        })
        .ok_or_else(|| ParseError::VariableNotFound {
            name: name.to_owned(),
        })?;

    let value = &script[value_start..];
    let value_end = find_unquoted(value, ';').ok_or_else(|| ParseError::Unterminated {
        name: name.to_owned(),
    })?;

    Ok(value[..value_end].trim())
}

/// Parses the records assigned to the `name` variable in a script block.
pub fn records(script: &str, name: &str) -> Result<Vec<RawRecord>> {
    let value = assignment(script, name)?;

    TupleParser::parse(name, value)?
        .iter()
        .enumerate()
        .map(|(idx, fields)| record(idx, fields))
        .collect()
}

/// Parses the (word, weight) pairs assigned to the `name` variable in a script block
/// and returns the words in source order.
pub fn words(script: &str, name: &str) -> Result<Vec<String>> {
    let value = assignment(script, name)?;

    TupleParser::parse(name, value)?
        .iter()
        .enumerate()
        .map(|(idx, fields)| {
            if fields.len() != WORD_FIELDS {
                return Err(ParseError::FieldCount {
                    record: idx,
                    found: fields.len(),
                    expected: WORD_FIELDS,
                });
            }

            let weight = unquote(&fields[1]);
            weight.parse::<f64>().map_field_err(idx, 1, weight)?;

            Ok(unquote(&fields[0]).to_owned())
        })
        .collect()
}

/// Serializes records into the bracketed-array syntax read by [`records`].
pub fn write_records(records: &[RawRecord]) -> String {
    let mut value = String::from("[");

    for record in records {
        // Writing into a `String` never fails.
        let _ = write!(
            value,
            "[{},{},{},\"{}\",\"{}\",\"{}\",{}],",
            record.ranking,
            record.percentile,
            record.normalized_value,
            record.kind,
            record.category,
            record.period,
            record.absolute_value,
        );
    }

    value.push(']');
    value
}

fn record(idx: usize, fields: &[String]) -> Result<RawRecord> {
    if fields.len() != RECORD_FIELDS {
        return Err(ParseError::FieldCount {
            record: idx,
            found: fields.len(),
            expected: RECORD_FIELDS,
        });
    }

    let field = |n: usize| unquote(&fields[n]);

    Ok(RawRecord {
        ranking: field(RANKING_FIELD)
            .parse::<i64>()
            .map_field_err(idx, RANKING_FIELD, field(RANKING_FIELD))?,
        percentile: field(PERCENTILE_FIELD)
            .parse::<i64>()
            .map_field_err(idx, PERCENTILE_FIELD, field(PERCENTILE_FIELD))?,
        normalized_value: field(NORMALIZED_VALUE_FIELD)
            .parse::<i64>()
            .map_field_err(idx, NORMALIZED_VALUE_FIELD, field(NORMALIZED_VALUE_FIELD))?,
        kind: field(TYPE_FIELD)
            .parse::<MetricType>()
            .map_field_err(idx, TYPE_FIELD, field(TYPE_FIELD))?,
        category: field(CATEGORY_FIELD).to_owned(),
        period: field(PERIOD_FIELD)
            .parse::<Period>()
            .map_field_err(idx, PERIOD_FIELD, field(PERIOD_FIELD))?,
        absolute_value: field(ABSOLUTE_VALUE_FIELD)
            .parse::<f64>()
            .map_field_err(idx, ABSOLUTE_VALUE_FIELD, field(ABSOLUTE_VALUE_FIELD))?,
    })
}

fn preceded_by_identifier(script: &str, idx: usize) -> bool {
    script[..idx]
        .chars()
        .next_back()
        .is_some_and(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
}
