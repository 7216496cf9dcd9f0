//! Extraction and aggregation of the analytics a topic page publishes.
//!
//! A [`Page`] wraps the source of a fetched topic page. Its inline data is parsed into
//! [`RawRecord`]s, the DOM fragments are read by the [`extract`] functions and the
//! derived metrics are computed by the [`aggregate`] functions. The result is an
//! [`EntitySnapshot`] ready to be rendered and published.
//!
//! [`RawRecord`]: record::RawRecord
//! [`EntitySnapshot`]: snapshot::EntitySnapshot

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod filter;
pub mod parse;
pub mod record;
pub mod snapshot;

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::extract::ChartLocator;
use crate::extract::LinkLocator;
use crate::record::MetricType;
use crate::snapshot::EntitySnapshot;

/// How much to extract from a page and where to find it.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub ranks_variable: String,
    pub words_variable: String,
    pub words: usize,
    pub awards: usize,
    pub links: usize,
    pub link_locator: LinkLocator,
    pub charts: ChartLocator,
    /// The base that relative outbound-link identifiers are joined with.
    pub base_url: Url,
}

impl ExtractOptions {
    pub fn new(base_url: Url) -> Self {
        Self {
            ranks_variable: String::from("NEGARANKS"),
            words_variable: String::from("WORDS"),
            words: 100,
            awards: 100,
            links: 100,
            link_locator: LinkLocator::default(),
            charts: ChartLocator::default(),
            base_url,
        }
    }
}

#[derive(Debug)]
pub struct Page {
    url: String,
    document: Html,
}

impl Page {
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn title(&self) -> String {
        extract::title(&self.document, &self.url)
    }

    /// Returns the SVG markup of the history chart the page rendered for `kind`.
    pub fn chart(&self, kind: MetricType, charts: &ChartLocator) -> Result<Option<String>> {
        extract::chart(&self.document, charts.chart(kind))
    }

    /// Returns the latest level of `kind` as displayed by the page gauge.
    pub fn gauge(&self, kind: MetricType, charts: &ChartLocator) -> Result<Option<String>> {
        extract::gauge(&self.document, charts.gauge(kind))
    }

    /// Extracts and aggregates everything the page publishes about its topic.
    ///
    /// Fails only when the inline data is missing or malformed. Absent optional
    /// fragments, like the word cloud or the outbound links, are left empty.
    pub fn snapshot(&self, options: &ExtractOptions) -> Result<EntitySnapshot> {
        let title = self.title();
        let records = extract::records(&self.document, &options.ranks_variable)?;
        let words = extract::words(&self.document, &options.words_variable, options.words)?;
        let links = extract::links(
            &self.document,
            &options.link_locator,
            &options.base_url,
            options.links,
        )?;

        debug!(
            title = %title,
            records = records.len(),
            words = words.len(),
            links = links.len(),
            "extracted page"
        );

        Ok(EntitySnapshot {
            url: self.url.clone(),
            title,
            description: None,
            message: None,
            compact_message: None,
            historical_conflict: Vec::new(),
            historical_polemic: Vec::new(),
            historical_conflict_comparison: None,
            historical_polemic_comparison: None,
            recent_conflict_levels: aggregate::recent(&records, MetricType::Conflict),
            recent_polemic_levels: aggregate::recent(&records, MetricType::Polemic),
            mean_conflict_level: aggregate::mean(&records, MetricType::Conflict),
            mean_polemic_level: aggregate::mean(&records, MetricType::Polemic),
            conflict_awards: aggregate::awards(&records, MetricType::Conflict, options.awards),
            polemic_awards: aggregate::awards(&records, MetricType::Polemic, options.awards),
            words_that_matter: words,
            social_jumps: links,
            records,
        })
    }
}
