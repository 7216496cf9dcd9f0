//! Extractors that read values out of an already fetched and parsed page.
//!
//! Every extractor is independent of the others. Missing optional fragments are
//! logged and yield an empty value; only a required fragment that is present but
//! malformed (e.g. an unparsable inline-data assignment) is reported as an error.

use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;
use serde::Deserialize;
use tracing::debug;
use tracing::warn;
use url::Url;

use crate::error::ParseError;
use crate::error::Result;
use crate::parse;
use crate::record::MetricType;
use crate::record::RawRecord;
use crate::snapshot::OutboundLink;

const HEADING_SPAN_SELECTOR: &str = "h1 span";
const HEADING_SELECTOR: &str = "h1";
const TITLE_SELECTOR: &str = "title";
const SCRIPT_SELECTOR: &str = "script";
const WORD_CLOUD_SELECTOR: &str = "#the_word_cloud svg text";
const TERM_SELECTOR: &str = "dt";
const DESCRIPTION_SELECTOR: &str = "dd";
const TERM_LINK_SELECTOR: &str = "a[href]";
const CHART_SELECTOR: &str = "svg";
const GAUGE_VALUE_SELECTOR: &str = "svg g g text";

/// Locates the definition list holding the outbound links of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkLocator {
    /// CSS selector of the definition list element.
    pub container: String,
    /// The description-element attribute holding the relative link identifier.
    pub attribute: String,
}

impl Default for LinkLocator {
    fn default() -> Self {
        Self {
            container: String::from("#social-jumps dl"),
            attribute: String::from("data-link"),
        }
    }
}

/// Locates the charts a page renders for itself: one history chart and one gauge of
/// the latest level per metric type. Every field is an element id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChartLocator {
    pub conflict_chart: String,
    pub polemic_chart: String,
    pub conflict_gauge: String,
    pub polemic_gauge: String,
}

impl ChartLocator {
    pub fn chart(&self, kind: MetricType) -> &str {
        match kind {
            MetricType::Conflict => &self.conflict_chart,
            MetricType::Polemic => &self.polemic_chart,
        }
    }

    pub fn gauge(&self, kind: MetricType) -> &str {
        match kind {
            MetricType::Conflict => &self.conflict_gauge,
            MetricType::Polemic => &self.polemic_gauge,
        }
    }
}

impl Default for ChartLocator {
    fn default() -> Self {
        Self {
            conflict_chart: String::from("chart_time_conflict"),
            polemic_chart: String::from("chart_time_polemic"),
            conflict_gauge: String::from("gauge_conflict_chart"),
            polemic_gauge: String::from("gauge_polemic_chart"),
        }
    }
}

/// Returns the title of the page.
///
/// Falls back from the primary heading to the document title and finally to the
/// page URL, so a title is always returned.
pub fn title(document: &Html, url: &str) -> String {
    [HEADING_SPAN_SELECTOR, HEADING_SELECTOR, TITLE_SELECTOR]
        .into_iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| document.select(&selector).map(text).find(|t| !t.is_empty()))
        .unwrap_or_else(|| {
            warn!("no title element found, using the page URL");
            url.to_owned()
        })
}

/// Returns the records assigned to the `name` variable in the page scripts.
pub fn records(document: &Html, name: &str) -> Result<Vec<RawRecord>> {
    find_in_scripts(document, name, parse::records)?.ok_or_else(|| ParseError::VariableNotFound {
        name: name.to_owned(),
    })
}

/// Returns the first `limit` words of the word-importance list, in source order.
///
/// The list is read from the `name` script variable. Pages that render the word cloud
/// without exposing the variable are read from the rendered cloud instead.
pub fn words(document: &Html, name: &str, limit: usize) -> Result<Vec<String>> {
    let words = match find_in_scripts(document, name, parse::words)? {
        Some(words) => words,
        None => {
            let cloud = selector(WORD_CLOUD_SELECTOR)?;
            let words: Vec<String> = document
                .select(&cloud)
                .map(text)
                .filter(|w| !w.is_empty())
                .collect();

            if words.is_empty() {
                warn!(variable = name, "no word-importance list found");
            }

            words
        }
    };

    debug!(count = words.len(), limit, "extracted important words");
    Ok(words.into_iter().take(limit).collect())
}

/// Returns up to `limit` outbound links paired from the terms and descriptions
/// of a definition list.
pub fn links(
    document: &Html,
    locator: &LinkLocator,
    base_url: &Url,
    limit: usize,
) -> Result<Vec<OutboundLink>> {
    let container = selector(&locator.container)?;
    let Some(list) = document.select(&container).next() else {
        warn!(container = %locator.container, "no outbound-link list found");
        return Ok(Vec::new());
    };

    let terms = selector(TERM_SELECTOR)?;
    let descriptions = selector(DESCRIPTION_SELECTOR)?;
    let term_link = selector(TERM_LINK_SELECTOR)?;

    let links: Vec<OutboundLink> = list
        .select(&terms)
        .zip(list.select(&descriptions))
        .filter_map(|(term, description)| {
            let relative = description
                .value()
                .attr(&locator.attribute)
                .or_else(|| term.select(&term_link).next()?.value().attr("href"))?;

            match base_url.join(relative.trim()) {
                Ok(link) => Some(OutboundLink {
                    title: text(term),
                    link: link.to_string(),
                }),
                Err(error) => {
                    warn!(relative, %error, "skipping outbound link");
                    None
                }
            }
        })
        .take(limit)
        .collect();

    if links.is_empty() {
        warn!(container = %locator.container, "outbound-link list has no entries");
    }

    Ok(links)
}

/// Returns the markup of the first SVG inside the element with the given id.
pub fn chart(document: &Html, id: &str) -> Result<Option<String>> {
    let container = selector(&format!("[id=\"{id}\"]"))?;
    let Some(container) = document.select(&container).next() else {
        warn!(id, "no chart container found");
        return Ok(None);
    };

    let chart = selector(CHART_SELECTOR)?;
    let markup = container.select(&chart).next().map(|svg| svg.html());

    if markup.is_none() {
        warn!(id, "the chart container holds no SVG");
    }

    Ok(markup)
}

/// Returns the value a rendered gauge displays: the first non-empty text of the
/// second-level group of its SVG.
pub fn gauge(document: &Html, id: &str) -> Result<Option<String>> {
    let value = selector(&format!("[id=\"{id}\"] {GAUGE_VALUE_SELECTOR}"))?;
    let level = document.select(&value).map(text).find(|t| !t.is_empty());

    match &level {
        Some(level) => debug!(id, level, "read gauge value"),
        None => warn!(id, "no gauge value found"),
    }

    Ok(level)
}

/// Returns the ids of the required elements the page does not contain.
pub fn missing_elements(document: &Html, ids: &[String]) -> Vec<String> {
    ids.iter()
        .filter(|id| {
            let found = Selector::parse(&format!("[id=\"{id}\"]"))
                .map(|selector| document.select(&selector).next().is_some())
                .unwrap_or(false);

            !found
        })
        .cloned()
        .collect()
}

/// Makes sure relative identifiers are joined under the base path rather than replacing
/// its last segment.
pub fn base_url(base: &str) -> std::result::Result<Url, url::ParseError> {
    if base.ends_with('/') {
        Url::parse(base)
    } else {
        Url::parse(&format!("{base}/"))
    }
}

fn find_in_scripts<T, P>(document: &Html, name: &str, parse: P) -> Result<Option<T>>
where
    P: Fn(&str, &str) -> Result<T>,
{
    let scripts = selector(SCRIPT_SELECTOR)?;

    for script in document.select(&scripts) {
        let content = script.text().collect::<String>();

        match parse(&content, name) {
            Ok(value) => return Ok(Some(value)),
            Err(ParseError::VariableNotFound { .. }) => continue,
            Err(error) => return Err(error),
        }
    }

    Ok(None)
}

fn selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|error| ParseError::Selector {
        selector: selector.to_owned(),
        reason: error.to_string(),
    })
}

fn text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<&str>>()
        .join(" ")
}
