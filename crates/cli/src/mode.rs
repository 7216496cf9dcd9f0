use std::fmt::Display;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use topicrank_analytics::ExtractOptions;
use topicrank_analytics::Page;
use topicrank_analytics::filter;
use topicrank_analytics::record::MetricType;
use topicrank_analytics::snapshot::EntitySnapshot;
use topicrank_analytics::snapshot::ImageInfo;
use topicrank_vis::color::ColorRegistry;
use topicrank_vis::plot::HistoricalPlot;
use topicrank_vis::plot::Series;
use topicrank_vis::report::RankedEntry;
use topicrank_vis::report::RankingList;
use topicrank_vis::report::ReportEngine;
use topicrank_vis::report::Totals;
use tracing::info;
use tracing::info_span;
use tracing::warn;

use crate::error::CliError;
use crate::error::EntityError;
use crate::error::ValidationError;
use crate::fetch::PageFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Mode {
    /// Analyze a single topic.
    Summary,
    /// Compare the histories of exactly two topics.
    Comparison,
    /// Rank two or more topics by their levels.
    Ranking,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Summary => "summary",
            Mode::Comparison => "comparison",
            Mode::Ranking => "ranking",
        }
    }

    /// Checks the number of pages against the mode before anything is fetched.
    pub fn validate(&self, urls: &[String]) -> Result<(), ValidationError> {
        let found = urls.len();

        match self {
            Mode::Summary if found == 0 => Err(ValidationError::Summary),
            Mode::Comparison if found != 2 => Err(ValidationError::Comparison { found }),
            Mode::Ranking if found < 2 => Err(ValidationError::Ranking { found }),
            _ => Ok(()),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot value the topics of a ranking run are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RankingField {
    #[value(name = "recent_conflict_levels", alias = "recent_conflict")]
    RecentConflict,
    #[value(name = "recent_polemic_levels", alias = "recent_polemic")]
    RecentPolemic,
    #[value(name = "mean_conflict_level", alias = "mean_conflict")]
    MeanConflict,
    #[value(name = "mean_polemic_level", alias = "mean_polemic")]
    MeanPolemic,
}

impl RankingField {
    pub const ALL: [RankingField; 4] = [
        RankingField::RecentConflict,
        RankingField::RecentPolemic,
        RankingField::MeanConflict,
        RankingField::MeanPolemic,
    ];

    fn kind(&self) -> MetricType {
        match self {
            RankingField::RecentConflict | RankingField::MeanConflict => MetricType::Conflict,
            RankingField::RecentPolemic | RankingField::MeanPolemic => MetricType::Polemic,
        }
    }

    fn is_recent(&self) -> bool {
        matches!(self, RankingField::RecentConflict | RankingField::RecentPolemic)
    }

    fn heading(&self) -> &'static str {
        match self {
            RankingField::RecentConflict => "RECENT CONFLICT LEVELS",
            RankingField::RecentPolemic => "RECENT POLEMIC LEVELS",
            RankingField::MeanConflict => "MEAN CONFLICT LEVEL",
            RankingField::MeanPolemic => "MEAN POLEMIC LEVEL",
        }
    }

    /// Recent levels are read as integers and means as floats. Missing or unreadable
    /// values count as zero.
    fn score(&self, snapshot: &EntitySnapshot) -> f64 {
        let kind = self.kind();

        if self.is_recent() {
            snapshot
                .recent(kind)
                .and_then(|value| value.trim().parse::<i64>().ok())
                .unwrap_or(0) as f64
        } else {
            snapshot
                .mean(kind)
                .and_then(|value| value.trim().parse::<f64>().ok())
                .unwrap_or(0.0)
        }
    }

    fn format(&self, score: f64) -> String {
        if self.is_recent() {
            format!("{}", score as i64)
        } else {
            format!("{score:.2}")
        }
    }

    /// Orders the topics by descending score. Ties keep the input order.
    pub fn rank(&self, snapshots: &[EntitySnapshot]) -> RankingList {
        let mut scored: Vec<(&EntitySnapshot, f64)> = snapshots
            .iter()
            .map(|snapshot| (snapshot, self.score(snapshot)))
            .collect();

        scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));

        let entries = scored
            .into_iter()
            .enumerate()
            .map(|(idx, (snapshot, score))| RankedEntry {
                rank: idx + 1,
                title: snapshot.title.clone(),
                value: self.format(score),
            })
            .collect();

        RankingList {
            heading: String::from(self.heading()),
            entries,
        }
    }
}

/// The outcome of one mode invocation, handed to the publishers.
#[derive(Debug, Serialize)]
pub(crate) struct AnalysisRun {
    pub mode: Mode,
    pub snapshots: Vec<EntitySnapshot>,
    pub comparison_images: Vec<ImageInfo>,
    pub rankings: Vec<RankingList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_report: Option<String>,
}

impl AnalysisRun {
    fn new(mode: Mode, snapshots: Vec<EntitySnapshot>) -> Self {
        Self {
            mode,
            snapshots,
            comparison_images: Vec::new(),
            rankings: Vec::new(),
            ranking_report: None,
        }
    }

    pub fn heading(&self) -> String {
        let titles: Vec<&str> = self.snapshots.iter().map(|s| s.title.as_str()).collect();
        let titles = topicrank_vis::plot::join_titles(&titles);

        match self.mode {
            Mode::Summary => titles,
            Mode::Comparison => format!("Comparison of {titles}"),
            Mode::Ranking => format!("Ranking of {titles}"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub extract: ExtractOptions,
    pub required_elements: Vec<String>,
    pub timeout: Duration,
    /// Values of this year are still accumulating and are left out of the plots.
    pub current_year: i32,
    /// Keep the charts and gauges the pages render instead of the ones derived from
    /// the inline data. Overlays are always plotted from the inline data.
    pub capture_page_charts: bool,
    /// A custom message attached to every snapshot for the posting sinks.
    pub message: Option<String>,
}

/// Drives the fetch, extraction, aggregation and rendering of the topics of a run.
pub(crate) struct Analyzer<'a> {
    fetcher: &'a dyn PageFetcher,
    colors: &'a mut ColorRegistry,
    plot: HistoricalPlot,
    reports: ReportEngine,
    settings: Settings,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        colors: &'a mut ColorRegistry,
        plot: HistoricalPlot,
        settings: Settings,
    ) -> Result<Self, CliError> {
        Ok(Self {
            fetcher,
            colors,
            plot,
            reports: ReportEngine::new()?,
            settings,
        })
    }

    pub fn run(
        &mut self,
        mode: Mode,
        urls: &[String],
        fields: &[RankingField],
    ) -> Result<AnalysisRun, CliError> {
        mode.validate(urls)?;
        info!(%mode, pages = urls.len(), "starting analysis");

        match mode {
            Mode::Summary => self.summary(urls),
            Mode::Comparison => self.comparison(urls),
            Mode::Ranking => self.ranking(urls, fields),
        }
    }

    fn summary(&mut self, urls: &[String]) -> Result<AnalysisRun, CliError> {
        let Some((url, extra)) = urls.split_first() else {
            return Err(ValidationError::Summary.into());
        };

        if !extra.is_empty() {
            warn!(
                kept = %url,
                dropped = extra.len(),
                "the summary mode analyzes one page, dropping the others"
            );
        }

        let snapshot = self.entity(url)?;
        Ok(AnalysisRun::new(Mode::Summary, vec![snapshot]))
    }

    fn comparison(&mut self, urls: &[String]) -> Result<AnalysisRun, CliError> {
        let snapshots = urls
            .iter()
            .map(|url| self.entity(url))
            .collect::<Result<Vec<_>, _>>()?;

        self.with_overlays(AnalysisRun::new(Mode::Comparison, snapshots))
    }

    fn ranking(
        &mut self,
        urls: &[String],
        fields: &[RankingField],
    ) -> Result<AnalysisRun, CliError> {
        let mut snapshots = Vec::with_capacity(urls.len());

        for url in urls {
            match self.topic(url) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(error) => warn!(url = %url, %error, "excluding the topic from the ranking"),
            }
        }

        if snapshots.is_empty() {
            return Err(CliError::NoSnapshots(Mode::Ranking));
        }

        let fields = if fields.is_empty() {
            &RankingField::ALL[..]
        } else {
            fields
        };

        let rankings: Vec<RankingList> =
            fields.iter().map(|field| field.rank(&snapshots)).collect();
        let report = self.reports.ranking(&rankings)?;

        let mut run = AnalysisRun::new(Mode::Ranking, snapshots);
        run.rankings = rankings;
        run.ranking_report = Some(report);

        self.with_overlays(run)
    }

    /// Renders one overlay per metric type across all topics of the run and attaches
    /// it to every snapshot.
    fn with_overlays(&mut self, mut run: AnalysisRun) -> Result<AnalysisRun, CliError> {
        for kind in MetricType::ALL {
            let series: Vec<Series> = run
                .snapshots
                .iter()
                .map(|snapshot| self.series(snapshot, kind))
                .collect();

            let images: Vec<ImageInfo> = self.plot.overlay(kind, &series)?.into_iter().collect();

            run.snapshots = run
                .snapshots
                .into_iter()
                .map(|snapshot| snapshot.with_comparison_images(kind, images.clone()))
                .collect();
            run.comparison_images.extend(images);
        }

        Ok(run)
    }

    fn entity(&mut self, url: &str) -> Result<EntitySnapshot, CliError> {
        self.topic(url).map_err(|source| CliError::Entity {
            url: url.to_owned(),
            source,
        })
    }

    fn topic(&mut self, url: &str) -> Result<EntitySnapshot, EntityError> {
        let span = info_span!("topic", url = %url);
        let _enter = span.enter();

        let settings = &self.settings;
        let html = self
            .fetcher
            .fetch(url, &settings.required_elements, settings.timeout)?;
        let page = Page::parse(url, &html);
        let mut snapshot = page.snapshot(&settings.extract)?;

        for kind in MetricType::ALL {
            let image = match self.captured(&page, &snapshot, kind)? {
                Some(image) => Some(image),
                None => {
                    let series = self.series(&snapshot, kind);
                    self.plot.single(kind, &snapshot.title, series)?
                }
            };
            snapshot = snapshot.with_historical_images(kind, image.into_iter().collect());
        }

        if self.settings.capture_page_charts {
            snapshot = self.with_gauge_levels(&page, snapshot)?;
        }

        let totals = Totals {
            words: self.settings.extract.words,
            links: self.settings.extract.links,
        };
        let description = self.reports.description(&snapshot, totals)?;
        snapshot = snapshot.with_description(description);

        if let Some(message) = &self.settings.message {
            snapshot = snapshot.with_message(message.clone());
        }

        info!(title = %snapshot.title, "analyzed topic");
        Ok(snapshot)
    }

    /// Saves the history chart the page rendered, or returns `None` when the chart has
    /// to be plotted from the inline data.
    fn captured(
        &self,
        page: &Page,
        snapshot: &EntitySnapshot,
        kind: MetricType,
    ) -> Result<Option<ImageInfo>, EntityError> {
        if !self.settings.capture_page_charts {
            return Ok(None);
        }

        let Some(chart) = page.chart(kind, &self.settings.extract.charts)? else {
            warn!(%kind, "no page chart to capture, plotting the inline data");
            return Ok(None);
        };

        let image = self.plot.capture(kind, &snapshot.title, page.url(), &chart)?;
        Ok(Some(image))
    }

    fn with_gauge_levels(
        &self,
        page: &Page,
        mut snapshot: EntitySnapshot,
    ) -> Result<EntitySnapshot, EntityError> {
        for kind in MetricType::ALL {
            if let Some(level) = page.gauge(kind, &self.settings.extract.charts)? {
                snapshot = snapshot.with_recent_level(kind, level);
            }
        }

        Ok(snapshot)
    }

    fn series(&mut self, snapshot: &EntitySnapshot, kind: MetricType) -> Series {
        let color = self.colors.get_color(&snapshot.title);
        let points = filter::historical(&snapshot.records, kind, self.settings.current_year);

        Series::new(snapshot.title.clone(), color, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::fs;

    use tempfile::TempDir;
    use topicrank_analytics::extract;
    use topicrank_analytics::parse;
    use topicrank_analytics::record::Period;
    use topicrank_analytics::record::RawRecord;

    use crate::fetch::error::FetchError;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    /// Serves canned pages and counts the fetches.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
        calls: Cell<usize>,
    }

    impl FixtureFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.clone()))
                    .collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl PageFetcher for FixtureFetcher {
        fn fetch(
            &self,
            url: &str,
            required_elements: &[String],
            timeout: Duration,
        ) -> crate::fetch::error::Result<String> {
            self.calls.set(self.calls.get() + 1);

            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Timeout {
                    url: url.to_owned(),
                    missing: required_elements.to_vec(),
                    timeout_secs: timeout.as_secs(),
                })
        }
    }

    fn record(
        kind: MetricType,
        period: i32,
        normalized_value: i64,
        absolute_value: f64,
    ) -> RawRecord {
        RawRecord {
            ranking: 50,
            percentile: 90,
            normalized_value,
            kind,
            category: String::from("all"),
            period: Period::Year(period),
            absolute_value,
        }
    }

    fn page(title: &str, recent_conflict: i64) -> String {
        let records = vec![
            record(MetricType::Conflict, 2022, 70, 10.0),
            record(MetricType::Conflict, 2023, recent_conflict, 20.0),
            record(MetricType::Polemic, 2022, 30, 1.5),
            record(MetricType::Polemic, 2023, 40, 2.5),
        ];

        page_with(title, &records, "")
    }

    fn page_with(title: &str, records: &[RawRecord], body: &str) -> String {
        format!(
            "<html><body><h1>{title}</h1>{body}<script>var NEGARANKS = {};</script></body></html>",
            parse::write_records(records)
        )
    }

    fn settings() -> Result<Settings, url::ParseError> {
        Ok(Settings {
            extract: ExtractOptions::new(extract::base_url("http://en.negapedia.org")?),
            required_elements: Vec::new(),
            timeout: Duration::from_secs(10),
            current_year: 2024,
            capture_page_charts: false,
            message: None,
        })
    }

    fn urls(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|url| url.to_string()).collect()
    }

    fn run(
        fetcher: &FixtureFetcher,
        dir: &TempDir,
        mode: Mode,
        pages: &[&str],
        fields: &[RankingField],
    ) -> Result<AnalysisRun, Box<dyn std::error::Error>> {
        run_with(fetcher, dir, settings()?, mode, pages, fields)
    }

    fn run_with(
        fetcher: &FixtureFetcher,
        dir: &TempDir,
        settings: Settings,
        mode: Mode,
        pages: &[&str],
        fields: &[RankingField],
    ) -> Result<AnalysisRun, Box<dyn std::error::Error>> {
        let mut colors = ColorRegistry::new();
        let plot = HistoricalPlot::new(dir.path()).with_size(320, 240);
        let mut analyzer = Analyzer::new(fetcher, &mut colors, plot, settings)?;

        Ok(analyzer.run(mode, &urls(pages), fields)?)
    }

    fn abc() -> FixtureFetcher {
        FixtureFetcher::new(&[
            ("http://x/A", page("A", 80)),
            ("http://x/B", page("B", 95)),
            ("http://x/C", page("C", 60)),
        ])
    }

    #[test]
    fn comparison_requires_two_pages_before_fetching() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;
        let mut colors = ColorRegistry::new();
        let mut analyzer = Analyzer::new(
            &fetcher,
            &mut colors,
            HistoricalPlot::new(dir.path()),
            settings()?,
        )?;

        for pages in [&["http://x/A"][..], &["http://x/A", "http://x/B", "http://x/C"][..]] {
            let result = analyzer.run(Mode::Comparison, &urls(pages), &[]);

            assert!(matches!(
                result,
                Err(CliError::Validation(ValidationError::Comparison { found }))
                    if found == pages.len()
            ));
        }
        assert_eq!(fetcher.calls.get(), 0);

        Ok(())
    }

    #[test]
    fn ranking_requires_two_pages_and_summary_one() -> TestResult {
        assert_eq!(
            Mode::Ranking.validate(&urls(&["http://x/A"])),
            Err(ValidationError::Ranking { found: 1 })
        );
        assert_eq!(Mode::Summary.validate(&[]), Err(ValidationError::Summary));
        assert_eq!(Mode::Summary.validate(&urls(&["a", "b"])), Ok(()));

        Ok(())
    }

    #[test]
    fn comparison_shares_one_overlay_per_type() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let run = run(&fetcher, &dir, Mode::Comparison, &["http://x/A", "http://x/B"], &[])?;

        assert_eq!(run.snapshots.len(), 2);
        assert_eq!(run.comparison_images.len(), 2);
        for snapshot in &run.snapshots {
            assert_eq!(snapshot.historical_conflict.len(), 1);
            assert_eq!(snapshot.historical_polemic.len(), 1);
            assert_eq!(snapshot.comparison_images(MetricType::Conflict).map(<[_]>::len), Some(1));
            assert_eq!(snapshot.comparison_images(MetricType::Polemic).map(<[_]>::len), Some(1));
        }
        assert_eq!(
            run.comparison_images[0].image_alt,
            "Comparison of conflict levels between A and B"
        );

        Ok(())
    }

    #[test]
    fn comparison_aborts_when_a_topic_fails() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let pages = ["http://x/A", "http://x/missing"];
        let result = run(&fetcher, &dir, Mode::Comparison, &pages, &[]);

        let error = result.err().ok_or("the comparison should fail")?;
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::Entity { url, .. }) if url == "http://x/missing"
        ));

        Ok(())
    }

    #[test]
    fn ranking_orders_by_recent_conflict() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let run = run(
            &fetcher,
            &dir,
            Mode::Ranking,
            &["http://x/A", "http://x/B", "http://x/C"],
            &[RankingField::RecentConflict],
        )?;

        let ranking = &run.rankings[0];
        let order: Vec<(&str, &str)> = ranking
            .entries
            .iter()
            .map(|e| (e.title.as_str(), e.value.as_str()))
            .collect();

        assert_eq!(run.rankings.len(), 1);
        assert_eq!(order, vec![("B", "95"), ("A", "80"), ("C", "60")]);
        assert_eq!(
            run.ranking_report.as_deref(),
            Some("RECENT CONFLICT LEVELS:\n1. B: 95\n2. A: 80\n3. C: 60\n\n")
        );
        assert_eq!(run.comparison_images.len(), 2);

        Ok(())
    }

    #[test]
    fn ranking_defaults_to_every_field() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let run = run(&fetcher, &dir, Mode::Ranking, &["http://x/A", "http://x/B"], &[])?;

        let headings: Vec<&str> = run.rankings.iter().map(|r| r.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "RECENT CONFLICT LEVELS",
                "RECENT POLEMIC LEVELS",
                "MEAN CONFLICT LEVEL",
                "MEAN POLEMIC LEVEL",
            ]
        );
        assert_eq!(run.rankings[2].entries[0].value, "15.00");

        Ok(())
    }

    #[test]
    fn ranking_skips_failing_topics() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let run = run(
            &fetcher,
            &dir,
            Mode::Ranking,
            &["http://x/A", "http://x/missing", "http://x/C"],
            &[RankingField::RecentConflict],
        )?;

        let titles: Vec<&str> = run.snapshots.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(fetcher.calls.get(), 3);

        Ok(())
    }

    #[test]
    fn ranking_without_survivors_fails() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let result = run(&fetcher, &dir, Mode::Ranking, &["http://x/D", "http://x/E"], &[]);

        let error = result.err().ok_or("the ranking should fail")?;
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::NoSnapshots(Mode::Ranking))
        ));

        Ok(())
    }

    #[test]
    fn summary_drops_extra_pages() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let run = run(&fetcher, &dir, Mode::Summary, &["http://x/A", "http://x/B"], &[])?;

        assert_eq!(fetcher.calls.get(), 1);
        assert_eq!(run.snapshots.len(), 1);
        assert!(run.comparison_images.is_empty());

        let snapshot = &run.snapshots[0];
        assert_eq!(snapshot.title, "A");
        assert_eq!(snapshot.recent_conflict_levels.as_deref(), Some("80"));
        assert_eq!(
            snapshot.historical_conflict[0].image_alt,
            "Historical conflict levels of A"
        );
        assert!(
            snapshot
                .description
                .as_deref()
                .is_some_and(|text| text.contains("Conflict level at http://x/A: 80"))
        );

        Ok(())
    }

    #[test]
    fn summary_fails_when_its_topic_fails() -> TestResult {
        let fetcher = abc();
        let dir = tempfile::tempdir()?;

        let result = run(&fetcher, &dir, Mode::Summary, &["http://x/missing"], &[]);

        let error = result.err().ok_or("the summary should fail")?;
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::Entity {
                url,
                source: EntityError::Fetch(_),
            }) if url == "http://x/missing"
        ));
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);

        Ok(())
    }

    #[test]
    fn current_year_values_are_not_plotted() -> TestResult {
        let records = vec![
            record(MetricType::Conflict, 2024, 55, 12.0),
            record(MetricType::Polemic, 2024, 35, 3.0),
        ];
        let fetcher = FixtureFetcher::new(&[("http://x/New", page_with("New", &records, ""))]);
        let dir = tempfile::tempdir()?;

        let run = run(&fetcher, &dir, Mode::Summary, &["http://x/New"], &[])?;

        let snapshot = &run.snapshots[0];
        assert_eq!(snapshot.title, "New");
        assert!(snapshot.historical_conflict.is_empty());
        assert!(snapshot.historical_polemic.is_empty());
        assert!(snapshot.description.is_some());
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);

        Ok(())
    }

    #[test]
    fn captures_page_charts_and_gauges() -> TestResult {
        let records = vec![
            record(MetricType::Conflict, 2022, 70, 10.0),
            record(MetricType::Polemic, 2022, 30, 1.5),
        ];
        let charts = concat!(
            r#"<div id="chart_time_conflict"><svg width="40" height="20">"#,
            r#"<rect width="40" height="20" fill="red"></rect></svg></div>"#,
            r#"<div id="gauge_conflict_chart"><svg><g><g><text>99</text></g></g></svg></div>"#,
        );
        let fetcher = FixtureFetcher::new(&[("http://x/A", page_with("A", &records, charts))]);
        let dir = tempfile::tempdir()?;
        let settings = Settings {
            capture_page_charts: true,
            ..settings()?
        };

        let run = run_with(&fetcher, &dir, settings, Mode::Summary, &["http://x/A"], &[])?;

        let snapshot = &run.snapshots[0];
        assert_eq!(
            snapshot.historical_conflict[0].image_alt,
            "Conflict diagram extracted from http://x/A"
        );
        assert_eq!(
            snapshot.historical_polemic[0].image_alt,
            "Historical polemic levels of A"
        );
        assert_eq!(snapshot.recent_conflict_levels.as_deref(), Some("99"));
        assert_eq!(snapshot.recent_polemic_levels.as_deref(), Some("30"));
        assert_eq!(fs::read_dir(dir.path())?.count(), 2);

        Ok(())
    }

    #[test]
    fn page_charts_are_ignored_unless_captured() -> TestResult {
        let charts =
            r#"<div id="gauge_conflict_chart"><svg><g><g><text>99</text></g></g></svg></div>"#;
        let records = vec![record(MetricType::Conflict, 2022, 70, 10.0)];
        let fetcher = FixtureFetcher::new(&[("http://x/A", page_with("A", &records, charts))]);
        let dir = tempfile::tempdir()?;

        let run = run(&fetcher, &dir, Mode::Summary, &["http://x/A"], &[])?;

        let snapshot = &run.snapshots[0];
        assert_eq!(snapshot.recent_conflict_levels.as_deref(), Some("70"));
        assert_eq!(
            snapshot.historical_conflict[0].image_alt,
            "Historical conflict levels of A"
        );

        Ok(())
    }

    #[test]
    fn ties_keep_input_order() {
        let snapshot = |title: &str, mean: Option<&str>| EntitySnapshot {
            url: format!("http://x/{title}"),
            title: title.to_owned(),
            description: None,
            message: None,
            compact_message: None,
            records: Vec::new(),
            historical_conflict: Vec::new(),
            historical_polemic: Vec::new(),
            historical_conflict_comparison: None,
            historical_polemic_comparison: None,
            recent_conflict_levels: None,
            recent_polemic_levels: None,
            mean_conflict_level: mean.map(str::to_owned),
            mean_polemic_level: None,
            words_that_matter: Vec::new(),
            conflict_awards: Default::default(),
            polemic_awards: Default::default(),
            social_jumps: Vec::new(),
        };

        let ranking = RankingField::MeanConflict.rank(&[
            snapshot("A", None),
            snapshot("B", Some("2.5")),
            snapshot("C", Some("0")),
        ]);

        let order: Vec<(&str, &str)> = ranking
            .entries
            .iter()
            .map(|e| (e.title.as_str(), e.value.as_str()))
            .collect();
        assert_eq!(order, vec![("B", "2.50"), ("A", "0.00"), ("C", "0.00")]);
    }
}
