use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;
use topicrank_analytics::snapshot::ImageInfo;
use topicrank_vis::error::VisError;
use topicrank_vis::report::PostPage;
use topicrank_vis::report::ReportEngine;
use tracing::info;

use crate::mode::AnalysisRun;

const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S_%6f";

#[derive(Debug, Error)]
pub(crate) enum PublishError {
    #[error("publish error: I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("publish error: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("publish error: {0}")]
    Vis(#[from] VisError),
}

/// The destinations an analysis run can be published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Sink {
    /// Write the snapshots as a JSON document.
    Json,
    /// Write a standalone HTML page.
    Web,
}

impl Sink {
    pub fn publisher(&self, output_dir: &Path) -> Result<Box<dyn Publisher>, PublishError> {
        let publisher: Box<dyn Publisher> = match self {
            Sink::Json => Box::new(JsonPublisher::new(output_dir)),
            Sink::Web => Box::new(WebPublisher::new(output_dir)?),
        };

        Ok(publisher)
    }
}

/// Hands the result of a run over to an external channel.
pub(crate) trait Publisher {
    /// Publishes the run and returns where it ended up.
    fn publish(&self, run: &AnalysisRun) -> Result<PathBuf, PublishError>;
}

#[derive(Serialize)]
struct Envelope<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    run: &'a AnalysisRun,
}

pub(crate) struct JsonPublisher {
    output_dir: PathBuf,
}

impl JsonPublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Publisher for JsonPublisher {
    fn publish(&self, run: &AnalysisRun) -> Result<PathBuf, PublishError> {
        let generated_at = Utc::now();
        let envelope = Envelope {
            generated_at,
            run,
        };

        let path = output_path(&self.output_dir, generated_at, "json")?;
        fs::write(&path, serde_json::to_string_pretty(&envelope)?)?;

        info!(path = %path.display(), "published the run as JSON");
        Ok(path)
    }
}

pub(crate) struct WebPublisher {
    output_dir: PathBuf,
    reports: ReportEngine,
}

impl WebPublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, PublishError> {
        Ok(Self {
            output_dir: output_dir.into(),
            reports: ReportEngine::new()?,
        })
    }
}

impl Publisher for WebPublisher {
    fn publish(&self, run: &AnalysisRun) -> Result<PathBuf, PublishError> {
        let heading = run.heading();
        let page = PostPage {
            heading: &heading,
            snapshots: &run.snapshots,
            ranking: run.ranking_report.as_deref(),
        };

        let html = self.reports.post(page, image_src)?;
        let path = output_path(&self.output_dir, Utc::now(), "html")?;
        fs::write(&path, html)?;

        info!(path = %path.display(), "published the run as a web page");
        Ok(path)
    }
}

/// Images are linked by absolute path so the page can be opened from any directory.
fn image_src(image: &ImageInfo) -> String {
    fs::canonicalize(&image.image)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| image.image.clone())
}

fn output_path(dir: &Path, time: DateTime<Utc>, extension: &str) -> Result<PathBuf, PublishError> {
    fs::create_dir_all(dir)?;
    let name = format!("post_{}.{extension}", time.format(TIMESTAMP_FORMAT));
    Ok(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::mode::Mode;

    use topicrank_analytics::snapshot::EntitySnapshot;
    use topicrank_vis::report::RankedEntry;
    use topicrank_vis::report::RankingList;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn run() -> AnalysisRun {
        let snapshot = EntitySnapshot {
            url: String::from("http://en.negapedia.org/articles/Rome"),
            title: String::from("Rome"),
            description: Some(String::from("RECENT CONFLICT LEVELS:\n")),
            message: None,
            compact_message: None,
            records: Vec::new(),
            historical_conflict: vec![ImageInfo::local(
                "missing/conflict.png",
                "Historical conflict levels of Rome",
            )],
            historical_polemic: Vec::new(),
            historical_conflict_comparison: None,
            historical_polemic_comparison: None,
            recent_conflict_levels: Some(String::from("80")),
            recent_polemic_levels: None,
            mean_conflict_level: None,
            mean_polemic_level: None,
            words_that_matter: Vec::new(),
            conflict_awards: BTreeMap::new(),
            polemic_awards: BTreeMap::new(),
            social_jumps: Vec::new(),
        };

        AnalysisRun {
            mode: Mode::Ranking,
            snapshots: vec![snapshot],
            comparison_images: Vec::new(),
            rankings: vec![RankingList {
                heading: String::from("RECENT CONFLICT LEVELS"),
                entries: vec![RankedEntry {
                    rank: 1,
                    title: String::from("Rome"),
                    value: String::from("80"),
                }],
            }],
            ranking_report: Some(String::from("RECENT CONFLICT LEVELS:\n1. Rome: 80\n")),
        }
    }

    #[test]
    fn json_publisher_writes_envelope() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = JsonPublisher::new(dir.path()).publish(&run())?;

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("post_") && name.ends_with(".json"));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(json["mode"], "ranking");
        assert!(json["generated_at"].is_string());
        assert_eq!(json["snapshots"][0]["title"], "Rome");
        assert_eq!(json["snapshots"][0]["recent_conflict_levels"], "80");
        assert_eq!(json["snapshots"][0]["historical_conflict"][0]["location"], "local");
        assert_eq!(json["rankings"][0]["entries"][0]["rank"], 1);

        Ok(())
    }

    #[test]
    fn web_publisher_writes_page() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = Sink::Web.publisher(dir.path())?.publish(&run())?;

        let html = fs::read_to_string(&path)?;
        assert!(path.extension().is_some_and(|ext| ext == "html"));
        assert!(html.contains("<title>Ranking of Rome</title>"));
        assert!(html.contains(r#"src="missing/conflict.png""#));
        assert!(html.contains("1. Rome: 80"));

        Ok(())
    }
}
