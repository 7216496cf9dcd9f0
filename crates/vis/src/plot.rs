//! Renders the historical levels of one or more topics as PNG line charts.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::Utc;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::ranged1d::DefaultFormatting;
use plotters::coord::ranged1d::KeyPointHint;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordi32;
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters::style::register_font;
use topicrank_analytics::record::MetricType;
use topicrank_analytics::snapshot::ImageInfo;
use tracing::debug;
use tracing::warn;

use crate::color::PlotColor;
use crate::error::Result;
use crate::error::VisError;
use crate::svg;

const FONT_FAMILY: &str = "sans-serif";
pub(crate) const FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S_%6f";
const IMAGE_EXTENSION: &str = "png";

/// The yearly values of one topic, drawn as one line of a chart.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub color: PlotColor,
    pub points: Vec<(i32, f64)>,
}

impl Series {
    pub fn new(label: impl Into<String>, color: PlotColor, points: Vec<(i32, f64)>) -> Self {
        Self {
            label: label.into(),
            color,
            points,
        }
    }
}

/// Writes historical-level charts into a destination directory.
///
/// Every image gets a file name made of its slugified caption, the UTC time of
/// rendering down to the microsecond and a per-process sequence number, so two
/// images never collide, even for topics with the same title.
#[derive(Debug, Clone)]
pub struct HistoricalPlot {
    dir: PathBuf,
    size: (u32, u32),
}

impl HistoricalPlot {
    const DEFAULT_SIZE: (u32, u32) = (1400, 800);

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            size: Self::DEFAULT_SIZE,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renders the history of one topic.
    pub fn single(
        &self,
        kind: MetricType,
        title: &str,
        series: Series,
    ) -> Result<Option<ImageInfo>> {
        let caption = format!("{} level of {title}", capitalized(kind));
        let alt = format!("Historical {kind} levels of {title}");

        self.render(kind, &caption, &alt, &[series])
    }

    /// Renders the histories of several topics overlaid on one chart, with a legend
    /// entry per topic.
    pub fn overlay(&self, kind: MetricType, series: &[Series]) -> Result<Option<ImageInfo>> {
        let caption = format!("Comparison of {kind} level between topics");
        let titles: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        let alt = format!("Comparison of {kind} levels between {}", join_titles(&titles));

        self.render(kind, &caption, &alt, series)
    }

    /// Saves the history chart a topic page rendered itself as a PNG image.
    pub fn capture(
        &self,
        kind: MetricType,
        title: &str,
        url: &str,
        chart: &str,
    ) -> Result<ImageInfo> {
        let caption = format!("{} diagram of {title}", capitalized(kind));
        let alt = format!("{} diagram extracted from {url}", capitalized(kind));

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name(&caption));
        let (width, height) = svg::to_png(chart, &path)?;

        debug!(path = %path.display(), width, height, "captured page chart");

        Ok(ImageInfo::local(path.to_string_lossy(), alt))
    }

    /// Draws the chart and returns its descriptor, or `None` when there is no point to
    /// draw.
    pub fn render(
        &self,
        kind: MetricType,
        caption: &str,
        alt: &str,
        series: &[Series],
    ) -> Result<Option<ImageInfo>> {
        let series: Vec<&Series> = series.iter().filter(|s| !s.points.is_empty()).collect();

        let Some(bounds) = Bounds::of(&series) else {
            warn!(caption, "no historical values to plot, skipping the image");
            return Ok(None);
        };

        fs::create_dir_all(&self.dir)?;
        ensure_font()?;

        let path = self.dir.join(file_name(caption));
        let (x_axis, y_axis) = bounds.axes();
        let x_labels = bounds.x_ticks().len();
        let y_labels = y_axis.ticks.len();

        {
            let root = BitMapBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(caption, (FONT_FAMILY, 28))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(x_axis, y_axis)?;

            chart
                .configure_mesh()
                .x_desc("Year")
                .y_desc(format!("{kind} level"))
                .x_labels(x_labels)
                .y_labels(y_labels)
                .x_label_formatter(&|year: &i32| year.to_string())
                .y_label_formatter(&|value: &f64| format!("{value:.0}"))
                .label_style((FONT_FAMILY, 16))
                .draw()?;

            for series in &series {
                let color = series.color.rgb();

                chart
                    .draw_series(
                        LineSeries::new(series.points.iter().copied(), color.stroke_width(2))
                            .point_size(4),
                    )?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .label_font((FONT_FAMILY, 16))
                .draw()?;

            root.present()?;
        }

        debug!(path = %path.display(), series = series.len(), "rendered historical plot");

        Ok(Some(ImageInfo::local(path.to_string_lossy(), alt)))
    }
}

/// Joins titles the way they read in a sentence: `A`, `A and B`, `A, B, and C`.
pub fn join_titles(titles: &[&str]) -> String {
    match titles {
        [] => String::new(),
        [single] => (*single).to_owned(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// Turns free text into a lowercase file-name fragment of ASCII alphanumerics
/// separated by single underscores.
pub fn slugify(text: &str) -> String {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<String>>()
        .join("_")
}

fn file_name(caption: &str) -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(1);

    format!(
        "{}_{}_{}.{IMAGE_EXTENSION}",
        slugify(caption),
        Utc::now().format(TIMESTAMP_FORMAT),
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

fn capitalized(kind: MetricType) -> &'static str {
    match kind {
        MetricType::Conflict => "Conflict",
        MetricType::Polemic => "Polemic",
    }
}

fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();

    let registered =
        *REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT).is_ok());

    if registered {
        Ok(())
    } else {
        Err(VisError::Font(FONT_FAMILY))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_year: i32,
    max_year: i32,
    min_value: f64,
    max_value: f64,
}

impl Bounds {
    fn of(series: &[&Series]) -> Option<Bounds> {
        let mut points = series.iter().flat_map(|s| s.points.iter());
        let &(year, value) = points.next()?;

        let initial = Bounds {
            min_year: year,
            max_year: year,
            min_value: value,
            max_value: value,
        };

        Some(points.fold(initial, |b, &(year, value)| Bounds {
            min_year: b.min_year.min(year),
            max_year: b.max_year.max(year),
            min_value: b.min_value.min(value),
            max_value: b.max_value.max(value),
        }))
    }

    /// Every year from the one before the first to the one after the last.
    fn x_ticks(&self) -> Vec<i32> {
        (self.min_year - 1..=self.max_year + 1).collect()
    }

    fn y_step(&self) -> f64 {
        (self.max_value / 10.0).round().max(1.0)
    }

    fn y_bottom(&self) -> f64 {
        if self.min_value < 0.0 {
            (self.min_value / self.y_step()).floor() * self.y_step()
        } else {
            0.0
        }
    }

    /// Ticks from the bottom of the axis up to the first one at or above the largest value.
    fn y_ticks(&self) -> Vec<f64> {
        let step = self.y_step();
        let bottom = self.y_bottom();
        let count = ((self.max_value - bottom) / step).ceil().max(1.0) as usize;

        (0..=count).map(|i| bottom + i as f64 * step).collect()
    }

    fn axes(&self) -> (WithKeyPoints<RangedCoordi32>, SteppedAxis) {
        let years = (self.min_year - 1..self.max_year + 1).with_key_points(self.x_ticks());

        (years, SteppedAxis::new(self.y_ticks()))
    }
}

/// A linear value axis whose grid lines and labels sit exactly on the given ticks.
///
/// The axis spans from the first tick to the last one.
#[derive(Debug, Clone, PartialEq)]
struct SteppedAxis {
    ticks: Vec<f64>,
    start: f64,
    end: f64,
}

impl SteppedAxis {
    fn new(ticks: Vec<f64>) -> Self {
        let start = ticks.first().copied().unwrap_or(0.0);
        let end = ticks.last().copied().filter(|end| *end > start).unwrap_or(start + 1.0);

        Self { ticks, start, end }
    }
}

impl Ranged for SteppedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let ratio = (value - self.start) / (self.end - self.start);
        let length = limit.1 - limit.0;

        if length == 0 {
            return limit.1;
        }

        limit.0 + (f64::from(length) * ratio + 1e-3).floor() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> std::ops::Range<f64> {
        self.start..self.end
    }
}
