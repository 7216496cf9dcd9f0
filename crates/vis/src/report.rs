//! Text and HTML reports rendered from the snapshots of an analysis run.

use serde::Serialize;
use tinytemplate::TinyTemplate;
use tinytemplate::format_unescaped;
use topicrank_analytics::record::MetricType;
use topicrank_analytics::snapshot::EntitySnapshot;
use topicrank_analytics::snapshot::ImageInfo;
use topicrank_analytics::snapshot::OutboundLink;

use crate::error::Result;

/// How many words and links the description lists before eliding the rest.
const PREVIEW_LEN: usize = 10;

/// One ordering of the topics of a ranking run by a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingList {
    pub heading: String,
    pub entries: Vec<RankedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// The 1-based position of the topic in the ordering.
    pub rank: usize,
    pub title: String,
    pub value: String,
}

/// A page published for a run: its topics, the images they share and an optional
/// ranking report.
#[derive(Debug, Clone, Copy)]
pub struct PostPage<'a> {
    pub heading: &'a str,
    pub snapshots: &'a [EntitySnapshot],
    pub ranking: Option<&'a str>,
}

pub struct ReportEngine {
    text: TinyTemplate<'static>,
    html: TinyTemplate<'static>,
}

impl ReportEngine {
    const DESCRIPTION: &str = "description";
    const RANKING: &str = "ranking";
    const POST: &str = "post";

    pub fn new() -> Result<ReportEngine> {
        let mut text = TinyTemplate::new();
        text.set_default_formatter(&format_unescaped);
        text.add_template(
            Self::DESCRIPTION,
            include_str!("./template/description.txt.tt"),
        )?;
        text.add_template(Self::RANKING, include_str!("./template/ranking.txt.tt"))?;

        let mut html = TinyTemplate::new();
        html.add_template(Self::POST, include_str!("./template/post.html.tt"))?;

        Ok(Self { text, html })
    }

    /// Renders the human-readable summary of one topic. Missing values leave out
    /// their section.
    pub fn description(&self, snapshot: &EntitySnapshot, totals: Totals) -> Result<String> {
        let context = DescriptionContext::new(snapshot, totals);
        Ok(self.text.render(Self::DESCRIPTION, &context)?)
    }

    pub fn ranking(&self, rankings: &[RankingList]) -> Result<String> {
        let context = RankingContext { rankings };
        Ok(self.text.render(Self::RANKING, &context)?)
    }

    /// Renders a standalone HTML page. `src` maps every image to the location the
    /// page should load it from.
    pub fn post(&self, page: PostPage<'_>, src: impl Fn(&ImageInfo) -> String) -> Result<String> {
        let topics = page
            .snapshots
            .iter()
            .map(|snapshot| TopicContext {
                url: &snapshot.url,
                title: &snapshot.title,
                description: snapshot.description.as_deref().unwrap_or_default(),
                images: MetricType::ALL
                    .into_iter()
                    .flat_map(|kind| snapshot.historical_images(kind))
                    .map(|image| ImageContext::new(image, &src))
                    .collect(),
            })
            .collect();

        // Comparison images are attached to every topic of the run; show them once.
        let shared_images = page
            .snapshots
            .first()
            .map(|snapshot| {
                MetricType::ALL
                    .into_iter()
                    .filter_map(|kind| snapshot.comparison_images(kind))
                    .flatten()
                    .map(|image| ImageContext::new(image, &src))
                    .collect()
            })
            .unwrap_or_default();

        let context = PostContext {
            heading: page.heading,
            topics,
            shared_images,
            ranking: page.ranking,
        };

        Ok(self.html.render(Self::POST, &context)?)
    }
}

/// The total number of words and links extracted, as announced in the description
/// headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub words: usize,
    pub links: usize,
}

#[derive(Serialize)]
struct DescriptionContext<'a> {
    url: &'a str,
    recent_conflict: Option<&'a str>,
    recent_polemic: Option<&'a str>,
    mean_conflict: Option<&'a str>,
    mean_polemic: Option<&'a str>,
    words: &'a [String],
    words_total: usize,
    conflict_awards: Vec<AwardLine<'a>>,
    polemic_awards: Vec<AwardLine<'a>>,
    links: &'a [OutboundLink],
    links_total: usize,
}

impl<'a> DescriptionContext<'a> {
    fn new(snapshot: &'a EntitySnapshot, totals: Totals) -> Self {
        let words = &snapshot.words_that_matter;
        let links = &snapshot.social_jumps;

        Self {
            url: &snapshot.url,
            recent_conflict: snapshot.recent(MetricType::Conflict),
            recent_polemic: snapshot.recent(MetricType::Polemic),
            mean_conflict: snapshot.mean(MetricType::Conflict),
            mean_polemic: snapshot.mean(MetricType::Polemic),
            words: &words[..words.len().min(PREVIEW_LEN)],
            words_total: totals.words,
            conflict_awards: AwardLine::of(snapshot, MetricType::Conflict),
            polemic_awards: AwardLine::of(snapshot, MetricType::Polemic),
            links: &links[..links.len().min(PREVIEW_LEN)],
            links_total: totals.links,
        }
    }
}

#[derive(Serialize)]
struct AwardLine<'a> {
    category: &'a str,
    label: &'a str,
}

impl<'a> AwardLine<'a> {
    fn of(snapshot: &'a EntitySnapshot, kind: MetricType) -> Vec<AwardLine<'a>> {
        snapshot
            .awards(kind)
            .iter()
            .flat_map(|(category, labels)| {
                labels.iter().map(move |label| AwardLine {
                    category,
                    label,
                })
            })
            .collect()
    }
}

#[derive(Serialize)]
struct RankingContext<'a> {
    rankings: &'a [RankingList],
}

#[derive(Serialize)]
struct PostContext<'a> {
    heading: &'a str,
    topics: Vec<TopicContext<'a>>,
    shared_images: Vec<ImageContext<'a>>,
    ranking: Option<&'a str>,
}

#[derive(Serialize)]
struct TopicContext<'a> {
    url: &'a str,
    title: &'a str,
    description: &'a str,
    images: Vec<ImageContext<'a>>,
}

#[derive(Serialize)]
struct ImageContext<'a> {
    src: String,
    alt: &'a str,
}

impl<'a> ImageContext<'a> {
    fn new(image: &'a ImageInfo, src: impl Fn(&ImageInfo) -> String) -> Self {
        Self {
            src: src(image),
            alt: &image.image_alt,
        }
    }
}
