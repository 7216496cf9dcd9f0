use serde::Deserialize;
use serde::Serialize;

use crate::aggregate::Awards;
use crate::record::MetricType;
use crate::record::RawRecord;

/// Where a generated image lives. Images are always written to the local file system.
pub const LOCAL: &str = "local";

/// A title and an absolute URL of a page the topic links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundLink {
    pub title: String,
    pub link: String,
}

/// Describes a generated image in the shape the posting sinks consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub image: String,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub image_alt: String,
    pub location: String,
}

impl ImageInfo {
    /// An image written to the local file system. Its dimensions are left to the sink.
    pub fn local(image: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            image_width: None,
            image_height: None,
            image_alt: alt.into(),
            location: String::from(LOCAL),
        }
    }
}

/// The aggregated view of one analyzed topic.
///
/// A snapshot is assembled once per fetched page. The `with_*` methods consume the
/// snapshot and return it with the rendered artifacts attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub message: Option<String>,
    pub compact_message: Option<String>,
    pub records: Vec<RawRecord>,
    pub historical_conflict: Vec<ImageInfo>,
    pub historical_polemic: Vec<ImageInfo>,
    pub historical_conflict_comparison: Option<Vec<ImageInfo>>,
    pub historical_polemic_comparison: Option<Vec<ImageInfo>>,
    pub recent_conflict_levels: Option<String>,
    pub recent_polemic_levels: Option<String>,
    pub mean_conflict_level: Option<String>,
    pub mean_polemic_level: Option<String>,
    pub words_that_matter: Vec<String>,
    pub conflict_awards: Awards,
    pub polemic_awards: Awards,
    pub social_jumps: Vec<OutboundLink>,
}

impl EntitySnapshot {
    pub fn recent(&self, kind: MetricType) -> Option<&str> {
        match kind {
            MetricType::Conflict => self.recent_conflict_levels.as_deref(),
            MetricType::Polemic => self.recent_polemic_levels.as_deref(),
        }
    }

    pub fn mean(&self, kind: MetricType) -> Option<&str> {
        match kind {
            MetricType::Conflict => self.mean_conflict_level.as_deref(),
            MetricType::Polemic => self.mean_polemic_level.as_deref(),
        }
    }

    pub fn awards(&self, kind: MetricType) -> &Awards {
        match kind {
            MetricType::Conflict => &self.conflict_awards,
            MetricType::Polemic => &self.polemic_awards,
        }
    }

    pub fn historical_images(&self, kind: MetricType) -> &[ImageInfo] {
        match kind {
            MetricType::Conflict => &self.historical_conflict,
            MetricType::Polemic => &self.historical_polemic,
        }
    }

    pub fn comparison_images(&self, kind: MetricType) -> Option<&[ImageInfo]> {
        match kind {
            MetricType::Conflict => self.historical_conflict_comparison.as_deref(),
            MetricType::Polemic => self.historical_polemic_comparison.as_deref(),
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }

    /// Replaces the latest level computed from the records, e.g. with the one the page
    /// displays itself.
    pub fn with_recent_level(mut self, kind: MetricType, level: String) -> Self {
        match kind {
            MetricType::Conflict => self.recent_conflict_levels = Some(level),
            MetricType::Polemic => self.recent_polemic_levels = Some(level),
        }
        self
    }

    pub fn with_historical_images(mut self, kind: MetricType, images: Vec<ImageInfo>) -> Self {
        match kind {
            MetricType::Conflict => self.historical_conflict = images,
            MetricType::Polemic => self.historical_polemic = images,
        }
        self
    }

    /// Attaches the overlay images shared by every topic of a multi-topic run.
    pub fn with_comparison_images(mut self, kind: MetricType, images: Vec<ImageInfo>) -> Self {
        match kind {
            MetricType::Conflict => self.historical_conflict_comparison = Some(images),
            MetricType::Polemic => self.historical_polemic_comparison = Some(images),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot() -> EntitySnapshot {
        EntitySnapshot {
            url: String::from("http://en.negapedia.org/articles/Rome"),
            title: String::from("Rome"),
            description: None,
            message: None,
            compact_message: None,
            records: Vec::new(),
            historical_conflict: Vec::new(),
            historical_polemic: Vec::new(),
            historical_conflict_comparison: None,
            historical_polemic_comparison: None,
            recent_conflict_levels: Some(String::from("42")),
            recent_polemic_levels: None,
            mean_conflict_level: Some(String::from("10.50")),
            mean_polemic_level: None,
            words_that_matter: vec![String::from("empire")],
            conflict_awards: BTreeMap::from([(
                String::from("all"),
                vec![String::from("Top 1000 of all time")],
            )]),
            polemic_awards: BTreeMap::new(),
            social_jumps: Vec::new(),
        }
    }

    #[test]
    fn accessors_select_by_metric_type() {
        let snapshot = snapshot();

        assert_eq!(snapshot.recent(MetricType::Conflict), Some("42"));
        assert_eq!(snapshot.recent(MetricType::Polemic), None);
        assert_eq!(snapshot.mean(MetricType::Conflict), Some("10.50"));
        assert!(snapshot.awards(MetricType::Polemic).is_empty());
    }

    #[test]
    fn recent_level_is_replaced_per_type() {
        let snapshot = snapshot().with_recent_level(MetricType::Polemic, String::from("7"));

        assert_eq!(snapshot.recent(MetricType::Conflict), Some("42"));
        assert_eq!(snapshot.recent(MetricType::Polemic), Some("7"));
    }

    #[test]
    fn comparison_images_are_attached_per_type() {
        let image = ImageInfo::local("images_to_post/plot.png", "Comparison");
        let snapshot = snapshot().with_comparison_images(MetricType::Polemic, vec![image.clone()]);

        assert_eq!(snapshot.comparison_images(MetricType::Conflict), None);
        assert_eq!(
            snapshot.comparison_images(MetricType::Polemic),
            Some(&[image][..])
        );
    }

    #[test]
    fn local_images_leave_dimensions_to_the_sink() -> Result<(), serde_json::Error> {
        let image = ImageInfo::local("images_to_post/plot.png", "Rome");
        let json = serde_json::to_value(&image)?;

        assert_eq!(image.image_width, None);
        assert_eq!(image.image_height, None);
        assert_eq!(json["image_width"], serde_json::Value::Null);
        assert_eq!(json["image_height"], serde_json::Value::Null);
        assert_eq!(json["location"], "local");

        Ok(())
    }

    #[test]
    fn serializes_in_sink_shape() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(snapshot())?;

        assert_eq!(json["recent_conflict_levels"], "42");
        assert_eq!(json["mean_polemic_level"], serde_json::Value::Null);
        assert_eq!(json["conflict_awards"]["all"][0], "Top 1000 of all time");
        assert_eq!(json["words_that_matter"][0], "empire");

        Ok(())
    }
}
