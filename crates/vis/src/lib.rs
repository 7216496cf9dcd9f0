//! topicrank's visualization library.
//!
//! Renders the artifacts of an analysis run: historical-level plots with a stable
//! color per topic, PNG captures of the charts a page renders itself, and the text
//! and HTML reports handed to the publishers.
//!
//! **WARNING**: This library is the topicrank's visualization internal library and
//! there are no plans to stabilize it. The API may break at any time without notice.

pub mod color;
pub mod error;
pub mod plot;
pub mod report;
pub mod svg;
