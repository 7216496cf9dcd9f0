//! Defines the `Error` and `Result` types that this crate uses.

use std::io::Error as IoError;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;
use tinytemplate::error::Error as TinyTemplateError;

/// The result type that uses [VisError] as the error type.
pub type Result<T> = std::result::Result<T, VisError>;

/// The error type for rendering the plots and reports of analyzed topics.
#[derive(Debug, Error)]
pub enum VisError {
    /// A [std::io::Error] encountered while creating the image files
    /// or their destination directory.
    #[error("vis error: I/O error: {0}")]
    Io(#[from] IoError),

    /// The drawing backend failed while drawing or encoding a plot.
    #[error("vis error: drawing error: {0}")]
    Drawing(String),

    /// A captured chart is not a valid SVG document or cannot be rasterized.
    #[error("vis error: SVG error: {0}")]
    Svg(String),

    /// The bundled font could not be registered with the drawing backend.
    #[error("vis error: the \"{0}\" font could not be registered")]
    Font(&'static str),

    /// A [tinytemplate::error::Error] encountered while registering
    /// or rendering a report template.
    #[error("vis error: template error: {0}")]
    Template(#[from] TinyTemplateError),
}

impl<E> From<DrawingAreaErrorKind<E>> for VisError
where
    E: std::error::Error + Send + Sync,
{
    fn from(error: DrawingAreaErrorKind<E>) -> Self {
        VisError::Drawing(error.to_string())
    }
}
