//! Rasterizes the SVG charts captured from rendered topic pages.

use std::borrow::Cow;
use std::path::Path;

use tiny_skia::Color;
use tiny_skia::Pixmap;
use tiny_skia::Transform;
use tracing::debug;
use usvg::Options;
use usvg::Tree;

use crate::error::Result;
use crate::error::VisError;
use crate::plot::FONT;

const FONT_FAMILY: &str = "DejaVu Sans";

/// Namespaces an inline chart may rely on without declaring them, as HTML does not
/// require the declarations.
const NAMESPACES: [(&str, &str, &str); 2] = [
    ("<svg", "xmlns=", r#" xmlns="http://www.w3.org/2000/svg""#),
    ("xlink:", "xmlns:xlink=", r#" xmlns:xlink="http://www.w3.org/1999/xlink""#),
];

/// Writes `svg` to `path` as a PNG image on a white background and returns its size.
pub fn to_png(svg: &str, path: &Path) -> Result<(u32, u32)> {
    let svg = as_document(svg);

    let mut options = Options {
        font_family: String::from(FONT_FAMILY),
        ..Options::default()
    };
    options.fontdb_mut().load_font_data(FONT.to_vec());

    let tree = Tree::from_data(svg.as_bytes(), &options)
        .map_err(|error| VisError::Svg(format!("parsing failed: {error}")))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        VisError::Svg(format!("a {}x{} image cannot be allocated", size.width(), size.height()))
    })?;

    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    pixmap
        .save_png(path)
        .map_err(|error| VisError::Svg(format!("encoding failed: {error}")))?;

    let (width, height) = (size.width(), size.height());
    debug!(path = %path.display(), width, height, "rasterized chart");

    Ok((width, height))
}

/// Turns the markup of an inline chart into a standalone SVG document.
fn as_document(svg: &str) -> Cow<'_, str> {
    let mut document = Cow::Borrowed(svg.trim());

    for (used, declared, declaration) in NAMESPACES {
        if document.contains(used) && !document.contains(declared) {
            document = Cow::Owned(document.replacen("<svg", &format!("<svg{declaration}"), 1));
        }
    }

    if document.contains("&nbsp;") {
        document = Cow::Owned(document.replace("&nbsp;", "&#160;"));
    }

    document
}
