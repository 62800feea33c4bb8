use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::{Container, EmbeddedImage, Render, fields};
use crate::error::Error;
use crate::ooxml::{InlinePicture, inline_picture, paragraph};
use crate::units::{cm_to_emu, inch_to_emu};
use crate::xml::XmlElement;

pub(super) const TAG: &str = "image";

/// Pictures without a resolution hint are sized at 72 DPI.
const DEFAULT_DPI: f64 = 72.0;

/// A picture inline with the zone's text.
#[derive(Clone, Debug, Deserialize)]
pub struct ImageElement {
    pub path: PathBuf,
    #[serde(default)]
    pub width_cm: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
}

impl ImageElement {
    pub fn from_spec(spec: &Value) -> Result<Self, Error> {
        fields(TAG, spec)
    }
}

impl Render for ImageElement {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
        let inline = embed_inline(container, &self.path, self.width_cm, self.height_cm)?;
        let run = XmlElement::new("w:r").with_child(XmlElement::new("w:drawing").with_child(inline));
        container.add_paragraph(paragraph(None).with_child(run))
    }

    fn kind(&self) -> &str {
        TAG
    }
}

/// Extent in EMU. A single given dimension scales the other one to keep the
/// aspect ratio; none given means natural size.
pub(super) fn picture_extent(
    image: &EmbeddedImage,
    width_cm: Option<f64>,
    height_cm: Option<f64>,
) -> (i64, i64) {
    let usable = |cm: Option<f64>| cm.filter(|v| v.is_finite() && *v > 0.0).map(cm_to_emu);
    let (px_w, px_h) = (image.width_px as f64, image.height_px as f64);
    match (usable(width_cm), usable(height_cm)) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, (w as f64 * px_h / px_w).round() as i64),
        (None, Some(h)) => ((h as f64 * px_w / px_h).round() as i64, h),
        (None, None) => (inch_to_emu(px_w / DEFAULT_DPI), inch_to_emu(px_h / DEFAULT_DPI)),
    }
}

/// Stores the picture and builds its `wp:inline`.
pub(super) fn embed_inline(
    container: &mut Container<'_>,
    path: &Path,
    width_cm: Option<f64>,
    height_cm: Option<f64>,
) -> Result<XmlElement, Error> {
    let image = container.embed_image(path)?;
    let (width_emu, height_emu) = picture_extent(&image, width_cm, height_cm);
    let drawing_id = container.next_drawing_id();
    Ok(inline_picture(&InlinePicture {
        rel_id: image.rel_id,
        drawing_id,
        name: image.name,
        width_emu,
        height_emu,
    }))
}
