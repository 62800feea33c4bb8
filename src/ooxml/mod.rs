//! Typed builders for the OOXML fragments the composer emits.
//!
//! Every builder returns a complete element whose children are already in
//! schema order, so callers never reorder or patch generated XML.

mod drawing;
mod paragraph;
mod table;

pub use drawing::{
    AnchorPlacement, InlinePicture, WrapMode, build_anchor, inline_picture,
};
pub use paragraph::{
    Align, RunStyle, field_run, horizontal_line_paragraph, paragraph, rule_line_paragraph,
    text_run,
};
pub use table::{ZONE_COLUMNS, column_widths, zone_cell_mut, zone_table};

use crate::error::Error;
use crate::xml::XmlElement;

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Prefixes generated fragments rely on; declared on a part root before
/// anything is composed into it.
pub const COMPOSE_NAMESPACES: [(&str, &str); 5] = [
    ("w", WML_NS),
    ("r", REL_NS),
    ("wp", WPD_NS),
    ("a", DML_NS),
    ("pic", PIC_NS),
];

pub fn ensure_namespaces(root: &mut XmlElement) {
    for (prefix, uri) in COMPOSE_NAMESPACES {
        let key = format!("xmlns:{prefix}");
        if root.attr(&key).is_none() {
            root.set_attr(key, uri);
        }
    }
}

/// `RRGGBB`, upper-case, no leading `#`: the only form written into
/// `w:color` attributes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Accepts an optional leading `#` and either case; anything but six hex
    /// digits is rejected.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(raw.to_string()));
        }
        Ok(HexColor(hex.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        HexColor("000000".to_string())
    }
}

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self, Error> {
        HexColor::parse(&raw)
    }
}

/// A single `w:bottom`-style border edge.
pub(crate) fn border_edge(side: &str, val: &str, size: i64, color: &str) -> XmlElement {
    XmlElement::new(format!("w:{side}"))
        .with_attr("w:val", val)
        .with_attr("w:sz", size.to_string())
        .with_attr("w:space", "0")
        .with_attr("w:color", color)
}
