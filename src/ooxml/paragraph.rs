use serde::Deserialize;

use super::{HexColor, border_edge};
use crate::units::{border_eighths, pt_to_half_points, pt_to_twips};
use crate::xml::XmlElement;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl From<String> for Align {
    /// Unrecognized values fall back to left, as Word does for a bad `w:jc`.
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => Align::Center,
            "right" => Align::Right,
            "justify" | "both" => Align::Justify,
            _ => Align::Left,
        }
    }
}

impl Align {
    fn jc(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "both",
        }
    }
}

/// Character formatting. Every field is optional; `None` leaves the run to
/// inherit from the paragraph style.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunStyle {
    pub font: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<HexColor>,
    pub align: Option<Align>,
}

impl RunStyle {
    /// Fields set on `self` win; unset fields come from `base`.
    pub fn merged_over(&self, base: &RunStyle) -> RunStyle {
        RunStyle {
            font: self.font.clone().or_else(|| base.font.clone()),
            size: self.size.or(base.size),
            bold: self.bold.or(base.bold),
            italic: self.italic.or(base.italic),
            color: self.color.clone().or_else(|| base.color.clone()),
            align: self.align.or(base.align),
        }
    }

    fn run_properties(&self) -> Option<XmlElement> {
        let mut rpr = XmlElement::new("w:rPr");
        if let Some(font) = self.font.as_deref().filter(|f| !f.is_empty()) {
            rpr.push(
                XmlElement::new("w:rFonts")
                    .with_attr("w:ascii", font)
                    .with_attr("w:hAnsi", font),
            );
        }
        if let Some(bold) = self.bold {
            rpr.push(toggle("w:b", bold));
        }
        if let Some(italic) = self.italic {
            rpr.push(toggle("w:i", italic));
        }
        if let Some(color) = &self.color {
            rpr.push(XmlElement::new("w:color").with_attr("w:val", color.as_str()));
        }
        if let Some(size) = self.size.filter(|s| *s > 0.0) {
            rpr.push(XmlElement::new("w:sz").with_attr("w:val", pt_to_half_points(size).to_string()));
        }
        if rpr.children.is_empty() { None } else { Some(rpr) }
    }
}

fn toggle(name: &str, on: bool) -> XmlElement {
    let el = XmlElement::new(name);
    if on { el } else { el.with_attr("w:val", "0") }
}

fn run(style: &RunStyle) -> XmlElement {
    let mut r = XmlElement::new("w:r");
    if let Some(rpr) = style.run_properties() {
        r.push(rpr);
    }
    r
}

/// Empty paragraph, justified when `align` is given.
pub fn paragraph(align: Option<Align>) -> XmlElement {
    let p = XmlElement::new("w:p");
    match align {
        Some(a) => p.with_child(
            XmlElement::new("w:pPr").with_child(XmlElement::new("w:jc").with_attr("w:val", a.jc())),
        ),
        None => p,
    }
}

/// Line breaks (`\n`, `\r`) become `w:br` and tabs become `w:tab`, each
/// between the `w:t` pieces of the same run.
pub fn text_run(text: &str, style: &RunStyle) -> XmlElement {
    let mut r = run(style);
    let mut piece = String::new();
    for c in text.chars() {
        let control = match c {
            '\n' | '\r' => "w:br",
            '\t' => "w:tab",
            _ => {
                piece.push(c);
                continue;
            }
        };
        if !piece.is_empty() {
            r.push(text_node(&std::mem::take(&mut piece)));
        }
        r.push(XmlElement::new(control));
    }
    if !piece.is_empty() || text.is_empty() {
        r.push(text_node(&piece));
    }
    r
}

fn text_node(text: &str) -> XmlElement {
    XmlElement::new("w:t")
        .with_attr("xml:space", "preserve")
        .with_text(text)
}

/// One run carrying a complete `begin → instrText → end` field; Word
/// evaluates the instruction when it lays the page out.
pub fn field_run(instruction: &str, style: &RunStyle) -> XmlElement {
    run(style)
        .with_child(XmlElement::new("w:fldChar").with_attr("w:fldCharType", "begin"))
        .with_child(
            XmlElement::new("w:instrText")
                .with_attr("xml:space", "preserve")
                .with_text(instruction),
        )
        .with_child(XmlElement::new("w:fldChar").with_attr("w:fldCharType", "end"))
}

fn bottom_border(thickness_pt: f64, color: &HexColor) -> XmlElement {
    XmlElement::new("w:pBdr").with_child(border_edge(
        "bottom",
        "single",
        border_eighths(thickness_pt),
        color.as_str(),
    ))
}

/// Paragraph drawn as a line inside a zone, with 2pt above and below.
pub fn horizontal_line_paragraph(thickness_pt: f64, color: &HexColor) -> XmlElement {
    let gap = pt_to_twips(2.0).to_string();
    XmlElement::new("w:p").with_child(
        XmlElement::new("w:pPr")
            .with_child(bottom_border(thickness_pt, color))
            .with_child(
                XmlElement::new("w:spacing")
                    .with_attr("w:before", gap.as_str())
                    .with_attr("w:after", gap.as_str()),
            ),
    )
}

/// Full-width rule: a zero-spacing, zero-indent paragraph whose bottom border
/// is the visible line. Schema order inside `w:pPr` is pBdr, spacing, ind.
pub fn rule_line_paragraph(thickness_pt: f64, color: &HexColor) -> XmlElement {
    XmlElement::new("w:p")
        .with_child(
            XmlElement::new("w:pPr")
                .with_child(bottom_border(thickness_pt, color))
                .with_child(
                    XmlElement::new("w:spacing")
                        .with_attr("w:before", "0")
                        .with_attr("w:after", "0")
                        .with_attr("w:line", "240")
                        .with_attr("w:lineRule", "auto"),
                )
                .with_child(
                    XmlElement::new("w:ind")
                        .with_attr("w:left", "0")
                        .with_attr("w:right", "0"),
                ),
        )
        .with_child(XmlElement::new("w:r"))
}
