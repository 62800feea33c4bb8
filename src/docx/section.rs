use super::package::{RT_FOOTER, RT_HEADER};
use crate::units::{EMU_PER_CM, cm_to_twips, dxa_to_emu, emu_to_dxa};
use crate::xml::XmlElement;

/// Which story a part holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartKind {
    Header,
    Footer,
}

/// Which pages of a section a header/footer applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    Default,
    First,
    Even,
}

impl PartKind {
    pub(crate) fn reference_tag(self) -> &'static str {
        match self {
            PartKind::Header => "w:headerReference",
            PartKind::Footer => "w:footerReference",
        }
    }

    pub(crate) fn root_tag(self) -> &'static str {
        match self {
            PartKind::Header => "w:hdr",
            PartKind::Footer => "w:ftr",
        }
    }

    pub(crate) fn file_stem(self) -> &'static str {
        match self {
            PartKind::Header => "header",
            PartKind::Footer => "footer",
        }
    }

    pub(crate) fn rel_type(self) -> &'static str {
        match self {
            PartKind::Header => RT_HEADER,
            PartKind::Footer => RT_FOOTER,
        }
    }

    pub(crate) fn content_type(self) -> &'static str {
        match self {
            PartKind::Header => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"
            }
            PartKind::Footer => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"
            }
        }
    }

    /// `w:pgMar` attribute holding this story's distance from the page edge.
    fn margin_attr(self) -> &'static str {
        match self {
            PartKind::Header => "w:header",
            PartKind::Footer => "w:footer",
        }
    }
}

impl Variant {
    pub(crate) fn type_attr(self) -> &'static str {
        match self {
            Variant::Default => "default",
            Variant::First => "first",
            Variant::Even => "even",
        }
    }
}

// CT_SectPr sequence, used to place inserted children.
const AFTER_REFERENCES: [&str; 16] = [
    "w:footnotePr",
    "w:endnotePr",
    "w:type",
    "w:pgSz",
    "w:pgMar",
    "w:paperSrc",
    "w:pgBorders",
    "w:lnNumType",
    "w:pgNumType",
    "w:cols",
    "w:formProt",
    "w:vAlign",
    "w:noEndnote",
    "w:titlePg",
    "w:textDirection",
    "w:bidi",
];
const AFTER_TITLE_PG: [&str; 6] = [
    "w:textDirection",
    "w:bidi",
    "w:rtlGutter",
    "w:docGrid",
    "w:printerSettings",
    "w:sectPrChange",
];

/// Page geometry of one section, in EMU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionGeometry {
    pub page_width: i64,
    pub page_height: i64,
    pub top_margin: i64,
    pub bottom_margin: i64,
    pub left_margin: i64,
    pub right_margin: i64,
    pub header_distance: i64,
    pub footer_distance: i64,
}

fn twips_attr(node: Option<&XmlElement>, attr: &str, default: i64) -> i64 {
    node.and_then(|n| n.attr(attr))
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v.round() as i64)
        .unwrap_or(default)
}

impl SectionGeometry {
    /// Reads `w:pgSz` and `w:pgMar`; anything missing falls back to US Letter
    /// with one-inch margins, which is what Word assumes.
    pub(crate) fn from_sect_pr(sect_pr: &XmlElement) -> Self {
        let pg_sz = sect_pr.find("w:pgSz");
        let pg_mar = sect_pr.find("w:pgMar");
        let emu = |node: Option<&XmlElement>, attr: &str, default: i64| {
            dxa_to_emu(twips_attr(node, attr, default))
        };
        SectionGeometry {
            page_width: emu(pg_sz, "w:w", 12240),
            page_height: emu(pg_sz, "w:h", 15840),
            top_margin: emu(pg_mar, "w:top", 1440),
            bottom_margin: emu(pg_mar, "w:bottom", 1440),
            left_margin: emu(pg_mar, "w:left", 1440),
            right_margin: emu(pg_mar, "w:right", 1440),
            header_distance: emu(pg_mar, "w:header", 720),
            footer_distance: emu(pg_mar, "w:footer", 720),
        }
    }

    pub fn usable_width_emu(&self) -> i64 {
        self.page_width - self.left_margin - self.right_margin
    }

    pub fn usable_width_dxa(&self) -> i64 {
        emu_to_dxa(self.usable_width_emu())
    }

    /// Offset from the page top where the header story starts.
    pub fn header_y_cm(&self) -> f64 {
        self.header_distance as f64 / EMU_PER_CM
    }

    /// Offset from the page top where the bottom margin, and so the footer
    /// area, starts.
    pub fn footer_y_cm(&self) -> f64 {
        (self.page_height - self.bottom_margin) as f64 / EMU_PER_CM
    }
}

/// Read-only view of one `w:sectPr`.
#[derive(Clone, Copy, Debug)]
pub struct Section<'a> {
    pub(crate) sect_pr: &'a XmlElement,
}

impl<'a> Section<'a> {
    pub fn geometry(&self) -> SectionGeometry {
        SectionGeometry::from_sect_pr(self.sect_pr)
    }

    pub fn has_title_page(&self) -> bool {
        has_title_page(self.sect_pr)
    }

    /// Relationship id of the part this section defines for (kind, variant).
    pub fn reference(&self, kind: PartKind, variant: Variant) -> Option<&'a str> {
        reference_id(self.sect_pr, kind, variant)
    }
}

pub(crate) fn has_title_page(sect_pr: &XmlElement) -> bool {
    sect_pr
        .find("w:titlePg")
        .is_some_and(|t| t.attr("w:val").is_none_or(|v| v != "0" && v != "false"))
}

pub(crate) fn reference_id(sect_pr: &XmlElement, kind: PartKind, variant: Variant) -> Option<&str> {
    sect_pr
        .find_all(kind.reference_tag())
        .find(|r| r.attr("w:type").unwrap_or("default") == variant.type_attr())
        .and_then(|r| r.attr("r:id"))
}

/// Adds the reference after any existing header/footer references.
pub(crate) fn add_reference(sect_pr: &mut XmlElement, kind: PartKind, variant: Variant, rel_id: &str) {
    sect_pr.insert_ordered(
        XmlElement::new(kind.reference_tag())
            .with_attr("w:type", variant.type_attr())
            .with_attr("r:id", rel_id),
        &AFTER_REFERENCES,
    );
}

/// Returns true when the section did not already have a title page.
pub(crate) fn enable_title_page(sect_pr: &mut XmlElement) -> bool {
    if has_title_page(sect_pr) {
        return false;
    }
    // An explicit w:val="0" is replaced rather than duplicated.
    sect_pr.retain_elements(|e| !e.is("w:titlePg"));
    sect_pr.insert_ordered(XmlElement::new("w:titlePg"), &AFTER_TITLE_PG);
    true
}

pub(crate) fn try_set_distance(sect_pr: &mut XmlElement, kind: PartKind, cm: f64) -> bool {
    if !cm.is_finite() || cm < 0.0 {
        return false;
    }
    match sect_pr.find_mut("w:pgMar") {
        Some(pg_mar) => {
            pg_mar.set_attr(kind.margin_attr(), cm_to_twips(cm).to_string());
            true
        }
        None => false,
    }
}
