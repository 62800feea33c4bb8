//! The host document: a DOCX package held in memory, with the parts the
//! composer edits (main document, settings, headers and footers) parsed into
//! mutable trees and everything else kept as raw bytes.

mod package;
mod section;

use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::path::Path;

pub use package::Relationships;
pub(crate) use package::Package;
pub use section::{PartKind, Section, SectionGeometry, Variant};

use package::{
    RT_FOOTER, RT_HEADER, RT_IMAGE, RT_SETTINGS, content_types_skeleton,
    relative_target, rels_path_for, resolve_target,
};

use crate::error::Error;
use crate::ooxml::{REL_NS, WML_NS, ensure_namespaces};
use crate::xml::XmlElement;

const MAIN_PART: &str = "word/document.xml";
const SETTINGS_PART: &str = "word/settings.xml";

const RT_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const CT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";

// CT_Settings children that come after w:evenAndOddHeaders.
const AFTER_EVEN_AND_ODD: &[&str] = &[
    "w:bookFoldRevPrinting",
    "w:bookFoldPrinting",
    "w:bookFoldPrintingSheets",
    "w:drawingGridHorizontalSpacing",
    "w:drawingGridVerticalSpacing",
    "w:displayHorizontalDrawingGridEvery",
    "w:displayVerticalDrawingGridEvery",
    "w:doNotUseMarginsForDrawingGridOrigin",
    "w:drawingGridHorizontalOrigin",
    "w:drawingGridVerticalOrigin",
    "w:doNotShadeFormData",
    "w:noPunctuationKerning",
    "w:characterSpacingControl",
    "w:printTwoOnOne",
    "w:strictFirstAndLastChars",
    "w:noLineBreaksAfter",
    "w:noLineBreaksBefore",
    "w:savePreviewPicture",
    "w:doNotValidateAgainstSchema",
    "w:saveInvalidXml",
    "w:ignoreMixedContent",
    "w:alwaysShowPlaceholderText",
    "w:doNotDemarcateInvalidXml",
    "w:saveXmlDataOnly",
    "w:useXSLTWhenSaving",
    "w:saveThroughXslt",
    "w:showXMLTags",
    "w:alwaysMergeEmptyNamespace",
    "w:updateFields",
    "w:hdrShapeDefaults",
    "w:footnotePr",
    "w:endnotePr",
    "w:compat",
    "w:docVars",
    "w:rsids",
    "m:mathPr",
    "w:attachedSchema",
    "w:themeFontLang",
    "w:clrSchemeMapping",
    "w:doNotIncludeSubdocsInStats",
    "w:doNotAutoCompressPictures",
    "w:forceUpgrade",
    "w:captions",
    "w:readModeInkLockDown",
    "w:smartTagType",
    "sl:schemaLibrary",
    "w:shapeDefaults",
    "w:doNotEmbedSmartTags",
    "w:decimalSymbol",
    "w:listSeparator",
    "w14:docId",
    "w15:chartTrackingRefBased",
    "w15:docId",
];

pub(crate) struct HeaderFooterPart {
    kind: PartKind,
    root: XmlElement,
    rels: Relationships,
}

struct SettingsPart {
    name: String,
    root: XmlElement,
}

pub struct Document {
    package: Package,
    main: XmlElement,
    main_rels: Relationships,
    settings: Option<SettingsPart>,
    parts: BTreeMap<String, HeaderFooterPart>,
    next_drawing_id: u32,
    dirty: BTreeSet<String>,
}

/// Mutable access to one header/footer part plus the package-wide state
/// that composing into it may touch.
pub(crate) struct PartContext<'a> {
    name: String,
    part: &'a mut HeaderFooterPart,
    package: &'a mut Package,
    next_drawing_id: &'a mut u32,
}

impl PartContext<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PartKind {
        self.part.kind
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.part.root
    }

    /// Stores the image in the package and returns the relationship id this
    /// part uses for it.
    pub fn embed_image(&mut self, data: Vec<u8>, ext: &str) -> String {
        let media = self.package.add_media(data, ext);
        let target = relative_target(&self.name, &media);
        self.part.rels.get_or_add(RT_IMAGE, &target)
    }

    pub fn next_drawing_id(&mut self) -> u32 {
        let id = *self.next_drawing_id;
        *self.next_drawing_id += 1;
        id
    }
}

fn sect_prs(body: &XmlElement) -> Vec<&XmlElement> {
    body.elements()
        .filter_map(|child| {
            if child.is("w:p") {
                child.find("w:pPr").and_then(|p| p.find("w:sectPr"))
            } else if child.is("w:sectPr") {
                Some(child)
            } else {
                None
            }
        })
        .collect()
}

fn nth_sect_pr_mut(body: &mut XmlElement, n: usize) -> Option<&mut XmlElement> {
    body.elements_mut()
        .filter_map(|child| {
            if child.is("w:p") {
                child.find_mut("w:pPr").and_then(|p| p.find_mut("w:sectPr"))
            } else if child.is("w:sectPr") {
                Some(child)
            } else {
                None
            }
        })
        .nth(n)
}

/// Largest `wp:docPr/@id` in any word/*.xml part, so new drawings never
/// collide with existing ones.
fn max_drawing_id(package: &Package) -> u32 {
    package
        .names()
        .filter(|name| name.starts_with("word/") && name.ends_with(".xml"))
        .filter_map(|name| package.read_text(name))
        .filter_map(|xml| {
            let doc = roxmltree::Document::parse(&xml).ok()?;
            let max = doc
                .descendants()
                .filter(|n| n.tag_name().name() == "docPr")
                .filter_map(|n| n.attribute("id")?.parse::<u32>().ok())
                .max();
            max
        })
        .max()
        .unwrap_or(0)
}

fn is_on(el: Option<&XmlElement>) -> bool {
    el.is_some_and(|e| e.attr("w:val").is_none_or(|v| v != "0" && v != "false"))
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let package = Package::from_bytes(bytes)?;

        let main_xml = package.read_text(MAIN_PART).ok_or_else(|| {
            Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into())
        })?;
        let mut main = XmlElement::parse(&main_xml)?;
        let mut dirty = BTreeSet::new();

        let body = main
            .find_mut("w:body")
            .ok_or_else(|| Error::Structure("missing w:body".into()))?;
        if body.find("w:sectPr").is_none() {
            body.push(XmlElement::new("w:sectPr"));
            dirty.insert(MAIN_PART.to_string());
        }

        let main_rels = match package.read_text(&rels_path_for(MAIN_PART)) {
            Some(xml) => Relationships::parse(&xml)?,
            None => Relationships::empty(),
        };

        let settings = match main_rels.find_by_type(RT_SETTINGS) {
            Some((_, target)) => {
                let name = resolve_target(MAIN_PART, target);
                match package.read_text(&name) {
                    Some(xml) => Some(SettingsPart {
                        root: XmlElement::parse(&xml)?,
                        name,
                    }),
                    None => None,
                }
            }
            None => None,
        };

        let mut parts = BTreeMap::new();
        for (kind, rel_type) in [(PartKind::Header, RT_HEADER), (PartKind::Footer, RT_FOOTER)] {
            for target in main_rels.targets_of_type(rel_type) {
                let name = resolve_target(MAIN_PART, target);
                let Some(xml) = package.read_text(&name) else {
                    log::warn!("{name} is referenced but not present in the package");
                    continue;
                };
                let rels = match package.read_text(&rels_path_for(&name)) {
                    Some(r) => Relationships::parse(&r)?,
                    None => Relationships::empty(),
                };
                let root = XmlElement::parse(&xml)?;
                parts.insert(name, HeaderFooterPart { kind, root, rels });
            }
        }

        let next_drawing_id = max_drawing_id(&package) + 1;
        log::debug!(
            "Opened document: {} header/footer parts, next drawing id {}",
            parts.len(),
            next_drawing_id
        );

        Ok(Document {
            package,
            main,
            main_rels,
            settings,
            parts,
            next_drawing_id,
            dirty,
        })
    }

    /// A blank single-section A4 document with 2 cm side margins and
    /// headers/footers 1.25 cm from the page edge.
    pub fn new() -> Self {
        let mut content_types = content_types_skeleton();
        for (part, ct) in [(MAIN_PART, CT_MAIN), (SETTINGS_PART, CT_SETTINGS)] {
            content_types.push(
                XmlElement::new("Override")
                    .with_attr("PartName", format!("/{part}"))
                    .with_attr("ContentType", ct),
            );
        }
        let mut package_rels = Relationships::empty();
        package_rels.get_or_add(RT_OFFICE_DOCUMENT, MAIN_PART);
        let package = Package::blank(
            content_types,
            vec![("_rels/.rels".to_string(), package_rels.to_xml().into_bytes())],
        );

        let sect_pr = XmlElement::new("w:sectPr")
            .with_child(
                XmlElement::new("w:pgSz")
                    .with_attr("w:w", "11906")
                    .with_attr("w:h", "16838"),
            )
            .with_child(
                XmlElement::new("w:pgMar")
                    .with_attr("w:top", "1417")
                    .with_attr("w:right", "1134")
                    .with_attr("w:bottom", "1417")
                    .with_attr("w:left", "1134")
                    .with_attr("w:header", "709")
                    .with_attr("w:footer", "709")
                    .with_attr("w:gutter", "0"),
            )
            .with_child(XmlElement::new("w:cols").with_attr("w:space", "708"))
            .with_child(XmlElement::new("w:docGrid").with_attr("w:linePitch", "360"));
        let main = XmlElement::new("w:document")
            .with_attr("xmlns:w", WML_NS)
            .with_attr("xmlns:r", REL_NS)
            .with_child(
                XmlElement::new("w:body")
                    .with_child(XmlElement::new("w:p"))
                    .with_child(sect_pr),
            );

        let mut main_rels = Relationships::empty();
        main_rels.get_or_add(RT_SETTINGS, "settings.xml");
        let settings = SettingsPart {
            name: SETTINGS_PART.to_string(),
            root: XmlElement::new("w:settings")
                .with_attr("xmlns:w", WML_NS)
                .with_child(XmlElement::new("w:defaultTabStop").with_attr("w:val", "708"))
                .with_child(XmlElement::new("w:compat")),
        };

        let dirty = [MAIN_PART.to_string(), rels_path_for(MAIN_PART), SETTINGS_PART.to_string()]
            .into_iter()
            .collect();

        Document {
            package,
            main,
            main_rels,
            settings: Some(settings),
            parts: BTreeMap::new(),
            next_drawing_id: 1,
            dirty,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut updated = BTreeMap::new();
        for name in &self.dirty {
            let xml = if name == MAIN_PART {
                Some(self.main.to_xml())
            } else if *name == rels_path_for(MAIN_PART) {
                Some(self.main_rels.to_xml())
            } else if let Some(settings) = self.settings.as_ref().filter(|s| s.name == *name) {
                Some(settings.root.to_xml())
            } else if let Some(part) = self.parts.get(name) {
                if !part.rels.is_empty() {
                    updated.insert(rels_path_for(name), part.rels.to_xml());
                }
                Some(part.root.to_xml())
            } else {
                None
            };
            if let Some(xml) = xml {
                updated.insert(name.clone(), xml);
            }
        }
        let cursor = self.package.write(Cursor::new(Vec::new()), &updated)?;
        Ok(cursor.into_inner())
    }

    fn body(&self) -> Option<&XmlElement> {
        self.main.find("w:body")
    }

    pub fn section_count(&self) -> usize {
        self.body().map(|b| sect_prs(b).len()).unwrap_or(0)
    }

    pub fn sections(&self) -> Vec<Section<'_>> {
        self.body()
            .map(|b| sect_prs(b).into_iter().map(|sect_pr| Section { sect_pr }).collect())
            .unwrap_or_default()
    }

    pub fn section(&self, index: usize) -> Option<Section<'_>> {
        self.sections().into_iter().nth(index)
    }

    fn sect_pr_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        let body = self.main.find_mut("w:body")?;
        nth_sect_pr_mut(body, index)
    }

    /// Turns on "different first page" for the section. Returns false when
    /// it was already on or the section does not exist.
    pub fn enable_title_page(&mut self, index: usize) -> bool {
        let changed = self
            .sect_pr_mut(index)
            .is_some_and(section::enable_title_page);
        if changed {
            self.dirty.insert(MAIN_PART.to_string());
        }
        changed
    }

    /// Sets the header or footer distance from the page edge. Returns false,
    /// leaving the document untouched, when the section has no page margins
    /// to carry the value or `cm` is not a usable length.
    pub fn try_set_distance(&mut self, index: usize, kind: PartKind, cm: f64) -> bool {
        let changed = self
            .sect_pr_mut(index)
            .is_some_and(|s| section::try_set_distance(s, kind, cm));
        if changed {
            self.dirty.insert(MAIN_PART.to_string());
        }
        changed
    }

    pub fn even_and_odd_headers(&self) -> bool {
        self.settings
            .as_ref()
            .is_some_and(|s| is_on(s.root.find("w:evenAndOddHeaders")))
    }

    /// Turns on distinct even-page headers and footers. Word only has a
    /// document-wide switch for this, kept in the settings part.
    pub fn enable_even_and_odd_headers(&mut self) -> Result<bool, Error> {
        if self.even_and_odd_headers() {
            return Ok(false);
        }
        let settings = self.settings_mut()?;
        settings.root.retain_elements(|e| !e.is("w:evenAndOddHeaders"));
        settings
            .root
            .insert_ordered(XmlElement::new("w:evenAndOddHeaders"), AFTER_EVEN_AND_ODD);
        let name = settings.name.clone();
        self.dirty.insert(name);
        Ok(true)
    }

    fn settings_mut(&mut self) -> Result<&mut SettingsPart, Error> {
        if self.settings.is_none() {
            let root = match self.package.read_text(SETTINGS_PART) {
                Some(xml) => XmlElement::parse(&xml)?,
                None => XmlElement::new("w:settings").with_attr("xmlns:w", WML_NS),
            };
            self.package.add_override(SETTINGS_PART, CT_SETTINGS);
            self.main_rels
                .get_or_add(RT_SETTINGS, &relative_target(MAIN_PART, SETTINGS_PART));
            self.dirty.insert(rels_path_for(MAIN_PART));
            self.settings = Some(SettingsPart {
                name: SETTINGS_PART.to_string(),
                root,
            });
        }
        self.settings
            .as_mut()
            .ok_or_else(|| Error::Structure("settings part unavailable".into()))
    }

    /// Part name of the header/footer the section shows for `variant`,
    /// following "linked to previous" inheritance. Never creates anything.
    pub fn resolve_header_footer(&self, index: usize, kind: PartKind, variant: Variant) -> Option<String> {
        let sections = self.sections();
        sections
            .get(..=index)?
            .iter()
            .rev()
            .find_map(|s| s.reference(kind, variant))
            .and_then(|rid| self.main_rels.target(rid))
            .map(|target| resolve_target(MAIN_PART, target))
    }

    pub fn header_footer(&self, index: usize, kind: PartKind, variant: Variant) -> Option<&XmlElement> {
        let name = self.resolve_header_footer(index, kind, variant)?;
        self.part(&name)
    }

    pub fn part(&self, name: &str) -> Option<&XmlElement> {
        self.parts.get(name).map(|p| &p.root)
    }

    /// Like `resolve_header_footer`, but when no section up to `index`
    /// defines the part, a new empty one is created and referenced from the
    /// first section so every later section inherits it.
    pub fn header_footer_part(
        &mut self,
        index: usize,
        kind: PartKind,
        variant: Variant,
    ) -> Result<String, Error> {
        if index >= self.section_count() {
            return Err(Error::Structure(format!("no section at index {index}")));
        }
        if let Some(name) = self.resolve_header_footer(index, kind, variant) {
            return if self.parts.contains_key(&name) {
                Ok(name)
            } else {
                Err(Error::Structure(format!("{name} is referenced but missing")))
            };
        }
        self.add_header_footer(kind, variant)
    }

    fn add_header_footer(&mut self, kind: PartKind, variant: Variant) -> Result<String, Error> {
        let stem = kind.file_stem();
        let name = (1..)
            .map(|n| format!("word/{stem}{n}.xml"))
            .find(|candidate| !self.package.contains(candidate) && !self.parts.contains_key(candidate))
            .ok_or_else(|| Error::Structure(format!("no free {stem} part name")))?;

        let mut root = XmlElement::new(kind.root_tag());
        ensure_namespaces(&mut root);
        root.push(XmlElement::new("w:p"));

        self.package.add_override(&name, kind.content_type());
        let rel_id = self
            .main_rels
            .get_or_add(kind.rel_type(), &relative_target(MAIN_PART, &name));
        if self.main.attr("xmlns:r").is_none() {
            self.main.set_attr("xmlns:r", REL_NS);
        }
        let sect_pr = self
            .sect_pr_mut(0)
            .ok_or_else(|| Error::Structure("document has no section".into()))?;
        section::add_reference(sect_pr, kind, variant, &rel_id);

        log::debug!("Created {name} ({} {:?})", stem, variant);
        self.parts.insert(
            name.clone(),
            HeaderFooterPart {
                kind,
                root,
                rels: Relationships::empty(),
            },
        );
        for dirty in [MAIN_PART.to_string(), rels_path_for(MAIN_PART), name.clone()] {
            self.dirty.insert(dirty);
        }
        Ok(name)
    }

    /// Opens a header/footer part for editing; the part is written back on
    /// save.
    pub(crate) fn part_context(&mut self, name: &str) -> Option<PartContext<'_>> {
        let part = self.parts.get_mut(name)?;
        self.dirty.insert(name.to_string());
        Some(PartContext {
            name: name.to_string(),
            part,
            package: &mut self.package,
            next_drawing_id: &mut self.next_drawing_id,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_document_has_one_a4_section() {
        let doc = Document::new();
        assert_eq!(doc.section_count(), 1);
        let g = doc.section(0).unwrap().geometry();
        assert_eq!(g.usable_width_dxa(), 9638);
        assert!(!doc.even_and_odd_headers());
    }

    #[test]
    fn new_header_is_inherited_by_later_sections() {
        let mut doc = Document::new();
        let name = doc
            .header_footer_part(0, PartKind::Header, Variant::Default)
            .unwrap();
        assert_eq!(name, "word/header1.xml");
        let again = doc
            .header_footer_part(0, PartKind::Header, Variant::Default)
            .unwrap();
        assert_eq!(name, again);
        let footer = doc
            .header_footer_part(0, PartKind::Footer, Variant::First)
            .unwrap();
        assert_eq!(footer, "word/footer1.xml");
        assert!(doc.header_footer(0, PartKind::Header, Variant::Even).is_none());
    }

    #[test]
    fn blank_document_round_trips() {
        let mut doc = Document::new();
        doc.header_footer_part(0, PartKind::Footer, Variant::Default)
            .unwrap();
        assert!(doc.enable_even_and_odd_headers().unwrap());
        assert!(!doc.enable_even_and_odd_headers().unwrap());
        let bytes = doc.to_bytes().unwrap();
        let reopened = Document::from_bytes(&bytes).unwrap();
        assert!(reopened.even_and_odd_headers());
        assert!(
            reopened
                .header_footer(0, PartKind::Footer, Variant::Default)
                .is_some()
        );
    }

    #[test]
    fn not_a_zip_is_invalid_docx() {
        let err = Document::from_bytes(b"plain text").err().unwrap();
        assert!(matches!(err, Error::InvalidDocx(_)));
    }
}
