mod common;

use common::{DocxBuilder, all, zip_entry, zip_names, zip_text};
use docx_hf_compose::docx::{PartKind, Variant};
use docx_hf_compose::xml::XmlElement;
use docx_hf_compose::{Document, HeaderFooterEngine};
use serde_json::json;

fn sect_prs(doc_bytes: &[u8]) -> Vec<XmlElement> {
    let main = XmlElement::parse(&zip_text(doc_bytes, "word/document.xml")).unwrap();
    all(&main, "w:sectPr").into_iter().cloned().collect()
}

#[test]
fn one_part_serves_every_section() {
    let mut doc = DocxBuilder::new(3).open();
    let report = HeaderFooterEngine::new(&mut doc)
        .apply(&json!({"header": {"center": [{"type": "text", "value": "Shared"}]}}), false)
        .unwrap();
    assert_eq!(report.parts_composed, ["word/header1.xml"]);
    for index in 0..3 {
        assert_eq!(
            doc.resolve_header_footer(index, PartKind::Header, Variant::Default)
                .as_deref(),
            Some("word/header1.xml")
        );
    }

    let bytes = doc.to_bytes().unwrap();
    let sections = sect_prs(&bytes);
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].find_all("w:headerReference").count(), 1);
    assert_eq!(sections[1].find_all("w:headerReference").count(), 0);
    assert_eq!(sections[2].find_all("w:headerReference").count(), 0);
    // References precede the page size.
    let names: Vec<_> = sections[0].elements().map(|e| e.name.as_str()).collect();
    assert_eq!(names[0], "w:headerReference");
}

#[test]
fn sections_with_their_own_header_keep_it() {
    let mut doc = DocxBuilder::new(2).with_header(1, 1, "Annex").open();
    let report = HeaderFooterEngine::new(&mut doc)
        .apply(&json!({"header": {"right": [{"type": "text", "value": "Doc"}]}}), false)
        .unwrap();
    assert_eq!(report.parts_composed, ["word/header2.xml", "word/header1.xml"]);
    assert_eq!(
        doc.resolve_header_footer(1, PartKind::Header, Variant::Default)
            .as_deref(),
        Some("word/header1.xml")
    );
}

#[test]
fn first_page_roles_enable_title_page_once() {
    let config = json!({"header_first": {"center": [{"type": "text", "value": "Cover"}]}});
    let mut doc = DocxBuilder::new(2).open();
    let mut engine = HeaderFooterEngine::new(&mut doc);
    engine.apply(&config, false).unwrap();
    engine.apply(&config, false).unwrap();

    let bytes = doc.to_bytes().unwrap();
    for sect_pr in sect_prs(&bytes) {
        assert_eq!(sect_pr.find_all("w:titlePg").count(), 1);
    }
    let first = doc
        .header_footer(1, PartKind::Header, Variant::First)
        .unwrap();
    assert!(first.text_content().contains("Cover"));
}

#[test]
fn even_roles_switch_on_even_and_odd_headers() {
    let mut doc = DocxBuilder::new(1).open();
    assert!(!doc.even_and_odd_headers());
    HeaderFooterEngine::new(&mut doc)
        .apply(&json!({"footer_even": {"left": [{"type": "field", "value": " PAGE "}]}}), false)
        .unwrap();
    assert!(doc.even_and_odd_headers());

    let bytes = doc.to_bytes().unwrap();
    let names = zip_names(&bytes);
    assert!(names.contains(&"word/settings.xml".to_string()));
    let settings = zip_text(&bytes, "word/settings.xml");
    assert!(settings.contains("<w:evenAndOddHeaders/>"));
    let rels = zip_text(&bytes, "word/_rels/document.xml.rels");
    assert!(rels.contains("relationships/settings"));

    let reopened = Document::from_bytes(&bytes).unwrap();
    assert!(reopened.even_and_odd_headers());
    let footer = sect_prs(&bytes)[0]
        .find("w:footerReference")
        .cloned()
        .unwrap();
    assert_eq!(footer.attr("w:type"), Some("even"));
}

#[test]
fn distance_sets_page_margin() {
    let mut doc = DocxBuilder::new(2).open();
    HeaderFooterEngine::new(&mut doc)
        .apply(
            &json!({
                "header": {"_distance_cm": 1.25, "left": [{"type": "text", "value": "a"}]},
                "footer": {"_distance_cm": "0.5"}
            }),
            false,
        )
        .unwrap();
    let bytes = doc.to_bytes().unwrap();
    for sect_pr in sect_prs(&bytes) {
        let pg_mar = sect_pr.find("w:pgMar").unwrap();
        assert_eq!(pg_mar.attr("w:header"), Some("709"));
        assert_eq!(pg_mar.attr("w:footer"), Some("283"));
        assert_eq!(pg_mar.attr("w:top"), Some("1440"));
    }
}

#[test]
fn saved_package_registers_new_parts() {
    let mut doc = DocxBuilder::new(1)
        .with_entry("customXml/item1.xml", b"<root>untouched</root>")
        .open();
    HeaderFooterEngine::new(&mut doc)
        .apply(
            &json!({
                "header": {"left": [{"type": "text", "value": "H"}]},
                "footer": {"right": [{"type": "text", "value": "F"}]}
            }),
            false,
        )
        .unwrap();
    let bytes = doc.to_bytes().unwrap();

    assert_eq!(zip_names(&bytes)[0], "[Content_Types].xml");
    let content_types = zip_text(&bytes, "[Content_Types].xml");
    assert!(content_types.contains("PartName=\"/word/header1.xml\""));
    assert!(content_types.contains("PartName=\"/word/footer1.xml\""));
    let rels = zip_text(&bytes, "word/_rels/document.xml.rels");
    assert!(rels.contains("Target=\"header1.xml\""));
    assert!(rels.contains("Target=\"footer1.xml\""));
    assert_eq!(zip_entry(&bytes, "customXml/item1.xml"), b"<root>untouched</root>");
    for name in zip_names(&bytes) {
        if name.ends_with(".xml") || name.ends_with(".rels") {
            let xml = zip_text(&bytes, &name);
            roxmltree::Document::parse(&xml).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    let reopened = Document::from_bytes(&bytes).unwrap();
    let footer = reopened
        .header_footer(0, PartKind::Footer, Variant::Default)
        .unwrap();
    assert_eq!(common::zone_cells(footer)[2].text_content(), "F");
}

#[test]
fn blank_document_when_no_input() {
    let mut doc = Document::new();
    HeaderFooterEngine::new(&mut doc)
        .apply(&json!({"header": {"center": [{"type": "text", "value": "Draft"}]}}), false)
        .unwrap();
    let reopened = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    assert_eq!(reopened.section_count(), 1);
    let header = reopened
        .header_footer(0, PartKind::Header, Variant::Default)
        .unwrap();
    assert!(header.text_content().contains("Draft"));
}

#[test]
fn title_page_and_even_pages_combine() {
    let mut doc = DocxBuilder::new(2).open();
    HeaderFooterEngine::new(&mut doc)
        .apply(
            &json!({
                "header": {"center": [{"type": "text", "value": "Odd"}]},
                "header_first": {"center": [{"type": "text", "value": "Cover"}]},
                "header_even": {"center": [{"type": "text", "value": "Even"}]}
            }),
            false,
        )
        .unwrap();
    assert!(doc.even_and_odd_headers());

    let bytes = doc.to_bytes().unwrap();
    for sect_pr in sect_prs(&bytes) {
        assert_eq!(sect_pr.find_all("w:titlePg").count(), 1);
    }
    let types: Vec<_> = sect_prs(&bytes)[0]
        .find_all("w:headerReference")
        .filter_map(|r| r.attr("w:type").map(str::to_string))
        .collect();
    assert_eq!(types.len(), 3);
    for variant in ["default", "first", "even"] {
        assert!(types.iter().any(|t| t == variant), "missing {variant}");
    }
    for (variant, text) in [
        (Variant::Default, "Odd"),
        (Variant::First, "Cover"),
        (Variant::Even, "Even"),
    ] {
        let part = doc.header_footer(1, PartKind::Header, variant).unwrap();
        assert!(part.text_content().contains(text));
    }
}
