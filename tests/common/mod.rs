#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use docx_hf_compose::xml::XmlElement;
use docx_hf_compose::Document;
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// US Letter with 1" margins: 9360 dxa of usable width.
pub const LETTER_USABLE_DXA: i64 = 9360;

fn sect_pr(extra: &str) -> String {
    format!(
        "<w:sectPr>{extra}<w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
         <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
         w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/>\
         <w:cols w:space=\"720\"/><w:docGrid w:linePitch=\"360\"/></w:sectPr>"
    )
}

/// Builds a DOCX with `sections` Letter-sized sections. `section_refs[i]`
/// is spliced verbatim at the start of section i's `w:sectPr`; `extra`
/// entries are added to the package as-is.
pub struct DocxBuilder {
    sections: usize,
    section_refs: Vec<String>,
    rels: Vec<(String, String, String)>,
    overrides: Vec<(String, String)>,
    extra: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new(sections: usize) -> Self {
        DocxBuilder {
            sections,
            section_refs: vec![String::new(); sections],
            rels: Vec::new(),
            overrides: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Adds `word/header{n}.xml` holding one paragraph of `text`, shown as
    /// the default header of `section`.
    pub fn with_header(mut self, section: usize, n: usize, text: &str) -> Self {
        let rid = format!("rIdH{n}");
        let name = format!("header{n}.xml");
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:hdr xmlns:w=\"{W_NS}\" xmlns:r=\"{R_NS}\">\
             <w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:hdr>"
        );
        self.section_refs[section]
            .push_str(&format!("<w:headerReference w:type=\"default\" r:id=\"{rid}\"/>"));
        self.rels.push((
            rid,
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header".into(),
            name.clone(),
        ));
        self.overrides.push((
            format!("/word/{name}"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml".into(),
        ));
        self.extra.push((format!("word/{name}"), xml.into_bytes()));
        self
    }

    pub fn with_entry(mut self, name: &str, data: &[u8]) -> Self {
        self.extra.push((name.to_string(), data.to_vec()));
        self
    }

    fn document_xml(&self) -> String {
        let mut body = String::new();
        for i in 0..self.sections {
            let text = format!("<w:r><w:t>Section {}</w:t></w:r>", i + 1);
            if i + 1 < self.sections {
                body.push_str(&format!(
                    "<w:p><w:pPr>{}</w:pPr>{text}</w:p>",
                    sect_pr(&self.section_refs[i])
                ));
            } else {
                body.push_str(&format!("<w:p>{text}</w:p>"));
                body.push_str(&sect_pr(&self.section_refs[i]));
            }
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"{W_NS}\" xmlns:r=\"{R_NS}\"><w:body>{body}</w:body></w:document>"
        )
    }

    pub fn build(self) -> Vec<u8> {
        let overrides: String = self
            .overrides
            .iter()
            .map(|(part, ct)| format!("<Override PartName=\"{part}\" ContentType=\"{ct}\"/>"))
            .collect();
        let content_types = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
             <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
             <Override PartName=\"/word/document.xml\" \
             ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
             {overrides}</Types>"
        );
        let package_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
             Target=\"word/document.xml\"/></Relationships>";
        let rels: String = self
            .rels
            .iter()
            .map(|(id, ty, target)| {
                format!("<Relationship Id=\"{id}\" Type=\"{ty}\" Target=\"{target}\"/>")
            })
            .collect();
        let document_rels = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{rels}</Relationships>"
        );

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut entries: Vec<(String, Vec<u8>)> = vec![
            ("[Content_Types].xml".into(), content_types.into_bytes()),
            ("_rels/.rels".into(), package_rels.as_bytes().to_vec()),
            ("word/document.xml".into(), self.document_xml().into_bytes()),
            ("word/_rels/document.xml.rels".into(), document_rels.into_bytes()),
        ];
        entries.extend(self.extra);
        for (name, data) in entries {
            zip.start_file(name, options).unwrap();
            zip.write_all(&data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn open(self) -> Document {
        Document::from_bytes(&self.build()).unwrap()
    }
}

/// Writes a solid PNG of the given pixel size into `dir`.
pub fn png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    png_with_color(dir, name, width, height, [200, 30, 30])
}

pub fn png_with_color(dir: &Path, name: &str, width: u32, height: u32, rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb(rgb))
        .save(&path)
        .unwrap();
    path
}

pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    zip.file_names().map(str::to_string).collect()
}

pub fn zip_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = zip.by_name(name).unwrap();
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    data
}

pub fn zip_text(bytes: &[u8], name: &str) -> String {
    String::from_utf8(zip_entry(bytes, name)).unwrap()
}

/// The three `w:tc` of the first zone table in a header/footer root.
pub fn zone_cells(root: &XmlElement) -> Vec<&XmlElement> {
    root.find("w:tbl")
        .and_then(|t| t.find("w:tr"))
        .map(|tr| tr.find_all("w:tc").collect())
        .unwrap_or_default()
}

pub fn child_names(el: &XmlElement) -> Vec<&str> {
    el.elements().map(|e| e.name.as_str()).collect()
}

pub fn all<'a>(el: &'a XmlElement, name: &'a str) -> Vec<&'a XmlElement> {
    let mut out = Vec::new();
    el.descendants(name, &mut out);
    out
}
