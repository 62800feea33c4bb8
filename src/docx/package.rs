use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read, Seek, Write};

use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::xml::XmlElement;

pub(crate) const CONTENT_TYPES: &str = "[Content_Types].xml";
const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub(crate) const RT_HEADER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
pub(crate) const RT_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
pub(crate) const RT_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const RT_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

/// Location of the relationships part for `part_path`,
/// e.g. "word/header1.xml" → "word/_rels/header1.xml.rels".
pub(crate) fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part_path}.rels"),
    }
}

/// Resolves a relationship target against the part that owns it.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Inverse of `resolve_target` for parts that share a directory prefix;
/// anything else gets an absolute target.
pub(crate) fn relative_target(source_part: &str, part: &str) -> String {
    let dir = source_part.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
    match part.strip_prefix(dir).and_then(|rest| rest.strip_prefix('/')) {
        Some(rel) if !dir.is_empty() => rel.to_string(),
        _ => format!("/{part}"),
    }
}

#[derive(Clone, Debug)]
pub struct Relationships {
    root: XmlElement,
}

impl Relationships {
    pub fn empty() -> Self {
        Relationships {
            root: XmlElement::new("Relationships").with_attr("xmlns", PKG_REL_NS),
        }
    }

    pub fn parse(xml: &str) -> Result<Self, Error> {
        Ok(Relationships {
            root: XmlElement::parse(xml)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.root.find("Relationship").is_none()
    }

    pub fn target(&self, id: &str) -> Option<&str> {
        self.root
            .find_all("Relationship")
            .find(|r| r.attr("Id") == Some(id))
            .and_then(|r| r.attr("Target"))
    }

    /// First relationship of `rel_type` as (id, target).
    pub fn find_by_type(&self, rel_type: &str) -> Option<(&str, &str)> {
        self.root
            .find_all("Relationship")
            .filter(|r| r.attr("Type") == Some(rel_type))
            .find_map(|r| Some((r.attr("Id")?, r.attr("Target")?)))
    }

    pub fn targets_of_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.root
            .find_all("Relationship")
            .filter(move |r| r.attr("Type") == Some(rel_type))
            .filter_map(|r| r.attr("Target"))
    }

    /// Reuses an existing relationship with the same type and target.
    pub fn get_or_add(&mut self, rel_type: &str, target: &str) -> String {
        let existing = self.root.find_all("Relationship").find(|r| {
            r.attr("Type") == Some(rel_type)
                && r.attr("Target") == Some(target)
                && r.attr("TargetMode").is_none()
        });
        if let Some(id) = existing.and_then(|r| r.attr("Id")) {
            return id.to_string();
        }
        let id = self.next_id();
        self.root.push(
            XmlElement::new("Relationship")
                .with_attr("Id", id.as_str())
                .with_attr("Type", rel_type)
                .with_attr("Target", target),
        );
        id
    }

    fn next_id(&self) -> String {
        let used: Vec<&str> = self
            .root
            .find_all("Relationship")
            .filter_map(|r| r.attr("Id"))
            .collect();
        let mut n = used.len() + 1;
        while used.contains(&format!("rId{n}").as_str()) {
            n += 1;
        }
        format!("rId{n}")
    }

    pub fn to_xml(&self) -> String {
        self.root.to_xml()
    }
}

fn image_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// The ZIP container: raw entries in their original order plus the parsed
/// content-type table.
pub(crate) struct Package {
    entries: BTreeMap<String, Vec<u8>>,
    order: Vec<String>,
    content_types: XmlElement,
    media_by_hash: HashMap<[u8; 32], String>,
}

impl Package {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;
        let mut entries = BTreeMap::new();
        let mut order = Vec::new();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let name = file.name().to_string();
            if name.ends_with('/') {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            order.push(name.clone());
            entries.insert(name, data);
        }
        Self::from_entries(entries, order)
    }

    pub fn from_entries(entries: BTreeMap<String, Vec<u8>>, order: Vec<String>) -> Result<Self, Error> {
        let ct_xml = entries
            .get(CONTENT_TYPES)
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .ok_or_else(|| Error::InvalidDocx("missing [Content_Types].xml".into()))?;
        let content_types = XmlElement::parse(&ct_xml)?;

        let media_by_hash: HashMap<[u8; 32], String> = entries
            .iter()
            .filter(|(name, _)| name.starts_with("word/media/"))
            .map(|(name, data)| (Sha256::digest(data).into(), name.clone()))
            .collect();

        Ok(Package {
            entries,
            order,
            content_types,
            media_by_hash,
        })
    }

    /// A package holding only the content-type table and the given entries.
    pub fn blank(content_types: XmlElement, entries: Vec<(String, Vec<u8>)>) -> Self {
        let order = entries.iter().map(|(name, _)| name.clone()).collect();
        Package {
            entries: entries.into_iter().collect(),
            order,
            content_types,
            media_by_hash: HashMap::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn read_text(&self, name: &str) -> Option<String> {
        self.entries
            .get(name)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn put(&mut self, name: &str, data: Vec<u8>) {
        if self.entries.insert(name.to_string(), data).is_none() {
            self.order.push(name.to_string());
        }
    }

    pub fn add_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{part}");
        let exists = self
            .content_types
            .find_all("Override")
            .any(|o| o.attr("PartName") == Some(part_name.as_str()));
        if !exists {
            self.content_types.push(
                XmlElement::new("Override")
                    .with_attr("PartName", part_name)
                    .with_attr("ContentType", content_type),
            );
        }
    }

    fn add_default(&mut self, ext: &str, content_type: &str) {
        let exists = self
            .content_types
            .find_all("Default")
            .any(|d| d.attr("Extension").is_some_and(|e| e.eq_ignore_ascii_case(ext)));
        if !exists {
            // Defaults precede overrides in Word's own output.
            let at = self
                .content_types
                .elements()
                .position(|e| e.is("Override"))
                .and_then(|n| self.content_types.element_position(n));
            let default = XmlElement::new("Default")
                .with_attr("Extension", ext)
                .with_attr("ContentType", content_type);
            match at {
                Some(i) => self.content_types.insert(i, default),
                None => self.content_types.push(default),
            }
        }
    }

    /// Stores an image once per distinct content and returns its part name.
    pub fn add_media(&mut self, data: Vec<u8>, ext: &str) -> String {
        let hash: [u8; 32] = Sha256::digest(&data).into();
        if let Some(existing) = self.media_by_hash.get(&hash) {
            return existing.clone();
        }
        let mut n = 1;
        let name = loop {
            let candidate = format!("word/media/image{n}.{ext}");
            if !self.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        self.add_default(ext, image_content_type(ext));
        self.put(&name, data);
        self.media_by_hash.insert(hash, name.clone());
        name
    }

    /// Writes the package. Parts named in `updated` are written from their
    /// serialized XML; everything else is copied byte for byte.
    pub fn write<W: Write + Seek>(
        &self,
        writer: W,
        updated: &BTreeMap<String, String>,
    ) -> Result<W, Error> {
        let mut zip = zip::ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        zip.start_file(CONTENT_TYPES, deflated)?;
        zip.write_all(self.content_types.to_xml().as_bytes())?;

        let fresh = updated.keys().filter(|name| !self.entries.contains_key(*name));
        for name in self.order.iter().chain(fresh) {
            if name == CONTENT_TYPES {
                continue;
            }
            let data: &[u8] = match (updated.get(name), self.entries.get(name)) {
                (Some(xml), _) => xml.as_bytes(),
                (None, Some(raw)) => raw,
                (None, None) => continue,
            };
            // Images don't compress well
            let options = if name.starts_with("word/media/") { stored } else { deflated };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        Ok(zip.finish()?)
    }
}

pub(crate) fn content_types_skeleton() -> XmlElement {
    XmlElement::new("Types")
        .with_attr("xmlns", CT_NS)
        .with_child(
            XmlElement::new("Default")
                .with_attr("Extension", "rels")
                .with_attr("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        )
        .with_child(
            XmlElement::new("Default")
                .with_attr("Extension", "xml")
                .with_attr("ContentType", "application/xml"),
        )
}
