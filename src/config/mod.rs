//! Turns a raw, declarative configuration into typed per-role zone content.

mod source;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

pub use source::{load, load_json, load_yaml};
#[cfg(feature = "excel")]
pub use source::load_excel;

use crate::docx::{PartKind, Variant};
use crate::elements::{Element, ElementFactory};
use crate::error::Error;
use crate::ooxml::{HexColor, ZONE_COLUMNS};

/// A header or footer flavor a configuration can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Header,
    Footer,
    HeaderFirst,
    FooterFirst,
    HeaderEven,
    FooterEven,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Header,
        Role::Footer,
        Role::HeaderFirst,
        Role::FooterFirst,
        Role::HeaderEven,
        Role::FooterEven,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Role::Header => "header",
            Role::Footer => "footer",
            Role::HeaderFirst => "header_first",
            Role::FooterFirst => "footer_first",
            Role::HeaderEven => "header_even",
            Role::FooterEven => "footer_even",
        }
    }

    pub fn kind(self) -> PartKind {
        match self {
            Role::Header | Role::HeaderFirst | Role::HeaderEven => PartKind::Header,
            Role::Footer | Role::FooterFirst | Role::FooterEven => PartKind::Footer,
        }
    }

    pub fn variant(self) -> Variant {
        match self {
            Role::Header | Role::Footer => Variant::Default,
            Role::HeaderFirst | Role::FooterFirst => Variant::First,
            Role::HeaderEven | Role::FooterEven => Variant::Even,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One of the three columns of a header/footer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    Left,
    Center,
    Right,
}

impl Zone {
    pub const ALL: [Zone; ZONE_COLUMNS] = [Zone::Left, Zone::Center, Zone::Right];

    pub fn key(self) -> &'static str {
        match self {
            Zone::Left => "left",
            Zone::Center => "center",
            Zone::Right => "right",
        }
    }

    pub fn column(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A full-width rule above or below the zone table.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleLine {
    pub thickness_pt: f64,
    pub color: HexColor,
}

/// Resolved content of one role. The special keys are kept raw and
/// interpreted when the role is composed.
#[derive(Debug, Default)]
pub struct SectionConfig {
    pub col_widths: Option<Value>,
    pub top_line: Option<Value>,
    pub bottom_line: Option<Value>,
    pub distance_cm: Option<Value>,
    pub zones: BTreeMap<Zone, Vec<Element>>,
}

const DEFAULT_RATIOS: [f64; ZONE_COLUMNS] = [1.0, 1.0, 1.0];

impl SectionConfig {
    /// Column proportions; anything other than three finite, non-negative
    /// numbers with a positive sum falls back to equal thirds.
    pub fn column_ratios(&self) -> [f64; ZONE_COLUMNS] {
        let Some(raw) = &self.col_widths else {
            return DEFAULT_RATIOS;
        };
        let parsed: Option<Vec<f64>> = raw
            .as_array()
            .map(|a| a.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
            .unwrap_or_default();
        match parsed.as_deref() {
            Some(&[l, c, r])
                if [l, c, r].iter().all(|v| v.is_finite() && *v >= 0.0) && l + c + r > 0.0 =>
            {
                [l, c, r]
            }
            _ => {
                log::warn!("_col_widths {raw} is not three non-negative numbers with a positive sum; using [1, 1, 1]");
                DEFAULT_RATIOS
            }
        }
    }

    pub fn top_rule(&self) -> Result<Option<RuleLine>, Error> {
        rule_line("_top_line", self.top_line.as_ref())
    }

    pub fn bottom_rule(&self) -> Result<Option<RuleLine>, Error> {
        rule_line("_bottom_line", self.bottom_line.as_ref())
    }

    /// `_distance_cm` as a number, if it reads as one.
    pub fn distance(&self) -> Option<f64> {
        match self.distance_cm.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn rule_line(key: &str, raw: Option<&Value>) -> Result<Option<RuleLine>, Error> {
    let spec = match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(None),
        Some(Value::Object(spec)) => spec,
        Some(other) => {
            return Err(Error::Config(format!("{key} must be a mapping, found {other}")));
        }
    };
    let thickness_pt = match spec.get("thickness_pt") {
        None | Some(Value::Null) => 1.0,
        Some(v) => v
            .as_f64()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .ok_or_else(|| Error::Config(format!("{key}.thickness_pt must be a number, found {v}")))?,
    };
    let color = match spec.get("color") {
        None | Some(Value::Null) => HexColor::default(),
        Some(Value::String(s)) => HexColor::parse(s)?,
        Some(other) => return Err(Error::InvalidColor(other.to_string())),
    };
    Ok(Some(RuleLine { thickness_pt, color }))
}

#[derive(Debug, Default)]
pub struct ResolvedConfig {
    /// Keep existing header/footer content and append after it.
    pub merge: bool,
    pub roles: BTreeMap<Role, SectionConfig>,
}

impl ResolvedConfig {
    pub fn has_first_page_roles(&self) -> bool {
        self.roles.keys().any(|r| r.variant() == Variant::First)
    }

    pub fn has_even_page_roles(&self) -> bool {
        self.roles.keys().any(|r| r.variant() == Variant::Even)
    }
}

/// An element that was dropped while resolving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub role: Role,
    pub zone: Zone,
    pub attempted_type: Option<String>,
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.role, self.zone)?;
        if let Some(t) = &self.attempted_type {
            write!(f, " type={t}")?;
        }
        write!(f, ": {}", self.reason)
    }
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub config: ResolvedConfig,
    pub diagnostics: Vec<Diagnostic>,
}

/// Accepts the spellings people put in YAML and spreadsheets for a flag.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" | "" => Some(false),
        _ => None,
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => parse_flag(s).unwrap_or(true),
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Resolves `raw` into typed roles. Individual elements that fail to build
/// are dropped and reported; only a malformed root or role is an error.
pub fn resolve(raw: &Value, factory: &ElementFactory) -> Result<Resolution, Error> {
    let root = raw.as_object().ok_or_else(|| {
        Error::Config(format!("configuration root must be a mapping, found {}", type_name(raw)))
    })?;

    let mut resolution = Resolution::default();
    resolution.config.merge = root.get("_merge").is_some_and(truthy);

    for role in Role::ALL {
        let section = match root.get(role.key()) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(section)) if section.is_empty() => continue,
            Some(Value::Object(section)) => section,
            Some(other) => {
                return Err(Error::Config(format!(
                    "'{role}' must be a mapping, found {}",
                    type_name(other)
                )));
            }
        };
        let resolved = resolve_section(role, section, factory, &mut resolution.diagnostics);
        resolution.config.roles.insert(role, resolved);
    }

    for d in &resolution.diagnostics {
        log::warn!("Skipping element ({d})");
    }
    Ok(resolution)
}

fn resolve_section(
    role: Role,
    section: &Map<String, Value>,
    factory: &ElementFactory,
    diagnostics: &mut Vec<Diagnostic>,
) -> SectionConfig {
    let special = |key: &str| section.get(key).cloned();
    let mut resolved = SectionConfig {
        col_widths: special("_col_widths"),
        top_line: special("_top_line"),
        bottom_line: special("_bottom_line"),
        distance_cm: special("_distance_cm"),
        zones: BTreeMap::new(),
    };

    for zone in Zone::ALL {
        let mut report = |attempted_type: Option<String>, reason: String| {
            diagnostics.push(Diagnostic {
                role,
                zone,
                attempted_type,
                reason,
            })
        };
        let entries = match section.get(zone.key()) {
            None | Some(Value::Null) => continue,
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                report(None, format!("zone must be a list, found {}", type_name(other)));
                continue;
            }
        };

        let mut elements = Vec::new();
        for entry in entries {
            if !entry.is_object() {
                report(None, format!("entry must be a mapping, found {}", type_name(entry)));
                continue;
            }
            let kind = match entry.get("type") {
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) if s.is_empty() => continue,
                Some(Value::String(s)) => s.clone(),
                Some(other) => {
                    report(Some(other.to_string()), "type must be a string".into());
                    continue;
                }
            };
            match factory.create(entry) {
                Ok(element) => elements.push(element),
                Err(e) => report(Some(kind), e.to_string()),
            }
        }
        if !elements.is_empty() {
            resolved.zones.insert(zone, elements);
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(raw: Value) -> Resolution {
        resolve(&raw, &ElementFactory::new()).unwrap()
    }

    #[test]
    fn partial_failure_keeps_valid_siblings() {
        let res = run(json!({
            "header": {
                "center": [
                    {"type": "text", "value": "a"},
                    {"type": "sparkline"},
                    {"type": "field", "value": " PAGE "}
                ],
                "right": [{"type": "text", "value": "b"}]
            }
        }));
        let header = &res.config.roles[&Role::Header];
        assert_eq!(header.zones[&Zone::Center].len(), 2);
        assert_eq!(header.zones[&Zone::Right].len(), 1);
        assert_eq!(res.diagnostics.len(), 1);
        let d = &res.diagnostics[0];
        assert_eq!((d.role, d.zone), (Role::Header, Zone::Center));
        assert_eq!(d.attempted_type.as_deref(), Some("sparkline"));
    }

    #[test]
    fn empty_type_is_dropped_silently() {
        let res = run(json!({"footer": {"left": [{"type": ""}, {"value": "x"}]}}));
        assert!(res.diagnostics.is_empty());
        let footer = &res.config.roles[&Role::Footer];
        assert!(footer.zones.is_empty());
    }

    #[test]
    fn non_mapping_root_or_role_is_fatal() {
        let factory = ElementFactory::new();
        assert!(matches!(resolve(&json!([1, 2]), &factory), Err(Error::Config(_))));
        assert!(matches!(
            resolve(&json!({"header": [1]}), &factory),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn null_and_empty_roles_are_absent() {
        let res = run(json!({"header": null, "footer": {}, "logo": {"left": []}}));
        assert!(res.config.roles.is_empty());
    }

    #[test]
    fn malformed_zones_are_diagnosed() {
        let res = run(json!({"header": {"left": "logo.png", "right": [42, {"type": "text"}]}}));
        assert_eq!(res.diagnostics.len(), 2);
        assert_eq!(res.config.roles[&Role::Header].zones[&Zone::Right].len(), 1);
    }

    #[test]
    fn merge_and_special_keys_are_hoisted() {
        let res = run(json!({
            "_merge": true,
            "header_even": {"_col_widths": [2, 1, 2], "_distance_cm": "1.25", "center": []}
        }));
        assert!(res.config.merge);
        assert!(res.config.has_even_page_roles());
        assert!(!res.config.has_first_page_roles());
        let even = &res.config.roles[&Role::HeaderEven];
        assert_eq!(even.column_ratios(), [2.0, 1.0, 2.0]);
        assert_eq!(even.distance(), Some(1.25));
    }

    #[test]
    fn bad_ratios_fall_back_to_thirds() {
        for raw in [json!([0, 0, 0]), json!([1, 2]), json!("wide"), json!([1, -1, 3])] {
            let s = SectionConfig {
                col_widths: Some(raw),
                ..SectionConfig::default()
            };
            assert_eq!(s.column_ratios(), [1.0, 1.0, 1.0]);
        }
    }

    #[test]
    fn rule_defaults_and_colors() {
        let s = SectionConfig {
            top_line: Some(json!({})),
            bottom_line: Some(json!({"thickness_pt": 2, "color": "#ff0000"})),
            ..SectionConfig::default()
        };
        let top = s.top_rule().unwrap().unwrap();
        assert_eq!(top.thickness_pt, 1.0);
        assert_eq!(top.color.as_str(), "000000");
        assert_eq!(s.bottom_rule().unwrap().unwrap().color.as_str(), "FF0000");

        let bad = SectionConfig {
            top_line: Some(json!({"color": "crimson"})),
            ..SectionConfig::default()
        };
        assert!(matches!(bad.top_rule(), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn roles_map_to_parts() {
        assert_eq!(Role::FooterFirst.kind(), PartKind::Footer);
        assert_eq!(Role::FooterFirst.variant(), Variant::First);
        assert_eq!(Role::HeaderEven.key(), "header_even");
    }
}
