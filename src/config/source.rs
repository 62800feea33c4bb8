//! Reading configurations from files.

use std::path::Path;

use serde_json::Value;

use crate::error::Error;

fn load_error(path: &Path, reason: impl ToString) -> Error {
    Error::ConfigLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_text(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| load_error(path, e))
}

/// Picks a loader from the file extension.
pub fn load(path: &Path) -> Result<Value, Error> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "yaml" | "yml" => load_yaml(path),
        "json" => load_json(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path),
        _ => Err(load_error(
            path,
            format!("unsupported configuration format '{ext}' (expected .yaml, .yml, .json or a spreadsheet)"),
        )),
    }
}

#[cfg(feature = "excel")]
fn load_spreadsheet(path: &Path) -> Result<Value, Error> {
    load_excel(path)
}

#[cfg(not(feature = "excel"))]
fn load_spreadsheet(path: &Path) -> Result<Value, Error> {
    Err(load_error(path, "spreadsheet support requires the `excel` feature"))
}

pub fn load_yaml(path: &Path) -> Result<Value, Error> {
    let text = read_text(path)?;
    serde_yaml::from_str(&text).map_err(|e| load_error(path, e))
}

pub fn load_json(path: &Path) -> Result<Value, Error> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| load_error(path, e))
}

/// Reads the `HEADER` and `FOOTER` sheets. The first row of each names the
/// columns; every following row is one element appended to the zone named in
/// its `zone` column.
#[cfg(feature = "excel")]
pub fn load_excel(path: &Path) -> Result<Value, Error> {
    use calamine::{Reader, open_workbook_auto};

    let mut workbook = open_workbook_auto(path).map_err(|e| load_error(path, e))?;
    let mut config = serde_json::Map::new();
    for (sheet, role) in [("HEADER", "header"), ("FOOTER", "footer")] {
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| load_error(path, format!("sheet {sheet}: {e}")))?;
        let zones = excel::rows_to_zones(range.rows());
        log::debug!("{sheet}: {} zone(s) from {}", zones.len(), path.display());
        config.insert(role.to_string(), Value::Object(zones));
    }
    Ok(Value::Object(config))
}

#[cfg(feature = "excel")]
mod excel {
    use calamine::Data;
    use serde_json::{Map, Number, Value};

    use crate::config::parse_flag;

    const STYLE_COLUMNS: [&str; 6] = ["font", "size", "bold", "italic", "color", "align"];
    const FLAG_COLUMNS: [&str; 3] = ["bold", "italic", "behind_text"];

    fn cell_value(cell: &Data) -> Option<Value> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| Value::String(s.to_string()))
            }
            Data::Bool(b) => Some(Value::Bool(*b)),
            Data::Int(i) => Some(Value::from(*i)),
            // Whole numbers come back as floats; keep them integral so that
            // text cells like a year don't render as "2024.0".
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(Value::from(*f as i64)),
            Data::Float(f) => Number::from_f64(*f).map(Value::Number),
            other => Some(Value::String(other.to_string())),
        }
    }

    fn as_flag(value: Value) -> Value {
        let parsed = match &value {
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => parse_flag(s),
            _ => None,
        };
        parsed.map(Value::Bool).unwrap_or(value)
    }

    pub(super) fn rows_to_zones<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Map<String, Value> {
        let mut zones = Map::new();
        let Some(header) = rows.next() else {
            return zones;
        };
        let columns: Vec<String> = header
            .iter()
            .map(|c| c.to_string().trim().to_ascii_lowercase())
            .collect();

        for row in rows {
            let mut element = Map::new();
            let mut style = Map::new();
            let mut zone = None;
            for (name, cell) in columns.iter().zip(row) {
                let Some(mut value) = cell_value(cell) else {
                    continue;
                };
                if FLAG_COLUMNS.contains(&name.as_str()) {
                    value = as_flag(value);
                }
                match name.as_str() {
                    "" => {}
                    "zone" => zone = value.as_str().map(|z| z.trim().to_ascii_lowercase()),
                    n if STYLE_COLUMNS.contains(&n) => {
                        style.insert(n.to_string(), value);
                    }
                    n => {
                        element.insert(n.to_string(), value);
                    }
                }
            }
            let Some(zone) = zone else {
                if !element.is_empty() {
                    log::debug!("Ignoring spreadsheet row without a zone: {element:?}");
                }
                continue;
            };
            if !style.is_empty() {
                element.insert("style".into(), Value::Object(style));
            }
            if let Value::Array(list) = zones
                .entry(zone)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                list.push(Value::Object(element));
            }
        }
        zones
    }

}
