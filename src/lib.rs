mod compose;
pub mod config;
pub mod docx;
pub mod elements;
mod engine;
mod error;
pub mod ooxml;
pub mod units;
pub mod xml;

pub use docx::Document;
pub use engine::{ApplyReport, HeaderFooterEngine};
pub use error::Error;

use std::path::Path;
use std::time::Instant;

/// Applies the layout configuration at `layout` to `input` (or to a blank
/// A4 document) and writes the result to `output`.
pub fn compose_docx(
    layout: &Path,
    input: Option<&Path>,
    output: &Path,
    merge: bool,
) -> Result<ApplyReport, Error> {
    let t0 = Instant::now();

    let mut doc = match input {
        Some(path) => Document::open(path)?,
        None => Document::new(),
    };
    let raw = config::load(layout)?;
    let t_load = t0.elapsed();

    let report = HeaderFooterEngine::new(&mut doc).apply(&raw, merge)?;
    let t_compose = t0.elapsed();

    let bytes = doc.to_bytes()?;
    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: load={:.1}ms, compose={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_load.as_secs_f64() * 1000.0,
        (t_compose - t_load).as_secs_f64() * 1000.0,
        (t_total - t_compose).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(report)
}
