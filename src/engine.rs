use std::path::Path;
use std::time::Instant;

use serde_json::Value;

use crate::compose::apply_sections;
use crate::config::{self, Diagnostic, Resolution, resolve};
use crate::docx::Document;
use crate::elements::ElementFactory;
use crate::error::Error;

/// What one `apply` call did.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Elements dropped during resolution.
    pub diagnostics: Vec<Diagnostic>,
    /// Header/footer parts written, in composition order.
    pub parts_composed: Vec<String>,
}

/// Entry point: composes headers and footers of one document from
/// configurations.
///
/// ```no_run
/// use docx_hf_compose::{Document, HeaderFooterEngine};
/// use serde_json::json;
///
/// let mut doc = Document::open("report.docx".as_ref())?;
/// HeaderFooterEngine::new(&mut doc).apply(
///     &json!({"footer": {"center": [{"type": "field", "value": " PAGE "}]}}),
///     false,
/// )?;
/// doc.save("report.docx".as_ref())?;
/// # Ok::<(), docx_hf_compose::Error>(())
/// ```
pub struct HeaderFooterEngine<'d> {
    document: &'d mut Document,
    factory: ElementFactory,
}

impl<'d> HeaderFooterEngine<'d> {
    pub fn new(document: &'d mut Document) -> Self {
        HeaderFooterEngine {
            document,
            factory: ElementFactory::new(),
        }
    }

    pub fn with_factory(mut self, factory: ElementFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn factory_mut(&mut self) -> &mut ElementFactory {
        &mut self.factory
    }

    /// Resolves without touching the document.
    pub fn check(&self, config: &Value) -> Result<Vec<Diagnostic>, Error> {
        Ok(resolve(config, &self.factory)?.diagnostics)
    }

    /// Applies `config` to every section. `merge` keeps existing header and
    /// footer content; it replaces any root `_merge` the configuration carries.
    pub fn apply(&mut self, config: &Value, merge: bool) -> Result<ApplyReport, Error> {
        let t0 = Instant::now();
        let Resolution {
            config: mut resolved,
            diagnostics,
        } = resolve(config, &self.factory)?;
        resolved.merge = merge;
        let t_resolve = t0.elapsed();

        let parts_composed = apply_sections(self.document, &resolved)?;
        let t_total = t0.elapsed();

        log::info!(
            "Timing: resolve={:.1}ms, compose={:.1}ms, total={:.1}ms ({} role(s), {} part(s), {} element(s) skipped)",
            t_resolve.as_secs_f64() * 1000.0,
            (t_total - t_resolve).as_secs_f64() * 1000.0,
            t_total.as_secs_f64() * 1000.0,
            resolved.roles.len(),
            parts_composed.len(),
            diagnostics.len(),
        );

        Ok(ApplyReport {
            diagnostics,
            parts_composed,
        })
    }

    /// Loads a YAML, JSON or spreadsheet configuration and applies it.
    pub fn apply_from_source(&mut self, path: &Path, merge: bool) -> Result<ApplyReport, Error> {
        let raw = config::load(path)?;
        self.apply(&raw, merge)
    }

    pub fn apply_yaml(&mut self, path: &Path, merge: bool) -> Result<ApplyReport, Error> {
        let raw = config::load_yaml(path)?;
        self.apply(&raw, merge)
    }

    #[cfg(feature = "excel")]
    pub fn apply_excel(&mut self, path: &Path, merge: bool) -> Result<ApplyReport, Error> {
        let raw = config::load_excel(path)?;
        self.apply(&raw, merge)
    }
}
