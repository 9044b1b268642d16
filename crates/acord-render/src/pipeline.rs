//! End-to-end generation: map, fill, flatten, overlay, sign, OCR.

use std::path::{Path, PathBuf};

use lopdf::Document;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use acord_schema::{map_fields, overlay_plan, FormVariant, StructuredInput};

use crate::error::RenderError;
use crate::fill;
use crate::flatten;
use crate::notes;
use crate::ocr;
use crate::overlay;
use crate::signature::{self, SignatureAsset};

pub struct GenerateOptions {
    /// Rasterize the filled form so values survive any viewer.
    pub flatten: bool,
    pub dpi: f32,
    /// Run `ocrmypdf` over the flattened output.
    pub ocr: bool,
    /// Drop the general-liability section pages from the output.
    pub skip_gl: bool,
    pub signature: Option<SignatureAsset>,
    pub signature_font: Option<PathBuf>,
    /// Where to write the notes document. Defaults next to the output.
    pub notes_path: Option<PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            flatten: true,
            dpi: 200.0,
            ocr: false,
            skip_gl: false,
            signature: None,
            signature_font: None,
            notes_path: None,
        }
    }
}

/// Summary of one generation run, also the CLI's JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub filled_count: usize,
    pub total_fields: usize,
    pub skipped_fields: Vec<String>,
    pub ocr_applied: bool,
    pub output_path: PathBuf,
    pub notes_path: Option<PathBuf>,
}

fn derive_notes_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_path.with_file_name(format!("{}_notes.pdf", stem))
}

/// Fill `form_path` from `input` and write the result to
/// `output_path`. The notes document, when any notes are present, is
/// built from the input alone and written as a separate file; it is
/// never merged into the form output.
pub fn generate(
    form_path: &Path,
    input: &StructuredInput,
    variant: FormVariant,
    output_path: &Path,
    opts: &GenerateOptions,
) -> Result<GenerationResult, RenderError> {
    let fields = map_fields(input, variant);
    info!(%variant, fields = fields.len(), "mapped structured input");

    let mut doc = Document::load(form_path)
        .map_err(|e| RenderError::FormUnreadable(format!("{}: {}", form_path.display(), e)))?;
    let report = fill::fill_fields(&mut doc, &fields)?;
    info!(
        filled = report.filled,
        total = report.total,
        skipped = report.skipped.len(),
        "filled form widgets"
    );

    if opts.flatten {
        // The filled-but-interactive document only exists inside this
        // scope; the temp file is removed as soon as rasterization is
        // done with it.
        let staging = NamedTempFile::new()?;
        doc.save(staging.path())
            .map_err(|e| RenderError::Fill(format!("staging save: {}", e)))?;
        drop(doc);

        let excluded: &[usize] = if opts.skip_gl {
            variant.gl_page_indices()
        } else {
            &[]
        };
        let mut flat = flatten::flatten_document(staging.path(), opts.dpi, excluded)?;
        drop(staging);

        overlay::draw_overlays(&mut flat, &overlay_plan(input, variant))?;

        if let Some(asset) = &opts.signature {
            match acord_schema::overlay::signature_rect(variant) {
                Some(rect) => {
                    signature::apply_signature(
                        &mut flat,
                        0,
                        rect,
                        asset,
                        opts.signature_font.as_deref(),
                    );
                }
                None => warn!(%variant, "form has no signature box, ignoring signature"),
            }
        }

        flat.save(output_path)
            .map_err(|e| RenderError::OutputUnwritable(format!("{}: {}", output_path.display(), e)))?;
    } else {
        if opts.signature.is_some() {
            warn!("signature needs a flattened output, ignoring signature");
        }
        doc.save(output_path)
            .map_err(|e| RenderError::OutputUnwritable(format!("{}: {}", output_path.display(), e)))?;
    }

    let ocr_applied = opts.ocr && opts.flatten && ocr::apply_ocr(output_path);

    let notes_path = if input.broker_notes.is_empty() {
        None
    } else {
        let path = opts
            .notes_path
            .clone()
            .unwrap_or_else(|| derive_notes_path(output_path));
        let bytes = notes::build_notes(&input.broker_notes)?;
        std::fs::write(&path, bytes)
            .map_err(|e| RenderError::OutputUnwritable(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "wrote broker notes document");
        Some(path)
    };

    Ok(GenerationResult {
        filled_count: report.filled,
        total_fields: report.total,
        skipped_fields: report.skipped,
        ocr_applied,
        output_path: output_path.to_path_buf(),
        notes_path,
    })
}
