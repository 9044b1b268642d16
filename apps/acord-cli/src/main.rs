//! Command-line front end for ACORD form generation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use acord_render::{GenerateOptions, SignatureAsset};
use acord_schema::{FormVariant, StructuredInput};

#[derive(Parser)]
#[command(name = "acord", about = "Fill, flatten and annotate ACORD insurance forms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every fillable widget on a blank form.
    List {
        /// Blank form PDF.
        form: PathBuf,
        /// Emit JSON instead of a text table.
        #[arg(long)]
        json: bool,
    },
    /// Fill a form from a structured-input JSON file.
    Fill {
        /// Blank form PDF.
        form: PathBuf,
        /// Structured input JSON.
        input: PathBuf,
        /// Output PDF path.
        output: PathBuf,
        /// Form variant: 125, 24, 25 or 37.
        #[arg(long, short)]
        variant: String,
        /// Keep the interactive widgets instead of rasterizing.
        #[arg(long)]
        no_flatten: bool,
        /// Rasterization resolution.
        #[arg(long, default_value_t = 200.0)]
        dpi: f32,
        /// Add an OCR text layer to the flattened output.
        #[arg(long)]
        ocr: bool,
        /// Drop the general-liability section pages.
        #[arg(long)]
        skip_gl: bool,
        /// Signature image file (PNG or JPEG).
        #[arg(long, conflicts_with = "sign_name")]
        sign_image: Option<PathBuf>,
        /// Name to draw in the signature box.
        #[arg(long)]
        sign_name: Option<String>,
        /// Script typeface for --sign-name.
        #[arg(long, requires = "sign_name")]
        sign_font: Option<PathBuf>,
        /// Where to write the broker-notes document.
        #[arg(long)]
        notes_out: Option<PathBuf>,
        /// Emit the result summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("acord=info".parse()?)
                .add_directive("acord_render=info".parse()?),
        )
        .init();

    match Cli::parse().command {
        Command::List { form, json } => list(form, json),
        Command::Fill {
            form,
            input,
            output,
            variant,
            no_flatten,
            dpi,
            ocr,
            skip_gl,
            sign_image,
            sign_name,
            sign_font,
            notes_out,
            json,
        } => {
            let variant: FormVariant = variant
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("unrecognized form variant")?;
            let data = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let structured: StructuredInput = serde_json::from_str(&data)
                .with_context(|| format!("parsing {}", input.display()))?;

            let signature = match (sign_image, sign_name) {
                (Some(path), _) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    Some(SignatureAsset::Image(bytes))
                }
                (None, Some(name)) => Some(SignatureAsset::Typed(name)),
                (None, None) => None,
            };
            if signature.is_some() && no_flatten {
                bail!("signatures require flattening; drop --no-flatten");
            }

            let opts = GenerateOptions {
                flatten: !no_flatten,
                dpi,
                ocr,
                skip_gl,
                signature,
                signature_font: sign_font,
                notes_path: notes_out,
            };
            let result = acord_render::generate(&form, &structured, variant, &output, &opts)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                info!(
                    filled = result.filled_count,
                    total = result.total_fields,
                    skipped = result.skipped_fields.len(),
                    ocr = result.ocr_applied,
                    "generation complete"
                );
                println!(
                    "wrote {} ({}/{} fields, {} skipped)",
                    result.output_path.display(),
                    result.filled_count,
                    result.total_fields,
                    result.skipped_fields.len()
                );
                for name in &result.skipped_fields {
                    println!("  skipped: {}", name);
                }
                if let Some(notes) = &result.notes_path {
                    println!("wrote {}", notes.display());
                }
            }
            Ok(())
        }
    }
}

fn list(form: PathBuf, json: bool) -> Result<()> {
    let doc = lopdf::Document::load(&form)
        .with_context(|| format!("reading {}", form.display()))?;
    let fields = acord_render::fill::list_fields(&doc);
    if json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        for field in &fields {
            println!("page {:>2}  {:?}  {}", field.page, field.kind, field.name);
        }
        println!("{} widgets", fields.len());
    }
    Ok(())
}
