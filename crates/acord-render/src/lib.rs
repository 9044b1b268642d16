//! PDF rendering for ACORD form generation: widget filling, raster
//! flattening, coordinate overlays, signature composition, OCR, and
//! the broker-notes document. Schema knowledge lives in `acord-schema`;
//! this crate only touches bytes and pages.

mod draw;
pub mod error;
pub mod fill;
pub mod flatten;
pub mod notes;
pub mod ocr;
pub mod overlay;
pub mod pipeline;
pub mod signature;

pub use error::RenderError;
pub use fill::{FieldInfo, FieldKind, FillReport};
pub use pipeline::{generate, GenerateOptions, GenerationResult};
pub use signature::SignatureAsset;
