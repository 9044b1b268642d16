use thiserror::Error;

/// Fatal rendering failures. Cosmetic stages (signature composition,
/// OCR) report degradation through their return values instead of
/// surfacing here.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read blank form: {0}")]
    FormUnreadable(String),

    #[error("widget fill failed: {0}")]
    Fill(String),

    #[error("rasterization failed: {0}")]
    Flatten(String),

    #[error("overlay drawing failed: {0}")]
    Overlay(String),

    #[error("notes document generation failed: {0}")]
    Notes(String),

    #[error("failed to write output: {0}")]
    OutputUnwritable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Fill(err.to_string())
    }
}
