//! Bytes-to-text extraction and the nine-extractor field fleet.
//!
//! Two independent concerns live here: [`text`] turns raw bytes into a
//! normalized string (the Text Extractor), and [`fields`] turns that string
//! into the nine resume fields the orchestrator commits one at a time (the
//! Field Extractor Fleet). Both depend on collaborators defined as traits —
//! [`llm::LlmClient`], [`text::ocr::OcrEngine`], [`text::pdf::PdfRasterizer`],
//! [`text::doc::DocConverter`] — so the concrete backends stay out of this
//! crate the same way the vector DB wire format does.

pub mod fields;
pub mod json_recovery;
pub mod llm;
pub mod text;

pub mod prelude {
    pub use crate::fields::{parse_module_selection, run_named_simple_extractor, FLEET_ORDER};
    pub use crate::json_recovery::{first_nonempty_line, recover_json_object};
    pub use crate::llm::{DecodingOptions, IsolatedRequest, LlmClient, LlmError};
    pub use crate::text::{extract_text, TextExtractionContext, MIN_USEFUL_CHARS};
}
