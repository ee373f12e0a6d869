//! Legacy `.doc` extraction: a cascade of increasingly crude fallbacks,
//! because the binary format has no single reliable in-process reader.

use ats_core::error::ExtractionError;

use super::docx::extract_docx;
use super::normalize_whitespace;

/// An external conversion step in the `.doc` cascade: a hosted extraction
/// service, a headless-office conversion to DOCX, or a commandline tool.
/// Each is optional; the cascade degrades gracefully if none are wired up.
pub trait DocConverter: Send + Sync {
    /// Human-readable name, used only for logging which stage produced text.
    fn name(&self) -> &'static str;
    fn convert(&self, doc_bytes: &[u8]) -> Result<String, ExtractionError>;
}

const MIN_CASCADE_CHARS: usize = 100;

/// Best-effort scan of the raw binary for runs of printable ASCII, the last
/// resort when nothing structured works. `.doc` files embed plain runs of
/// text between binary records, so this recovers a usable (if messy) string
/// far more often than it has any right to.
fn printable_ascii_scan(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut run = String::new();
    for &b in bytes {
        let c = b as char;
        if c.is_ascii_graphic() || c == ' ' {
            run.push(c);
        } else {
            if run.len() >= 4 {
                out.push_str(&run);
                out.push(' ');
            }
            run.clear();
        }
    }
    if run.len() >= 4 {
        out.push_str(&run);
    }
    out
}

/// Run the `.doc` cascade: external converters in the order given, then a
/// DOCX-parse attempt (some `.doc` files are mislabeled DOCX), then the
/// printable-ASCII scan. Returns the first stage whose output clears the
/// threshold, or the longest stage's output if none do.
pub fn extract_doc(bytes: &[u8], converters: &[&dyn DocConverter]) -> Result<String, ExtractionError> {
    let mut best = String::new();

    for converter in converters {
        if let Ok(text) = converter.convert(bytes) {
            let norm = normalize_whitespace(&text);
            if norm.chars().count() >= MIN_CASCADE_CHARS {
                return Ok(norm);
            }
            if norm.len() > best.len() {
                best = norm;
            }
        }
    }

    if let Ok(docx_text) = extract_docx(bytes, None) {
        if docx_text.chars().count() >= MIN_CASCADE_CHARS {
            return Ok(docx_text);
        }
        if docx_text.len() > best.len() {
            best = docx_text;
        }
    }

    let scanned = normalize_whitespace(&printable_ascii_scan(bytes));
    if scanned.len() > best.len() {
        best = scanned;
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFails;
    impl DocConverter for AlwaysFails {
        fn name(&self) -> &'static str {
            "always-fails"
        }
        fn convert(&self, _: &[u8]) -> Result<String, ExtractionError> {
            Err(ExtractionError::DecoderFailure("unavailable".into()))
        }
    }

    struct Echoes(&'static str);
    impl DocConverter for Echoes {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn convert(&self, _: &[u8]) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn first_converter_that_clears_the_threshold_wins() {
        let long_text = "word ".repeat(30);
        let fails = AlwaysFails;
        let echoes = Echoes(Box::leak(long_text.clone().into_boxed_str()));
        let result = extract_doc(b"irrelevant", &[&fails, &echoes]).unwrap();
        assert!(result.len() > 50);
    }

    #[test]
    fn falls_all_the_way_to_ascii_scan() {
        let mut bytes = vec![0u8, 1, 2, 3];
        bytes.extend_from_slice(b"Jane Doe Senior Engineer");
        bytes.extend_from_slice(&[0u8, 0u8]);
        let result = extract_doc(&bytes, &[]).unwrap();
        assert!(result.contains("Jane Doe"));
    }
}
