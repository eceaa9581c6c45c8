//! File rewriter: splices generated code over a previously
//! located entry-point function. Operates purely on the byte range the
//! Analyzer already recorded (`CommandMetadata::entry_point_span`); it
//! does not re-parse the target before replacing, matching the
//! contract exactly.

use std::fs;
use std::ops::Range;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("target file has no located entry point to replace")]
    NoEntryPoint,
    #[error("entry point span {span:?} is out of bounds for a {len}-byte file")]
    SpanOutOfBounds { span: Range<usize>, len: usize },
    #[error("failed to read {path}: {cause}")]
    Read { path: String, cause: String },
    #[error("failed to write {path}: {cause}")]
    Write { path: String, cause: String },
}

/// Replaces the byte range `entry_point_span` covers in `original_source`
/// with `replacement_text`, preserving everything else verbatim.
pub fn rewrite_entry_point(
    original_source: &str,
    entry_point_span: Option<Range<usize>>,
    replacement_text: &str,
) -> Result<String, RewriteError> {
    let span = entry_point_span.ok_or(RewriteError::NoEntryPoint)?;
    if span.start > span.end || span.end > original_source.len() {
        return Err(RewriteError::SpanOutOfBounds {
            span,
            len: original_source.len(),
        });
    }
    if !original_source.is_char_boundary(span.start) || !original_source.is_char_boundary(span.end) {
        return Err(RewriteError::SpanOutOfBounds {
            span,
            len: original_source.len(),
        });
    }

    let mut rewritten = String::with_capacity(original_source.len() + replacement_text.len());
    rewritten.push_str(&original_source[..span.start]);
    rewritten.push_str(replacement_text);
    rewritten.push_str(&original_source[span.end..]);
    Ok(rewritten)
}

/// Reads `target_path`, splices in `replacement_text` over
/// `entry_point_span`, and writes the result back in place. The `emit`
/// sub-command's top-level operation.
pub fn rewrite_file(
    target_path: &Path,
    entry_point_span: Option<Range<usize>>,
    replacement_text: &str,
) -> Result<(), RewriteError> {
    let path = target_path.display().to_string();
    let original =
        fs::read_to_string(target_path).map_err(|cause| RewriteError::Read {
            path: path.clone(),
            cause: cause.to_string(),
        })?;
    let rewritten = rewrite_entry_point(&original, entry_point_span, replacement_text)?;
    fs::write(target_path, rewritten).map_err(|cause| RewriteError::Write {
        path,
        cause: cause.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splices_replacement_over_span_preserving_rest() {
        let source = "package main\n\nfunc main() {\n\told()\n}\n";
        let start = source.find("func main").unwrap();
        let end = source.len() - 1; // preserve trailing newline
        let replacement = "func main() {\n\tnew()\n}";

        let rewritten = rewrite_entry_point(source, Some(start..end), replacement).unwrap();
        assert_eq!(rewritten, "package main\n\nfunc main() {\n\tnew()\n}\n");
    }

    #[test]
    fn missing_entry_point_is_an_error() {
        let err = rewrite_entry_point("package main\n", None, "func main() {}").unwrap_err();
        assert!(matches!(err, RewriteError::NoEntryPoint));
    }

    #[test]
    fn out_of_bounds_span_is_an_error() {
        let err = rewrite_entry_point("short", Some(0..100), "x").unwrap_err();
        assert!(matches!(err, RewriteError::SpanOutOfBounds { .. }));
    }
}
