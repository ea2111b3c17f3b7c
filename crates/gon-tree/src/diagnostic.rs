//! Diagnostic rendering for parse errors.

use ariadne::{Color, Label, Report, ReportKind, Source};
use gon_parse::{BuilderError, MAX_SUB_OBJECT_DEPTH, Span};

/// The kind of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Block/list nesting pushed past [`MAX_SUB_OBJECT_DEPTH`].
    DepthExceeded,
    /// The node arena ran out of slots during assembly.
    ArenaExhausted,
}

/// A parse error with source location.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Source location.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source
    /// context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = self.span.start as usize..self.span.end as usize;

        match self.kind {
            ParseErrorKind::DepthExceeded => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!(
                        "maximum nesting depth ({}) exceeded",
                        MAX_SUB_OBJECT_DEPTH
                    ))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("this opens one scope too many")
                            .with_color(Color::Red),
                    )
                    .with_help("flatten the structure; the depth limit is fixed at compile time")
            }

            ParseErrorKind::ArenaExhausted => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message("object storage exhausted during assembly")
                    .with_label(
                        Label::new((filename, range))
                            .with_message("no slot left for this object")
                            .with_color(Color::Red),
                    )
            }
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ParseErrorKind::DepthExceeded => write!(
                f,
                "maximum nesting depth ({}) exceeded",
                MAX_SUB_OBJECT_DEPTH
            ),
            ParseErrorKind::ArenaExhausted => {
                write!(f, "object storage exhausted during assembly")
            }
        }?;
        write!(f, " at offset {}", self.span.start)
    }
}

impl std::error::Error for ParseError {}

impl From<BuilderError> for ParseError {
    fn from(err: BuilderError) -> Self {
        match err {
            BuilderError::DepthExceeded { span } => {
                ParseError::new(ParseErrorKind::DepthExceeded, span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_diagnostic_renders_with_source_context() {
        let source = "deep [ [ [ [ [ x ] ] ] ] ]";
        let err = crate::parse(source).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DepthExceeded);

        let rendered = err.render("config.gon", source);
        let plain = String::from_utf8(strip_ansi_escapes::strip(&rendered)).unwrap();
        assert!(plain.contains("maximum nesting depth"));
        assert!(plain.contains("config.gon"));
    }

    #[test]
    fn test_display_includes_offset() {
        let err = ParseError::new(ParseErrorKind::DepthExceeded, Span::new(7, 8));
        assert_eq!(
            err.to_string(),
            "maximum nesting depth (5) exceeded at offset 7"
        );
    }
}
