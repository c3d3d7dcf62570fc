//! Diagnostics collected during interpretation.

use vireo_syntax::content::ops::OperandError;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The page is still expected to render correctly.
    Warning,
    /// Part of the page content was dropped or replaced.
    Error,
}

/// The kind of problem a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A malformed token in the content stream.
    Tokenize,
    /// An operator with fewer operands than it requires.
    StackUnderflow,
    /// An operand of the wrong kind, or an otherwise invalid operand value.
    TypeMismatch,
    /// An operator keyword that is not known.
    UnknownOperator,
    /// A `Q` without a matching `q`.
    UnbalancedStateStack,
    /// A text-positioning or text-showing operator outside `BT`/`ET`.
    UnbalancedTextObject,
    /// A color space that could not be resolved.
    ColorSpaceResolution,
    /// A content sub-stream that could not be decoded.
    StreamDecode,
    /// The interpretation was cancelled by the caller.
    Cancelled,
}

/// A single diagnostic raised while interpreting a content stream.
///
/// Diagnostics are collected in order and returned alongside the (possibly
/// partial) drawing intents; they are never thrown across the
/// stream-processing boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    /// How serious the problem is.
    pub severity: Severity,
    /// The kind of problem.
    pub kind: ErrorKind,
    /// A human-readable description.
    pub message: String,
    /// The approximate byte offset into the (logically concatenated)
    /// content stream, where known.
    pub offset: Option<usize>,
}

/// An ordered collector of diagnostics, owned by one interpreter invocation.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticSink(Vec<RenderError>);

impl DiagnosticSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn error(
        &mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        offset: Option<usize>,
    ) {
        self.0.push(RenderError {
            severity: Severity::Error,
            kind,
            message: message.into(),
            offset,
        });
    }

    pub(crate) fn warning(
        &mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        offset: Option<usize>,
    ) {
        self.0.push(RenderError {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            offset,
        });
    }

    pub(crate) fn operand_error(&mut self, error: &OperandError, offset: usize) {
        let kind = match error {
            OperandError::StackUnderflow { .. } => ErrorKind::StackUnderflow,
            OperandError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            OperandError::UnknownOperator { .. } => ErrorKind::UnknownOperator,
        };

        self.error(kind, error.to_string(), Some(offset));
    }

    pub(crate) fn into_vec(self) -> Vec<RenderError> {
        self.0
    }
}
