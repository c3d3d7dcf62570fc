/*!
A renderer-agnostic interpreter for PDF content streams.

The interpreter takes decoded content-stream bytes, runs the graphics state
machine over them and emits an ordered sequence of drawing intents (stroke
this path with that state, show this glyph run, invoke that XObject). It
does not rasterize anything, lay out glyphs or walk the document object
model; resources are obtained through the [`Resolver`] capability and pixels
are somebody else's problem.

Interpretation is best-effort by design: every malformed token or operator
is confined to itself, reported as a [`RenderError`] and skipped, so a
damaged page still renders as far as it can. The returned diagnostics are
ordered and complete.

```
use vireo_interpret::{DictResolver, InterpreterSettings, process};

let resolver = DictResolver::default();
let content: &[u8] = b"q 1 0 0 RG 0 0 10 10 re S Q";
let result = process([Ok(content)], &resolver, &InterpreterSettings::default());

assert_eq!(result.intents.len(), 1);
assert!(result.diagnostics.is_empty());
```
*/

pub mod color;
pub mod device;
pub mod font;
pub mod resolve;
pub mod state;

mod context;
mod convert;
mod cookie;
mod diag;
mod interpret;

pub use cookie::Cookie;
pub use device::{
    Device, DrawIntent, GlyphMetrics, GlyphRun, InlineImage, IntentRecorder, MarkedContentEvent,
};
pub use diag::{ErrorKind, RenderError, Severity};
pub use resolve::{Category, DictResolver, Resolver};
pub use state::{FillRule, State};

use context::Context;
use diag::DiagnosticSink;

/// A sub-stream of a page's content that could not be decoded.
///
/// Decoding happens in the document model, before interpretation; this type
/// carries the failure across the boundary so it becomes an ordinary
/// diagnostic instead of aborting the page.
#[derive(Debug, Clone)]
pub struct DecodeFailure {
    /// A human-readable description of the decode failure.
    pub message: String,
}

impl DecodeFailure {
    /// Create a new decode failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Settings for one interpreter invocation.
#[derive(Debug, Clone, Default)]
pub struct InterpreterSettings {
    /// The cancellation handle checked between instructions.
    pub cookie: Cookie,
}

/// The result of interpreting a page's content.
#[derive(Debug)]
pub struct Interpretation {
    /// The emitted drawing intents, in order.
    pub intents: Vec<DrawIntent>,
    /// The diagnostics raised along the way, in order.
    pub diagnostics: Vec<RenderError>,
}

/// Interpret a page's content streams, recording all drawing intents.
///
/// `streams` is the ordered sequence of the page's content sub-streams,
/// each already decoded by the document model (or the reason it could not
/// be). The sub-streams are treated as a single logical stream: operand
/// and graphics state persist across the boundaries.
pub fn process<'a, I>(
    streams: I,
    resolver: &dyn Resolver,
    settings: &InterpreterSettings,
) -> Interpretation
where
    I: IntoIterator<Item = Result<&'a [u8], DecodeFailure>>,
{
    let mut device = IntentRecorder::new();
    let diagnostics = process_with_device(streams, resolver, settings, &mut device);

    Interpretation {
        intents: device.finish(),
        diagnostics,
    }
}

/// Interpret a page's content streams into a caller-provided device.
///
/// This is [`process`] without the recording device; use it to consume
/// drawing intents on the fly instead of materializing them.
pub fn process_with_device<'a, I, D>(
    streams: I,
    resolver: &dyn Resolver,
    settings: &InterpreterSettings,
    device: &mut D,
) -> Vec<RenderError>
where
    I: IntoIterator<Item = Result<&'a [u8], DecodeFailure>>,
    D: Device,
{
    let mut sink = DiagnosticSink::new();

    // Streams must be treated as if concatenated, with at least one
    // whitespace byte in-between so adjacent tokens stay apart.
    let mut content = Vec::new();
    for stream in streams {
        match stream {
            Ok(data) => {
                content.extend_from_slice(data);
                content.push(b' ');
            }
            Err(failure) => {
                sink.error(
                    ErrorKind::StreamDecode,
                    failure.message,
                    Some(content.len()),
                );
            }
        }
    }

    let mut ctx = Context::new(settings.cookie.clone());
    interpret::interpret(&content, resolver, &mut ctx, device, &mut sink);

    sink.into_vec()
}

#[cfg(test)]
mod tests {
    use crate::device::DrawIntent;
    use crate::state::FillRule;
    use crate::{
        Cookie, DecodeFailure, DictResolver, ErrorKind, Interpretation, InterpreterSettings,
        MarkedContentEvent, Severity, process,
    };
    use kurbo::Affine;

    fn run_with_resources(content: &str, resources: &[u8]) -> Interpretation {
        let resolver = DictResolver::from_bytes(resources).unwrap();

        process(
            [Ok(content.as_bytes())],
            &resolver,
            &InterpreterSettings::default(),
        )
    }

    fn run(content: &str) -> Interpretation {
        run_with_resources(content, b"<<>>")
    }

    fn fill_states(result: &Interpretation) -> Vec<&crate::State> {
        result
            .intents
            .iter()
            .filter_map(|i| match i {
                DrawIntent::FillPath { state, .. } => Some(state),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn restore_on_initial_state_is_a_reported_no_op() {
        let result = run("Q 0 0 1 1 re f");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::UnbalancedStateStack);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
        assert_eq!(result.intents.len(), 1);
    }

    #[test]
    fn save_restore_roundtrip_restores_the_state() {
        let result = run("q 4 w 2 J /DeviceRGB CS 2 0 0 2 0 0 cm Q 0 0 1 1 re f");
        let states = fill_states(&result);

        assert!(result.diagnostics.is_empty());
        assert_eq!(states.len(), 1);

        let state = states[0];
        assert_eq!(state.ctm, Affine::IDENTITY);
        assert_eq!(state.line_width, 1.0);
        assert_eq!(state.line_cap, kurbo::Cap::Butt);
        assert_eq!(state.stroke_cs.components(), 1);
    }

    #[test]
    fn save_restore_is_structural() {
        let before = run("0 0 1 1 re f");
        let after = run("q Q 0 0 1 1 re f");

        assert_eq!(fill_states(&before), fill_states(&after));
    }

    #[test]
    fn transform_composition_matches_a_single_concatenation() {
        let composed = run("0.5 0 0 2 0 0 cm 2 0 0 0.5 10 3 cm 0 0 1 1 re f");
        let a = Affine::new([0.5, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let b = Affine::new([2.0, 0.0, 0.0, 0.5, 10.0, 3.0]);

        assert_eq!(fill_states(&composed)[0].ctm, a * b);
    }

    #[test]
    fn identity_transform_keeps_the_ctm() {
        let result = run("1 0 0 1 0 0 cm 0 0 1 1 re f");

        assert_eq!(fill_states(&result)[0].ctm, Affine::IDENTITY);
    }

    #[test]
    fn malformed_operator_is_isolated() {
        // `re` with two operands: one diagnostic, state untouched, the
        // following operators process normally.
        let result = run("5 7 re 0 0 4 4 re f");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::StackUnderflow);
        assert_eq!(result.intents.len(), 1);
    }

    #[test]
    fn wrong_operand_type_is_isolated() {
        let result = run("0 0 (a) 4 re 0 0 4 4 re f");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(result.intents.len(), 1);
    }

    #[test]
    fn unknown_operator_is_reported_and_skipped() {
        let result = run("vnd2 0 0 1 1 re f");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::UnknownOperator);
        assert_eq!(result.intents.len(), 1);
    }

    #[test]
    fn unknown_operators_are_tolerated_in_compatibility_sections() {
        let result = run("BX vnd EX vnd");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::UnknownOperator);
    }

    #[test]
    fn tokenize_error_is_reported_with_offset() {
        let result = run("q ) Q");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::Tokenize);
        assert_eq!(result.diagnostics[0].offset, Some(2));
    }

    #[test]
    fn scaled_red_rectangle() {
        let result = run("q 2 0 0 2 0 0 cm 1 0 0 RG 0 0 10 10 re f Q");

        assert!(result.diagnostics.is_empty());
        assert_eq!(result.intents.len(), 1);

        let DrawIntent::FillPath { rule, state, .. } = &result.intents[0] else {
            panic!("expected a fill intent");
        };
        assert_eq!(*rule, FillRule::NonZero);
        assert_eq!(state.ctm, Affine::scale(2.0));
        assert_eq!(state.stroke_cs.components(), 3);
        assert_eq!(state.stroke_color.as_slice(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn restore_after_scaled_fill_restores_identity() {
        let result = run("q 2 0 0 2 0 0 cm 1 0 0 RG 0 0 10 10 re f Q 0 0 1 1 re f");
        let states = fill_states(&result);

        assert_eq!(states.len(), 2);
        assert_eq!(states[1].ctm, Affine::IDENTITY);
        assert_eq!(states[1].stroke_color.as_slice(), &[0.0]);
    }

    #[test]
    fn show_text() {
        let result = run_with_resources(
            "BT /F1 12 Tf 0 0 Td (Hi) Tj ET",
            b"<< /Font << /F1 << /Type /Font /BaseFont /Helvetica >> >> >>",
        );

        assert!(result.diagnostics.is_empty());
        assert_eq!(result.intents.len(), 1);

        let DrawIntent::GlyphRun { run, .. } = &result.intents[0] else {
            panic!("expected a glyph run");
        };
        assert_eq!(run.font, "F1");
        assert_eq!(run.size, 12.0);
        assert_eq!(run.text, b"Hi");
        assert_eq!(run.transform, Affine::new([12.0, 0.0, 0.0, 12.0, 0.0, 0.0]));
    }

    #[test]
    fn show_text_outside_text_object() {
        let result = run("(Hi) Tj BT ET 0 0 1 1 re f");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::UnbalancedTextObject);

        // No glyph run was emitted, and later operators still processed.
        assert_eq!(result.intents.len(), 1);
        assert!(matches!(result.intents[0], DrawIntent::FillPath { .. }));
    }

    #[test]
    fn text_advance_uses_the_width_table() {
        // "AB" at size 10 with A = 600/1000 units wide: B starts 6 units
        // to the right of A.
        let result = run_with_resources(
            "BT /F1 10 Tf [(A) (B)] TJ ET",
            b"<< /Font << /F1 << /FirstChar 65 /Widths [600 700] >> >> >>",
        );

        let transforms = result
            .intents
            .iter()
            .filter_map(|i| match i {
                DrawIntent::GlyphRun { run, .. } => Some(run.transform),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[0], Affine::new([10.0, 0.0, 0.0, 10.0, 0.0, 0.0]));
        assert_eq!(transforms[1], Affine::new([10.0, 0.0, 0.0, 10.0, 6.0, 0.0]));
    }

    #[test]
    fn show_texts_applies_adjustments() {
        let result = run_with_resources(
            "BT /F1 10 Tf [(A) 100 (B)] TJ ET",
            b"<< /Font << /F1 << >> >> >>",
        );

        let transforms = result
            .intents
            .iter()
            .filter_map(|i| match i {
                DrawIntent::GlyphRun { run, .. } => Some(run.transform),
                _ => None,
            })
            .collect::<Vec<_>>();

        // The adjustment subtracts 100/1000 * size from the advance.
        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[1], Affine::new([10.0, 0.0, 0.0, 10.0, -1.0, 0.0]));
    }

    #[test]
    fn next_line_and_show_uses_leading() {
        let result = run_with_resources(
            "BT /F1 10 Tf 14 TL (A) ' ET",
            b"<< /Font << /F1 << >> >> >>",
        );

        let DrawIntent::GlyphRun { run, .. } = &result.intents[0] else {
            panic!("expected a glyph run");
        };
        assert_eq!(run.transform, Affine::new([10.0, 0.0, 0.0, 10.0, 0.0, -14.0]));
    }

    #[test]
    fn next_line_with_leading_side_effect() {
        // TD sets the leading to -ty.
        let result = run_with_resources(
            "BT /F1 10 Tf 5 -7 TD (A) Tj ET",
            b"<< /Font << /F1 << >> >> >>",
        );

        let DrawIntent::GlyphRun { run, state } = &result.intents[0] else {
            panic!("expected a glyph run");
        };
        assert_eq!(state.text_state.leading, 7.0);
        assert_eq!(run.transform, Affine::new([10.0, 0.0, 0.0, 10.0, 5.0, -7.0]));
    }

    #[test]
    fn color_space_from_resources() {
        let result = run_with_resources(
            "/CS0 cs 0.5 scn 0 0 1 1 re f",
            b"<< /ColorSpace << /CS0 [/Separation /Spot /DeviceCMYK << >>] >> >>",
        );

        assert!(result.diagnostics.is_empty());

        let state = fill_states(&result)[0];
        assert_eq!(state.fill_cs.kind_name(), "Separation");
        assert_eq!(state.fill_color.as_slice(), &[0.5]);
    }

    #[test]
    fn selecting_a_color_space_sets_the_initial_color() {
        let result = run("1 1 0 rg /DeviceRGB cs 0 0 1 1 re f");

        let state = fill_states(&result)[0];
        assert_eq!(state.fill_color.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_color_space_leaves_the_previous_one() {
        let result = run("/DeviceRGB cs /Nope cs 0 0 1 1 re f");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].kind,
            ErrorKind::ColorSpaceResolution
        );

        let state = fill_states(&result)[0];
        assert_eq!(state.fill_cs.components(), 3);
    }

    #[test]
    fn component_count_mismatch_leaves_the_color() {
        let result = run("/DeviceRGB cs 1 sc 0 0 1 1 re f");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::TypeMismatch);

        let state = fill_states(&result)[0];
        assert_eq!(state.fill_color.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn pattern_color() {
        let result = run_with_resources(
            "/Pattern cs /P1 scn 0 0 1 1 re f",
            b"<< /Pattern << /P1 << /PatternType 1 >> >> >>",
        );

        assert!(result.diagnostics.is_empty());

        let state = fill_states(&result)[0];
        assert!(state.fill_cs.is_pattern());
        assert_eq!(state.fill_pattern.as_deref(), Some("P1"));
    }

    #[test]
    fn ext_g_state_is_applied() {
        let result = run_with_resources(
            "/GS1 gs 0 0 5 5 re S",
            b"<< /ExtGState << /GS1 << /LW 4 /LC 1 /D [[2 1] 0.5] >> >> >>",
        );

        let DrawIntent::StrokePath { state, .. } = &result.intents[0] else {
            panic!("expected a stroke intent");
        };
        assert_eq!(state.line_width, 4.0);
        assert_eq!(state.line_cap, kurbo::Cap::Round);
        assert_eq!(state.dash_array.as_slice(), &[2.0, 1.0]);
        assert_eq!(state.dash_offset, 0.5);
    }

    #[test]
    fn clip_is_intersected_after_painting() {
        let result = run("0 0 10 10 re W n 0 0 5 5 re f");

        assert_eq!(result.intents.len(), 1);

        let state = fill_states(&result)[0];
        let clip = state.clip.as_ref().expect("expected an active clip");
        assert_eq!(clip.rule, FillRule::NonZero);
        assert!(clip.parent.is_none());
    }

    #[test]
    fn clip_is_dropped_on_restore() {
        let result = run("q 0 0 10 10 re W n Q 0 0 5 5 re f");

        let state = fill_states(&result)[0];
        assert!(state.clip.is_none());
    }

    #[test]
    fn inline_image() {
        let result = run("BI /W 2 /H 2 /BPC 8 ID \x01\x02\x03\x04 EI");

        assert_eq!(result.intents.len(), 1);

        let DrawIntent::InlineImage { image, .. } = &result.intents[0] else {
            panic!("expected an inline image");
        };
        assert_eq!(image.width, Some(2));
        assert_eq!(image.height, Some(2));
        assert_eq!(image.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn marked_content_events() {
        let result = run("/Span BMC EMC /Tag /P DP");

        assert_eq!(result.intents.len(), 3);
        assert!(matches!(
            &result.intents[0],
            DrawIntent::MarkedContent {
                event: MarkedContentEvent::Begin { tag },
                ..
            } if tag == "Span"
        ));
        assert!(matches!(
            &result.intents[1],
            DrawIntent::MarkedContent {
                event: MarkedContentEvent::End,
                ..
            }
        ));
    }

    #[test]
    fn glyph_metrics() {
        let result = run("500 0 d0 500 0 0 0 750 600 d1");

        assert_eq!(result.intents.len(), 2);
        assert!(matches!(
            result.intents[1],
            DrawIntent::GlyphMetrics { metrics } if metrics.bbox == Some([0.0, 0.0, 750.0, 600.0])
        ));
    }

    #[test]
    fn xobject_and_shading_intents() {
        let result = run("/X0 Do /Sh0 sh");

        assert_eq!(result.intents.len(), 2);
        assert!(
            matches!(&result.intents[0], DrawIntent::XObject { name, .. } if name == "X0")
        );
        assert!(
            matches!(&result.intents[1], DrawIntent::Shading { name, .. } if name == "Sh0")
        );
    }

    #[test]
    fn state_persists_across_sub_streams() {
        let resolver = DictResolver::default();
        let result = process(
            [
                Ok("q 2 0 0 2 0 0 cm".as_bytes()),
                Ok("0 0 1 1 re f Q".as_bytes()),
            ],
            &resolver,
            &InterpreterSettings::default(),
        );

        assert!(result.diagnostics.is_empty());
        assert_eq!(fill_states(&result)[0].ctm, Affine::scale(2.0));
    }

    #[test]
    fn operands_persist_across_sub_streams() {
        let resolver = DictResolver::default();
        let result = process(
            [Ok("0 0 4".as_bytes()), Ok("4 re f".as_bytes())],
            &resolver,
            &InterpreterSettings::default(),
        );

        assert!(result.diagnostics.is_empty());
        assert_eq!(result.intents.len(), 1);
    }

    #[test]
    fn decode_failure_is_one_diagnostic() {
        let resolver = DictResolver::default();
        let result = process(
            [
                Err(DecodeFailure::new("flate stream was truncated")),
                Ok("0 0 1 1 re f".as_bytes()),
            ],
            &resolver,
            &InterpreterSettings::default(),
        );

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::StreamDecode);
        assert_eq!(result.intents.len(), 1);
    }

    #[test]
    fn cancellation_stops_the_loop() {
        let cookie = Cookie::new();
        cookie.cancel();

        let resolver = DictResolver::default();
        let result = process(
            [Ok("0 0 1 1 re f".as_bytes())],
            &resolver,
            &InterpreterSettings { cookie },
        );

        assert!(result.intents.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, ErrorKind::Cancelled);
    }

    #[test]
    fn empty_input() {
        let resolver = DictResolver::default();
        let streams: [Result<&[u8], DecodeFailure>; 0] = [];
        let result = process(streams, &resolver, &InterpreterSettings::default());

        assert!(result.intents.is_empty());
        assert!(result.diagnostics.is_empty());
    }
}
