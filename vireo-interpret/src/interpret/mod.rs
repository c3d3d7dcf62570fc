//! The interpreter loop.
//!
//! The loop pulls instructions from the lexer, converts them into typed
//! operations and applies them to the graphics state, emitting drawing
//! intents through the device. Every error is confined to the instruction
//! that raised it: one corrupt operator never aborts interpretation of the
//! rest of the page.

use crate::color::ColorSpace;
use crate::context::Context;
use crate::convert::{convert_line_cap, convert_line_join, convert_transform};
use crate::device::{Device, GlyphMetrics, InlineImage, MarkedContentEvent};
use crate::diag::{DiagnosticSink, ErrorKind};
use crate::font::Font;
use crate::interpret::path::{close_path, end_path, fill_path, fill_stroke_path, stroke_path};
use crate::resolve::{Category, Resolver};
use crate::state::{FillRule, RenderingIntent, TextRenderingMode};
use kurbo::{Affine, Point, Shape};
use log::{debug, warn};
use smallvec::SmallVec;
use std::ops::Deref;
use vireo_syntax::content::ops::{OperandError, TypedInstruction};
use vireo_syntax::content::Instructions;
use vireo_syntax::object::dict::keys;
use vireo_syntax::object::number::Number;
use vireo_syntax::object::{Array, Dict, Name, Object};

pub(crate) mod path;
pub(crate) mod text;

/// Interpret one logical content stream into the device.
pub(crate) fn interpret(
    data: &[u8],
    resolver: &dyn Resolver,
    ctx: &mut Context,
    device: &mut impl Device,
    sink: &mut DiagnosticSink,
) {
    let base_depth = ctx.num_states();

    for item in Instructions::new(data) {
        if ctx.cookie.is_cancelled() {
            sink.warning(
                ErrorKind::Cancelled,
                "interpretation was cancelled by the caller",
                None,
            );

            break;
        }

        let instruction = match item {
            Ok(instruction) => instruction,
            Err(error) => {
                sink.error(ErrorKind::Tokenize, error.message, Some(error.offset));

                continue;
            }
        };

        let offset = instruction.offset;

        match TypedInstruction::dispatch(&instruction) {
            Ok(op) => exec(op, offset, resolver, ctx, device, sink),
            Err(error) => {
                if matches!(error, OperandError::UnknownOperator { .. })
                    && ctx.in_compatibility_section()
                {
                    debug!("ignoring {error} inside a compatibility section");
                } else {
                    sink.operand_error(&error, offset);
                }
            }
        }
    }

    // Unwind saves that were never restored, so callers always observe a
    // balanced stack.
    while ctx.num_states() > base_depth {
        debug!("unwinding a save without matching restore");
        ctx.restore_state();
    }
}

fn exec(
    op: TypedInstruction<'_>,
    offset: usize,
    resolver: &dyn Resolver,
    ctx: &mut Context,
    device: &mut impl Device,
    sink: &mut DiagnosticSink,
) {
    match op {
        // Special graphics state.
        TypedInstruction::SaveState(_) => ctx.save_state(),
        TypedInstruction::RestoreState(_) => {
            if !ctx.restore_state() {
                sink.warning(
                    ErrorKind::UnbalancedStateStack,
                    "restore without a matching save",
                    Some(offset),
                );
            }
        }
        TypedInstruction::Transform(t) => {
            let affine = convert_transform(&t);
            ctx.get_mut().ctm *= affine;
        }

        // General graphics state.
        TypedInstruction::LineWidth(w) => {
            ctx.get_mut().line_width = w.0.as_f32();
        }
        TypedInstruction::LineCap(c) => {
            ctx.get_mut().line_cap = convert_line_cap(&c.0);
        }
        TypedInstruction::LineJoin(j) => {
            ctx.get_mut().line_join = convert_line_join(&j.0);
        }
        TypedInstruction::MiterLimit(l) => {
            ctx.get_mut().miter_limit = l.0.as_f32();
        }
        TypedInstruction::DashPattern(p) => {
            let state = ctx.get_mut();
            state.dash_array = p.0.iter::<f32>().collect();
            state.dash_offset = p.1.as_f32();
        }
        TypedInstruction::RenderingIntent(i) => {
            match RenderingIntent::from_name(i.0.deref()) {
                Some(intent) => ctx.get_mut().rendering_intent = intent,
                None => warn!("unknown rendering intent {}", i.0.as_str()),
            }
        }
        TypedInstruction::FlatnessTolerance(f) => {
            ctx.get_mut().flatness = f.0.as_f32();
        }
        TypedInstruction::SetGraphicsState(gs) => {
            match resolver
                .resolve(Category::ExtGState, gs.0.deref())
                .and_then(Object::into_dict)
            {
                Some(dict) => handle_gs(&dict, ctx),
                None => warn!("failed to get extgstate {}", gs.0.as_str()),
            }
        }

        // Path construction.
        TypedInstruction::MoveTo(m) => {
            let p = Point::new(m.0.as_f64(), m.1.as_f64());
            ctx.set_last_point(p);
            ctx.set_sub_path_start(p);
            ctx.path_mut().move_to(p);
        }
        TypedInstruction::LineTo(l) => {
            if !ctx.path().elements().is_empty() {
                let p = Point::new(l.0.as_f64(), l.1.as_f64());
                ctx.set_last_point(p);
                ctx.path_mut().line_to(p);
            }
        }
        TypedInstruction::CubicTo(c) => {
            if !ctx.path().elements().is_empty() {
                let p1 = Point::new(c.0.as_f64(), c.1.as_f64());
                let p2 = Point::new(c.2.as_f64(), c.3.as_f64());
                let p3 = Point::new(c.4.as_f64(), c.5.as_f64());

                ctx.set_last_point(p3);
                ctx.path_mut().curve_to(p1, p2, p3);
            }
        }
        TypedInstruction::CubicStartTo(c) => {
            if !ctx.path().elements().is_empty() {
                let p1 = ctx.last_point();
                let p2 = Point::new(c.0.as_f64(), c.1.as_f64());
                let p3 = Point::new(c.2.as_f64(), c.3.as_f64());

                ctx.set_last_point(p3);
                ctx.path_mut().curve_to(p1, p2, p3);
            }
        }
        TypedInstruction::CubicEndTo(c) => {
            if !ctx.path().elements().is_empty() {
                let p2 = Point::new(c.0.as_f64(), c.1.as_f64());
                let p3 = Point::new(c.2.as_f64(), c.3.as_f64());

                ctx.set_last_point(p3);
                ctx.path_mut().curve_to(p2, p3, p3);
            }
        }
        TypedInstruction::ClosePath(_) => close_path(ctx),
        TypedInstruction::RectPath(r) => {
            let rect = kurbo::Rect::new(
                r.0.as_f64(),
                r.1.as_f64(),
                r.0.as_f64() + r.2.as_f64(),
                r.1.as_f64() + r.3.as_f64(),
            )
            .to_path(0.1);
            ctx.path_mut().extend(rect);
        }

        // Path painting.
        TypedInstruction::StrokePath(_) => stroke_path(ctx, device),
        TypedInstruction::CloseAndStrokePath(_) => {
            close_path(ctx);
            stroke_path(ctx, device);
        }
        TypedInstruction::FillPathNonZero(_) | TypedInstruction::FillPathNonZeroCompatibility(_) => {
            fill_path(ctx, device, FillRule::NonZero);
        }
        TypedInstruction::FillPathEvenOdd(_) => fill_path(ctx, device, FillRule::EvenOdd),
        TypedInstruction::FillAndStrokeNonZero(_) => {
            fill_stroke_path(ctx, device, FillRule::NonZero);
        }
        TypedInstruction::FillAndStrokeEvenOdd(_) => {
            fill_stroke_path(ctx, device, FillRule::EvenOdd);
        }
        TypedInstruction::CloseFillAndStrokeNonZero(_) => {
            close_path(ctx);
            fill_stroke_path(ctx, device, FillRule::NonZero);
        }
        TypedInstruction::CloseFillAndStrokeEvenOdd(_) => {
            close_path(ctx);
            fill_stroke_path(ctx, device, FillRule::EvenOdd);
        }
        TypedInstruction::EndPath(_) => end_path(ctx),

        // Clipping.
        TypedInstruction::ClipNonZero(_) => ctx.set_pending_clip(Some(FillRule::NonZero)),
        TypedInstruction::ClipEvenOdd(_) => ctx.set_pending_clip(Some(FillRule::EvenOdd)),

        // Color.
        TypedInstruction::ColorSpaceStroke(c) => {
            select_color_space(ctx, resolver, sink, offset, &c.0, true);
        }
        TypedInstruction::ColorSpaceNonStroke(c) => {
            select_color_space(ctx, resolver, sink, offset, &c.0, false);
        }
        TypedInstruction::StrokeColor(c) => {
            set_color(ctx, sink, offset, "SC", &c.0, None, true);
        }
        TypedInstruction::NonStrokeColor(c) => {
            set_color(ctx, sink, offset, "sc", &c.0, None, false);
        }
        TypedInstruction::StrokeColorNamed(c) => {
            set_color(ctx, sink, offset, "SCN", &c.0, c.1.as_ref(), true);
        }
        TypedInstruction::NonStrokeColorNamed(c) => {
            set_color(ctx, sink, offset, "scn", &c.0, c.1.as_ref(), false);
        }
        TypedInstruction::StrokeColorDeviceGray(c) => {
            let state = ctx.get_mut();
            state.stroke_cs = ColorSpace::device_gray();
            state.stroke_color = smallvec::smallvec![c.0.as_f32()];
            state.stroke_pattern = None;
        }
        TypedInstruction::NonStrokeColorDeviceGray(c) => {
            let state = ctx.get_mut();
            state.fill_cs = ColorSpace::device_gray();
            state.fill_color = smallvec::smallvec![c.0.as_f32()];
            state.fill_pattern = None;
        }
        TypedInstruction::StrokeColorDeviceRgb(c) => {
            let state = ctx.get_mut();
            state.stroke_cs = ColorSpace::device_rgb();
            state.stroke_color = smallvec::smallvec![c.0.as_f32(), c.1.as_f32(), c.2.as_f32()];
            state.stroke_pattern = None;
        }
        TypedInstruction::NonStrokeColorDeviceRgb(c) => {
            let state = ctx.get_mut();
            state.fill_cs = ColorSpace::device_rgb();
            state.fill_color = smallvec::smallvec![c.0.as_f32(), c.1.as_f32(), c.2.as_f32()];
            state.fill_pattern = None;
        }
        TypedInstruction::StrokeColorCmyk(c) => {
            let state = ctx.get_mut();
            state.stroke_cs = ColorSpace::device_cmyk();
            state.stroke_color =
                smallvec::smallvec![c.0.as_f32(), c.1.as_f32(), c.2.as_f32(), c.3.as_f32()];
            state.stroke_pattern = None;
        }
        TypedInstruction::NonStrokeColorCmyk(c) => {
            let state = ctx.get_mut();
            state.fill_cs = ColorSpace::device_cmyk();
            state.fill_color =
                smallvec::smallvec![c.0.as_f32(), c.1.as_f32(), c.2.as_f32(), c.3.as_f32()];
            state.fill_pattern = None;
        }

        // Shading, XObjects and inline images.
        TypedInstruction::Shading(s) => {
            device.draw_shading(s.0.as_str(), ctx.get());
        }
        TypedInstruction::XObject(x) => {
            device.invoke_x_object(x.0.as_str(), ctx.get());
        }
        TypedInstruction::InlineImage(i) => {
            let dict = i.0.dict();
            let image = InlineImage {
                width: dict.get::<i32>(keys::W).or_else(|| dict.get::<i32>(keys::WIDTH)),
                height: dict.get::<i32>(keys::H).or_else(|| dict.get::<i32>(keys::HEIGHT)),
                data: i.0.data().to_vec(),
            };

            device.draw_inline_image(&image, ctx.get());
        }
        TypedInstruction::BeginInlineImageData(_) | TypedInstruction::EndInlineImage(_) => {
            // Consumed by the lexer; stray occurrences are no-ops.
        }

        // Text objects.
        TypedInstruction::BeginText(_) => {
            if ctx.in_text() {
                warn!("nested text object");
            }

            ctx.set_in_text(true);
            let text_state = &mut ctx.get_mut().text_state;
            text_state.text_matrix = Affine::IDENTITY;
            text_state.text_line_matrix = Affine::IDENTITY;
        }
        TypedInstruction::EndText(_) => {
            if !ctx.in_text() {
                warn!("text object ended without being begun");
            }

            ctx.set_in_text(false);
        }

        // Text state.
        TypedInstruction::CharacterSpacing(c) => {
            ctx.get_mut().text_state.char_space = c.0.as_f32();
        }
        TypedInstruction::WordSpacing(w) => {
            ctx.get_mut().text_state.word_space = w.0.as_f32();
        }
        TypedInstruction::HorizontalScaling(h) => {
            ctx.get_mut().text_state.horizontal_scaling = h.0.as_f32();
        }
        TypedInstruction::TextLeading(l) => {
            ctx.get_mut().text_state.leading = l.0.as_f32();
        }
        TypedInstruction::TextFont(t) => {
            let font = resolve_font(ctx, resolver, &t.0);
            ctx.get_mut().text_state.font = Some((font, t.1.as_f32()));
        }
        TypedInstruction::TextRenderingMode(r) => {
            let mode = match r.0.as_i32() {
                0 => TextRenderingMode::Fill,
                1 => TextRenderingMode::Stroke,
                2 => TextRenderingMode::FillStroke,
                3 => TextRenderingMode::Invisible,
                4 => TextRenderingMode::FillAndClip,
                5 => TextRenderingMode::StrokeAndClip,
                6 => TextRenderingMode::FillAndStrokeAndClip,
                7 => TextRenderingMode::Clip,
                other => {
                    warn!("unknown text rendering mode {other}");

                    TextRenderingMode::Fill
                }
            };

            ctx.get_mut().text_state.render_mode = mode;
        }
        TypedInstruction::TextRise(t) => {
            ctx.get_mut().text_state.rise = t.0.as_f32();
        }

        // Text positioning.
        TypedInstruction::NextLine(n) => {
            if require_text_object(ctx, sink, offset, "Td") {
                text::next_line(ctx, n.0.as_f64(), n.1.as_f64());
            }
        }
        TypedInstruction::NextLineAndSetLeading(n) => {
            if require_text_object(ctx, sink, offset, "TD") {
                ctx.get_mut().text_state.leading = -n.1.as_f32();
                text::next_line(ctx, n.0.as_f64(), n.1.as_f64());
            }
        }
        TypedInstruction::SetTextMatrix(m) => {
            if require_text_object(ctx, sink, offset, "Tm") {
                let matrix = Affine::new([
                    m.0.as_f64(),
                    m.1.as_f64(),
                    m.2.as_f64(),
                    m.3.as_f64(),
                    m.4.as_f64(),
                    m.5.as_f64(),
                ]);

                let text_state = &mut ctx.get_mut().text_state;
                text_state.text_matrix = matrix;
                text_state.text_line_matrix = matrix;
            }
        }
        TypedInstruction::NextLineUsingLeading(_) => {
            if require_text_object(ctx, sink, offset, "T*") {
                let leading = ctx.get().text_state.leading;
                text::next_line(ctx, 0.0, -leading as f64);
            }
        }

        // Text showing.
        TypedInstruction::ShowText(s) => {
            if require_text_object(ctx, sink, offset, "Tj") {
                text::show_text_string(ctx, device, &s.0.get());
            }
        }
        TypedInstruction::ShowTexts(s) => {
            if require_text_object(ctx, sink, offset, "TJ") {
                for object in s.0.raw_iter() {
                    if let Some(adjustment) = object.clone().into_f32() {
                        ctx.get_mut().text_state.apply_adjustment(adjustment);
                    } else if let Some(string) = object.into_string() {
                        text::show_text_string(ctx, device, &string.get());
                    }
                }
            }
        }
        TypedInstruction::NextLineAndShowText(n) => {
            if require_text_object(ctx, sink, offset, "'") {
                let leading = ctx.get().text_state.leading;
                text::next_line(ctx, 0.0, -leading as f64);
                text::show_text_string(ctx, device, &n.0.get());
            }
        }
        TypedInstruction::ShowTextWithParameters(t) => {
            if require_text_object(ctx, sink, offset, "\"") {
                let text_state = &mut ctx.get_mut().text_state;
                text_state.word_space = t.0.as_f32();
                text_state.char_space = t.1.as_f32();

                let leading = ctx.get().text_state.leading;
                text::next_line(ctx, 0.0, -leading as f64);
                text::show_text_string(ctx, device, &t.2.get());
            }
        }

        // Type 3 fonts.
        TypedInstruction::ColorGlyph(d) => {
            let metrics = GlyphMetrics {
                advance: (d.0.as_f32(), d.1.as_f32()),
                bbox: None,
            };
            device.glyph_metrics(&metrics, ctx.get());
        }
        TypedInstruction::ShapeGlyph(d) => {
            let metrics = GlyphMetrics {
                advance: (d.0.as_f32(), d.1.as_f32()),
                bbox: Some([d.2.as_f32(), d.3.as_f32(), d.4.as_f32(), d.5.as_f32()]),
            };
            device.glyph_metrics(&metrics, ctx.get());
        }

        // Marked content.
        TypedInstruction::MarkedContentPoint(m) => {
            let event = MarkedContentEvent::Point {
                tag: m.0.as_str().to_string(),
            };
            device.marked_content(&event, ctx.get());
        }
        TypedInstruction::MarkedContentPointWithProperties(m) => {
            let event = MarkedContentEvent::Point {
                tag: m.0.as_str().to_string(),
            };
            device.marked_content(&event, ctx.get());
        }
        TypedInstruction::BeginMarkedContent(m) => {
            let event = MarkedContentEvent::Begin {
                tag: m.0.as_str().to_string(),
            };
            device.marked_content(&event, ctx.get());
        }
        TypedInstruction::BeginMarkedContentWithProperties(m) => {
            // A name operand refers to an entry in the Properties
            // sub-dictionary; an inline dictionary stands for itself.
            if let Some(name) = m.1.clone().into_name()
                && resolver
                    .resolve(Category::Properties, name.deref())
                    .is_none()
            {
                warn!("unknown marked-content properties {}", name.as_str());
            }

            let event = MarkedContentEvent::Begin {
                tag: m.0.as_str().to_string(),
            };
            device.marked_content(&event, ctx.get());
        }
        TypedInstruction::EndMarkedContent(_) => {
            device.marked_content(&MarkedContentEvent::End, ctx.get());
        }

        // Compatibility.
        TypedInstruction::BeginCompatibility(_) => ctx.enter_compatibility_section(),
        TypedInstruction::EndCompatibility(_) => ctx.leave_compatibility_section(),
    }
}

/// Report and reject a text-positioning or text-showing operator outside a
/// `BT`/`ET` bracket.
fn require_text_object(
    ctx: &Context,
    sink: &mut DiagnosticSink,
    offset: usize,
    operator: &str,
) -> bool {
    if ctx.in_text() {
        true
    } else {
        sink.error(
            ErrorKind::UnbalancedTextObject,
            format!("operator {operator} outside of a text object"),
            Some(offset),
        );

        false
    }
}

/// Resolve a color space name and make it current, leaving the previous
/// space untouched when resolution fails.
fn select_color_space(
    ctx: &mut Context,
    resolver: &dyn Resolver,
    sink: &mut DiagnosticSink,
    offset: usize,
    name: &Name<'_>,
    is_stroke: bool,
) {
    let cs = ColorSpace::from_name(name).or_else(|| {
        ctx.cached_color_space(name.deref(), || {
            resolver
                .resolve(Category::ColorSpace, name.deref())
                .and_then(|o| ColorSpace::from_object(&o))
        })
    });

    let Some(cs) = cs else {
        sink.error(
            ErrorKind::ColorSpaceResolution,
            format!("failed to resolve color space /{}", name.as_str()),
            Some(offset),
        );

        return;
    };

    let state = ctx.get_mut();
    if is_stroke {
        state.stroke_color = cs.initial_color();
        state.stroke_cs = cs;
        state.stroke_pattern = None;
    } else {
        state.fill_color = cs.initial_color();
        state.fill_cs = cs;
        state.fill_pattern = None;
    }
}

/// Set color components (and possibly a pattern name) on the current state,
/// validating the component count against the active color space.
fn set_color(
    ctx: &mut Context,
    sink: &mut DiagnosticSink,
    offset: usize,
    operator: &str,
    components: &SmallVec<[Number; 6]>,
    pattern: Option<&Name<'_>>,
    is_stroke: bool,
) {
    let state = ctx.get_mut();
    let cs = if is_stroke {
        &state.stroke_cs
    } else {
        &state.fill_cs
    };

    if pattern.is_some() && !cs.is_pattern() {
        sink.error(
            ErrorKind::TypeMismatch,
            format!(
                "operator {operator} names a pattern, but the current color space is {}",
                cs.kind_name()
            ),
            Some(offset),
        );

        return;
    }

    if components.len() != cs.components() && !(cs.is_pattern() && pattern.is_some() && components.is_empty()) {
        sink.error(
            ErrorKind::TypeMismatch,
            format!(
                "operator {operator} received {} color components, color space {} expects {}",
                components.len(),
                cs.kind_name(),
                cs.components()
            ),
            Some(offset),
        );

        return;
    }

    let color = components.iter().map(|n| n.as_f32()).collect();
    let pattern = pattern.map(|p| p.as_str().to_string());

    if is_stroke {
        state.stroke_color = color;
        if pattern.is_some() {
            state.stroke_pattern = pattern;
        }
    } else {
        state.fill_color = color;
        if pattern.is_some() {
            state.fill_pattern = pattern;
        }
    }
}

/// Resolve a font by resource name, caching the result per invocation.
fn resolve_font(ctx: &mut Context, resolver: &dyn Resolver, name: &Name<'_>) -> Font {
    ctx.cached_font(name.deref(), || {
        let dict = resolver
            .resolve(Category::Font, name.deref())
            .and_then(Object::into_dict);

        if dict.is_none() {
            warn!("failed to resolve font {}", name.as_str());
        }

        Font::new(name.as_str(), dict.as_ref())
    })
}

/// Apply the entries of an external graphics state dictionary.
fn handle_gs(dict: &Dict<'_>, ctx: &mut Context) {
    for key in dict.keys() {
        if handle_gs_single(dict, &key, ctx).is_none() {
            warn!("invalid value in graphics state for {}", key.as_str());
        }
    }
}

fn handle_gs_single(dict: &Dict<'_>, key: &Name<'_>, ctx: &mut Context) -> Option<()> {
    match key.deref() {
        keys::LW => ctx.get_mut().line_width = dict.get::<f32>(key.deref())?,
        keys::LC => ctx.get_mut().line_cap = convert_line_cap(&dict.get::<Number>(key.deref())?),
        keys::LJ => ctx.get_mut().line_join = convert_line_join(&dict.get::<Number>(key.deref())?),
        keys::ML => ctx.get_mut().miter_limit = dict.get::<f32>(key.deref())?,
        keys::D => {
            let entry = dict.get::<Array<'_>>(key.deref())?;
            let mut iter = entry.flex_iter();
            let dashes = iter.next::<Array<'_>>()?;
            let phase = iter.next::<f32>()?;

            let state = ctx.get_mut();
            state.dash_array = dashes.iter::<f32>().collect();
            state.dash_offset = phase;
        }
        keys::RI => {
            let name = dict.get::<Name<'_>>(key.deref())?;
            ctx.get_mut().rendering_intent = RenderingIntent::from_name(name.deref())?;
        }
        keys::FL => ctx.get_mut().flatness = dict.get::<f32>(key.deref())?,
        keys::SM => ctx.get_mut().smoothness = dict.get::<f32>(key.deref())?,
        keys::FONT => {
            let entry = dict.get::<Array<'_>>(key.deref())?;
            let mut iter = entry.flex_iter();
            let font_dict = iter.next::<Dict<'_>>()?;
            let size = iter.next::<f32>()?;

            let name = font_dict
                .get::<Name<'_>>(keys::BASE_FONT)
                .map(|n| n.as_str().to_string())
                .unwrap_or_default();

            ctx.get_mut().text_state.font = Some((Font::new(&name, Some(&font_dict)), size));
        }
        _ => {}
    }

    Some(())
}
