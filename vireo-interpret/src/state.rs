//! The graphics state.

use crate::color::{ColorComponents, ColorSpace};
use crate::font::Font;
use kurbo::{Affine, BezPath, Cap, Join};
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

/// The winding rule used for filling and clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    /// The nonzero winding rule.
    NonZero,
    /// The even-odd rule.
    EvenOdd,
}

/// The rendering intent of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    /// Absolute colorimetric rendering.
    AbsoluteColorimetric,
    /// Relative colorimetric rendering.
    #[default]
    RelativeColorimetric,
    /// Saturation-preserving rendering.
    Saturation,
    /// Perceptual rendering.
    Perceptual,
}

impl RenderingIntent {
    pub(crate) fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"AbsoluteColorimetric" => Some(Self::AbsoluteColorimetric),
            b"RelativeColorimetric" => Some(Self::RelativeColorimetric),
            b"Saturation" => Some(Self::Saturation),
            b"Perceptual" => Some(Self::Perceptual),
            _ => None,
        }
    }
}

/// How glyphs of shown text are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRenderingMode {
    /// Fill the glyph outlines.
    #[default]
    Fill,
    /// Stroke the glyph outlines.
    Stroke,
    /// Fill, then stroke the glyph outlines.
    FillStroke,
    /// Paint nothing.
    Invisible,
    /// Fill the outlines and add them to the clip.
    FillAndClip,
    /// Stroke the outlines and add them to the clip.
    StrokeAndClip,
    /// Fill and stroke the outlines and add them to the clip.
    FillAndStrokeAndClip,
    /// Only add the outlines to the clip.
    Clip,
}

/// One entry in the chain of active clip regions.
///
/// Intersecting a new clip conses a node onto the chain; restoring a saved
/// state drops back to the shorter chain by value semantics, so no explicit
/// clip bookkeeping is needed on restore.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipNode {
    /// The clip path, in device space.
    pub path: BezPath,
    /// The winding rule the path is applied with.
    pub rule: FillRule,
    /// The enclosing clip region, if any.
    pub parent: Option<Arc<ClipNode>>,
}

/// The text-specific part of the graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Character spacing, in unscaled text-space units.
    pub char_space: f32,
    /// Word spacing, applied to single-byte code 32.
    pub word_space: f32,
    /// Horizontal scaling, in percent.
    pub horizontal_scaling: f32,
    /// Leading between text lines.
    pub leading: f32,
    /// The selected font and its size, if any.
    pub font: Option<(Font, f32)>,
    /// How shown glyphs are painted.
    pub render_mode: TextRenderingMode,
    /// The text matrix.
    pub text_matrix: Affine,
    /// The text line matrix.
    pub text_line_matrix: Affine,
    /// Text rise.
    pub rise: f32,
}

impl TextState {
    pub(crate) fn horizontal_scaling(&self) -> f32 {
        self.horizontal_scaling / 100.0
    }

    pub(crate) fn font_size(&self) -> f32 {
        self.font.as_ref().map(|f| f.1).unwrap_or(0.0)
    }

    /// The transform from glyph space to text space for the current font
    /// parameters.
    fn font_transform(&self) -> Affine {
        Affine::new([
            self.font_size() as f64 * self.horizontal_scaling() as f64,
            0.0,
            0.0,
            self.font_size() as f64,
            0.0,
            self.rise as f64,
        ])
    }

    /// Advance the text matrix past a glyph.
    pub(crate) fn step(&mut self, glyph_width: f32, is_word_boundary: bool) {
        let word_space = if is_word_boundary { self.word_space } else { 0.0 };
        let tx = (glyph_width * self.font_size() + self.char_space + word_space)
            * self.horizontal_scaling();

        self.text_matrix *= Affine::translate((tx as f64, 0.0));
    }

    /// Apply a `TJ` positioning adjustment, in 1/1000 text-space units.
    pub(crate) fn apply_adjustment(&mut self, adjustment: f32) {
        let tx = -adjustment / 1000.0 * self.font_size() * self.horizontal_scaling();

        self.text_matrix *= Affine::translate((tx as f64, 0.0));
    }
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font: None,
            render_mode: TextRenderingMode::default(),
            text_matrix: Affine::IDENTITY,
            text_line_matrix: Affine::IDENTITY,
            rise: 0.0,
        }
    }
}

/// A graphics state, as manipulated by the `q`/`Q` operators.
///
/// This is a plain value record: pushing clones it, popping discards it, and
/// no two stack entries share mutable data.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    /// The current transformation matrix.
    pub ctm: Affine,
    /// The stroke color components.
    pub stroke_color: ColorComponents,
    /// The stroke color space.
    pub stroke_cs: ColorSpace,
    /// The name of the stroke pattern, if one is selected.
    pub stroke_pattern: Option<String>,
    /// The fill color components.
    pub fill_color: ColorComponents,
    /// The fill color space.
    pub fill_cs: ColorSpace,
    /// The name of the fill pattern, if one is selected.
    pub fill_pattern: Option<String>,
    /// The line width.
    pub line_width: f32,
    /// The line cap style.
    pub line_cap: Cap,
    /// The line join style.
    pub line_join: Join,
    /// The miter limit.
    pub miter_limit: f32,
    /// The dash array.
    pub dash_array: SmallVec<[f32; 4]>,
    /// The dash phase.
    pub dash_offset: f32,
    /// The rendering intent.
    pub rendering_intent: RenderingIntent,
    /// The flatness tolerance.
    pub flatness: f32,
    /// The smoothness tolerance.
    pub smoothness: f32,
    /// The text state.
    pub text_state: TextState,
    /// The innermost active clip region, if any.
    pub clip: Option<Arc<ClipNode>>,
}

impl State {
    pub(crate) fn new() -> Self {
        Self {
            ctm: Affine::IDENTITY,
            stroke_color: smallvec![0.0],
            stroke_cs: ColorSpace::device_gray(),
            stroke_pattern: None,
            fill_color: smallvec![0.0],
            fill_cs: ColorSpace::device_gray(),
            fill_pattern: None,
            line_width: 1.0,
            line_cap: Cap::Butt,
            line_join: Join::Miter,
            miter_limit: 10.0,
            dash_array: smallvec![],
            dash_offset: 0.0,
            rendering_intent: RenderingIntent::default(),
            flatness: 1.0,
            smoothness: 0.01,
            text_state: TextState::default(),
            clip: None,
        }
    }

    /// The transform from glyph space to device space at the current text
    /// position.
    pub fn text_transform(&self) -> Affine {
        self.ctm * self.text_state.text_matrix * self.text_state.font_transform()
    }

    /// Push a clip region, intersecting it with the active one.
    pub(crate) fn push_clip(&mut self, path: BezPath, rule: FillRule) {
        self.clip = Some(Arc::new(ClipNode {
            path,
            rule,
            parent: self.clip.take(),
        }));
    }
}
