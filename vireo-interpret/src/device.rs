//! The device boundary.
//!
//! The interpreter does not rasterize anything; it emits drawing intents
//! through the [`Device`] trait. Every intent carries a snapshot of the
//! graphics state in effect when it was emitted, so devices stay free of
//! state tracking.

use crate::state::{FillRule, State};
use kurbo::{Affine, BezPath};

/// A run of text shown by a single text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    /// The resource name of the font the run is shown with.
    pub font: String,
    /// The font size.
    pub size: f32,
    /// The raw string bytes of the run.
    pub text: Vec<u8>,
    /// The transform from glyph space to device space at the start of the
    /// run.
    pub transform: Affine,
}

/// An inline image, with its raw (still encoded) data.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// The width of the image in samples, if the dictionary carries one.
    pub width: Option<i32>,
    /// The height of the image in samples, if the dictionary carries one.
    pub height: Option<i32>,
    /// The raw data between `ID` and `EI`.
    pub data: Vec<u8>,
}

/// A marked-content event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkedContentEvent {
    /// `MP`/`DP`: a marked-content point.
    Point {
        /// The role tag of the point.
        tag: String,
    },
    /// `BMC`/`BDC`: begin of a marked-content sequence.
    Begin {
        /// The role tag of the sequence.
        tag: String,
    },
    /// `EMC`: end of a marked-content sequence.
    End,
}

/// The glyph metrics declared by the Type 3 operators `d0`/`d1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// The horizontal and vertical displacement of the glyph.
    pub advance: (f32, f32),
    /// The glyph bounding box declared by `d1`, if any.
    pub bbox: Option<[f32; 4]>,
}

/// A device that consumes the drawing intents of an interpretation.
pub trait Device {
    /// Stroke a path with the current stroke color and line style.
    fn stroke_path(&mut self, path: &BezPath, state: &State);
    /// Fill a path with the current fill color.
    fn fill_path(&mut self, path: &BezPath, rule: FillRule, state: &State);
    /// Show a run of text.
    fn draw_glyph_run(&mut self, run: &GlyphRun, state: &State);
    /// Invoke a named external object.
    fn invoke_x_object(&mut self, name: &str, state: &State);
    /// Paint a named shading over the current clip.
    fn draw_shading(&mut self, name: &str, state: &State);
    /// Draw an inline image.
    fn draw_inline_image(&mut self, image: &InlineImage, state: &State);
    /// Observe a marked-content event.
    fn marked_content(&mut self, event: &MarkedContentEvent, state: &State);
    /// Record the glyph metrics of a Type 3 glyph description.
    fn glyph_metrics(&mut self, metrics: &GlyphMetrics, state: &State);
}

/// One drawing intent, as recorded by [`IntentRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawIntent {
    /// Stroke a path.
    StrokePath {
        /// The path, in user space.
        path: BezPath,
        /// The state the path is stroked with.
        state: State,
    },
    /// Fill a path.
    FillPath {
        /// The path, in user space.
        path: BezPath,
        /// The winding rule to fill with.
        rule: FillRule,
        /// The state the path is filled with.
        state: State,
    },
    /// Show a run of text.
    GlyphRun {
        /// The run.
        run: GlyphRun,
        /// The state the run is shown with.
        state: State,
    },
    /// Invoke a named external object.
    XObject {
        /// The resource name of the object.
        name: String,
        /// The state the object is invoked with.
        state: State,
    },
    /// Paint a named shading.
    Shading {
        /// The resource name of the shading.
        name: String,
        /// The state the shading is painted with.
        state: State,
    },
    /// Draw an inline image.
    InlineImage {
        /// The image.
        image: InlineImage,
        /// The state the image is drawn with.
        state: State,
    },
    /// A marked-content event.
    MarkedContent {
        /// The event.
        event: MarkedContentEvent,
        /// The state at the event.
        state: State,
    },
    /// Glyph metrics declared by a Type 3 glyph description.
    GlyphMetrics {
        /// The metrics.
        metrics: GlyphMetrics,
    },
}

/// A [`Device`] that records all intents into an ordered list.
#[derive(Debug, Default)]
pub struct IntentRecorder {
    intents: Vec<DrawIntent>,
}

impl IntentRecorder {
    /// Create a new, empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the recorder, returning the recorded intents in order.
    pub fn finish(self) -> Vec<DrawIntent> {
        self.intents
    }
}

impl Device for IntentRecorder {
    fn stroke_path(&mut self, path: &BezPath, state: &State) {
        self.intents.push(DrawIntent::StrokePath {
            path: path.clone(),
            state: state.clone(),
        });
    }

    fn fill_path(&mut self, path: &BezPath, rule: FillRule, state: &State) {
        self.intents.push(DrawIntent::FillPath {
            path: path.clone(),
            rule,
            state: state.clone(),
        });
    }

    fn draw_glyph_run(&mut self, run: &GlyphRun, state: &State) {
        self.intents.push(DrawIntent::GlyphRun {
            run: run.clone(),
            state: state.clone(),
        });
    }

    fn invoke_x_object(&mut self, name: &str, state: &State) {
        self.intents.push(DrawIntent::XObject {
            name: name.to_string(),
            state: state.clone(),
        });
    }

    fn draw_shading(&mut self, name: &str, state: &State) {
        self.intents.push(DrawIntent::Shading {
            name: name.to_string(),
            state: state.clone(),
        });
    }

    fn draw_inline_image(&mut self, image: &InlineImage, state: &State) {
        self.intents.push(DrawIntent::InlineImage {
            image: image.clone(),
            state: state.clone(),
        });
    }

    fn marked_content(&mut self, event: &MarkedContentEvent, state: &State) {
        self.intents.push(DrawIntent::MarkedContent {
            event: event.clone(),
            state: state.clone(),
        });
    }

    fn glyph_metrics(&mut self, metrics: &GlyphMetrics, _: &State) {
        self.intents.push(DrawIntent::GlyphMetrics { metrics: *metrics });
    }
}
