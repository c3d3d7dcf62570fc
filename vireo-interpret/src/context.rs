//! The interpreter context.

use crate::color::ColorSpace;
use crate::cookie::Cookie;
use crate::font::Font;
use crate::state::{FillRule, State};
use kurbo::{BezPath, Point};
use rustc_hash::FxHashMap;

/// The mutable state owned by one interpreter invocation: the graphics
/// state stack, the accumulated path and the per-invocation caches.
pub(crate) struct Context {
    states: Vec<State>,
    path: BezPath,
    sub_path_start: Point,
    last_point: Point,
    pending_clip: Option<FillRule>,
    in_text: bool,
    compatibility_depth: u32,
    color_space_cache: FxHashMap<Vec<u8>, Option<ColorSpace>>,
    font_cache: FxHashMap<Vec<u8>, Font>,
    pub(crate) cookie: Cookie,
}

impl Context {
    /// Create a new context.
    pub(crate) fn new(cookie: Cookie) -> Self {
        Self {
            states: vec![State::new()],
            path: BezPath::new(),
            sub_path_start: Point::default(),
            last_point: Point::default(),
            pending_clip: None,
            in_text: false,
            compatibility_depth: 0,
            color_space_cache: FxHashMap::default(),
            font_cache: FxHashMap::default(),
            cookie,
        }
    }

    /// Push a copy of the current state.
    pub(crate) fn save_state(&mut self) {
        let cur = self.get().clone();
        self.states.push(cur);
    }

    /// Pop the current state. Returns `false` if only the initial state is
    /// left, in which case nothing is popped.
    pub(crate) fn restore_state(&mut self) -> bool {
        if self.states.len() > 1 {
            self.states.pop();

            true
        } else {
            false
        }
    }

    pub(crate) fn num_states(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn get(&self) -> &State {
        // The stack is never empty; `restore_state` refuses to pop the
        // last element.
        self.states.last().expect("state stack is never empty")
    }

    pub(crate) fn get_mut(&mut self) -> &mut State {
        self.states.last_mut().expect("state stack is never empty")
    }

    pub(crate) fn path(&self) -> &BezPath {
        &self.path
    }

    pub(crate) fn path_mut(&mut self) -> &mut BezPath {
        &mut self.path
    }

    pub(crate) fn sub_path_start(&self) -> Point {
        self.sub_path_start
    }

    pub(crate) fn set_sub_path_start(&mut self, point: Point) {
        self.sub_path_start = point;
    }

    pub(crate) fn last_point(&self) -> Point {
        self.last_point
    }

    pub(crate) fn set_last_point(&mut self, point: Point) {
        self.last_point = point;
    }

    pub(crate) fn pending_clip(&self) -> Option<FillRule> {
        self.pending_clip
    }

    pub(crate) fn set_pending_clip(&mut self, rule: Option<FillRule>) {
        self.pending_clip = rule;
    }

    pub(crate) fn in_text(&self) -> bool {
        self.in_text
    }

    pub(crate) fn set_in_text(&mut self, in_text: bool) {
        self.in_text = in_text;
    }

    pub(crate) fn in_compatibility_section(&self) -> bool {
        self.compatibility_depth > 0
    }

    pub(crate) fn enter_compatibility_section(&mut self) {
        self.compatibility_depth += 1;
    }

    pub(crate) fn leave_compatibility_section(&mut self) {
        self.compatibility_depth = self.compatibility_depth.saturating_sub(1);
    }

    /// Look up a color space in the per-invocation cache, resolving and
    /// inserting it on a miss.
    pub(crate) fn cached_color_space(
        &mut self,
        name: &[u8],
        resolve: impl FnOnce() -> Option<ColorSpace>,
    ) -> Option<ColorSpace> {
        self.color_space_cache
            .entry(name.to_vec())
            .or_insert_with(resolve)
            .clone()
    }

    /// Look up a font in the per-invocation cache, resolving and inserting
    /// it on a miss.
    pub(crate) fn cached_font(&mut self, name: &[u8], resolve: impl FnOnce() -> Font) -> Font {
        self.font_cache
            .entry(name.to_vec())
            .or_insert_with(resolve)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::cookie::Cookie;

    #[test]
    fn save_restore() {
        let mut ctx = Context::new(Cookie::new());
        assert_eq!(ctx.num_states(), 1);

        ctx.save_state();
        assert_eq!(ctx.num_states(), 2);

        assert!(ctx.restore_state());
        assert_eq!(ctx.num_states(), 1);
    }

    #[test]
    fn restore_never_pops_the_last_state() {
        let mut ctx = Context::new(Cookie::new());

        assert!(!ctx.restore_state());
        assert_eq!(ctx.num_states(), 1);
    }
}
