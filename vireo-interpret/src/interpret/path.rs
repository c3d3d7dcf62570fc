//! Path painting.

use crate::context::Context;
use crate::device::Device;
use crate::state::FillRule;

/// Close the current subpath and reset the current point to its start.
pub(crate) fn close_path(ctx: &mut Context) {
    ctx.path_mut().close_path();
    ctx.set_last_point(ctx.sub_path_start());
}

pub(crate) fn fill_path(ctx: &mut Context, device: &mut impl Device, rule: FillRule) {
    if !ctx.path().elements().is_empty() {
        device.fill_path(ctx.path(), rule, ctx.get());
    }

    end_path(ctx);
}

pub(crate) fn stroke_path(ctx: &mut Context, device: &mut impl Device) {
    if !ctx.path().elements().is_empty() {
        device.stroke_path(ctx.path(), ctx.get());
    }

    end_path(ctx);
}

pub(crate) fn fill_stroke_path(ctx: &mut Context, device: &mut impl Device, rule: FillRule) {
    if !ctx.path().elements().is_empty() {
        device.fill_path(ctx.path(), rule, ctx.get());
        device.stroke_path(ctx.path(), ctx.get());
    }

    end_path(ctx);
}

/// Intersect a pending clip marked by `W`/`W*` into the current state and
/// discard the accumulated path.
///
/// The clip takes effect only after the path has been painted, which is why
/// every painting operator funnels through here last.
pub(crate) fn end_path(ctx: &mut Context) {
    if let Some(rule) = ctx.pending_clip() {
        if !ctx.path().elements().is_empty() {
            let clip_path = ctx.get().ctm * ctx.path().clone();
            ctx.get_mut().push_clip(clip_path, rule);
        }

        ctx.set_pending_clip(None);
    }

    ctx.path_mut().truncate(0);
}
