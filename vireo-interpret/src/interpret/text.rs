//! Text positioning and showing.

use crate::context::Context;
use crate::device::{Device, GlyphRun};
use kurbo::Affine;
use log::warn;

/// Move to the start of the next line, offset by `(tx, ty)` from the
/// current one.
pub(crate) fn next_line(ctx: &mut Context, tx: f64, ty: f64) {
    let text_state = &mut ctx.get_mut().text_state;
    let new_matrix = text_state.text_line_matrix * Affine::translate((tx, ty));

    text_state.text_line_matrix = new_matrix;
    text_state.text_matrix = new_matrix;
}

/// Show one text string: emit a glyph-run intent and advance the text
/// matrix by the width of each glyph.
pub(crate) fn show_text_string(ctx: &mut Context, device: &mut impl Device, text: &[u8]) {
    let state = ctx.get().clone();

    let Some((font, size)) = state.text_state.font.clone() else {
        warn!("text was shown before a font was selected");

        return;
    };

    let run = GlyphRun {
        font: font.name().to_string(),
        size,
        text: text.to_vec(),
        transform: state.text_transform(),
    };
    device.draw_glyph_run(&run, &state);

    let text_state = &mut ctx.get_mut().text_state;
    for code in text {
        let width = font.glyph_width(*code) / 1000.0;
        text_state.step(width, *code == b' ');
    }
}
