//! Conversions from operand values to state types.

use kurbo::{Affine, Cap, Join};
use log::warn;
use vireo_syntax::content::ops::Transform;
use vireo_syntax::object::Number;

pub(crate) fn convert_line_cap(cap: &Number) -> Cap {
    match cap.as_i32() {
        0 => Cap::Butt,
        1 => Cap::Round,
        2 => Cap::Square,
        other => {
            warn!("invalid line cap style {other}");

            Cap::Butt
        }
    }
}

pub(crate) fn convert_line_join(join: &Number) -> Join {
    match join.as_i32() {
        0 => Join::Miter,
        1 => Join::Round,
        2 => Join::Bevel,
        other => {
            warn!("invalid line join style {other}");

            Join::Miter
        }
    }
}

pub(crate) fn convert_transform(t: &Transform) -> Affine {
    Affine::new([
        t.0.as_f64(),
        t.1.as_f64(),
        t.2.as_f64(),
        t.3.as_f64(),
        t.4.as_f64(),
        t.5.as_f64(),
    ])
}
