//! Font handles.
//!
//! Glyph shaping and outline rendering are out of scope; all the interpreter
//! needs from a font is its name and the advance widths used to step the
//! text matrix. Widths are read from the simple-font width table; anything
//! more elaborate is the rasterizer's problem.

use vireo_syntax::object::dict::keys;
use vireo_syntax::object::{Array, Dict};

/// A font selected by the `Tf` operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    name: String,
    first_char: i32,
    widths: Vec<f32>,
    missing_width: f32,
}

impl Font {
    /// Create a new font from its resource name and (optionally) the
    /// resolved font dictionary.
    pub(crate) fn new(name: &str, dict: Option<&Dict<'_>>) -> Self {
        let mut font = Self {
            name: name.to_string(),
            first_char: 0,
            widths: vec![],
            missing_width: 0.0,
        };

        let Some(dict) = dict else {
            return font;
        };

        font.first_char = dict.get::<i32>(keys::FIRST_CHAR).unwrap_or(0);
        font.widths = dict
            .get::<Array<'_>>(keys::WIDTHS)
            .map(|a| a.iter::<f32>().collect())
            .unwrap_or_default();
        font.missing_width = dict
            .get::<Dict<'_>>(keys::FONT_DESCRIPTOR)
            .and_then(|d| d.get::<f32>(keys::MISSING_WIDTH))
            .unwrap_or(0.0);

        font
    }

    /// The resource name the font was selected by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The advance width of a character code, in glyph-space (1/1000) units.
    pub fn glyph_width(&self, code: u8) -> f32 {
        let index = code as i32 - self.first_char;

        usize::try_from(index)
            .ok()
            .and_then(|i| self.widths.get(i).copied())
            .unwrap_or(self.missing_width)
    }
}

#[cfg(test)]
mod tests {
    use crate::font::Font;
    use vireo_syntax::object::Dict;

    #[test]
    fn widths() {
        let dict =
            Dict::from_bytes(b"<< /FirstChar 65 /Widths [500 600] >>").unwrap();
        let font = Font::new("F1", Some(&dict));

        assert_eq!(font.glyph_width(65), 500.0);
        assert_eq!(font.glyph_width(66), 600.0);
        assert_eq!(font.glyph_width(64), 0.0);
        assert_eq!(font.glyph_width(67), 0.0);
    }

    #[test]
    fn missing_width() {
        let dict = Dict::from_bytes(
            b"<< /FirstChar 65 /Widths [500] /FontDescriptor << /MissingWidth 250 >> >>",
        )
        .unwrap();
        let font = Font::new("F1", Some(&dict));

        assert_eq!(font.glyph_width(32), 250.0);
    }

    #[test]
    fn unresolved() {
        let font = Font::new("F9", None);

        assert_eq!(font.name(), "F9");
        assert_eq!(font.glyph_width(65), 0.0);
    }
}
