//! Dictionary objects.

use crate::byte_reader::Reader;
use crate::object::macros::object;
use crate::object::{Name, Object, ObjectLike};
use crate::reader::{Readable, ReaderExt, Skippable};
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// A dictionary, which is a key-value map, keys being names, and values being any
/// content-stream object.
#[derive(Clone)]
pub struct Dict<'a>(Arc<Repr<'a>>);

impl Default for Dict<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

// Note that this is not structural equality, i.e. two dictionaries with the same
// items are still considered different if they have different whitespaces.
impl PartialEq for Dict<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.data == other.0.data
    }
}

impl<'a> Dict<'a> {
    /// Parse a dictionary from raw bytes.
    pub fn from_bytes(data: &'a [u8]) -> Option<Dict<'a>> {
        Reader::new(data).read::<Dict<'a>>()
    }

    /// Create a new empty dictionary.
    pub fn empty() -> Dict<'a> {
        let repr = Repr {
            data: &[],
            offsets: FxHashMap::default(),
        };

        Self(Arc::new(repr))
    }

    /// Returns the number of entries in the dictionary.
    pub fn len(&self) -> usize {
        self.0.offsets.len()
    }

    /// Return whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.0.offsets.is_empty()
    }

    /// Returns the entry of a key resolved as a specific object type.
    #[allow(
        private_bounds,
        reason = "users shouldn't be able to implement `ObjectLike` for custom objects."
    )]
    pub fn get<T>(&self, key: impl Deref<Target = [u8]>) -> Option<T>
    where
        T: ObjectLike<'a>,
    {
        let offset = *self.0.offsets.get(key.deref())?;

        Reader::new(&self.0.data[offset..]).read::<T>()
    }

    /// Returns an iterator over all keys in the dictionary.
    pub fn keys(&self) -> impl Iterator<Item = Name<'a>> {
        self.0.offsets.keys().cloned()
    }
}

impl Debug for Dict<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("Dict");

        for (key, offset) in &self.0.offsets {
            debug_struct.field(
                key.as_str(),
                &Reader::new(&self.0.data[*offset..]).read::<Object<'_>>(),
            );
        }

        debug_struct.finish()
    }
}

impl Skippable for Dict<'_> {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        r.forward_tag(b"<<")?;

        loop {
            r.skip_white_spaces_and_comments();

            if r.forward_tag(b">>").is_some() {
                break Some(());
            } else {
                if r.skip::<Name<'_>>().is_none() {
                    // In case there is garbage in-between, be lenient and just try to skip it.
                    r.skip::<Object<'_>>()?;
                    continue;
                };

                r.skip_white_spaces_and_comments();
                r.skip::<Object<'_>>()?;
            }
        }
    }
}

impl<'a> Readable<'a> for Dict<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        read_inner(r, Some(b"<<"), DictEnd::Tag(b">>"))
    }
}

#[derive(Clone, Copy)]
enum DictEnd {
    /// Normal dictionaries end with `>>`.
    Tag(&'static [u8]),
    /// Inline image dictionaries end right before the `ID` operator.
    BeforeTag(&'static [u8]),
}

fn read_inner<'a>(
    r: &mut Reader<'a>,
    start_tag: Option<&[u8]>,
    end: DictEnd,
) -> Option<Dict<'a>> {
    let mut offsets = FxHashMap::default();

    let data = {
        let dict_data = r.tail()?;
        let start_offset = r.offset();

        if let Some(start_tag) = start_tag {
            r.forward_tag(start_tag)?;
        }

        loop {
            r.skip_white_spaces_and_comments();

            let end_found = match end {
                DictEnd::Tag(tag) => r.forward_tag(tag).is_some(),
                DictEnd::BeforeTag(tag) => r.peek_tag(tag).is_some(),
            };

            if end_found {
                let end_offset = r.offset() - start_offset;

                break &dict_data[..end_offset];
            } else {
                let Some(name) = r.read::<Name<'a>>() else {
                    if start_tag.is_some() {
                        // In case there is garbage in-between, be lenient and just try to skip it.
                        // But only do this if we are parsing a proper dictionary as opposed to an
                        // inline image dictionary.
                        r.skip::<Object<'_>>()?;
                        continue;
                    } else {
                        return None;
                    }
                };
                r.skip_white_spaces_and_comments();

                let offset = r.offset() - start_offset;
                offsets.insert(name, offset);

                r.skip::<Object<'_>>()?;
            }
        }
    };

    Some(Dict(Arc::new(Repr { data, offsets })))
}

object!(Dict<'a>, Dict);

struct Repr<'a> {
    data: &'a [u8],
    offsets: FxHashMap<Name<'a>, usize>,
}

/// The entry dictionary of an inline image, which is delimited by `BI` and `ID`
/// instead of the usual brackets.
pub(crate) struct InlineImageDict<'a>(Dict<'a>);

impl<'a> InlineImageDict<'a> {
    pub(crate) fn into_dict(self) -> Dict<'a> {
        self.0
    }
}

impl<'a> Readable<'a> for InlineImageDict<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        Some(Self(read_inner(r, None, DictEnd::BeforeTag(b"ID"))?))
    }
}

/// Commonly used dictionary keys and name values.
pub mod keys {
    /// The resource category for color spaces.
    pub const COLORSPACE: &[u8] = b"ColorSpace";
    /// The resource category for fonts.
    pub const FONT: &[u8] = b"Font";
    /// The resource category for external objects.
    pub const XOBJECT: &[u8] = b"XObject";
    /// The resource category for patterns.
    pub const PATTERN: &[u8] = b"Pattern";
    /// The resource category for shadings.
    pub const SHADING: &[u8] = b"Shading";
    /// The resource category for external graphics states.
    pub const EXT_G_STATE: &[u8] = b"ExtGState";
    /// The resource category for marked-content properties.
    pub const PROPERTIES: &[u8] = b"Properties";

    /// The device gray color space.
    pub const DEVICE_GRAY: &[u8] = b"DeviceGray";
    /// The device RGB color space.
    pub const DEVICE_RGB: &[u8] = b"DeviceRGB";
    /// The device CMYK color space.
    pub const DEVICE_CMYK: &[u8] = b"DeviceCMYK";
    /// The abbreviation of the device gray color space in inline images.
    pub const G: &[u8] = b"G";
    /// The abbreviation of the device RGB color space in inline images.
    pub const RGB: &[u8] = b"RGB";
    /// The abbreviation of the device CMYK color space in inline images.
    pub const CMYK: &[u8] = b"CMYK";
    /// The calibrated gray color space.
    pub const CAL_GRAY: &[u8] = b"CalGray";
    /// The calibrated RGB color space.
    pub const CAL_RGB: &[u8] = b"CalRGB";
    /// The CIE Lab color space.
    pub const LAB: &[u8] = b"Lab";
    /// The ICC-based color space.
    pub const ICC_BASED: &[u8] = b"ICCBased";
    /// The indexed color space.
    pub const INDEXED: &[u8] = b"Indexed";
    /// The abbreviation of the indexed color space in inline images.
    pub const I: &[u8] = b"I";
    /// The separation color space.
    pub const SEPARATION: &[u8] = b"Separation";
    /// The DeviceN color space.
    pub const DEVICE_N: &[u8] = b"DeviceN";

    /// The number of components of an ICC-based color space.
    pub const N: &[u8] = b"N";
    /// The alternate color space.
    pub const ALTERNATE: &[u8] = b"Alternate";
    /// The white point of a CIE-based color space.
    pub const WHITE_POINT: &[u8] = b"WhitePoint";
    /// The component ranges of a Lab color space.
    pub const RANGE: &[u8] = b"Range";

    /// The width of an image.
    pub const W: &[u8] = b"W";
    /// The long form of the width key.
    pub const WIDTH: &[u8] = b"Width";
    /// The height of an image.
    pub const H: &[u8] = b"H";
    /// The long form of the height key.
    pub const HEIGHT: &[u8] = b"Height";

    /// The first character code covered by a font's width table.
    pub const FIRST_CHAR: &[u8] = b"FirstChar";
    /// The width table of a font.
    pub const WIDTHS: &[u8] = b"Widths";
    /// The fallback width of a font.
    pub const MISSING_WIDTH: &[u8] = b"MissingWidth";
    /// The PostScript name of a font.
    pub const BASE_FONT: &[u8] = b"BaseFont";
    /// The font descriptor of a font.
    pub const FONT_DESCRIPTOR: &[u8] = b"FontDescriptor";

    /// The line width entry of an external graphics state.
    pub const LW: &[u8] = b"LW";
    /// The line cap entry of an external graphics state.
    pub const LC: &[u8] = b"LC";
    /// The line join entry of an external graphics state.
    pub const LJ: &[u8] = b"LJ";
    /// The miter limit entry of an external graphics state.
    pub const ML: &[u8] = b"ML";
    /// The dash pattern entry of an external graphics state.
    pub const D: &[u8] = b"D";
    /// The rendering intent entry of an external graphics state.
    pub const RI: &[u8] = b"RI";
    /// The flatness tolerance entry of an external graphics state.
    pub const FL: &[u8] = b"FL";
    /// The smoothness tolerance entry of an external graphics state.
    pub const SM: &[u8] = b"SM";
}

#[cfg(test)]
mod tests {
    use crate::byte_reader::Reader;
    use crate::object::dict::{Dict, keys};
    use crate::object::{Array, Name};
    use crate::reader::ReaderExt;

    #[test]
    fn dict_empty() {
        let dict = Reader::new("<<>>".as_bytes()).read::<Dict<'_>>().unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn dict_1() {
        let dict = Reader::new("<< /Entry 45 >>".as_bytes())
            .read::<Dict<'_>>()
            .unwrap();
        assert_eq!(dict.get::<i32>(Name::from_unescaped(b"Entry")), Some(45));
    }

    #[test]
    fn dict_2() {
        let dict = Reader::new("<</A 1/B(text)/C[1 2]>>".as_bytes())
            .read::<Dict<'_>>()
            .unwrap();
        assert_eq!(dict.len(), 3);
        assert!(dict.get::<Array<'_>>(Name::from_unescaped(b"C")).is_some());
    }

    #[test]
    fn dict_nested() {
        let dict = Reader::new("<</Inner <</X 1>> >>".as_bytes())
            .read::<Dict<'_>>()
            .unwrap();
        let inner = dict.get::<Dict<'_>>(Name::from_unescaped(b"Inner")).unwrap();
        assert_eq!(inner.get::<i32>(Name::from_unescaped(b"X")), Some(1));
    }

    #[test]
    fn dict_key_constant() {
        let dict = Reader::new("<</W 8/H 8>>".as_bytes())
            .read::<Dict<'_>>()
            .unwrap();
        assert_eq!(dict.get::<i32>(keys::W), Some(8));
        assert_eq!(dict.get::<i32>(keys::H), Some(8));
    }

    #[test]
    fn dict_unterminated() {
        assert!(Reader::new("<</A 1".as_bytes()).read::<Dict<'_>>().is_none());
    }
}
