//! The objects that can appear as operands in a content stream.

use crate::byte_reader::Reader;
use crate::content::InlineImageData;
use crate::reader::{Readable, Skippable};
use std::fmt::Debug;

pub mod array;
pub mod bool;
pub mod dict;
pub mod name;
pub mod null;
pub mod number;
pub mod string;

pub use array::Array;
pub use dict::Dict;
pub use name::Name;
pub use null::Null;
pub use number::Number;

/// A trait for content-stream objects.
pub(crate) trait ObjectLike<'a>: TryFrom<Object<'a>> + Readable<'a> + Debug + Clone {}

pub(crate) mod macros {
    macro_rules! object {
        ($t:ident $(<$l:lifetime>),*, $s:ident) => {
            impl<'a> TryFrom<crate::object::Object<'a>> for $t$(<$l>),* {
                type Error = ();

                fn try_from(
                    value: crate::object::Object<'a>,
                ) -> std::result::Result<Self, Self::Error> {
                    match value {
                        crate::object::Object::$s(b) => Ok(b),
                        _ => Err(()),
                    }
                }
            }

            impl<'a> crate::object::ObjectLike<'a> for $t$(<$l>),* {}
        };
    }

    pub(crate) use object;
}

/// A primitive content-stream object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object<'a> {
    /// A null object.
    Null(Null),
    /// A boolean object.
    Boolean(bool),
    /// A number object.
    Number(Number),
    /// A string object.
    String(string::String<'a>),
    /// A name object.
    Name(Name<'a>),
    /// A dict object.
    Dict(Dict<'a>),
    /// An array object.
    Array(Array<'a>),
    /// An inline image.
    // Never produced by the object grammar itself; the content lexer pushes
    // this after consuming the raw-byte sub-mode between `ID` and `EI`.
    InlineImage(InlineImageData<'a>),
}

impl<'a> Object<'a> {
    /// Parse an object from raw bytes.
    pub fn from_bytes(data: &'a [u8]) -> Option<Self> {
        <Self as Readable<'a>>::from_bytes(data)
    }

    /// Try casting the object to a specific subtype.
    pub(crate) fn cast<T>(self) -> Option<T>
    where
        T: ObjectLike<'a>,
    {
        self.try_into().ok()
    }

    #[inline(always)]
    pub fn into_dict(self) -> Option<Dict<'a>> {
        self.cast()
    }

    #[inline(always)]
    pub fn into_name(self) -> Option<Name<'a>> {
        self.cast()
    }

    #[inline(always)]
    pub fn into_string(self) -> Option<string::String<'a>> {
        self.cast()
    }

    #[inline(always)]
    pub fn into_array(self) -> Option<Array<'a>> {
        self.cast()
    }

    #[inline(always)]
    pub fn into_f32(self) -> Option<f32> {
        self.cast()
    }

    #[inline(always)]
    pub fn into_number(self) -> Option<Number> {
        self.cast()
    }
}

impl<'a> ObjectLike<'a> for Object<'a> {}

impl Skippable for Object<'_> {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        match r.peek_byte()? {
            b'n' => Null::skip(r),
            b't' | b'f' => bool::skip(r),
            b'/' => Name::skip(r),
            b'<' => match r.peek_bytes(2)? {
                b"<<" => Dict::skip(r),
                _ => string::String::skip(r),
            },
            b'(' => string::String::skip(r),
            b'.' | b'+' | b'-' | b'0'..=b'9' => Number::skip(r),
            b'[' => Array::skip(r),
            _ => None,
        }
    }
}

impl<'a> Readable<'a> for Object<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        let object = match r.peek_byte()? {
            b'n' => Self::Null(Null::read(r)?),
            b't' | b'f' => Self::Boolean(bool::read(r)?),
            b'/' => Self::Name(Name::read(r)?),
            b'<' => match r.peek_bytes(2)? {
                b"<<" => Self::Dict(Dict::read(r)?),
                _ => Self::String(string::String::read(r)?),
            },
            b'(' => Self::String(string::String::read(r)?),
            b'.' | b'+' | b'-' | b'0'..=b'9' => Self::Number(Number::read(r)?),
            b'[' => Self::Array(Array::read(r)?),
            _ => return None,
        };

        Some(object)
    }
}
