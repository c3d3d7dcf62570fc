//! Reading content-stream objects from raw bytes.

use crate::byte_reader::Reader;
use crate::trivia::{Comment, is_eol_character, is_white_space_character};

/// Extension trait for the `Reader` struct.
pub(crate) trait ReaderExt<'a> {
    fn read<T: Readable<'a>>(&mut self) -> Option<T>;
    fn skip<T: Skippable>(&mut self) -> Option<&'a [u8]>;
    fn skip_white_spaces(&mut self);
    fn skip_eol_characters(&mut self);
    fn skip_white_spaces_and_comments(&mut self);
}

impl<'a> ReaderExt<'a> for Reader<'a> {
    #[inline]
    fn read<T: Readable<'a>>(&mut self) -> Option<T> {
        let old_offset = self.offset;

        T::read(self).or_else(|| {
            self.offset = old_offset;

            None
        })
    }

    #[inline]
    fn skip<T: Skippable>(&mut self) -> Option<&'a [u8]> {
        let old_offset = self.offset;

        T::skip(self).or_else(|| {
            self.offset = old_offset;
            None
        })?;

        self.data.get(old_offset..self.offset)
    }

    #[inline]
    fn skip_white_spaces(&mut self) {
        self.forward_while(is_white_space_character);
    }

    #[inline]
    fn skip_eol_characters(&mut self) {
        self.forward_while(is_eol_character);
    }

    #[inline]
    fn skip_white_spaces_and_comments(&mut self) {
        while let Some(b) = self.peek_byte() {
            if is_white_space_character(b) {
                self.skip_white_spaces();
            } else if b == b'%' {
                Comment::skip(self);
            } else {
                return;
            }
        }
    }
}

/// A type that can be parsed from a byte stream.
///
/// Parsers must only advance the reader on success; the `ReaderExt`
/// combinators rewind to the previous offset when `None` is returned.
pub(crate) trait Readable<'a>: Sized {
    fn read(r: &mut Reader<'a>) -> Option<Self>;

    fn from_bytes(b: &'a [u8]) -> Option<Self> {
        let mut r = Reader::new(b);

        Self::read(&mut r)
    }
}

/// A type whose byte representation can be skipped over without materializing it.
pub(crate) trait Skippable {
    fn skip(r: &mut Reader<'_>) -> Option<()>;
}
