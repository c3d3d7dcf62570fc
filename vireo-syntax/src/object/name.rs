//! Name objects.

use crate::byte_reader::Reader;
use crate::object::macros::object;
use crate::reader::{Readable, Skippable};
use crate::trivia::is_regular_character;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Cow<'a> {
    Borrowed(&'a [u8]),
    Owned(Vec<u8>),
}

/// A name in a content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name<'a>(Cow<'a>);

impl<'a> AsRef<Name<'a>> for Name<'a> {
    fn as_ref(&self) -> &Name<'a> {
        self
    }
}

impl Hash for Name<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.deref().hash(state)
    }
}

// Allows map lookups keyed by the raw (unescaped) bytes of a name.
impl std::borrow::Borrow<[u8]> for Name<'_> {
    fn borrow(&self) -> &[u8] {
        self.deref()
    }
}

impl Deref for Name<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match &self.0 {
            Cow::Borrowed(a) => a,
            Cow::Owned(v) => v.as_ref(),
        }
    }
}

impl<'a> Name<'a> {
    /// Create a new name from a sequence of bytes, decoding `#xx` escapes.
    pub fn new(data: &'a [u8]) -> Name<'a> {
        fn convert_hex(c: u8) -> u8 {
            match c {
                b'A'..=b'F' => c - b'A' + 10,
                b'a'..=b'f' => c - b'a' + 10,
                _ => c - b'0',
            }
        }

        let data = if !data.contains(&b'#') {
            Cow::Borrowed(data)
        } else {
            let mut cleaned = vec![];

            let mut r = Reader::new(data);

            while let Some(b) = r.read_byte() {
                if b == b'#' {
                    // We already verified when skipping that a valid hex sequence follows.
                    match r.read_bytes(2) {
                        Some(hex) => cleaned.push(convert_hex(hex[0]) << 4 | convert_hex(hex[1])),
                        None => cleaned.push(b),
                    }
                } else {
                    cleaned.push(b);
                }
            }

            Cow::Owned(cleaned)
        };

        Self(data)
    }

    /// Create a new name from bytes that contain no escapes.
    pub const fn from_unescaped(data: &'a [u8]) -> Name<'a> {
        Self(Cow::Borrowed(data))
    }

    /// Return a string representation of the name.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.deref()).unwrap_or("{non-ascii name}")
    }
}

object!(Name<'a>, Name);

impl Skippable for Name<'_> {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        skip_name_like(r, true)
    }
}

impl<'a> Readable<'a> for Name<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        let data = {
            let start = r.offset();
            skip_name_like(r, true)?;
            let end = r.offset();

            r.range(start + 1..end)?
        };

        Some(Self::new(data))
    }
}

// This method is shared by `Name` and the parser for content-stream operators (which behave like
// names, except that they aren't preceded by a solidus).
pub(crate) fn skip_name_like(r: &mut Reader<'_>, solidus: bool) -> Option<()> {
    if solidus {
        r.forward_tag(b"/")?;
    }

    while let Some(b) = r.eat(is_regular_character) {
        if b == b'#' {
            r.eat(|n| n.is_ascii_hexdigit())?;
            r.eat(|n| n.is_ascii_hexdigit())?;
        }
    }

    Some(())
}

#[cfg(test)]
mod tests {
    use crate::byte_reader::Reader;
    use crate::object::name::Name;
    use crate::reader::ReaderExt;
    use std::ops::Deref;

    #[test]
    fn name_1() {
        assert_eq!(Reader::new("/".as_bytes()).read::<Name>().unwrap().deref(), b"");
    }

    #[test]
    fn name_2() {
        assert!(Reader::new("dfg".as_bytes()).read::<Name>().is_none());
    }

    #[test]
    fn name_3() {
        assert!(Reader::new("/AB#FG".as_bytes()).read::<Name>().is_none());
    }

    #[test]
    fn name_4() {
        assert_eq!(
            Reader::new("/Name1".as_bytes()).read::<Name>().unwrap().deref(),
            b"Name1"
        );
    }

    #[test]
    fn name_5() {
        assert_eq!(
            Reader::new("/A;Name_With-Various***Characters?".as_bytes())
                .read::<Name>()
                .unwrap()
                .deref(),
            b"A;Name_With-Various***Characters?"
        );
    }

    #[test]
    fn name_6() {
        assert_eq!(
            Reader::new("/1.2".as_bytes()).read::<Name>().unwrap().deref(),
            b"1.2"
        );
    }

    #[test]
    fn name_7() {
        assert_eq!(
            Reader::new("/.notdef".as_bytes()).read::<Name>().unwrap().deref(),
            b".notdef"
        );
    }

    #[test]
    fn name_8() {
        assert_eq!(
            Reader::new("/lime#20Green".as_bytes())
                .read::<Name>()
                .unwrap()
                .deref(),
            b"lime Green"
        );
    }

    #[test]
    fn name_9() {
        assert_eq!(
            Reader::new("/paired#28#29parentheses".as_bytes())
                .read::<Name>()
                .unwrap()
                .deref(),
            b"paired()parentheses"
        );
    }

    #[test]
    fn name_10() {
        assert_eq!(
            Reader::new("/A#3b".as_bytes()).read::<Name>().unwrap().deref(),
            b"A;"
        );
    }

    #[test]
    fn name_11() {
        assert_eq!(
            Reader::new("/k1  ".as_bytes()).read::<Name>().unwrap().deref(),
            b"k1"
        );
    }
}
