//! String objects.

use crate::byte_reader::Reader;
use crate::object::macros::object;
use crate::reader::{Readable, ReaderExt, Skippable};
use crate::trivia::is_white_space_character;
use log::warn;
use std::borrow::Cow;

/// A hex-encoded string.
#[derive(Clone, Debug)]
struct HexString<'a>(&'a [u8], bool);

impl HexString<'_> {
    /// Returns the content of the string.
    fn get(&self) -> Vec<u8> {
        if self.1 {
            let mut cleaned = Vec::with_capacity(self.0.len() + 1);

            for b in self.0.iter().copied() {
                if !is_white_space_character(b) {
                    cleaned.push(b);
                }
            }

            if cleaned.len() % 2 != 0 {
                cleaned.push(b'0');
            }

            decode_hex(&cleaned)
        } else {
            decode_hex(self.0)
        }
    }
}

impl PartialEq for HexString<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl Skippable for HexString<'_> {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        parse_hex(r).map(|_| {})
    }
}

impl<'a> Readable<'a> for HexString<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        let start = r.offset();
        let mut dirty = parse_hex(r)?;
        let end = r.offset();

        // Exclude outer brackets.
        let result = r.range(start + 1..end - 1)?;
        dirty |= result.len() % 2 != 0;

        Some(HexString(result, dirty))
    }
}

fn parse_hex(r: &mut Reader<'_>) -> Option<bool> {
    let mut has_whitespace = false;

    r.forward_tag(b"<")?;
    while let Some(b) = r.peek_byte() {
        let is_hex = b.is_ascii_hexdigit();
        let is_whitespace = is_white_space_character(b);
        has_whitespace |= is_whitespace;

        if !is_hex && !is_whitespace {
            break;
        }

        r.read_byte()?;
    }
    r.forward_tag(b">")?;

    Some(has_whitespace)
}

// The input has been validated as an even-length hex digit sequence while parsing.
fn decode_hex(data: &[u8]) -> Vec<u8> {
    fn convert(b: u8) -> u8 {
        match b {
            b'A'..=b'F' => b - b'A' + 10,
            b'a'..=b'f' => b - b'a' + 10,
            _ => b - b'0',
        }
    }

    data.chunks_exact(2)
        .map(|pair| convert(pair[0]) << 4 | convert(pair[1]))
        .collect()
}

/// A literal string.
#[derive(Debug, Clone)]
struct LiteralString<'a>(&'a [u8], bool);

impl<'a> LiteralString<'a> {
    /// Returns the content of the string.
    fn get(&self) -> Cow<'a, [u8]> {
        if !self.1 {
            return Cow::Borrowed(self.0);
        }

        let mut cleaned = vec![];
        let mut r = Reader::new(self.0);

        while let Some(byte) = r.read_byte() {
            match byte {
                b'\\' => {
                    let Some(next) = r.read_byte() else {
                        break;
                    };

                    if is_octal_digit(next) {
                        let second = r.read_byte();
                        let third = r.read_byte();

                        let bytes = match (second, third) {
                            (Some(n1), Some(n2)) => match (is_octal_digit(n1), is_octal_digit(n2)) {
                                (true, true) => [next, n1, n2],
                                (true, _) => {
                                    r.jump(r.offset() - 1);
                                    [b'0', next, n1]
                                }
                                _ => {
                                    r.jump(r.offset() - 2);
                                    [b'0', b'0', next]
                                }
                            },
                            (Some(n1), None) => {
                                if is_octal_digit(n1) {
                                    [b'0', next, n1]
                                } else {
                                    r.jump(r.offset() - 1);
                                    [b'0', b'0', next]
                                }
                            }
                            _ => [b'0', b'0', next],
                        };

                        let octal = (bytes[0] - b'0') as u32 * 64
                            + (bytes[1] - b'0') as u32 * 8
                            + (bytes[2] - b'0') as u32;

                        if let Ok(num) = u8::try_from(octal) {
                            cleaned.push(num);
                        } else {
                            warn!("overflow occurred while parsing octal literal string");
                        }
                    } else {
                        match next {
                            b'n' => cleaned.push(0xA),
                            b'r' => cleaned.push(0xD),
                            b't' => cleaned.push(0x9),
                            b'b' => cleaned.push(0x8),
                            b'f' => cleaned.push(0xC),
                            b'(' => cleaned.push(b'('),
                            b')' => cleaned.push(b')'),
                            b'\\' => cleaned.push(b'\\'),
                            b'\n' | b'\r' => {
                                // A reverse solidus followed by an end-of-line marker is a
                                // line continuation; both are dropped from the value.
                                r.skip_eol_characters();
                            }
                            _ => cleaned.push(next),
                        }
                    }
                }
                // An end-of-line marker without a preceding reverse solidus is
                // normalized to a single 0x0A byte.
                b'\n' | b'\r' => {
                    cleaned.push(b'\n');
                    r.skip_eol_characters();
                }
                other => cleaned.push(other),
            }
        }

        Cow::Owned(cleaned)
    }
}

impl PartialEq for LiteralString<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(other.0) && self.1.eq(&other.1)
    }
}

impl Skippable for LiteralString<'_> {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        parse_literal(r).map(|_| ())
    }
}

impl<'a> Readable<'a> for LiteralString<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        let start = r.offset();
        let dirty = parse_literal(r)?;
        let end = r.offset();

        // Exclude outer brackets.
        let result = r.range(start + 1..end - 1)?;

        Some(LiteralString(result, dirty))
    }
}

fn parse_literal(r: &mut Reader<'_>) -> Option<bool> {
    r.forward_tag(b"(")?;
    let mut bracket_counter = 1;
    let mut dirty = false;

    while bracket_counter > 0 {
        let byte = r.read_byte()?;

        match byte {
            b'\\' => {
                dirty = true;

                let _ = r.read_byte()?;
            }
            b'(' => bracket_counter += 1,
            b')' => bracket_counter -= 1,
            b'\n' | b'\r' => dirty = true,
            _ => {}
        };
    }

    Some(dirty)
}

#[derive(Clone, Debug, PartialEq)]
enum InnerString<'a> {
    Hex(HexString<'a>),
    Literal(LiteralString<'a>),
}

/// A string in a content stream.
#[derive(Clone, Debug, PartialEq)]
pub struct String<'a>(InnerString<'a>);

impl<'a> String<'a> {
    /// Returns the content of the string.
    pub fn get(&self) -> Cow<'a, [u8]> {
        match &self.0 {
            InnerString::Hex(hex) => Cow::Owned(hex.get()),
            InnerString::Literal(lit) => lit.get(),
        }
    }
}

object!(String<'a>, String);

impl Skippable for String<'_> {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        match r.peek_byte()? {
            b'<' => HexString::skip(r),
            b'(' => LiteralString::skip(r),
            _ => None,
        }
    }
}

impl<'a> Readable<'a> for String<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        let inner = match r.peek_byte()? {
            b'<' => InnerString::Hex(r.read::<HexString<'_>>()?),
            b'(' => InnerString::Literal(r.read::<LiteralString<'_>>()?),
            _ => return None,
        };

        Some(String(inner))
    }
}

fn is_octal_digit(byte: u8) -> bool {
    matches!(byte, b'0'..=b'7')
}

#[cfg(test)]
mod tests {
    use crate::byte_reader::Reader;
    use crate::object::string::{HexString, LiteralString, String};
    use crate::reader::ReaderExt;

    #[test]
    fn hex_string_empty() {
        assert_eq!(
            Reader::new("<>".as_bytes())
                .read::<HexString<'_>>()
                .unwrap()
                .get(),
            vec![]
        );
    }

    #[test]
    fn hex_string_1() {
        assert_eq!(
            Reader::new("<00010203>".as_bytes())
                .read::<HexString<'_>>()
                .unwrap()
                .get(),
            vec![0x00, 0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn hex_string_2() {
        assert_eq!(
            Reader::new("<000102034>".as_bytes())
                .read::<HexString<'_>>()
                .unwrap()
                .get(),
            vec![0x00, 0x01, 0x02, 0x03, 0x40]
        );
    }

    #[test]
    fn hex_string_whitespace() {
        assert_eq!(
            Reader::new("<1  3 4>dfgfg4".as_bytes())
                .read::<HexString<'_>>()
                .unwrap()
                .get(),
            vec![0x13, 0x40]
        );
    }

    #[test]
    fn hex_string_invalid_1() {
        assert!(Reader::new("<".as_bytes()).read::<HexString<'_>>().is_none());
    }

    #[test]
    fn hex_string_invalid_2() {
        assert!(Reader::new("34AD".as_bytes()).read::<HexString<'_>>().is_none());
    }

    #[test]
    fn literal_string_empty() {
        assert_eq!(
            Reader::new("()".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"".to_vec()
        );
    }

    #[test]
    fn literal_string_1() {
        assert_eq!(
            Reader::new("(Hi there.)".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi there.".to_vec()
        );
    }

    #[test]
    fn literal_string_2() {
        assert_eq!(
            Reader::new("(Hi ) there.)".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi ".to_vec()
        );
    }

    #[test]
    fn literal_string_3() {
        assert_eq!(
            Reader::new("(Hi (()) there)".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi (()) there".to_vec()
        );
    }

    #[test]
    fn literal_string_4() {
        assert_eq!(
            Reader::new("(Hi \\()".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi (".to_vec()
        );
    }

    #[test]
    fn literal_string_5() {
        assert_eq!(
            Reader::new("(Hi \\\nthere)".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi there".to_vec()
        );
    }

    #[test]
    fn literal_string_6() {
        assert_eq!(
            Reader::new("(Hi \\05354)".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi +54".to_vec()
        );
    }

    #[test]
    fn literal_string_7() {
        assert_eq!(
            Reader::new("(\\3)".as_bytes())
                .read::<String<'_>>()
                .unwrap()
                .get(),
            b"\x03".to_vec()
        )
    }

    #[test]
    fn literal_string_8() {
        assert_eq!(
            Reader::new("(\\36ab)".as_bytes())
                .read::<String<'_>>()
                .unwrap()
                .get(),
            b"\x1eab".to_vec()
        )
    }

    #[test]
    fn literal_string_9() {
        assert_eq!(
            Reader::new("(\\0Y)".as_bytes())
                .read::<String<'_>>()
                .unwrap()
                .get(),
            b"\0Y".to_vec()
        )
    }

    #[test]
    fn literal_string_trailing() {
        assert_eq!(
            Reader::new("(Hi there.)abcde".as_bytes())
                .read::<LiteralString<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi there.".to_vec()
        );
    }

    #[test]
    fn string_1() {
        assert_eq!(
            Reader::new("(Hi there.)".as_bytes())
                .read::<String<'_>>()
                .unwrap()
                .get()
                .to_vec(),
            b"Hi there.".to_vec()
        );
    }

    #[test]
    fn string_2() {
        assert_eq!(
            Reader::new("<00010203>".as_bytes())
                .read::<String<'_>>()
                .unwrap()
                .get(),
            vec![0x00, 0x01, 0x02, 0x03]
        );
    }
}
