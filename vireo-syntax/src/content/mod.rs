//! Content-stream instructions.
//!
//! This module provides facilities to split a decoded content stream into
//! instructions, each consisting of the operands accumulated since the last
//! operator and the operator keyword itself. Malformed tokens surface as
//! structured [`LexError`]s; deciding whether to abort is left to the caller.

pub mod ops;

use crate::byte_reader::Reader;
use crate::object::dict::InlineImageDict;
use crate::object::macros::object;
use crate::object::name::{Name, skip_name_like};
use crate::object::null::Null;
use crate::object::{Dict, Object, ObjectLike};
use crate::reader::{Readable, ReaderExt, Skippable};
use crate::trivia::{is_regular_character, is_white_space_character};
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;

// 6 operands are used for example for ctm or cubic curves,
// but anything above should be pretty rare (for example for
// DeviceN color spaces).
const OPERANDS_THRESHOLD: usize = 6;

/// An operator keyword in a content stream.
#[derive(Clone, PartialEq)]
pub struct Operator<'a>(Name<'a>);

impl Debug for Operator<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

impl Deref for Operator<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl Operator<'_> {
    /// Return a string representation of the operator.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// An operator keyword: a name-like run of regular characters without the
/// leading solidus. Must be non-empty.
struct Keyword;

impl Skippable for Keyword {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        let start = r.offset();
        skip_name_like(r, false)?;

        if r.offset() == start { None } else { Some(()) }
    }
}

/// An error raised for a single malformed token.
///
/// The lexer resynchronizes after raising one of these, so iteration can
/// continue with the next token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// A human-readable description of the problem.
    pub message: String,
    /// The byte offset at which the problem was encountered.
    pub offset: usize,
}

impl LexError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// An instruction in a content stream.
#[derive(Debug, Clone)]
pub struct Instruction<'a> {
    /// The operands of the operator.
    pub operands: Stack<'a>,
    /// The actual operator.
    pub operator: Operator<'a>,
    /// The byte offset of the first operand (or of the operator itself, if
    /// it has none).
    pub offset: usize,
}

/// The raw dictionary and data of an inline image.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImageData<'a> {
    dict: Dict<'a>,
    data: &'a [u8],
}

impl<'a> InlineImageData<'a> {
    /// The entry dictionary of the image, read from between `BI` and `ID`.
    pub fn dict(&self) -> &Dict<'a> {
        &self.dict
    }

    /// The raw (still encoded) image data between `ID` and `EI`.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

object!(InlineImageData<'a>, InlineImage);

impl<'a> Readable<'a> for InlineImageData<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        let dict = r.read::<InlineImageDict<'_>>()?;
        r.forward_tag(b"ID")?;
        r.forward_if(is_white_space_character);

        let data = scan_image_data(r).ok()?;

        Some(InlineImageData {
            dict: dict.into_dict(),
            data,
        })
    }
}

/// Consume raw image bytes up to (and including) a whitespace-delimited
/// `EI` operator.
fn scan_image_data<'a>(r: &mut Reader<'a>) -> Result<&'a [u8], LexError> {
    let start = r.offset();
    let tail = r.tail().unwrap_or(&[]);

    for pos in memchr::memmem::find_iter(tail, b"EI") {
        let preceded = pos == 0 || is_white_space_character(tail[pos - 1]);
        let followed = tail.get(pos + 2).is_none_or(|b| !is_regular_character(*b));

        if preceded && followed {
            // Exclude the single whitespace byte delimiting the data from
            // the `EI` keyword.
            let end = if pos > 0 { pos - 1 } else { 0 };
            r.jump(start + pos + 2);

            return Ok(&tail[..end]);
        }
    }

    r.jump_to_end();

    Err(LexError::new("unterminated inline image", start))
}

/// An iterator over the instructions of a content stream.
///
/// Yields one item per operator; operand-level parse failures are reported
/// as [`LexError`]s and the operands accumulated so far are discarded, so a
/// single corrupt token never poisons the following instruction.
pub struct Instructions<'a> {
    reader: Reader<'a>,
    stack: Stack<'a>,
}

impl<'a> Instructions<'a> {
    /// Create a new instruction iterator over decoded content-stream bytes.
    pub fn new(data: &'a [u8]) -> Instructions<'a> {
        Self {
            reader: Reader::new(data),
            stack: Stack::new(),
        }
    }

    /// Consume raw image bytes up to (and including) a whitespace-delimited
    /// `EI` operator.
    ///
    /// This is the escape hatch from the regular token grammar needed for
    /// inline images: the bytes between `ID` and `EI` are arbitrary encoded
    /// data and must not be tokenized. The lexer enters this mode itself
    /// after it has read an inline image dictionary, but the entry point is
    /// exposed for callers driving the tokenizer manually.
    pub fn read_inline_image_data(&mut self) -> Result<&'a [u8], LexError> {
        scan_image_data(&mut self.reader)
    }

    fn read_inline_image(&mut self, offset: usize) -> Result<InlineImageData<'a>, LexError> {
        self.reader.skip_white_spaces_and_comments();

        let Some(dict) = self.reader.read::<InlineImageDict<'_>>() else {
            // Without a valid dictionary there is no way to tell where the
            // image data starts, so give up on the rest of the stream.
            self.reader.jump_to_end();

            return Err(LexError::new("malformed inline image dictionary", offset));
        };

        // The `ID` operator and the single whitespace byte after it.
        let _ = self.reader.forward_tag(b"ID");
        self.reader.forward_if(is_white_space_character);

        let data = self.read_inline_image_data()?;

        Ok(InlineImageData {
            dict: dict.into_dict(),
            data,
        })
    }

    /// Skip past a malformed token so that iteration can continue.
    fn recover(&mut self, byte: u8) {
        if byte == b'(' {
            // A literal string only fails to parse when it is unterminated,
            // in which case it has swallowed the rest of the stream.
            self.reader.jump_to_end();
        } else {
            self.reader.forward();
            self.reader.forward_while(is_regular_character);
        }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stack.clear();

        self.reader.skip_white_spaces_and_comments();

        let offset = self.reader.offset();

        while !self.reader.at_end() {
            let byte = self.reader.peek_byte()?;

            if matches!(
                byte,
                b'/' | b'.' | b'+' | b'-' | b'0'..=b'9' | b'[' | b'<' | b'('
            ) {
                match self.reader.read::<Object<'_>>() {
                    Some(obj) => self.stack.push(obj),
                    None => {
                        let error_offset = self.reader.offset();
                        self.recover(byte);

                        return Some(Err(LexError::new("malformed operand", error_offset)));
                    }
                }
            } else if let Some(keyword) = self.reader.skip::<Keyword>() {
                match keyword {
                    // Booleans and null are keywords, not operators.
                    b"true" => self.stack.push(Object::Boolean(true)),
                    b"false" => self.stack.push(Object::Boolean(false)),
                    b"null" => self.stack.push(Object::Null(Null)),
                    // Inline images need special casing: their data cannot
                    // be tokenized as normal operands.
                    b"BI" => {
                        return Some(self.read_inline_image(offset).map(|image| {
                            self.stack.push(Object::InlineImage(image));

                            Instruction {
                                operands: self.stack.clone(),
                                operator: Operator(Name::from_unescaped(b"BI")),
                                offset,
                            }
                        }));
                    }
                    _ => {
                        return Some(Ok(Instruction {
                            operands: self.stack.clone(),
                            operator: Operator(Name::new(keyword)),
                            offset,
                        }));
                    }
                }
            } else {
                // A stray delimiter byte that cannot start any token.
                let error_offset = self.reader.offset();
                self.reader.forward();

                return Some(Err(LexError::new(
                    format!("unexpected byte {byte:#04x} in content stream"),
                    error_offset,
                )));
            }

            self.reader.skip_white_spaces_and_comments();
        }

        None
    }
}

/// A stack holding the operands for an instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack<'a>(SmallVec<[Object<'a>; OPERANDS_THRESHOLD]>);

impl<'a> Stack<'a> {
    /// Create a new, empty stack.
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    fn push(&mut self, operand: Object<'a>) {
        self.0.push(operand);
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    /// The number of operands on the stack.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the stack holds no operands.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An iterator over the operands, bottom-most first.
    pub fn iter(&self) -> impl Iterator<Item = &Object<'a>> {
        self.0.iter()
    }

    fn get<T>(&self, index: usize) -> Option<T>
    where
        T: ObjectLike<'a>,
    {
        self.0.get(index).and_then(|e| e.clone().cast::<T>())
    }

    /// Read the operand at `index` out of the topmost `arity` entries,
    /// tolerating surplus operands further down the stack.
    pub(crate) fn from_top<T>(&self, arity: usize, index: usize) -> Option<T>
    where
        T: ObjectLike<'a>,
    {
        self.get(self.len().checked_sub(arity)? + index)
    }
}

impl Default for Stack<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::content::{Instruction, Instructions, LexError};
    use crate::object::Object;

    fn instructions(data: &str) -> Vec<Result<Instruction<'_>, LexError>> {
        Instructions::new(data.as_bytes()).collect()
    }

    fn ok(data: &str) -> Vec<Instruction<'_>> {
        instructions(data).into_iter().map(|i| i.unwrap()).collect()
    }

    #[test]
    fn empty() {
        assert!(instructions("").is_empty());
    }

    #[test]
    fn single_operator() {
        let ops = ok("q");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operator.as_str(), "q");
        assert!(ops[0].operands.is_empty());
    }

    #[test]
    fn operands_and_operator() {
        let ops = ok("1 0 0 1 30 40 cm");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operator.as_str(), "cm");
        assert_eq!(ops[0].operands.len(), 6);
    }

    #[test]
    fn stack_cleared_between_instructions() {
        let ops = ok("1 w 2 J");
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].operands.len(), 1);
        assert_eq!(ops[1].operands.len(), 1);
    }

    #[test]
    fn starred_operator() {
        let ops = ok("f*");
        assert_eq!(ops[0].operator.as_str(), "f*");
    }

    #[test]
    fn quote_operator() {
        let ops = ok("(text) '");
        assert_eq!(ops[0].operator.as_str(), "'");
        assert_eq!(ops[0].operands.len(), 1);
    }

    #[test]
    fn keywords_are_operands() {
        let ops = ok("true false null Do");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operands.len(), 3);
    }

    #[test]
    fn comments_are_skipped() {
        let ops = ok("% a comment\n1 w % another\n");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operator.as_str(), "w");
    }

    #[test]
    fn composite_operands() {
        let ops = ok("[(a) 1 (b)] TJ");
        assert_eq!(ops[0].operands.len(), 1);
        assert!(matches!(
            ops[0].operands.iter().next().unwrap(),
            Object::Array(_)
        ));
    }

    #[test]
    fn instruction_offsets() {
        let ops = ok("q 1 0 0 1 5 5 cm");
        assert_eq!(ops[0].offset, 0);
        assert_eq!(ops[1].offset, 2);
    }

    #[test]
    fn malformed_operand_reports_and_recovers() {
        let items = instructions("--q 5 w");
        assert_eq!(items.len(), 2);
        assert!(items[0].is_err());

        let w = items[1].as_ref().unwrap();
        assert_eq!(w.operator.as_str(), "w");
        assert_eq!(w.operands.len(), 1);
    }

    #[test]
    fn malformed_operand_discards_accumulated_operands() {
        let items = instructions("1 2 --x re");
        assert!(items[0].is_err());

        // The `re` instruction must not see the operands that preceded the
        // malformed token.
        let re = items[1].as_ref().unwrap();
        assert_eq!(re.operands.len(), 0);
    }

    #[test]
    fn unterminated_string_ends_stream() {
        let items = instructions("(never closed");
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn stray_delimiter() {
        let items = instructions(") q");
        assert!(items[0].is_err());
        assert_eq!(items[1].as_ref().unwrap().operator.as_str(), "q");
    }

    #[test]
    fn inline_image() {
        let items = ok("BI /W 2 /H 2 /BPC 8 ID \x00\x01\x02\x03 EI q");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].operator.as_str(), "BI");

        let Some(Object::InlineImage(image)) = items[0].operands.iter().next() else {
            panic!("expected an inline image operand");
        };
        assert_eq!(image.data(), b"\x00\x01\x02\x03");
        assert_eq!(image.dict().get::<i32>(crate::object::dict::keys::W), Some(2));

        assert_eq!(items[1].operator.as_str(), "q");
    }

    #[test]
    fn inline_image_unterminated() {
        let items = instructions("BI /W 2 ID \x00\x01\x02");
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
