//! Boolean objects.

use crate::byte_reader::Reader;
use crate::object::macros::object;
use crate::reader::{Readable, ReaderExt, Skippable};

impl Skippable for bool {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        match r.peek_byte()? {
            b't' => r.forward_tag(b"true"),
            b'f' => r.forward_tag(b"false"),
            _ => None,
        }
    }
}

impl Readable<'_> for bool {
    fn read(r: &mut Reader<'_>) -> Option<Self> {
        match r.skip::<bool>()? {
            b"true" => Some(true),
            b"false" => Some(false),
            _ => None,
        }
    }
}

object!(bool, Boolean);

#[cfg(test)]
mod tests {
    use crate::byte_reader::Reader;
    use crate::reader::ReaderExt;

    #[test]
    fn bool_true() {
        assert!(Reader::new("true".as_bytes()).read::<bool>().unwrap());
    }

    #[test]
    fn bool_false() {
        assert!(!Reader::new("false".as_bytes()).read::<bool>().unwrap());
    }

    #[test]
    fn bool_trailing() {
        assert!(Reader::new("trueabdf".as_bytes()).read::<bool>().unwrap());
    }

    #[test]
    fn bool_invalid() {
        assert!(Reader::new("tru".as_bytes()).read::<bool>().is_none());
    }
}
