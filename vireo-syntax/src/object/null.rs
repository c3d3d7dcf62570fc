//! The null object.

use crate::byte_reader::Reader;
use crate::object::macros::object;
use crate::reader::{Readable, Skippable};

/// The null object.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct Null;

object!(Null, Null);

impl Skippable for Null {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        r.forward_tag(b"null")
    }
}

impl Readable<'_> for Null {
    fn read(r: &mut Reader<'_>) -> Option<Self> {
        Self::skip(r)?;

        Some(Null)
    }
}

#[cfg(test)]
mod tests {
    use crate::byte_reader::Reader;
    use crate::object::null::Null;
    use crate::reader::ReaderExt;

    #[test]
    fn null() {
        assert_eq!(Reader::new("null".as_bytes()).read::<Null>().unwrap(), Null);
    }

    #[test]
    fn null_invalid() {
        assert!(Reader::new("nul".as_bytes()).read::<Null>().is_none());
    }
}
