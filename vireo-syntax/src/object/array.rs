//! Array objects.

use crate::byte_reader::Reader;
use crate::object::macros::object;
use crate::object::{Object, ObjectLike};
use crate::reader::{Readable, ReaderExt, Skippable};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// An array of content-stream objects.
///
/// The underlying data is stored raw; items are parsed lazily on iteration.
#[derive(Clone)]
pub struct Array<'a> {
    data: &'a [u8],
}

// Note that this is not structural equality, i.e. two arrays with the same
// items are still considered different if they have different whitespaces.
impl PartialEq for Array<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<'a> Array<'a> {
    /// Returns an iterator over the objects of the array.
    pub fn raw_iter(&self) -> ArrayIter<'a> {
        ArrayIter::new(self.data)
    }

    /// Returns an iterator over the objects of the array, resolved to a specific type.
    ///
    /// Items that cannot be resolved to `T` are skipped.
    #[allow(
        private_bounds,
        reason = "users shouldn't be able to implement `ObjectLike` for custom objects."
    )]
    pub fn iter<T>(&self) -> ResolvedArrayIter<'a, T>
    where
        T: ObjectLike<'a>,
    {
        ResolvedArrayIter::new(self.data)
    }

    /// Return a flex iterator over the items in the array.
    pub fn flex_iter(&self) -> FlexArrayIter<'a> {
        FlexArrayIter::new(self.data)
    }
}

impl Debug for Array<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.raw_iter()).finish()
    }
}

object!(Array<'a>, Array);

impl Skippable for Array<'_> {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        r.forward_tag(b"[")?;

        loop {
            r.skip_white_spaces_and_comments();

            if r.forward_tag(b"]").is_some() {
                return Some(());
            } else {
                r.skip::<Object<'_>>()?;
            }
        }
    }
}

impl Default for Array<'_> {
    fn default() -> Self {
        Self { data: &[] }
    }
}

impl<'a> Readable<'a> for Array<'a> {
    fn read(r: &mut Reader<'a>) -> Option<Self> {
        let bytes = r.skip::<Array<'_>>()?;

        Some(Self {
            data: &bytes[1..bytes.len() - 1],
        })
    }
}

/// An iterator over the items of an array.
pub struct ArrayIter<'a> {
    reader: Reader<'a>,
}

impl<'a> ArrayIter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(data),
        }
    }
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Object<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.skip_white_spaces_and_comments();

        if self.reader.at_end() {
            return None;
        }

        // Items have already been validated when the array was skipped, but
        // stay defensive anyway and end iteration instead of panicking.
        match self.reader.read::<Object<'_>>() {
            Some(item) => Some(item),
            None => {
                self.reader.jump_to_end();
                None
            }
        }
    }
}

/// An iterator over the array that resolves objects of a specific type.
pub struct ResolvedArrayIter<'a, T> {
    raw_iter: ArrayIter<'a>,
    phantom_data: PhantomData<T>,
}

impl<'a, T> ResolvedArrayIter<'a, T> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            raw_iter: ArrayIter::new(data),
            phantom_data: PhantomData,
        }
    }
}

impl<'a, T> Iterator for ResolvedArrayIter<'a, T>
where
    T: ObjectLike<'a>,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.raw_iter.by_ref() {
            if let Some(resolved) = item.cast::<T>() {
                return Some(resolved);
            }
        }

        None
    }
}

/// An iterator over the array that allows reading a different object type on each call.
pub struct FlexArrayIter<'a> {
    raw_iter: ArrayIter<'a>,
}

impl<'a> FlexArrayIter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            raw_iter: ArrayIter::new(data),
        }
    }

    /// Read the next item as a specific type.
    #[allow(
        private_bounds,
        reason = "users shouldn't be able to implement `ObjectLike` for custom objects."
    )]
    pub fn next<T>(&mut self) -> Option<T>
    where
        T: ObjectLike<'a>,
    {
        self.raw_iter.next()?.cast::<T>()
    }
}

#[cfg(test)]
mod tests {
    use crate::byte_reader::Reader;
    use crate::object::array::Array;
    use crate::object::number::Number;
    use crate::reader::ReaderExt;

    #[test]
    fn array_empty() {
        let array = Reader::new("[]".as_bytes()).read::<Array<'_>>().unwrap();
        assert_eq!(array.raw_iter().count(), 0);
    }

    #[test]
    fn array_numbers() {
        let array = Reader::new("[1 2 3]".as_bytes()).read::<Array<'_>>().unwrap();
        let items = array.iter::<i32>().collect::<Vec<_>>();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn array_mixed() {
        let array = Reader::new("[/Sep (a) 4.5]".as_bytes())
            .read::<Array<'_>>()
            .unwrap();
        assert_eq!(array.raw_iter().count(), 3);
    }

    #[test]
    fn array_nested() {
        let array = Reader::new("[[1 2] [3]]".as_bytes())
            .read::<Array<'_>>()
            .unwrap();
        assert_eq!(array.iter::<Array<'_>>().count(), 2);
    }

    #[test]
    fn array_flex() {
        let array = Reader::new("[/Indexed 3]".as_bytes())
            .read::<Array<'_>>()
            .unwrap();
        let mut iter = array.flex_iter();
        assert!(iter.next::<crate::object::Name<'_>>().is_some());
        assert_eq!(iter.next::<Number>().unwrap().as_i32(), 3);
    }

    #[test]
    fn array_unterminated() {
        assert!(Reader::new("[1 2".as_bytes()).read::<Array<'_>>().is_none());
    }
}
