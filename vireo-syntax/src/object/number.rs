//! Number objects.

use crate::byte_reader::Reader;
use crate::object::macros::object;
use crate::object::{Object, ObjectLike};
use crate::reader::{Readable, ReaderExt, Skippable};
use log::debug;
use std::fmt::Debug;
use std::str::FromStr;

/// A number in a content stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Number(pub(crate) InternalNumber);

impl Number {
    /// Returns the number as a f64.
    pub fn as_f64(&self) -> f64 {
        match self.0 {
            InternalNumber::Real(r) => r as f64,
            InternalNumber::Integer(i) => i as f64,
        }
    }

    /// Returns the number as a f32.
    pub fn as_f32(&self) -> f32 {
        match self.0 {
            InternalNumber::Real(r) => r,
            InternalNumber::Integer(i) => {
                let converted = i as f32;

                // Double check whether conversion didn't overflow.
                if converted as i32 != i {
                    debug!("integer {} was truncated to {}", i, converted);
                }

                converted
            }
        }
    }

    /// Returns the number as an i32.
    pub fn as_i32(&self) -> i32 {
        match self.0 {
            InternalNumber::Real(r) => {
                let res = r as i32;

                if r.trunc() != r {
                    debug!("float {} was truncated to {}", r, res);
                }

                res
            }
            InternalNumber::Integer(i) => i,
        }
    }

}

impl Skippable for Number {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        // Broken producers occasionally emit a run of signs ("--5"); accept
        // the run here and settle the effective sign at read time.
        r.forward_while(|b| b == b'+' || b == b'-');

        match r.peek_byte()? {
            b'.' => {
                r.read_byte()?;
                r.forward_while_1(is_digit)?;
            }
            b'0'..=b'9' => {
                r.forward_while_1(is_digit)?;
                if r.forward_tag(b".").is_some() {
                    r.forward_while(is_digit);
                }
            }
            _ => return None,
        }

        Some(())
    }
}

impl Readable<'_> for Number {
    fn read(r: &mut Reader<'_>) -> Option<Self> {
        let data = r.skip::<Number>()?;

        let signs = data
            .iter()
            .take_while(|b| **b == b'+' || **b == b'-')
            .count();
        let negative = data[..signs].iter().filter(|b| **b == b'-').count() % 2 == 1;

        // We need to use f64 here, so that we can still parse a full `i32` without losing
        // precision.
        let num = f64::from_str(std::str::from_utf8(&data[signs..]).ok()?).ok()?;
        let num = if negative { -num } else { num };

        if num.fract() == 0.0 {
            Some(Number(InternalNumber::Integer(num as i32)))
        } else {
            Some(Number(InternalNumber::Real(num as f32)))
        }
    }
}

object!(Number, Number);

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum InternalNumber {
    Real(f32),
    Integer(i32),
}

macro_rules! int_num {
    ($i:ident) => {
        impl Skippable for $i {
            fn skip(r: &mut Reader<'_>) -> Option<()> {
                r.forward_if(|b| b == b'+' || b == b'-');
                r.forward_while_1(is_digit)?;

                // We have a float instead of an integer.
                if r.peek_byte() == Some(b'.') {
                    return None;
                }

                Some(())
            }
        }

        impl<'a> Readable<'a> for $i {
            fn read(r: &mut Reader<'a>) -> Option<$i> {
                r.read::<Number>()
                    .map(|n| n.as_i32())
                    .and_then(|n| n.try_into().ok())
            }
        }

        impl TryFrom<Object<'_>> for $i {
            type Error = ();

            fn try_from(value: Object<'_>) -> std::result::Result<Self, Self::Error> {
                match value {
                    Object::Number(n) => n.as_i32().try_into().ok().ok_or(()),
                    _ => Err(()),
                }
            }
        }

        impl<'a> ObjectLike<'a> for $i {}
    };
}

int_num!(i32);
int_num!(u8);
int_num!(usize);

impl Skippable for f32 {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        r.skip::<Number>().map(|_| {})
    }
}

impl Readable<'_> for f32 {
    fn read(r: &mut Reader<'_>) -> Option<Self> {
        r.read::<Number>().map(|n| n.as_f32())
    }
}

impl TryFrom<Object<'_>> for f32 {
    type Error = ();

    fn try_from(value: Object<'_>) -> Result<Self, Self::Error> {
        match value {
            Object::Number(n) => Ok(n.as_f32()),
            _ => Err(()),
        }
    }
}

impl ObjectLike<'_> for f32 {}

impl Skippable for f64 {
    fn skip(r: &mut Reader<'_>) -> Option<()> {
        r.skip::<Number>().map(|_| {})
    }
}

impl Readable<'_> for f64 {
    fn read(r: &mut Reader<'_>) -> Option<Self> {
        r.read::<Number>().map(|n| n.as_f64())
    }
}

impl TryFrom<Object<'_>> for f64 {
    type Error = ();

    fn try_from(value: Object<'_>) -> Result<Self, Self::Error> {
        match value {
            Object::Number(n) => Ok(n.as_f64()),
            _ => Err(()),
        }
    }
}

impl ObjectLike<'_> for f64 {}

pub(crate) fn is_digit(byte: u8) -> bool {
    byte.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use crate::byte_reader::Reader;
    use crate::object::number::Number;
    use crate::reader::ReaderExt;

    #[test]
    fn int_1() {
        assert_eq!(Reader::new("0".as_bytes()).read::<i32>().unwrap(), 0);
    }

    #[test]
    fn int_2() {
        assert_eq!(Reader::new("+32".as_bytes()).read::<i32>().unwrap(), 32);
    }

    #[test]
    fn int_3() {
        assert_eq!(Reader::new("-32".as_bytes()).read::<i32>().unwrap(), -32);
    }

    #[test]
    fn int_4() {
        assert_eq!(
            Reader::new("98349".as_bytes()).read::<i32>().unwrap(),
            98349
        );
    }

    #[test]
    fn int_5() {
        assert_eq!(
            Reader::new("003245".as_bytes()).read::<i32>().unwrap(),
            3245
        );
    }

    #[test]
    fn int_trailing() {
        assert_eq!(Reader::new("0abc".as_bytes()).read::<i32>().unwrap(), 0);
    }

    #[test]
    fn real_1() {
        assert_eq!(Reader::new("3".as_bytes()).read::<f32>().unwrap(), 3.0);
    }

    #[test]
    fn real_2() {
        assert_eq!(
            Reader::new("-32.01".as_bytes()).read::<f32>().unwrap(),
            -32.01
        );
    }

    #[test]
    fn real_3() {
        assert_eq!(
            Reader::new("-.345".as_bytes()).read::<f32>().unwrap(),
            -0.345
        );
    }

    #[test]
    fn real_4() {
        assert_eq!(
            Reader::new("-.00143".as_bytes()).read::<f32>().unwrap(),
            -0.00143
        );
    }

    #[test]
    fn real_5() {
        assert_eq!(
            Reader::new("-12.0013".as_bytes()).read::<f32>().unwrap(),
            -12.0013
        );
    }

    #[test]
    fn real_trailing() {
        assert_eq!(Reader::new("0abc".as_bytes()).read::<f32>().unwrap(), 0.0);
    }

    #[test]
    fn real_failing() {
        assert!(Reader::new("+abc".as_bytes()).read::<f32>().is_none());
    }

    #[test]
    fn number_1() {
        assert_eq!(
            Reader::new("+32".as_bytes())
                .read::<Number>()
                .unwrap()
                .as_f64() as f32,
            32.0
        );
    }

    #[test]
    fn number_2() {
        assert_eq!(
            Reader::new("-32.01".as_bytes())
                .read::<Number>()
                .unwrap()
                .as_f64() as f32,
            -32.01
        );
    }

    #[test]
    fn number_multiple_signs() {
        assert_eq!(
            Reader::new("--32".as_bytes())
                .read::<Number>()
                .unwrap()
                .as_i32(),
            32
        );
    }

    #[test]
    fn number_mixed_signs() {
        assert_eq!(
            Reader::new("+-5".as_bytes())
                .read::<Number>()
                .unwrap()
                .as_i32(),
            -5
        );
    }

    #[test]
    fn number_trailing_dot() {
        assert_eq!(
            Reader::new("4.".as_bytes())
                .read::<Number>()
                .unwrap()
                .as_f32(),
            4.0
        );
    }

    #[test]
    fn large_number() {
        assert_eq!(
            Reader::new("38359922".as_bytes())
                .read::<Number>()
                .unwrap()
                .as_i32(),
            38359922
        );
    }
}
