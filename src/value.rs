//
// Copyright (c) 2016 KAMADA Ken'ichi.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions
// are met:
// 1. Redistributions of source code must retain the above copyright
//    notice, this list of conditions and the following disclaimer.
// 2. Redistributions in binary form must reproduce the above copyright
//    notice, this list of conditions and the following disclaimer in the
//    documentation and/or other materials provided with the distribution.
//
// THIS SOFTWARE IS PROVIDED BY THE AUTHOR AND CONTRIBUTORS ``AS IS'' AND
// ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED.  IN NO EVENT SHALL THE AUTHOR OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS
// OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION)
// HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT
// LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY
// OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF
// SUCH DAMAGE.
//

use std::fmt;

use crate::endian::ByteOrder;

/// Field types of TIFF directory entries [EXIF23 4.6.2].
///
/// The set is closed: an entry with any other type code is skipped by
/// the parser and cannot be constructed for the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ValueType {
    /// 8-bit unsigned integers.
    Byte = 1,
    /// 8-bit bytes containing 7-bit ASCII characters, NUL-terminated.
    Ascii = 2,
    /// 16-bit unsigned integers.
    Short = 3,
    /// 32-bit unsigned integers.
    Long = 4,
    /// Pairs of 32-bit unsigned integers (numerator, denominator).
    Rational = 5,
    /// 8-bit signed integers.
    SByte = 6,
    /// 8-bit bytes with a tag-defined meaning.
    Undefined = 7,
    /// 16-bit signed integers.
    SShort = 8,
    /// 32-bit signed integers.
    SLong = 9,
    /// Pairs of 32-bit signed integers (numerator, denominator).
    SRational = 10,
    /// IEEE 754 single precision floating point numbers.
    Float = 11,
    /// IEEE 754 double precision floating point numbers.
    Double = 12,
    /// 32-bit offsets of sub-directories.
    Ifd = 13,
}

impl ValueType {
    /// Returns the type for a type code, or `None` if the code is
    /// unknown.
    pub fn from_u16(code: u16) -> Option<ValueType> {
        Some(match code {
            1 => ValueType::Byte,
            2 => ValueType::Ascii,
            3 => ValueType::Short,
            4 => ValueType::Long,
            5 => ValueType::Rational,
            6 => ValueType::SByte,
            7 => ValueType::Undefined,
            8 => ValueType::SShort,
            9 => ValueType::SLong,
            10 => ValueType::SRational,
            11 => ValueType::Float,
            12 => ValueType::Double,
            13 => ValueType::Ifd,
            _ => return None,
        })
    }

    /// Returns the type code written in a directory entry.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Returns the size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            ValueType::Byte | ValueType::Ascii |
            ValueType::SByte | ValueType::Undefined => 1,
            ValueType::Short | ValueType::SShort => 2,
            ValueType::Long | ValueType::SLong |
            ValueType::Float | ValueType::Ifd => 4,
            ValueType::Rational | ValueType::SRational |
            ValueType::Double => 8,
        }
    }

    /// Returns true if `count` elements of this type are packed into
    /// the 4-byte "value offset" element of a directory entry.
    ///
    /// Rational, SRational, and Double values are always stored
    /// elsewhere, whatever their count.  The parser and the writer
    /// share this predicate.
    pub fn fits_inline(self, count: u32) -> bool {
        match self {
            ValueType::Rational | ValueType::SRational |
            ValueType::Double => false,
            _ => self.size() as u64 * count as u64 <= 4,
        }
    }

    // The width of the unit whose bytes are reversed when converting
    // between byte orders.  A rational is two independent 4-byte words.
    fn swap_width(self) -> usize {
        match self {
            ValueType::Byte | ValueType::Ascii |
            ValueType::SByte | ValueType::Undefined => 1,
            ValueType::Short | ValueType::SShort => 2,
            ValueType::Long | ValueType::SLong | ValueType::Float |
            ValueType::Ifd | ValueType::Rational |
            ValueType::SRational => 4,
            ValueType::Double => 8,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Converts the payload of a value, as laid out in a blob of the byte
/// order `order`, to the canonical little-endian form in place.
pub(crate) fn normalize(order: ByteOrder, typ: ValueType, data: &mut [u8]) {
    let width = typ.swap_width();
    if order == ByteOrder::Big && width > 1 {
        data.chunks_exact_mut(width).for_each(|unit| unit.reverse());
    }
}

/// A resolved tag payload: its type and its bytes.
///
/// The bytes are always little endian, whatever the byte order of the
/// blob they came from.  Their length is the element count times the
/// element size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExifValue {
    typ: ValueType,
    data: Vec<u8>,
}

impl ExifValue {
    /// Constructs a value from little-endian bytes.
    pub fn new(typ: ValueType, data: Vec<u8>) -> Self {
        Self { typ, data }
    }

    pub fn byte(data: &[u8]) -> Self {
        Self::new(ValueType::Byte, data.to_vec())
    }

    /// Constructs an Ascii value.  The terminating NUL is appended.
    pub fn ascii(s: &str) -> Self {
        let mut data = s.as_bytes().to_vec();
        data.push(0);
        Self::new(ValueType::Ascii, data)
    }

    pub fn undefined(data: &[u8]) -> Self {
        Self::new(ValueType::Undefined, data.to_vec())
    }

    pub fn short(value: u16) -> Self {
        Self::new(ValueType::Short, value.to_le_bytes().to_vec())
    }

    pub fn long(value: u32) -> Self {
        Self::new(ValueType::Long, value.to_le_bytes().to_vec())
    }

    pub fn rational(num: u32, denom: u32) -> Self {
        let mut data = num.to_le_bytes().to_vec();
        data.extend_from_slice(&denom.to_le_bytes());
        Self::new(ValueType::Rational, data)
    }

    #[inline]
    pub fn typ(&self) -> ValueType {
        self.typ
    }

    /// Returns the little-endian payload.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of elements.  A trailing partial element is
    /// not counted.
    pub fn count(&self) -> usize {
        self.data.len() / self.typ.size()
    }

    /// Returns the value of a Short with exactly one element.
    pub fn to_u16(&self) -> Option<u16> {
        match (self.typ, self.data.as_slice()) {
            (ValueType::Short, &[lo, hi]) => Some(u16::from_le_bytes([lo, hi])),
            _ => None,
        }
    }

    /// Returns the value of a Long with exactly one element.
    pub fn to_u32(&self) -> Option<u32> {
        match (self.typ, self.data.as_slice()) {
            (ValueType::Long, &[a, b, c, d]) =>
                Some(u32::from_le_bytes([a, b, c, d])),
            _ => None,
        }
    }

    /// Returns the value of a Rational with exactly one element as a
    /// floating point number.  A zero denominator yields `None`.
    pub fn to_f64(&self) -> Option<f64> {
        if self.typ != ValueType::Rational || self.data.len() != 8 {
            return None;
        }
        let num = u32::from_le_bytes([self.data[0], self.data[1],
                                      self.data[2], self.data[3]]);
        let denom = u32::from_le_bytes([self.data[4], self.data[5],
                                        self.data[6], self.data[7]]);
        match denom {
            0 => None,
            _ => Some(num as f64 / denom as f64),
        }
    }

    /// Returns the string of an Ascii value with the trailing NULs
    /// removed, or `None` if it is not valid UTF-8.
    pub fn to_ascii(&self) -> Option<&str> {
        if self.typ != ValueType::Ascii {
            return None;
        }
        let end = self.data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        std::str::from_utf8(&self.data[..end]).ok()
    }
}

impl fmt::Display for ExifValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(s) = self.to_ascii() {
            return write!(f, "{:?}", s);
        }
        let size = self.typ.size();
        for (i, e) in self.data.chunks_exact(size).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let w = |at: usize| u32::from_le_bytes([e[at], e[at + 1],
                                                    e[at + 2], e[at + 3]]);
            match self.typ {
                ValueType::Byte | ValueType::Ascii =>
                    write!(f, "{}", e[0])?,
                ValueType::Undefined => write!(f, "{:#04x}", e[0])?,
                ValueType::SByte => write!(f, "{}", e[0] as i8)?,
                ValueType::Short =>
                    write!(f, "{}", u16::from_le_bytes([e[0], e[1]]))?,
                ValueType::SShort =>
                    write!(f, "{}", i16::from_le_bytes([e[0], e[1]]))?,
                ValueType::Long | ValueType::Ifd => write!(f, "{}", w(0))?,
                ValueType::SLong => write!(f, "{}", w(0) as i32)?,
                ValueType::Rational => write!(f, "{}/{}", w(0), w(4))?,
                ValueType::SRational =>
                    write!(f, "{}/{}", w(0) as i32, w(4) as i32)?,
                ValueType::Float => write!(f, "{}", f32::from_bits(w(0)))?,
                ValueType::Double => {
                    let mut b = [0u8; 8];
                    b.copy_from_slice(e);
                    write!(f, "{}", f64::from_le_bytes(b))?
                },
            }
        }
        Ok(())
    }
}

/// The values of the Orientation tag [EXIF23 4.6.5].
///
/// Each name gives where the 0th row and the 0th column of the stored
/// image appear visually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Orientation {
    TopLeft = 1,
    TopRight = 2,
    BottomRight = 3,
    BottomLeft = 4,
    LeftTop = 5,
    RightTop = 6,
    RightBottom = 7,
    LeftBottom = 8,
}

impl Orientation {
    pub fn from_u16(value: u16) -> Option<Orientation> {
        Some(match value {
            1 => Orientation::TopLeft,
            2 => Orientation::TopRight,
            3 => Orientation::BottomRight,
            4 => Orientation::BottomLeft,
            5 => Orientation::LeftTop,
            6 => Orientation::RightTop,
            7 => Orientation::RightBottom,
            8 => Orientation::LeftBottom,
            _ => return None,
        })
    }

    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }
}
