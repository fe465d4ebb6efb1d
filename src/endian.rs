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

use std::io;
use std::mem;

/// The byte order declared by the first two bytes of a TIFF header.
///
/// The order is fixed for the lifetime of one parse.  Blobs produced
/// by the writer are always little endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Declared by "MM" (Motorola).
    Big,
    /// Declared by "II" (Intel).
    Little,
}

impl ByteOrder {
    /// Returns the byte order named by a 2-byte marker, or `None` if
    /// the marker is neither "II" nor "MM".
    pub fn from_marker(marker: [u8; 2]) -> Option<ByteOrder> {
        match &marker {
            b"MM" => Some(ByteOrder::Big),
            b"II" => Some(ByteOrder::Little),
            _ => None,
        }
    }

    /// Returns the 2-byte marker of this byte order.
    pub fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::Big => *b"MM",
            ByteOrder::Little => *b"II",
        }
    }

    /// Returns the byte order of the host.
    pub fn native() -> ByteOrder {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    pub(crate) fn loadu16(self, buf: &[u8], from: usize) -> u16 {
        match self {
            ByteOrder::Big => BigEndian::loadu16(buf, from),
            ByteOrder::Little => LittleEndian::loadu16(buf, from),
        }
    }

    pub(crate) fn loadu32(self, buf: &[u8], from: usize) -> u32 {
        match self {
            ByteOrder::Big => BigEndian::loadu32(buf, from),
            ByteOrder::Little => LittleEndian::loadu32(buf, from),
        }
    }

    pub(crate) fn loadu64(self, buf: &[u8], from: usize) -> u64 {
        match self {
            ByteOrder::Big => BigEndian::loadu64(buf, from),
            ByteOrder::Little => LittleEndian::loadu64(buf, from),
        }
    }

    /// Returns the 4 bytes of the "value offset" element in the order
    /// they appear in a blob of this byte order.  `value` is the
    /// element as a number, as the reader reports it.
    pub(crate) fn u32_to_bytes(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        }
    }
}

// Static dispatch for the fixed-order paths (the writer always emits
// little endian).

pub trait Endian {
    fn loadu16(buf: &[u8], from: usize) -> u16;
    fn loadu32(buf: &[u8], from: usize) -> u32;
    fn loadu64(buf: &[u8], from: usize) -> u64;
    fn writeu16<W>(w: &mut W, num: u16) -> io::Result<()> where W: io::Write;
    fn writeu32<W>(w: &mut W, num: u32) -> io::Result<()> where W: io::Write;
}

pub struct BigEndian;
pub struct LittleEndian;

macro_rules! generate_load {
    ($name:ident, $int_type:ident, $from_func:ident) => (
        fn $name(buf: &[u8], offset: usize) -> $int_type {
            let mut num = [0u8; mem::size_of::<$int_type>()];
            num.copy_from_slice(
                &buf[offset .. offset + mem::size_of::<$int_type>()]);
            $int_type::$from_func(num)
        }
    )
}

macro_rules! generate_write {
    ($name:ident, $int_type:ident, $to_func:ident) => (
        fn $name<W>(w: &mut W, num: $int_type)
                    -> io::Result<()> where W: io::Write {
            w.write_all(&num.$to_func())
        }
    )
}

impl Endian for BigEndian {
    generate_load!(loadu16, u16, from_be_bytes);
    generate_load!(loadu32, u32, from_be_bytes);
    generate_load!(loadu64, u64, from_be_bytes);
    generate_write!(writeu16, u16, to_be_bytes);
    generate_write!(writeu32, u32, to_be_bytes);
}

impl Endian for LittleEndian {
    generate_load!(loadu16, u16, from_le_bytes);
    generate_load!(loadu32, u32, from_le_bytes);
    generate_load!(loadu64, u64, from_le_bytes);
    generate_write!(writeu16, u16, to_le_bytes);
    generate_write!(writeu32, u32, to_le_bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker() {
        assert_eq!(ByteOrder::from_marker(*b"MM"), Some(ByteOrder::Big));
        assert_eq!(ByteOrder::from_marker(*b"II"), Some(ByteOrder::Little));
        assert_eq!(ByteOrder::from_marker(*b"IM"), None);
        assert_eq!(ByteOrder::from_marker(*b"\0\0"), None);
        assert_eq!(ByteOrder::Big.marker(), *b"MM");
        assert_eq!(ByteOrder::Little.marker(), *b"II");
    }

    #[test]
    fn native() {
        #[cfg(target_endian = "little")]
        assert_eq!(ByteOrder::native(), ByteOrder::Little);
        #[cfg(target_endian = "big")]
        assert_eq!(ByteOrder::native(), ByteOrder::Big);
    }

    #[test]
    fn runtime_load() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        assert_eq!(ByteOrder::Big.loadu16(&data, 1), 0x0203);
        assert_eq!(ByteOrder::Little.loadu16(&data, 1), 0x0302);
        assert_eq!(ByteOrder::Big.loadu32(&data, 0), 0x01020304);
        assert_eq!(ByteOrder::Little.loadu32(&data, 0), 0x04030201);
        assert_eq!(ByteOrder::Big.loadu64(&data, 1), 0x0203040506070809);
        assert_eq!(ByteOrder::Little.loadu64(&data, 1), 0x0908070605040302);
    }

    #[test]
    fn u32_to_bytes() {
        assert_eq!(ByteOrder::Big.u32_to_bytes(0x41424344), *b"ABCD");
        assert_eq!(ByteOrder::Little.u32_to_bytes(0x44434241), *b"ABCD");
    }

    #[test]
    fn loadu16() {
        assert_eq!(BigEndian::loadu16(&[0x01, 0x02], 0), 0x0102);
        assert_eq!(BigEndian::loadu16(&[0x01, 0x02, 0x03], 1), 0x0203);
        assert_eq!(LittleEndian::loadu16(&[0x01, 0x02], 0), 0x0201);
        assert_eq!(LittleEndian::loadu16(&[0x01, 0x02, 0x03], 1), 0x0302);
    }

    #[test]
    fn loadu32() {
        assert_eq!(BigEndian::loadu32(&[0x01, 0x02, 0x03, 0x04], 0),
                   0x01020304);
        assert_eq!(LittleEndian::loadu32(&[0x01, 0x02, 0x03, 0x04, 0x05], 1),
                   0x05040302);
    }

    #[test]
    fn write() {
        let mut buf = Vec::new();
        BigEndian::writeu16(&mut buf, 0x0102).unwrap();
        LittleEndian::writeu16(&mut buf, 0x0304).unwrap();
        LittleEndian::writeu32(&mut buf, 0x05060708).unwrap();
        assert_eq!(buf, b"\x01\x02\x04\x03\x08\x07\x06\x05");
    }

    #[test]
    #[should_panic(expected = "index 3 out of range for slice of length 2")]
    fn out_of_range() {
        ByteOrder::Big.loadu16(&[0x01, 0x02], 1);
    }
}
