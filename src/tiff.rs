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

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::io::{Read, Seek};

use log::{debug, trace};

use crate::endian::ByteOrder;
use crate::error::Error;
use crate::stream::EndianReader;
use crate::tag::{Section, Tag};
use crate::value::{normalize, ExifValue, ValueType};

// TIFF header magic numbers [EXIF23 4.5.2].
const TIFF_FORTY_TWO: u16 = 0x002a;
pub const TIFF_BE_SIG: [u8; 4] = [0x4d, 0x4d, 0x00, 0x2a];
pub const TIFF_LE_SIG: [u8; 4] = [0x49, 0x49, 0x2a, 0x00];

// Tags describing strips, sub-images, and thumbnails.  Their values
// point into pixel data that never travels with the blob.
const SKIPPED_TAGS: [u16; 6] = [
    Tag::StripOffsets.1,
    Tag::RowsPerStrip.1,
    Tag::StripByteCounts.1,
    Tag::SubIFDs.1,
    Tag::JPEGInterchangeFormat.1,
    Tag::JPEGInterchangeFormatLength.1,
];

/// One 12-byte directory entry as stored in the blob [EXIF23 4.6.2].
///
/// `value_offset` is decoded in the byte order of the blob.  It is
/// either the offset of the value or the value itself packed into
/// 4 bytes, depending on `ValueType::fits_inline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    pub tag: u16,
    pub typ: u16,
    pub count: u32,
    pub value_offset: u32,
}

/// Returns true if `buf` starts with a TIFF header signature.
pub fn is_tiff(buf: &[u8]) -> bool {
    buf.starts_with(&TIFF_BE_SIG) || buf.starts_with(&TIFF_LE_SIG)
}

/// Parses the TIFF structure that starts at the current position of
/// `inner`.  All offsets in the blob are relative to that position.
///
/// Faults inside the structure skip the directory or the entry they
/// affect.  A missing or broken header is returned as an error.
pub(crate) fn parse<R>(mut inner: R)
                       -> Result<HashMap<Tag, ExifValue>, Error>
    where R: Read + Seek
{
    let base = inner.stream_position()?;
    let mut marker = [0; 2];
    inner.read_exact(&mut marker)?;
    let order = ByteOrder::from_marker(marker).ok_or_else(|| {
        debug!("Not a TIFF blob: byte order marker {:02x?}", marker);
        Error::InvalidFormat("Invalid TIFF byte order")
    })?;
    let mut reader = EndianReader::new(inner, order)?;
    if reader.read_u16()? != TIFF_FORTY_TWO {
        debug!("Not a TIFF blob: bad magic number");
        return Err(Error::InvalidFormat("Invalid forty two"));
    }
    let ifd_offset = reader.read_u32()?;
    let blob_len = reader.len().saturating_sub(base);
    let mut parser = Parser {
        reader,
        order,
        base,
        blob_len,
        values: HashMap::new(),
    };
    parser.walk(ifd_offset)?;
    Ok(parser.values)
}

struct Parser<R> {
    reader: EndianReader<R>,
    order: ByteOrder,
    base: u64,
    blob_len: u64,
    values: HashMap<Tag, ExifValue>,
}

impl<R> Parser<R> where R: Read + Seek {
    // Visits the directories breadth first.  The next IFD offset at
    // the end of each directory is never followed.
    fn walk(&mut self, ifd_offset: u32) -> Result<(), Error> {
        let mut queue = VecDeque::new();
        let mut enqueued = HashSet::new();
        queue.push_back((Section::Image, ifd_offset));

        while let Some((section, offset)) = queue.pop_front() {
            if offset as u64 >= self.blob_len {
                debug!("{} IFD offset {} is out of range", section, offset);
                continue;
            }
            let entries = match self.read_ifd(offset) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    debug!("{} IFD at {} is truncated", section, offset);
                    continue;
                },
                Err(e) => return Err(e.into()),
            };
            if entries.is_empty() {
                debug!("{} IFD at {} has no entries", section, offset);
            }
            for entry in entries {
                if let Some(child) = Section::from_pointer(entry.tag) {
                    // Only the first pointer to each section is followed.
                    if enqueued.insert(child) {
                        queue.push_back((child, entry.value_offset));
                    } else {
                        debug!("Ignoring duplicate pointer to {} IFD", child);
                    }
                } else if SKIPPED_TAGS.contains(&entry.tag) {
                    trace!("Skipping {}", Tag(section, entry.tag));
                } else {
                    match self.resolve(section, &entry) {
                        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof =>
                            debug!("Value of {} is truncated",
                                   Tag(section, entry.tag)),
                        r => r?,
                    }
                }
            }
        }
        Ok(())
    }

    // Reads the entry count and the entries of an IFD [EXIF23 4.6.2].
    fn read_ifd(&mut self, offset: u32) -> io::Result<Vec<IfdEntry>> {
        self.reader.set_position(self.base + offset as u64)?;
        let count = self.reader.read_u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let entry = IfdEntry {
                tag: self.reader.read_u16()?,
                typ: self.reader.read_u16()?,
                count: self.reader.read_u32()?,
                value_offset: self.reader.read_u32()?,
            };
            trace!("IFD entry at {}: tag {:#06x} type {} count {} \
                    value/offset {:#010x}", offset, entry.tag, entry.typ,
                   entry.count, entry.value_offset);
            entries.push(entry);
        }
        Ok(entries)
    }

    // Extracts the value of an entry, converts it to little endian,
    // and stores it unless the tag has already been seen.
    fn resolve(&mut self, section: Section, entry: &IfdEntry)
               -> io::Result<()> {
        let tag = Tag(section, entry.tag);
        let typ = match ValueType::from_u16(entry.typ) {
            Some(typ) => typ,
            None => {
                debug!("Skipping {} with unknown type {}", tag, entry.typ);
                return Ok(());
            },
        };
        if self.values.contains_key(&tag) {
            debug!("Ignoring duplicate {}", tag);
            return Ok(());
        }

        let mut data = if typ.fits_inline(entry.count) {
            // The value is left-justified in the 4-byte field, in the
            // order in which it was stored.
            let len = typ.size() * entry.count as usize;
            self.order.u32_to_bytes(entry.value_offset)[..len].to_vec()
        } else {
            let len = typ.size() as u64 * entry.count as u64;
            if len == 0 || len > i32::MAX as u64 ||
                    entry.value_offset as u64 + len > self.blob_len {
                debug!("Skipping {}: {} bytes at {} are out of range",
                       tag, len, entry.value_offset);
                return Ok(());
            }
            self.reader.set_position(self.base + entry.value_offset as u64)?;
            self.reader.read_bytes(len as usize)?
        };
        normalize(self.order, typ, &mut data);
        self.values.insert(tag, ExifValue::new(typ, data));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use super::*;

    fn parse_bytes(data: &[u8]) -> Result<HashMap<Tag, ExifValue>, Error> {
        parse(Cursor::new(data))
    }

    #[test]
    fn signature() {
        assert!(is_tiff(b"MM\0\x2a\0\0\0\x08"));
        assert!(is_tiff(b"II\x2a\0\x08\0\0\0"));
        assert!(!is_tiff(b"MM\x2a\0"));
        assert!(!is_tiff(b"II"));
    }

    #[test]
    fn bad_header() {
        assert_err_pat!(parse_bytes(b"XX\0\x2a\0\0\0\x08\0\0"),
                        Error::InvalidFormat("Invalid TIFF byte order"));
        assert_err_pat!(parse_bytes(b"II\x2b\0\x08\0\0\0\0\0"),
                        Error::InvalidFormat("Invalid forty two"));
        assert_err_pat!(parse_bytes(b"MM\0\x2a\0\0"), Error::Io(_));
        assert_err_pat!(parse_bytes(b"I"), Error::Io(_));
    }

    #[test]
    fn ascii_inline_boundary() {
        // "ACME" (4 bytes) is packed into the entry.
        let data = b"MM\0\x2a\0\0\0\x08\
                     \0\x01\x01\x0f\0\x02\0\0\0\x04ACME\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[&Tag::Make], ExifValue::new(ValueType::Ascii,
                                                 b"ACME".to_vec()));

        // "ACME\0" (5 bytes) is stored at offset 26.
        let data = b"MM\0\x2a\0\0\0\x08\
                     \0\x01\x01\x0f\0\x02\0\0\0\x05\0\0\0\x1a\
                     \0\0\0\0\
                     ACME\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[&Tag::Make], ExifValue::ascii("ACME"));
    }

    #[test]
    fn inline_short() {
        let be = b"MM\0\x2a\0\0\0\x08\
                   \0\x01\x01\x12\0\x03\0\0\0\x01\0\x06\0\0\
                   \0\0\0\0";
        let le = b"II\x2a\0\x08\0\0\0\
                   \x01\0\x12\x01\x03\0\x01\0\0\0\x06\0\0\0\
                   \0\0\0\0";
        for data in &[&be[..], &le[..]] {
            let v = parse_bytes(data).unwrap();
            assert_eq!(v[&Tag::Orientation], ExifValue::short(6));
        }
    }

    #[test]
    fn rational_out_of_line_big_endian() {
        let data = b"MM\0\x2a\0\0\0\x08\
                     \0\x01\x01\x1a\0\x05\0\0\0\x01\0\0\0\x1a\
                     \0\0\0\0\
                     \0\0\0\x48\0\0\0\x01";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v[&Tag::XResolution], ExifValue::rational(72, 1));
    }

    #[test]
    fn gps_without_exif() {
        let data = b"II\x2a\0\x08\0\0\0\
                     \x01\0\x25\x88\x04\0\x01\0\0\0\x1a\0\0\0\
                     \0\0\0\0\
                     \x01\0\0\0\x01\0\x04\0\0\0\x02\x03\0\0\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[&Tag::GPSVersionID], ExifValue::byte(&[2, 3, 0, 0]));
        assert!(v.keys().all(|t| t.section() == Section::Gps));
    }

    #[test]
    fn duplicate_pointer() {
        // The second Exif pointer leads to ColorSpace, which is never
        // reached.
        let data = b"II\x2a\0\x08\0\0\0\
                     \x02\0\x69\x87\x04\0\x01\0\0\0\x26\0\0\0\
                           \x69\x87\x04\0\x01\0\0\0\x38\0\0\0\
                     \0\0\0\0\
                     \x01\0\0\x90\x07\0\x04\0\0\x000230\
                     \0\0\0\0\
                     \x01\0\x01\xa0\x03\0\x01\0\0\0\x01\0\0\0\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[&Tag::ExifVersion], ExifValue::undefined(b"0230"));
        assert!(!v.contains_key(&Tag::ColorSpace));
    }

    #[test]
    fn empty_and_out_of_range_ifd() {
        // Make, an Exif pointer to an empty IFD at 50, and a GPS
        // pointer far beyond the end.
        let data = b"II\x2a\0\x08\0\0\0\
                     \x03\0\x0f\x01\x02\0\x03\0\0\0AB\0\0\
                           \x69\x87\x04\0\x01\0\0\0\x32\0\0\0\
                           \x25\x88\x04\0\x01\0\0\0\0\x10\0\0\
                     \0\0\0\0\
                     \0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[&Tag::Make], ExifValue::ascii("AB"));
    }

    #[test]
    fn skipped_tags() {
        let data = b"II\x2a\0\x08\0\0\0\
                     \x03\0\x0f\x01\x02\0\x03\0\0\0AB\0\0\
                           \x11\x01\x04\0\x01\0\0\0\x08\0\0\0\
                           \x16\x01\x03\0\x01\0\0\0\x10\0\0\0\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert!(v.contains_key(&Tag::Make));
    }

    #[test]
    fn truncated_ifd() {
        // The Exif IFD claims 5 entries but holds only one.
        let data = b"II\x2a\0\x08\0\0\0\
                     \x02\0\x0f\x01\x02\0\x03\0\0\0AB\0\0\
                           \x69\x87\x04\0\x01\0\0\0\x26\0\0\0\
                     \0\0\0\0\
                     \x05\0\0\x90\x07\0\x04\0\0\x000230";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert!(v.contains_key(&Tag::Make));
    }

    #[test]
    fn rejected_values() {
        // Make points past the end, XResolution has no elements, and
        // YResolution is larger than 2^31 - 1 bytes.  Only Model
        // survives.
        let data = b"II\x2a\0\x08\0\0\0\
                     \x04\0\x0f\x01\x02\0\x05\0\0\0\0\x10\0\0\
                           \x10\x01\x02\0\x03\0\0\0XY\0\0\
                           \x1a\x01\x05\0\0\0\0\0\x08\0\0\0\
                           \x1b\x01\x0c\0\0\0\0\x10\x08\0\0\0\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[&Tag::Model], ExifValue::ascii("XY"));
    }

    #[test]
    fn value_ends_at_stream_end() {
        let data = b"II\x2a\0\x08\0\0\0\
                     \x01\0\x0f\x01\x02\0\x06\0\0\0\x1a\0\0\0\
                     \0\0\0\0\
                     ACME\0";
        let v = parse_bytes(data).unwrap();
        assert!(v.is_empty());
        let data = b"II\x2a\0\x08\0\0\0\
                     \x01\0\x0f\x01\x02\0\x05\0\0\0\x1a\0\0\0\
                     \0\0\0\0\
                     ACME\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v[&Tag::Make], ExifValue::ascii("ACME"));
    }

    #[test]
    fn duplicate_tag() {
        let data = b"II\x2a\0\x08\0\0\0\
                     \x02\0\x0f\x01\x02\0\x03\0\0\0AB\0\0\
                           \x0f\x01\x02\0\x03\0\0\0CD\0\0\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[&Tag::Make], ExifValue::ascii("AB"));
    }

    #[test]
    fn unknown_type() {
        let data = b"II\x2a\0\x08\0\0\0\
                     \x02\0\x0f\x01\xff\xff\x01\0\0\0\0\0\0\0\
                           \x10\x01\x02\0\x03\0\0\0XY\0\0\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert!(v.contains_key(&Tag::Model));
    }

    #[test]
    fn next_ifd_not_followed() {
        let data = b"MM\0\x2a\0\0\0\x08\
                     \0\x01\x01\x0f\0\x02\0\0\0\x03AB\0\0\
                     \0\0\0\x1a\
                     \0\x01\x01\x10\0\x02\0\0\0\x03XY\0\0\
                     \0\0\0\0";
        let v = parse_bytes(data).unwrap();
        assert_eq!(v.len(), 1);
        assert!(v.contains_key(&Tag::Make));
    }

    #[test]
    fn offsets_relative_to_start() {
        let mut data = b"JUNK".to_vec();
        data.extend_from_slice(b"MM\0\x2a\0\0\0\x08\
                                 \0\x01\x01\x0f\0\x02\0\0\0\x05\0\0\0\x1a\
                                 \0\0\0\0\
                                 ACME\0");
        let mut cursor = Cursor::new(data);
        cursor.set_position(4);
        let v = parse(cursor).unwrap();
        assert_eq!(v[&Tag::Make], ExifValue::ascii("ACME"));
    }
}
