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

use std::collections::hash_map;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use log::debug;

use crate::error::Error;
use crate::tag::{Section, Tag};
use crate::tiff;
use crate::value::{ExifValue, Orientation};

/// Parses a raw TIFF-structured Exif blob.
///
/// A blob that is not TIFF-structured, or is cut off before its first
/// directory, yields an empty collection.  Broken directories and
/// entries inside an otherwise valid blob are skipped.
///
/// # Examples
/// ```
/// use exifblob::{Tag, read_raw};
/// let blob = b"II\x2a\0\x08\0\0\0\
///              \x01\0\x12\x01\x03\0\x01\0\0\0\x06\0\0\0\
///              \0\0\0\0";
/// let values = read_raw(blob);
/// assert_eq!(values.get(Tag::Orientation).and_then(|v| v.to_u16()),
///            Some(6));
/// assert!(read_raw(b"not a TIFF blob").is_empty());
/// ```
pub fn read_raw(data: &[u8]) -> ValueCollection {
    // Reading from a slice fails only on corrupt data, which
    // `read_from` already maps to an empty collection.
    read_from(Cursor::new(data)).unwrap_or_default()
}

/// Parses the TIFF-structured Exif blob that starts at the current
/// position of `reader`.
///
/// Offsets in the blob are relative to that position.  Corrupt data
/// is handled as in `read_raw`; other I/O errors of the stream are
/// returned as `Error::Io`.
pub fn read_from<R>(reader: R) -> Result<ValueCollection, Error>
    where R: Read + Seek
{
    match tiff::parse(reader) {
        Ok(values) => Ok(ValueCollection { values }),
        Err(e) if e.is_corruption() => {
            debug!("No Exif data: {}", e);
            Ok(ValueCollection::default())
        },
        Err(e) => Err(e),
    }
}

/// The parsed values, keyed by property path.
///
/// The collection is immutable.  `into_map` hands the entries over
/// as a map that can be edited and passed to `Writer::new`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueCollection {
    values: HashMap<Tag, ExifValue>,
}

impl ValueCollection {
    /// Returns the value of a tag.
    #[inline]
    pub fn get(&self, tag: Tag) -> Option<&ExifValue> {
        self.values.get(&tag)
    }

    #[inline]
    pub fn contains(&self, tag: Tag) -> bool {
        self.values.contains_key(&tag)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an iterator over all values in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<Tag, ExifValue> {
        self.values.iter()
    }

    /// Returns the values of one section sorted by tag number.
    pub fn section(&self, section: Section) -> Vec<(Tag, &ExifValue)> {
        let mut v: Vec<_> = self.values.iter()
            .filter(|(tag, _)| tag.section() == section)
            .map(|(&tag, value)| (tag, value))
            .collect();
        v.sort_by_key(|&(tag, _)| tag.number());
        v
    }

    /// Decodes Image.Orientation.  A missing tag or a value outside
    /// 1 to 8 yields `None`.
    pub fn orientation(&self) -> Option<Orientation> {
        self.get(Tag::Orientation)
            .and_then(ExifValue::to_u16)
            .and_then(Orientation::from_u16)
    }

    /// Converts the collection into a map.
    pub fn into_map(self) -> HashMap<Tag, ExifValue> {
        self.values
    }
}

impl<'a> IntoIterator for &'a ValueCollection {
    type Item = (&'a Tag, &'a ExifValue);
    type IntoIter = hash_map::Iter<'a, Tag, ExifValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
