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

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::io::{Cursor, Seek, SeekFrom, Write};

use log::debug;

use crate::endian::{Endian, LittleEndian};
use crate::error::Error;
use crate::tag::{Section, Tag};
use crate::tiff::TIFF_LE_SIG;
use crate::value::{ExifValue, Orientation, ValueType};

/// The color space of the image the blob is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb = 1,
    /// Recorded as Uncalibrated in ColorSpace and identified by the
    /// Interoperability index "R03".
    AdobeRgb = 2,
    Uncalibrated = 0xffff,
}

impl ColorSpace {
    /// Returns the value written to Exif.ColorSpace.
    pub fn wire_code(self) -> u16 {
        match self {
            ColorSpace::Srgb => 1,
            ColorSpace::AdobeRgb | ColorSpace::Uncalibrated => 0xffff,
        }
    }

    /// Returns the NUL-terminated InteroperabilityIndex that
    /// identifies the color space, if any.
    pub fn interop_index(self) -> Option<&'static [u8; 4]> {
        match self {
            ColorSpace::Srgb => Some(b"R98\0"),
            ColorSpace::AdobeRgb => Some(b"R03\0"),
            ColorSpace::Uncalibrated => None,
        }
    }
}

// Image tags that describe the image as a whole.  Tags for the layout
// of strips, tiles, and thumbnails are never written without the pixel
// data they refer to.
const WRITABLE_IMAGE_TAGS: [Tag; 25] = [
    Tag::ImageWidth,
    Tag::ImageLength,
    Tag::BitsPerSample,
    Tag::Compression,
    Tag::PhotometricInterpretation,
    Tag::Orientation,
    Tag::SamplesPerPixel,
    Tag::PlanarConfiguration,
    Tag::YCbCrSubSampling,
    Tag::YCbCrPositioning,
    Tag::XResolution,
    Tag::YResolution,
    Tag::ResolutionUnit,
    Tag::TransferFunction,
    Tag::WhitePoint,
    Tag::PrimaryChromaticities,
    Tag::YCbCrCoefficients,
    Tag::ReferenceBlackWhite,
    Tag::DateTime,
    Tag::ImageDescription,
    Tag::Make,
    Tag::Model,
    Tag::Software,
    Tag::Artist,
    Tag::Copyright,
];

/// Returns true if a caller-supplied Image tag with the number is
/// written.  Other Image tags are dropped by the writer.
pub fn can_write_image_tag(number: u16) -> bool {
    WRITABLE_IMAGE_TAGS.iter().any(|t| t.number() == number)
}

// The order of the directories in the written blob.
const SECTION_ORDER: [Section; 4] =
    [Section::Image, Section::Exif, Section::Interop, Section::Gps];

// Directories keyed by section, each with its values sorted by tag
// number.
type Sections = BTreeMap<Section, BTreeMap<u16, ExifValue>>;

/// The `Writer` struct encodes a tag map into a little-endian
/// TIFF-structured Exif blob.
///
/// Some entries are synthesized from the image description and win
/// over caller-supplied ones: Orientation (always TopLeft, as the
/// pixels are stored upright), ColorSpace, the image dimensions, the
/// Interoperability IFD for sRGB and Adobe RGB, and the pointers to
/// sub-IFDs.  Caller-supplied Image tags not accepted by
/// `can_write_image_tag` are dropped.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), exifblob::Error> {
/// use std::collections::HashMap;
/// use exifblob::{ColorSpace, ExifValue, Tag, Writer, read_raw};
/// let mut entries = HashMap::new();
/// entries.insert(Tag::Make, ExifValue::ascii("ACME"));
/// let blob = Writer::new(entries, 100, 50, ColorSpace::Srgb).write()?;
/// let values = read_raw(&blob);
/// assert_eq!(values.get(Tag::Make), Some(&ExifValue::ascii("ACME")));
/// assert_eq!(values.get(Tag::PixelXDimension).and_then(|v| v.to_u32()),
///            Some(100));
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Writer {
    entries: HashMap<Tag, ExifValue>,
    width: u32,
    height: u32,
    color_space: ColorSpace,
}

impl Writer {
    /// Constructs a `Writer` for an image of `width` x `height` pixels.
    ///
    /// If `entries` has Image.ImageWidth, the image is regarded as
    /// uncompressed and its dimensions go to ImageWidth and
    /// ImageLength.  Otherwise they go to PixelXDimension and
    /// PixelYDimension.
    pub fn new(entries: HashMap<Tag, ExifValue>, width: u32, height: u32,
               color_space: ColorSpace) -> Self {
        Self { entries, width, height, color_space }
    }

    /// Encodes the blob.
    ///
    /// `Error::NotSupported` is returned if the length of a value is
    /// not a multiple of the size of its type, and `Error::TooBig` if
    /// the blob does not fit in 32-bit offsets.
    pub fn write(&self) -> Result<Vec<u8>, Error> {
        let sections = self.prepare();
        let plan = LayoutPlan::new(&sections)?;
        plan.link().serialize()
    }

    // Filters the caller entries and adds the synthesized ones.
    fn prepare(&self) -> Sections {
        let replace_interop = self.color_space.interop_index().is_some();
        let mut sections = Sections::new();
        for (&tag, value) in &self.entries {
            let dropped = Section::from_pointer(tag.number()).is_some() ||
                match tag.section() {
                    Section::Image => !can_write_image_tag(tag.number()),
                    Section::Interop => replace_interop,
                    Section::Exif | Section::Gps => false,
                };
            if dropped {
                debug!("Dropping {}", tag);
                continue;
            }
            put(&mut sections, tag, value.clone());
        }

        put(&mut sections, Tag::Orientation,
            ExifValue::short(Orientation::TopLeft.code()));
        put(&mut sections, Tag::ColorSpace,
            ExifValue::short(self.color_space.wire_code()));
        let (size_tags, stale_tags) =
            if self.entries.contains_key(&Tag::ImageWidth) {
                ([Tag::ImageWidth, Tag::ImageLength],
                 [Tag::PixelXDimension, Tag::PixelYDimension])
            } else {
                ([Tag::PixelXDimension, Tag::PixelYDimension],
                 [Tag::ImageWidth, Tag::ImageLength])
            };
        put(&mut sections, size_tags[0], ExifValue::long(self.width));
        put(&mut sections, size_tags[1], ExifValue::long(self.height));
        for tag in &stale_tags {
            if let Some(ifd) = sections.get_mut(&tag.section()) {
                ifd.remove(&tag.number());
            }
        }
        if let Some(index) = self.color_space.interop_index() {
            put(&mut sections, Tag::InteroperabilityIndex,
                ExifValue::new(ValueType::Ascii, index.to_vec()));
            put(&mut sections, Tag::InteroperabilityVersion,
                ExifValue::undefined(b"0100"));
        }

        let has_gps = sections.contains_key(&Section::Gps);
        let has_interop = sections.contains_key(&Section::Interop);
        put_default(&mut sections, Tag::ExifVersion,
                    ExifValue::undefined(b"0230"));
        if has_gps {
            put_default(&mut sections, Tag::GPSVersionID,
                        ExifValue::byte(&[2, 3, 0, 0]));
        }
        if has_interop {
            put_default(&mut sections, Tag::InteroperabilityVersion,
                        ExifValue::undefined(b"0100"));
        }

        // Placeholders, linked to the real offsets after layout.
        put(&mut sections, Tag::ExifIFDPointer, ExifValue::long(0));
        if has_gps {
            put(&mut sections, Tag::GPSInfoIFDPointer, ExifValue::long(0));
        }
        if has_interop {
            put(&mut sections, Tag::InteropIFDPointer, ExifValue::long(0));
        }
        sections
    }
}

fn put(sections: &mut Sections, tag: Tag, value: ExifValue) {
    sections.entry(tag.section()).or_default().insert(tag.number(), value);
}

fn put_default(sections: &mut Sections, tag: Tag, value: ExifValue) {
    sections.entry(tag.section()).or_default()
        .entry(tag.number()).or_insert(value);
}

// The positions of all directories and values, computed before
// anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LayoutPlan<'a> {
    ifds: Vec<PlannedIfd<'a>>,
    len: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedIfd<'a> {
    section: Section,
    offset: u32,
    entries: Vec<PlannedEntry<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedEntry<'a> {
    tag: u16,
    typ: ValueType,
    count: u32,
    placement: Placement<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Placement<'a> {
    // The 4-byte value offset field holds the value itself.
    Inline([u8; 4]),
    // The value is stored at the offset.
    OutOfLine(u32, &'a [u8]),
}

impl<'a> LayoutPlan<'a> {
    // Assigns offsets to the directories and the out-of-line values
    // [EXIF23 4.6.2].  The header takes the first 8 bytes.
    fn new(sections: &'a Sections) -> Result<Self, Error> {
        let mut ifds = Vec::new();
        let mut next = 8;
        for section in &SECTION_ORDER {
            let values = match sections.get(section) {
                Some(values) => values,
                None => continue,
            };
            if values.len() > u16::MAX as usize {
                return Err(Error::TooBig("Too many IFD entries"));
            }
            let offset = to_offset(next)?;
            // The number of entries (2) + array of entries (12 * n) +
            // the next IFD pointer (4).
            let mut data_offset = next + 2 + 12 * values.len() as u64 + 4;
            let mut entries = Vec::with_capacity(values.len());
            for (&tag, value) in values {
                let typ = value.typ();
                let data = value.data();
                if data.len() % typ.size() != 0 {
                    return Err(Error::NotSupported(
                        "Value length is not a multiple of the type size"));
                }
                let count = u32::try_from(data.len() / typ.size())
                    .map_err(|_| Error::TooBig("Too long array"))?;
                let placement = if typ.fits_inline(count) {
                    let mut field = [0; 4];
                    field[..data.len()].copy_from_slice(data);
                    Placement::Inline(field)
                } else {
                    let value_offset = to_offset(data_offset)?;
                    // The value must begin on a word boundary. [TIFF6,
                    // Section 2: TIFF Structure, Image File Directory,
                    // IFD Entry, p. 15]
                    data_offset += data.len() as u64;
                    data_offset += data_offset % 2;
                    Placement::OutOfLine(value_offset, data)
                };
                entries.push(PlannedEntry { tag, typ, count, placement });
            }
            ifds.push(PlannedIfd { section: *section, offset, entries });
            next = data_offset;
        }
        Ok(LayoutPlan { ifds, len: to_offset(next)? })
    }

    // Returns the plan with each pointer entry set to the offset of
    // the directory it leads to.
    fn link(self) -> Self {
        let offsets: HashMap<Section, u32> = self.ifds.iter()
            .map(|ifd| (ifd.section, ifd.offset))
            .collect();
        let ifds = self.ifds.into_iter().map(|ifd| PlannedIfd {
            entries: ifd.entries.into_iter().map(|entry| {
                let target = Section::from_pointer(entry.tag)
                    .and_then(|child| offsets.get(&child));
                match target {
                    Some(&offset) => PlannedEntry {
                        placement: Placement::Inline(offset.to_le_bytes()),
                        ..entry
                    },
                    None => entry,
                }
            }).collect(),
            ..ifd
        }).collect();
        LayoutPlan { ifds, len: self.len }
    }

    fn serialize(&self) -> Result<Vec<u8>, Error> {
        let mut w = Cursor::new(vec![0; self.len as usize]);
        // TIFF signature and the offset of the 0th IFD.
        w.write_all(&TIFF_LE_SIG)?;
        LittleEndian::writeu32(&mut w, 8)?;
        for ifd in &self.ifds {
            w.seek(SeekFrom::Start(ifd.offset as u64))?;
            LittleEndian::writeu16(&mut w, ifd.entries.len() as u16)?;
            for entry in &ifd.entries {
                LittleEndian::writeu16(&mut w, entry.tag)?;
                LittleEndian::writeu16(&mut w, entry.typ.code())?;
                LittleEndian::writeu32(&mut w, entry.count)?;
                match entry.placement {
                    Placement::Inline(ref field) => w.write_all(field)?,
                    Placement::OutOfLine(offset, data) => {
                        LittleEndian::writeu32(&mut w, offset)?;
                        write_at(&mut w, data, offset)?;
                    },
                }
            }
            // The next IFD pointer.
            LittleEndian::writeu32(&mut w, 0)?;
        }
        Ok(w.into_inner())
    }
}

fn write_at<W>(w: &mut W, buf: &[u8], offset: u32)
               -> io::Result<()> where W: Write + Seek {
    let orig = w.stream_position()?;
    w.seek(SeekFrom::Start(offset as u64))?;
    w.write_all(buf)?;
    w.seek(SeekFrom::Start(orig))?;
    Ok(())
}

fn to_offset(pos: u64) -> Result<u32, Error> {
    u32::try_from(pos).map_err(|_| Error::TooBig("Offset too large"))
}
