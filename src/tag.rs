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

/// A directory of the TIFF tree.
///
/// The sections form a fixed tree: Exif and Gps hang off Image, and
/// Interop hangs off Exif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    /// The 0th IFD (TIFF attributes of the primary image).
    Image,
    /// The Exif IFD.
    Exif,
    /// The GPS IFD.
    Gps,
    /// The Interoperability IFD.
    Interop,
}

impl Section {
    /// Returns the section a sub-IFD pointer tag number leads to, or
    /// `None` if the number is not a pointer tag.
    ///
    /// Pointer tags are recognized by number alone, whatever section
    /// they appear in.
    pub(crate) fn from_pointer(number: u16) -> Option<Section> {
        match number {
            n if n == Tag::ExifIFDPointer.1 => Some(Section::Exif),
            n if n == Tag::GPSInfoIFDPointer.1 => Some(Section::Gps),
            n if n == Tag::InteropIFDPointer.1 => Some(Section::Interop),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match *self {
            Section::Image => "Image",
            Section::Exif => "Exif",
            Section::Gps => "GPS",
            Section::Interop => "Interop",
        })
    }
}

// Tag numbers are not unique across sections (GPSLatitudeRef and
// InteroperabilityIndex are both 1), so a tag is always qualified by
// its section.  Unknown numbers must stay representable, which rules
// out a plain enum.

/// A property path: a tag number qualified by the section it lives in.
///
/// Well-known tags are available as associated constants such as
/// `Tag::Make`.
///
/// # Examples
/// ```
/// use exifblob::{Section, Tag};
/// assert_eq!(Tag::Make, Tag(Section::Image, 271));
/// assert_eq!(Tag::Make.to_string(), "Make");
/// assert_eq!(Tag(Section::Exif, 0xc000).to_string(), "Tag(Exif, 49152)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub Section, pub u16);

impl Tag {
    /// Returns the section of the tag.
    #[inline]
    pub fn section(self) -> Section {
        self.0
    }

    /// Returns the tag number.
    #[inline]
    pub fn number(self) -> u16 {
        self.1
    }

    /// Returns the name of a well-known tag.
    pub fn name(self) -> Option<&'static str> {
        get_tag_name(self)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match get_tag_name(*self) {
            Some(name) => f.pad(name),
            None => f.pad(&format!("{:?}", self)),
        }
    }
}

macro_rules! generate_well_known_tag_constants {
    (
        $( |$sect:path| $(
            // Copy the doc attribute to the actual definition.
            $( #[$attr:meta] )*
            ($name:ident, $num:expr)
        ),+, )+
    ) => (
        #[allow(non_upper_case_globals)]
        impl Tag {
            $($(
                $( #[$attr] )*
                pub const $name: Tag = Tag($sect, $num);
            )+)+
        }

        fn get_tag_name(tag: Tag) -> Option<&'static str> {
            match tag {
                $($(
                    Tag::$name => Some(stringify!($name)),
                )+)+
                _ => None,
            }
        }
    )
}

generate_well_known_tag_constants!(
    |Section::Image|

    /// Number of columns of an uncompressed image.
    (ImageWidth, 0x100),
    /// Number of rows of an uncompressed image.
    (ImageLength, 0x101),
    (BitsPerSample, 0x102),
    (Compression, 0x103),
    (PhotometricInterpretation, 0x106),
    (ImageDescription, 0x10e),
    (Make, 0x10f),
    (Model, 0x110),
    /// Never preserved; strip data is not carried with the blob.
    (StripOffsets, 0x111),
    (Orientation, 0x112),
    (SamplesPerPixel, 0x115),
    /// Never preserved.
    (RowsPerStrip, 0x116),
    /// Never preserved.
    (StripByteCounts, 0x117),
    (XResolution, 0x11a),
    (YResolution, 0x11b),
    (PlanarConfiguration, 0x11c),
    (ResolutionUnit, 0x128),
    (TransferFunction, 0x12d),
    (Software, 0x131),
    (DateTime, 0x132),
    (Artist, 0x13b),
    (WhitePoint, 0x13e),
    (PrimaryChromaticities, 0x13f),
    /// Never preserved.
    (SubIFDs, 0x14a),
    /// Offset of the JPEG thumbnail.  Never preserved.
    (JPEGInterchangeFormat, 0x201),
    /// Length of the JPEG thumbnail.  Never preserved.
    (JPEGInterchangeFormatLength, 0x202),
    (YCbCrCoefficients, 0x211),
    (YCbCrSubSampling, 0x212),
    (YCbCrPositioning, 0x213),
    (ReferenceBlackWhite, 0x214),
    (Copyright, 0x8298),
    /// Pointer to the Exif IFD.
    (ExifIFDPointer, 0x8769),
    /// Pointer to the GPS IFD.
    (GPSInfoIFDPointer, 0x8825),

    |Section::Exif|

    (ExposureTime, 0x829a),
    (FNumber, 0x829d),
    (ExifVersion, 0x9000),
    (DateTimeOriginal, 0x9003),
    (MakerNote, 0x927c),
    (UserComment, 0x9286),
    (ColorSpace, 0xa001),
    /// Width of a compressed image.
    (PixelXDimension, 0xa002),
    /// Height of a compressed image.
    (PixelYDimension, 0xa003),
    /// Pointer to the Interoperability IFD.
    (InteropIFDPointer, 0xa005),

    |Section::Gps|

    (GPSVersionID, 0x0),
    (GPSLatitudeRef, 0x1),
    (GPSLatitude, 0x2),
    (GPSLongitudeRef, 0x3),
    (GPSLongitude, 0x4),
    (GPSAltitudeRef, 0x5),
    (GPSAltitude, 0x6),

    |Section::Interop|

    /// "R98" for sRGB, "R03" for Adobe RGB.
    (InteroperabilityIndex, 0x1),
    (InteroperabilityVersion, 0x2),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_constant() {
        assert_eq!(Tag::ExifVersion, Tag(Section::Exif, 0x9000));
        assert_eq!(Tag::GPSVersionID.number(), 0);
        assert_eq!(Tag::InteroperabilityIndex.section(), Section::Interop);
        // Same number, different sections.
        assert_ne!(Tag::GPSLatitudeRef, Tag::InteroperabilityIndex);
    }

    #[test]
    fn tag_display() {
        assert_eq!(Tag::PixelXDimension.to_string(), "PixelXDimension");
        assert_eq!(format!("{:<8}|", Tag::Make), "Make    |");
        assert_eq!(Tag(Section::Gps, 0x1234).to_string(), "Tag(Gps, 4660)");
        assert_eq!(Tag(Section::Image, 0x9000).name(), None);
        assert_eq!(Section::Gps.to_string(), "GPS");
    }

    #[test]
    fn pointer_sections() {
        assert_eq!(Section::from_pointer(34665), Some(Section::Exif));
        assert_eq!(Section::from_pointer(34853), Some(Section::Gps));
        assert_eq!(Section::from_pointer(40965), Some(Section::Interop));
        assert_eq!(Section::from_pointer(271), None);
    }

    #[test]
    fn ordering() {
        let mut v = vec![Tag::GPSVersionID, Tag::ColorSpace, Tag::ExifVersion,
                         Tag::Make, Tag::InteroperabilityIndex];
        v.sort();
        assert_eq!(v, [Tag::Make, Tag::ExifVersion, Tag::ColorSpace,
                       Tag::GPSVersionID, Tag::InteroperabilityIndex]);
    }
}
