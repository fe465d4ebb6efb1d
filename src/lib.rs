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

//! This is a pure-Rust library to read and re-serialize the
//! TIFF-structured Exif blob of an image.
//!
//! The blob is what a JPEG APP1 "Exif\0\0" segment or a WebP EXIF
//! chunk carries; extracting it from the container is left to the
//! caller.
//!
//! Reading walks the Image IFD and the Exif, GPS, and
//! Interoperability IFDs it leads to, and yields a `ValueCollection`
//! that maps each tag to its type and its bytes.  The bytes are always
//! little endian, whatever the byte order of the blob.
//!
//! Writing takes such a map together with the dimensions and the
//! color space of the image, and produces a little-endian blob.
//!
//! # Examples
//!
//! ```
//! # fn main() -> Result<(), exifblob::Error> {
//! use exifblob::{ColorSpace, ExifValue, Tag, Writer, read_raw};
//! let blob = b"MM\0\x2a\0\0\0\x08\
//!              \0\x01\x01\x0f\0\x02\0\0\0\x05\0\0\0\x1a\
//!              \0\0\0\0\
//!              ACME\0";
//! let values = read_raw(blob);
//! assert_eq!(values.get(Tag::Make).and_then(|v| v.to_ascii()), Some("ACME"));
//!
//! // Edit and write it back.
//! let mut entries = values.into_map();
//! entries.insert(Tag::Software, ExifValue::ascii("exifblob"));
//! let blob = Writer::new(entries, 640, 480, ColorSpace::Srgb).write()?;
//! assert!(blob.starts_with(b"II\x2a\0"));
//! for (tag, value) in read_raw(&blob).section(exifblob::Section::Image) {
//!     println!("{} {}", tag, value);
//! }
//! # Ok(()) }
//! ```

pub use endian::ByteOrder;
pub use error::Error;
pub use reader::{ValueCollection, read_from, read_raw};
pub use stream::EndianReader;
pub use tag::{Section, Tag};
pub use tiff::{IfdEntry, is_tiff};
pub use value::{ExifValue, Orientation, ValueType};
pub use writer::{ColorSpace, Writer, can_write_image_tag};

#[cfg(test)]
#[macro_use]
mod tmacro;

mod endian;
mod error;
mod reader;
mod stream;
mod tag;
mod tiff;
mod value;
mod writer;
