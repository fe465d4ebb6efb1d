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

use thiserror::Error;

/// An error type returned when parsing or writing Exif data.
///
/// The parse entry points never return `InvalidFormat`; a blob that
/// is not TIFF-structured is reported as an empty collection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Input data was malformed or truncated.
    #[error("{0}")]
    InvalidFormat(&'static str),
    /// Input data could not be read due to an I/O error and
    /// a `std::io::Error` value is associated with this variant.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Field values are too big to encode in a 32-bit offset space.
    #[error("{0}")]
    TooBig(&'static str),
    /// The value cannot be encoded as declared.
    #[error("{0}")]
    NotSupported(&'static str),
}

impl Error {
    // True if the error comes from the blob itself (bad structure or
    // a premature end) rather than from the underlying stream.
    pub(crate) fn is_corruption(&self) -> bool {
        match *self {
            Error::InvalidFormat(_) => true,
            Error::Io(ref err) => err.kind() == io::ErrorKind::UnexpectedEof,
            Error::TooBig(_) | Error::NotSupported(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Error::InvalidFormat("Invalid TIFF byte order").to_string(),
                   "Invalid TIFF byte order");
        assert_eq!(Error::TooBig("Offset too large").to_string(),
                   "Offset too large");
        let err = Error::from(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn corruption() {
        assert!(Error::InvalidFormat("x").is_corruption());
        assert!(Error::from(io::Error::from(io::ErrorKind::UnexpectedEof))
                .is_corruption());
        assert!(!Error::from(io::Error::from(io::ErrorKind::PermissionDenied))
                .is_corruption());
        assert!(!Error::NotSupported("x").is_corruption());
    }
}
