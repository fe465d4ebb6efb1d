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
use std::io::{Read, Seek, SeekFrom};

use crate::endian::ByteOrder;

// The reader never buffers more than this many bytes.
const BUFFER_SIZE: usize = 4096;

/// A buffered, seekable reader that decodes multi-byte numbers in the
/// byte order declared by the blob.
///
/// Numbers are reported in their natural form; the conversion from the
/// declared order to the host order happens here and nowhere else on
/// the read path.  Moving the position inside the buffered window
/// moves only the cursor, so hopping between a directory and its
/// out-of-line values does not re-read the stream.
#[derive(Debug)]
pub struct EndianReader<R> {
    inner: R,
    order: ByteOrder,
    // The capacity is min(stream length, BUFFER_SIZE) and never changes.
    buf: Vec<u8>,
    read_offset: usize,
    read_len: usize,
    // Position of `inner`, which is the end of the buffered window.
    stream_pos: u64,
    len: u64,
}

impl<R> EndianReader<R> where R: Read + Seek {
    /// Wraps `inner`.  Reading starts at the current position of
    /// `inner`.
    pub fn new(mut inner: R, order: ByteOrder) -> io::Result<Self> {
        let stream_pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(stream_pos))?;
        let capacity = len.min(BUFFER_SIZE as u64) as usize;
        Ok(Self {
            inner,
            order,
            buf: vec![0; capacity],
            read_offset: 0,
            read_len: 0,
            stream_pos,
            len,
        })
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Returns the length of the underlying stream.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.stream_pos - self.read_len as u64 + self.read_offset as u64
    }

    pub fn set_position(&mut self, pos: u64) -> io::Result<()> {
        let current = self.position();
        if pos == current {
            return Ok(());
        }
        let window_start = current - self.read_offset as u64;
        let window_end = window_start + self.read_len as u64;
        if window_start <= pos && pos <= window_end {
            self.read_offset = (pos - window_start) as usize;
        } else {
            self.read_offset = 0;
            self.read_len = 0;
            self.stream_pos = self.inner.seek(SeekFrom::Start(pos))?;
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let at = self.consume(1)?;
        Ok(self.buf[at])
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        let at = self.consume(2)?;
        Ok(self.order.loadu16(&self.buf, at))
    }

    pub fn read_i16(&mut self) -> io::Result<i16> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let at = self.consume(4)?;
        Ok(self.order.loadu32(&self.buf, at))
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        let at = self.consume(8)?;
        Ok(self.order.loadu64(&self.buf, at))
    }

    pub fn read_i64(&mut self) -> io::Result<i64> {
        self.read_u64().map(|v| v as i64)
    }

    // TIFF and Rust use IEEE 754 format, so no conversion is required.
    pub fn read_f32(&mut self) -> io::Result<f32> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> io::Result<f64> {
        self.read_u64().map(f64::from_bits)
    }

    /// Reads `len` bytes as ASCII.  Bytes with the 8th bit set are
    /// replaced with '?'.
    pub fn read_ascii(&mut self, len: usize) -> io::Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(bytes.iter()
           .map(|&b| if b.is_ascii() { b as char } else { '?' })
           .collect())
    }

    /// Reads exactly `len` raw bytes.  No byte order conversion is
    /// applied.
    pub fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        if self.read_offset + len <= self.read_len {
            let bytes = self.buf[self.read_offset .. self.read_offset + len]
                .to_vec();
            self.read_offset += len;
            return Ok(bytes);
        }

        // Keep the unread tail of the buffer, then read the rest
        // directly from the stream and drop the buffer.
        let mut bytes = self.buf[self.read_offset .. self.read_len].to_vec();
        let unread = bytes.len();
        self.read_offset = 0;
        self.read_len = 0;
        // `take` instead of a preallocated `vec![0; len]`: a huge length
        // in a broken blob must not trigger a huge allocation.
        let result = (&mut self.inner).take((len - unread) as u64)
            .read_to_end(&mut bytes);
        self.stream_pos += (bytes.len() - unread) as u64;
        result?;
        if bytes.len() != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof, "unexpected end of Exif data"));
        }
        Ok(bytes)
    }

    // Makes at least `count` bytes available and returns the buffer
    // index of the first one, advancing the cursor past them.
    fn consume(&mut self, count: usize) -> io::Result<usize> {
        if self.read_offset + count > self.read_len {
            self.fill_buffer(count)?;
        }
        let at = self.read_offset;
        self.read_offset += count;
        Ok(at)
    }

    fn fill_buffer(&mut self, min_bytes: usize) -> io::Result<()> {
        self.buf.copy_within(self.read_offset .. self.read_len, 0);
        self.read_len -= self.read_offset;
        self.read_offset = 0;
        while self.read_len < min_bytes {
            match self.inner.read(&mut self.buf[self.read_len ..]) {
                Ok(0) => return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "unexpected end of Exif data")),
                Ok(n) => {
                    self.read_len += n;
                    self.stream_pos += n as u64;
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
