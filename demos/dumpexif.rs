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

use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use exifblob::{Section, ValueType};

// Dumps a raw Exif blob, as saved from a JPEG APP1 segment (with or
// without the "Exif\0\0" prefix) or a WebP EXIF chunk.
// Set RUST_LOG=debug to see the skipped directories and entries.
fn main() {
    env_logger::init();
    for path in env::args_os().skip(1).map(PathBuf::from) {
        if let Err(e) = dump_file(&path) {
            println!("{}: {}", path.display(), e);
        }
    }
}

fn dump_file(path: &Path) -> Result<(), exifblob::Error> {
    let data = fs::read(path)?;
    let blob = data.strip_prefix(b"Exif\0\0").unwrap_or(&data);
    let values = exifblob::read_raw(blob);

    println!("{}: {} values", path.display(), values.len());
    for &section in &[Section::Image, Section::Exif,
                      Section::Gps, Section::Interop] {
        for (tag, value) in values.section(section) {
            println!("  {}/{}: {}", section, tag, value);
            if value.typ() == ValueType::Ascii {
                println!("      Ascii(\"{}\")", escape(value.data()));
            } else {
                println!("      {:?}", value.typ());
            }
        }
    }
    Ok(())
}

fn escape(bytes: &[u8]) -> String {
    let mut buf = String::new();
    for &c in bytes {
        // Writing to a String never fails.
        let _ = match c {
            b'\\' | b'"' => write!(buf, "\\{}", c as char),
            0x20..=0x7e => buf.write_char(c as char),
            _ => write!(buf, "\\x{:02x}", c),
        };
    }
    buf
}
