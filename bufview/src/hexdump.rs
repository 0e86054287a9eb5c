//! Hexdump formatting of bytes.
//!
//! This is what the [`Debug`] implementations of views and slices use. The
//! [`Config::offset`] is set to the absolute offset of the view in its
//! backing buffer, so a sub-view prints the same addresses as its parent.

use std::fmt::{
    Debug,
    Display,
    Write as _,
};

const BYTES_PER_LINE: usize = 16;

pub struct Hexdump<'b> {
    bytes: &'b [u8],
    config: Config,
}

impl<'b> Hexdump<'b> {
    #[inline]
    pub fn new(bytes: &'b [u8]) -> Self {
        Self::with_config(bytes, Default::default())
    }

    #[inline]
    pub fn with_config(bytes: &'b [u8], config: Config) -> Self {
        Self { bytes, config }
    }
}

impl<'b> Display for Hexdump<'b> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = Lines::new(self.bytes, &self.config);

        if self.config.header {
            writeln!(f, "Hexdump: {} bytes", self.bytes.len())?;
        }

        if let Some(line) = lines.next() {
            write!(f, "{line}")?;
        }

        for line in lines {
            write!(f, "\n{line}")?;
        }

        if self.config.trailing_newline {
            writeln!(f)?;
        }

        Ok(())
    }
}

impl<'b> Debug for Hexdump<'b> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(
            &Hexdump::with_config(self.bytes, Config::debug(self.config.offset)),
            f,
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Address printed for the first byte.
    pub offset: usize,
    pub trailing_newline: bool,
    pub at_least_one_line: bool,
    pub header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            offset: 0,
            trailing_newline: true,
            at_least_one_line: true,
            header: true,
        }
    }
}

impl Config {
    /// Config used for [`Debug`] output: no header, no trailing newline.
    #[inline]
    pub fn debug(offset: usize) -> Self {
        Self {
            offset,
            trailing_newline: false,
            at_least_one_line: false,
            header: false,
        }
    }
}

struct Lines<'b> {
    chunks: std::slice::Chunks<'b, u8>,
    pad_offset_to: usize,
    offset: usize,
    emit_empty_line: bool,
}

impl<'b> Lines<'b> {
    fn new(bytes: &'b [u8], config: &Config) -> Self {
        let pad_offset_to = std::cmp::max(num_hex_digits(config.offset + bytes.len()), 4);
        Self {
            chunks: bytes.chunks(BYTES_PER_LINE),
            pad_offset_to,
            offset: config.offset,
            emit_empty_line: config.at_least_one_line,
        }
    }
}

impl<'b> Iterator for Lines<'b> {
    type Item = Line<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes: &'b [u8] = match self.chunks.next() {
            Some(bytes) => bytes,
            None if self.emit_empty_line => &[],
            None => return None,
        };
        self.emit_empty_line = false;

        let offset = self.offset;
        self.offset += bytes.len();

        Some(Line {
            bytes,
            offset,
            pad_offset_to: self.pad_offset_to,
        })
    }
}

struct Line<'b> {
    bytes: &'b [u8],
    offset: usize,
    pad_offset_to: usize,
}

impl<'b> Display for Line<'b> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // print offset
        for _ in num_hex_digits(self.offset)..self.pad_offset_to {
            write!(f, "0")?;
        }
        write!(f, "{:x} ", self.offset)?;

        if !self.bytes.is_empty() {
            // print bytes
            for b in self.bytes {
                write!(f, " {b:02x}")?;
            }

            // pad bytes
            for _ in self.bytes.len()..BYTES_PER_LINE {
                write!(f, "   ")?;
            }
            write!(f, "  ")?;

            // print chars
            for b in self.bytes {
                if b.is_ascii() && !b.is_ascii_control() {
                    f.write_char((*b).into())?;
                }
                else {
                    write!(f, ".")?;
                }
            }
        }

        Ok(())
    }
}

fn num_hex_digits(mut num: usize) -> usize {
    if num == 0 {
        1
    }
    else {
        let mut d = 0usize;
        while num != 0 {
            d += 1;
            num >>= 4;
        }
        d
    }
}
