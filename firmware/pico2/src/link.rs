//! Serial line framing for the host command link.
//!
//! Incoming bytes are assembled into `\n`-terminated lines (a trailing `\r` is
//! dropped). Outgoing traffic is queued as [`OutLine`]s without the newline.

use core::fmt::Write;

use eyes_common::settings::{Leaf, write_prefixed};
use heapless::{String, Vec};

/// Longest incoming line kept; longer lines are reported and dropped.
pub const RX_LINE_CAPACITY: usize = 128;

/// Longest outgoing line.
pub const TX_LINE_CAPACITY: usize = 128;

/// One outgoing line, newline not included.
pub type OutLine = String<TX_LINE_CAPACITY>;

/// Why an incoming line was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum LineError {
    /// More bytes than [`RX_LINE_CAPACITY`]; carries the full length.
    Overflow(usize),
    /// The line is not valid UTF-8.
    NotUtf8,
}

/// Accumulates bytes until a newline.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8, RX_LINE_CAPACITY>,
    dropped: usize,
    complete: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            dropped: 0,
            complete: false,
        }
    }

    /// Feed one byte. Returns the finished line when `byte` is `\n`.
    ///
    /// The returned line borrows the buffer and stays valid until the next push.
    pub fn push(
        &mut self,
        byte: u8,
    ) -> Option<Result<&str, LineError>> {
        if self.complete {
            self.buf.clear();
            self.dropped = 0;
            self.complete = false;
        }

        if byte != b'\n' {
            if self.buf.push(byte).is_err() {
                self.dropped += 1;
            }
            return None;
        }

        self.complete = true;
        if self.dropped > 0 {
            return Some(Err(LineError::Overflow(self.buf.len() + self.dropped)));
        }
        let line = self.buf.strip_suffix(b"\r").unwrap_or(&self.buf[..]);
        Some(core::str::from_utf8(line).map_err(|_| LineError::NotUtf8))
    }
}

/// Queue-ready copy of a plain text line.
pub fn text_line(text: &str) -> Option<OutLine> { String::try_from(text).ok() }

/// `prefix` + `path=value` for one settings leaf.
pub fn leaf_line(
    prefix: &str,
    leaf: &Leaf,
) -> Option<OutLine> {
    let mut line = OutLine::new();
    write_prefixed(&mut line, prefix, leaf).ok()?;
    Some(line)
}

/// Write `line` and its terminator into `out` as one contiguous frame.
pub fn frame_line<const N: usize>(
    line: &str,
    out: &mut String<N>,
) -> core::fmt::Result {
    out.clear();
    out.write_str(line)?;
    out.write_char('\n')
}
