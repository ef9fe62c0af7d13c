// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fixed-capacity output buffer shared by the logging surface and the crash
//! reporter. Allocated once, reused across flushes, never reallocated: the
//! crash path must be able to format a full report without touching the
//! allocator.
//!
//! The buffer has a soft capacity and a hard reserve behind it. Writes past
//! the soft capacity land in the reserve, after which a truncation marker is
//! appended and further application data is dropped until the next flush.
//! Writes that would run past the reserve as well are an engine bug (the
//! sizing contract is broken) and surface as [`EngineError::Overflow`].

use crate::error::EngineError;
use chrono::{DateTime, Local};
use nix::errno::Errno;
use std::fmt::{self, Write as _};
use std::os::fd::RawFd;

/// Soft capacity available to application data per flush cycle.
pub(crate) const BUF_CAPACITY: usize = 8192;
/// Hard-limit slack behind the soft capacity.
pub(crate) const BUF_RESERVE: usize = 64;

const TRUNCATION_MARKER: &[u8] = b"\n<output truncated>\n";
const TIMESTAMP_WIDTH: usize = 10;

pub(crate) struct OutputBuffer {
    bytes: Box<[u8]>,
    capacity: usize,
    cursor: usize,
    truncated: bool,
    overflowed: bool,
}

impl OutputBuffer {
    pub(crate) fn new() -> Self {
        Self::with_capacity(BUF_CAPACITY, BUF_RESERVE)
    }

    pub(crate) fn with_capacity(capacity: usize, reserve: usize) -> Self {
        assert!(reserve >= TRUNCATION_MARKER.len());
        Self {
            bytes: vec![0u8; capacity + reserve].into_boxed_slice(),
            capacity,
            cursor: 0,
            truncated: false,
            overflowed: false,
        }
    }

    // Data may spill into the reserve, but the truncation marker must always
    // have room left behind it.
    fn data_limit(&self) -> usize {
        self.bytes.len() - TRUNCATION_MARKER.len()
    }

    /// Format `args` at the cursor. Once the cursor has crossed the soft
    /// capacity the cycle is truncated and later appends are dropped without
    /// error; running out of reserve is fatal to the engine.
    pub(crate) fn append(&mut self, args: fmt::Arguments<'_>) -> Result<(), EngineError> {
        if self.truncated {
            return Ok(());
        }
        self.overflowed = false;
        let result = self.write_fmt(args);
        if self.overflowed {
            return Err(EngineError::Overflow);
        }
        result.map_err(|_| EngineError::Format)?;
        if self.cursor >= self.capacity {
            self.truncate_cycle();
        }
        Ok(())
    }

    /// Render a `[HH:MM:SS]` local-time stamp at the cursor. The rendered
    /// width is checked against the contract; a mismatch means the platform
    /// time formatting is not behaving and the engine cannot be trusted.
    pub(crate) fn timestamp(&mut self, now: &DateTime<Local>) -> Result<(), EngineError> {
        let before = self.cursor;
        self.append(format_args!("{}", now.format("[%H:%M:%S]")))?;
        if self.cursor - before != TIMESTAMP_WIDTH {
            return Err(EngineError::TimestampWidth);
        }
        Ok(())
    }

    /// Write exactly `cursor` bytes to `fd` and rewind for the next cycle.
    /// The cursor is reset even on failure; every caller terminates on error.
    pub(crate) fn flush(&mut self, fd: RawFd) -> Result<(), EngineError> {
        let len = self.cursor;
        let result = if len == 0 {
            Ok(())
        } else {
            // SAFETY: the range is inside the owned buffer and `fd` is the
            // caller's descriptor.
            let written = unsafe { libc::write(fd, self.bytes.as_ptr().cast(), len) };
            if written < 0 {
                Err(EngineError::Write(Errno::last()))
            } else if written as usize != len {
                Err(EngineError::ShortWrite)
            } else {
                Ok(())
            }
        };
        self.cursor = 0;
        self.truncated = false;
        result
    }

    fn truncate_cycle(&mut self) {
        let end = self.cursor + TRUNCATION_MARKER.len();
        self.bytes[self.cursor..end].copy_from_slice(TRUNCATION_MARKER);
        self.cursor = end;
        self.truncated = true;
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub(crate) fn is_truncated(&self) -> bool {
        self.truncated
    }

    #[cfg(test)]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.cursor]
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let end = match self.cursor.checked_add(s.len()) {
            Some(end) if end <= self.data_limit() => end,
            _ => {
                self.overflowed = true;
                return Err(fmt::Error);
            }
        };
        self.bytes[self.cursor..end].copy_from_slice(s.as_bytes());
        self.cursor = end;
        Ok(())
    }
}
