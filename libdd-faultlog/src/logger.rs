// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::buffer::OutputBuffer;
use crate::config::{Config, Options};
use crate::demangler::{Demangler, DEMANGLE_SCRATCH};
use crate::dump;
use crate::error::{engine_fatal, EngineError};
use crate::fault::{self, CrashContext};
use crate::lock::TimedMutex;
use crate::stacktrace::{self, CaptureSlots, MAX_FRAMES};
use chrono::{DateTime, Local};
use nix::errno::Errno;
use parking_lot::MutexGuard;
use std::fmt;
use std::fs::OpenOptions;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

// Everything the logging surface mutates, together under the one lock.
struct LogState {
    buf: OutputBuffer,
    slots: CaptureSlots,
    scratch: String,
}

/// The process-wide diagnostic engine.
///
/// Construct exactly once with [`Logger::init`], before any logging
/// activity and from a single thread; keep the handle (or lean on the
/// macros in this crate, which take it explicitly). The logger lives for
/// the rest of the process and is never torn down.
pub struct Logger {
    mask: u64,
    options: Options,
    out: OwnedFd,
    demangler: Option<Arc<dyn Demangler>>,
    state: TimedMutex<LogState>,
}

impl Logger {
    /// Initialize the engine: select the output descriptor, install the
    /// fault handlers and the alternate stack (unless `NOSIG`), and return
    /// the owned handle.
    ///
    /// Any underlying resource failure here terminates the process with a
    /// diagnostic on stderr; there is nothing sensible to hand back from a
    /// diagnostic engine that could not set itself up.
    pub fn init(config: Config) -> Logger {
        match Logger::build(config) {
            Ok(logger) => logger,
            Err(err) => {
                eprintln!("[faultlog::panic] init failed: {err:#}");
                process::exit(libc::EXIT_FAILURE);
            }
        }
    }

    fn build(config: Config) -> anyhow::Result<Logger> {
        let Config {
            options,
            channels,
            log_path,
            demangler,
        } = config;
        // Zero means the caller wants everything.
        let mask = if channels == 0 { u64::MAX } else { channels };
        let out = open_output(options, log_path.as_deref())?;

        let logger = Logger {
            mask,
            options,
            out,
            demangler,
            state: TimedMutex::new(LogState {
                buf: OutputBuffer::new(),
                slots: [0; MAX_FRAMES],
                scratch: String::with_capacity(DEMANGLE_SCRATCH),
            }),
        };

        if !options.contains(Options::NOSIG) {
            // The fault path gets its own buffer, slots and scratch: it must
            // never contend with the path it is reporting on.
            fault::install(CrashContext {
                out: logger.out.as_raw_fd(),
                options,
                buf: OutputBuffer::new(),
                slots: [0; MAX_FRAMES],
                demangler: logger.demangler.clone(),
                scratch: String::with_capacity(DEMANGLE_SCRATCH),
            })?;
        }

        Ok(logger)
    }

    /// Append one formatted line to the channel. Silent when the channel's
    /// bit is not in the mask.
    pub fn log(&self, channel: u64, message: fmt::Arguments<'_>) {
        if self.mask & channel == 0 {
            return;
        }
        self.write_entry(|buf| {
            buf.append(message)?;
            buf.append(format_args!("\n"))
        });
    }

    /// Dump `data` as 16-byte hex rows with an ASCII gutter, preceded by a
    /// label line. Gated like [`Logger::log`].
    pub fn hexdump(&self, channel: u64, label: &str, data: &[u8]) {
        if self.mask & channel == 0 {
            return;
        }
        self.write_entry(|buf| {
            buf.append(format_args!("{label}\n"))?;
            dump::hex_rows(buf, data)
        });
    }

    /// Dump `data` as 8-byte rows of MSB-first binary groups, preceded by a
    /// label line. Gated like [`Logger::log`].
    pub fn bindump(&self, channel: u64, label: &str, data: &[u8]) {
        if self.mask & channel == 0 {
            return;
        }
        self.write_entry(|buf| {
            buf.append(format_args!("{label}\n"))?;
            dump::bin_rows(buf, data)
        });
    }

    /// Unconditional termination with context: the message, then the
    /// symbolicated stack of the calling thread, regardless of the channel
    /// mask. This is a controlled exit on the caller's own thread, so it
    /// uses the main buffer under the lock, not the crash context.
    pub fn fatal(&self, message: fmt::Arguments<'_>) -> ! {
        let (mut state, now) = self.lock();
        match self.render_fatal(&mut state, &now, message) {
            Ok(()) => process::exit(libc::EXIT_FAILURE),
            Err(err) => engine_fatal(self.out.as_raw_fd(), &err),
        }
    }

    fn render_fatal(
        &self,
        state: &mut LogState,
        now: &DateTime<Local>,
        message: fmt::Arguments<'_>,
    ) -> Result<(), EngineError> {
        let LogState {
            buf,
            slots,
            scratch,
        } = state;
        if self.options.contains(Options::TIME) {
            buf.timestamp(now)?;
            buf.append(format_args!(" "))?;
        }
        buf.append(message)?;
        buf.append(format_args!("\n"))?;
        // SAFETY: regular call path; this thread is the only one unwinding
        // itself.
        let depth = unsafe { stacktrace::capture_into(slots) };
        unsafe {
            stacktrace::symbolicate(&slots[..depth], buf, self.demangler.as_deref(), scratch)?;
        }
        buf.flush(self.out.as_raw_fd())
    }

    /// Invoke [`Logger::fatal`] when `condition` is false; otherwise do
    /// nothing at all.
    pub fn ensure(&self, condition: bool, context: fmt::Arguments<'_>) {
        if !condition {
            self.fatal(context);
        }
    }

    /// Keep the logging lock held until the returned guard drops. Exists for
    /// the starvation tests in bin_tests.
    #[cfg(feature = "test-fixtures")]
    pub fn hold_lock(&self) -> impl Drop + '_ {
        self.state.lock_unbounded()
    }

    // Shared scaffolding of the gated operations: acquire within the bound,
    // stamp, render, flush. Release is the guard drop on every return path.
    fn write_entry(&self, render: impl FnOnce(&mut OutputBuffer) -> Result<(), EngineError>) {
        let (mut state, now) = self.lock();
        if let Err(err) = self.render_entry(&mut state.buf, &now, render) {
            engine_fatal(self.out.as_raw_fd(), &err);
        }
    }

    fn render_entry(
        &self,
        buf: &mut OutputBuffer,
        now: &DateTime<Local>,
        render: impl FnOnce(&mut OutputBuffer) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        if self.options.contains(Options::TIME) {
            buf.timestamp(now)?;
            buf.append(format_args!(" "))?;
        }
        render(buf)?;
        buf.flush(self.out.as_raw_fd())
    }

    fn lock(&self) -> (MutexGuard<'_, LogState>, DateTime<Local>) {
        match self.state.lock() {
            Ok(acquired) => acquired,
            Err(err) => engine_fatal(self.out.as_raw_fd(), &err),
        }
    }
}

fn open_output(options: Options, path: Option<&Path>) -> anyhow::Result<OwnedFd> {
    let Some(path) = path else {
        let fd = unsafe { libc::dup(libc::STDERR_FILENO) };
        anyhow::ensure!(fd >= 0, "failed to duplicate stderr: {}", Errno::last());
        // SAFETY: dup handed us a fresh descriptor we now own.
        return Ok(unsafe { OwnedFd::from_raw_fd(fd) });
    };

    let path = stamped_path(options, path)?;
    let mut open_options = OpenOptions::new();
    open_options.write(true).create(true).mode(0o600);
    if options.contains(Options::TRUNCATE) {
        open_options.truncate(true);
    } else {
        open_options.append(true);
    }
    let file = open_options
        .open(&path)
        .map_err(|err| anyhow::anyhow!("failed to open log file {}: {err}", path.display()))?;
    Ok(file.into())
}

fn stamped_path(options: Options, path: &Path) -> anyhow::Result<PathBuf> {
    if !options.contains(Options::SUFFIX) {
        return Ok(path.to_path_buf());
    }
    let suffix = Local::now().format("_%Y-%m-%d_%H:%M:%S.log").to_string();
    anyhow::ensure!(suffix.len() == 24, "log suffix rendered at the wrong width");
    let stamped = format!("{}{suffix}", path.display());
    anyhow::ensure!(
        stamped.len() < libc::PATH_MAX as usize,
        "suffixed log path exceeds PATH_MAX"
    );
    Ok(PathBuf::from(stamped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_has_the_documented_shape() {
        let stamped = stamped_path(Options::SUFFIX, Path::new("/tmp/app")).unwrap();
        let name = stamped.to_str().unwrap();
        assert_eq!(name.len(), "/tmp/app".len() + 24);
        assert!(name.starts_with("/tmp/app_"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn suffix_only_applies_when_requested() {
        let stamped = stamped_path(Options::empty(), Path::new("/tmp/app")).unwrap();
        assert_eq!(stamped, PathBuf::from("/tmp/app"));
    }

    #[test]
    fn oversized_suffixed_path_is_rejected() {
        let long = "x".repeat(libc::PATH_MAX as usize);
        let result = stamped_path(Options::SUFFIX, Path::new(&long));
        assert!(result.is_err());
    }
}
