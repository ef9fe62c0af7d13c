// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::demangler::DemangleError;
use nix::errno::Errno;
use std::os::fd::RawFd;
use std::process;

/// Failures of the engine itself. None of these are recoverable: every one of
/// them means the diagnostic machinery is broken or the environment is
/// exhausted, and the only correct reaction is [`engine_fatal`].
#[derive(Debug, thiserror::Error)]
pub(crate) enum EngineError {
    #[error("message formatting failed")]
    Format,
    #[error("output buffer overflow detected")]
    Overflow,
    #[error("timestamp rendered at the wrong width")]
    TimestampWidth,
    #[error("write to the output descriptor failed: {0}")]
    Write(Errno),
    #[error("short write to the output descriptor")]
    ShortWrite,
    #[error("locking timed out")]
    LockTimeout,
    #[error(transparent)]
    Demangle(#[from] DemangleError),
}

/// Terminate with a diagnostic on the configured descriptor, falling back to
/// stderr if that write fails. No retry, no unwinding: a diagnostic engine
/// that masks its own failure reports nothing trustworthy afterwards.
pub(crate) fn engine_fatal(fd: RawFd, err: &EngineError) -> ! {
    let line = format!("[faultlog::panic] {err}\n");
    // SAFETY: `fd` is the logger's owned descriptor; the buffer is live for
    // the duration of the call.
    let written = unsafe { libc::write(fd, line.as_ptr().cast(), line.len()) };
    if written != line.len() as isize && fd != libc::STDERR_FILENO {
        // SAFETY: stderr stays open for the life of the process.
        let _ = unsafe { libc::write(libc::STDERR_FILENO, line.as_ptr().cast(), line.len()) };
    }
    process::exit(libc::EXIT_FAILURE)
}
