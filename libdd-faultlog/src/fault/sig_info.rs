// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use nix::errno::Errno;
use std::fmt;

/// Human-readable names for the fatal-signal set.
/// See <https://man7.org/linux/man-pages/man7/signal.7.html>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum SignalName {
    SIGABRT,
    SIGBUS,
    SIGFPE,
    SIGILL,
    SIGSEGV,
    SIGSYS,
    SIGTRAP,
    UNKNOWN,
}

impl From<libc::c_int> for SignalName {
    fn from(value: libc::c_int) -> Self {
        match value {
            // SIGIOT is an alias of SIGABRT on every supported target.
            libc::SIGABRT => SignalName::SIGABRT,
            libc::SIGBUS => SignalName::SIGBUS,
            libc::SIGFPE => SignalName::SIGFPE,
            libc::SIGILL => SignalName::SIGILL,
            libc::SIGSEGV => SignalName::SIGSEGV,
            libc::SIGSYS => SignalName::SIGSYS,
            libc::SIGTRAP => SignalName::SIGTRAP,
            _ => SignalName::UNKNOWN,
        }
    }
}

impl SignalName {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalName::SIGABRT => "SIGABRT",
            SignalName::SIGBUS => "SIGBUS",
            SignalName::SIGFPE => "SIGFPE",
            SignalName::SIGILL => "SIGILL",
            SignalName::SIGSEGV => "SIGSEGV",
            SignalName::SIGSYS => "SIGSYS",
            SignalName::SIGTRAP => "SIGTRAP",
            SignalName::UNKNOWN => "UNKNOWN",
        }
    }
}

/// Formats a raw `si_errno` as its errno name, or `unknown` when the value
/// does not map to one. Display-only so the crash path can render it
/// without allocating.
pub(crate) struct ErrnoName(pub(crate) libc::c_int);

impl fmt::Display for ErrnoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errno = Errno::from_raw(self.0);
        if errno == Errno::UnknownErrno {
            f.write_str("unknown")
        } else {
            write!(f, "{errno:?}")
        }
    }
}
