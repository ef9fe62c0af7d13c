// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::demangler::Demangler;
use std::path::PathBuf;
use std::sync::Arc;

bitflags::bitflags! {
    /// Behavior toggles fixed at initialization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Options: u32 {
        /// Prefix every entry with a `[HH:MM:SS]` local-time stamp.
        const TIME = 1 << 0;
        /// Truncate an existing log file instead of appending to it.
        const TRUNCATE = 1 << 1;
        /// Stamp the log file name with the date and time of initialization,
        /// as `<path>_<YYYY-MM-DD>_<HH:MM:SS>.log`.
        const SUFFIX = 1 << 2;
        /// Leave the fault-signal dispositions untouched.
        const NOSIG = 1 << 3;
        /// After reporting a fault, re-raise it against the default
        /// disposition to obtain a platform core dump.
        const CORE = 1 << 4;
    }
}

/// Initialization parameters for [`crate::Logger`].
///
/// Channels are caller-defined bits in a 64-bit enablement mask; a mask of
/// zero enables every channel. Without a log path, output goes to stderr.
pub struct Config {
    pub(crate) options: Options,
    pub(crate) channels: u64,
    pub(crate) log_path: Option<PathBuf>,
    pub(crate) demangler: Option<Arc<dyn Demangler>>,
}

impl Config {
    pub fn new(options: Options, channels: u64) -> Self {
        Self {
            options,
            channels,
            log_path: None,
            demangler: None,
        }
    }

    /// Log to a file instead of stderr, opened create/append (mode 0600).
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Register a name-demangling capability applied to every symbolicated
    /// stack frame.
    pub fn with_demangler(mut self, demangler: Arc<dyn Demangler>) -> Self {
        self.demangler = Some(demangler);
        self
    }
}
