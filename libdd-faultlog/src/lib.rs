// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! This crate implements a process-wide diagnostic logger that doubles as an
//! in-process crash reporter.
//!
//! Architecturally, it consists of two paths sharing one output descriptor:
//! 1. The logging surface: channel-gated `log`/`hexdump`/`bindump` calls and
//!    the unconditional `fatal`/`ensure` terminators. Every call serializes
//!    through a single mutex with a bounded (5 second) acquisition: a logger
//!    that can hang the program it instruments is worse than one that exits
//!    loudly, so a timed-out acquisition terminates the process.
//! 2. A signal handler, which catches the fatal UNIX signals (SIGSEGV,
//!    SIGBUS, SIGABRT, ...) on a pre-allocated alternate stack, symbolicates
//!    the call stack of the crashing thread, and writes the report before the
//!    process dies. The handler runs under a constrained environment where
//!    many standard operations are illegal.
//!    <https://man7.org/linux/man-pages/man7/signal-safety.7.html>
//!    It therefore never takes the logging mutex (the crashing thread may
//!    already hold it) and writes only into a dedicated crash buffer that was
//!    allocated at initialization. Symbol resolution and demangling are not
//!    guaranteed to be async-signal safe on every platform; that residual
//!    risk is accepted because a crash report without names is close to
//!    worthless, and is a known limitation rather than a bug.
//!
//! Initialization returns an owned [`Logger`] handle instead of mutating
//! ambient globals; the only process-global state is the crash context the
//! signal handler reads, published once through an atomic pointer.
#![cfg(unix)]

mod buffer;
mod config;
mod demangler;
mod dump;
mod error;
mod fault;
mod lock;
mod logger;
mod macros;
mod stacktrace;

pub use config::{Config, Options};
pub use demangler::{
    DemangleError, DemangleStatus, Demangler, SymbolicDemangler, DEMANGLE_SCRATCH,
};
pub use fault::SignalName;
pub use logger::Logger;
