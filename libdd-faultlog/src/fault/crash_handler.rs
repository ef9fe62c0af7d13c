// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

// Note that this file runs inside a signal handler and limits itself to the
// following async-signal safe functions, plus the documented symbolication
// and timestamp tradeoff.
// <https://man7.org/linux/man-pages/man7/signal-safety.7.html>
// - _exit
// - raise
// - sigaction
// - write

use super::sig_info::{ErrnoName, SignalName};
use super::signal_handler_manager::reset_fatal_dispositions;
use crate::buffer::OutputBuffer;
use crate::config::Options;
use crate::demangler::Demangler;
use crate::error::EngineError;
use crate::stacktrace::{self, CaptureSlots};
use chrono::Local;
use libc::{c_int, c_void, siginfo_t};
use std::os::fd::RawFd;
use std::ptr;
use std::sync::atomic::AtomicPtr;
use std::sync::atomic::Ordering::SeqCst;

/// Everything the fault path is allowed to touch. The handler gets this
/// struct and nothing else: no logging mutex, no main buffer, no engine
/// handle. Both buffers and the scratch string are allocated at
/// initialization; nothing here allocates at fault time apart from the
/// symbolication internals the crate-level docs call out.
pub(crate) struct CrashContext {
    pub(crate) out: RawFd,
    pub(crate) options: Options,
    pub(crate) buf: OutputBuffer,
    pub(crate) slots: CaptureSlots,
    pub(crate) demangler: Option<std::sync::Arc<dyn Demangler>>,
    pub(crate) scratch: String,
}

// Mutexes are off limits inside a signal handler, so the context is shared
// through an atomic pointer. The value is always either null or
// `Box::into_raw` of a live context.
static CRASH_CONTEXT: AtomicPtr<CrashContext> = AtomicPtr::new(ptr::null_mut());

pub(crate) fn publish(ctx: CrashContext) {
    let old = CRASH_CONTEXT.swap(Box::into_raw(Box::new(ctx)), SeqCst);
    if !old.is_null() {
        // SAFETY: non-null values in the cell only come from Box::into_raw
        // above.
        unsafe { drop(Box::from_raw(old)) };
    }
}

/// One-shot fault reporter.
///
/// The first faulting thread claims the context by swapping the pointer to
/// null; a second concurrent fault (or a fault racing initialization) finds
/// it empty and exits immediately without a report. Concurrent faults are
/// serialized by dropping the loser, not by blocking it.
pub(crate) extern "C" fn handle_fatal_signal(
    signum: c_int,
    info: *mut siginfo_t,
    _ucontext: *mut c_void,
) {
    // SAFETY: restoring dispositions on entry makes the handler strictly
    // one-shot; a repeat fault from here on takes the default action.
    unsafe { reset_fatal_dispositions() };

    let ctx = CRASH_CONTEXT.swap(ptr::null_mut(), SeqCst);
    if ctx.is_null() {
        // SAFETY: _exit is async-signal safe.
        unsafe { libc::_exit(libc::EXIT_FAILURE) };
    }

    // SAFETY: the pointer came from publish() and this thread just took
    // sole ownership of it via the swap.
    let ctx = unsafe { &mut *ctx };

    if report(ctx, signum, info).is_err() {
        const MSG: &[u8] = b"[faultlog::panic] crash report failed\n";
        // SAFETY: stderr stays open for the life of the process.
        unsafe { libc::write(libc::STDERR_FILENO, MSG.as_ptr().cast(), MSG.len()) };
    }

    if ctx.options.contains(Options::CORE) {
        // The default disposition is already restored; the re-raised signal
        // is delivered once the handler returns and the blocked set clears,
        // producing the platform core dump.
        // SAFETY: raise is async-signal safe.
        unsafe { libc::raise(signum) };
    } else {
        // SAFETY: _exit is async-signal safe.
        unsafe { libc::_exit(libc::EXIT_FAILURE) };
    }
}

fn report(
    ctx: &mut CrashContext,
    signum: c_int,
    info: *const siginfo_t,
) -> Result<(), EngineError> {
    // SAFETY: only instruction pointers are recorded; no allocation.
    let depth = unsafe { stacktrace::capture_into(&mut ctx.slots) };

    if ctx.options.contains(Options::TIME) {
        ctx.buf.timestamp(&Local::now())?;
        ctx.buf.append(format_args!(" "))?;
    }

    let si_errno = if info.is_null() {
        0
    } else {
        // SAFETY: the kernel hands the handler a valid siginfo pointer.
        unsafe { (*info).si_errno }
    };
    ctx.buf.append(format_args!(
        "[{}] {}\n\n",
        SignalName::from(signum).as_str(),
        ErrnoName(si_errno)
    ))?;

    // SAFETY: this thread owns the slots; the crashing thread is the only
    // one unwinding itself.
    unsafe {
        stacktrace::symbolicate(
            &ctx.slots[..depth],
            &mut ctx.buf,
            ctx.demangler.as_deref(),
            &mut ctx.scratch,
        )?;
    }

    ctx.buf.flush(ctx.out)
}
