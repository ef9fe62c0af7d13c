// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::crash_handler::{self, CrashContext};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::ptr;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::SeqCst;

/// The fatal-signal set the engine claims. SIGIOT aliases SIGABRT on every
/// supported target, so SIGABRT covers both.
pub(crate) const FATAL_SIGNALS: [Signal; 7] = [
    Signal::SIGABRT,
    Signal::SIGBUS,
    Signal::SIGFPE,
    Signal::SIGILL,
    Signal::SIGSEGV,
    Signal::SIGSYS,
    Signal::SIGTRAP,
];

static INIT_STARTED: AtomicBool = AtomicBool::new(false);

/// Registers the fault handlers and the alternate stack, and publishes the
/// crash context they report through.
///
/// PRECONDITIONS:
///     Called once, from a single thread, before any logging activity.
/// SAFETY:
///     The handler only ever touches the published crash context; a fault
///     delivered while this function is mid-flight lands on whatever
///     disposition the platform had before.
pub(crate) fn install(ctx: CrashContext) -> anyhow::Result<()> {
    anyhow::ensure!(
        INIT_STARTED
            .compare_exchange(false, true, SeqCst, SeqCst)
            .is_ok(),
        "attempted to double install fault handlers"
    );

    // SAFETY: no concurrent sigaltstack manipulation can exist before init.
    unsafe { create_alt_stack()? };

    crash_handler::publish(ctx);

    // Block the whole fatal set while the handler runs; a second, different
    // fatal condition mid-report would otherwise re-enter it.
    let mut handler_mask = SigSet::empty();
    for signal in FATAL_SIGNALS {
        handler_mask.add(signal);
    }
    let action = SigAction::new(
        SigHandler::SigAction(crash_handler::handle_fatal_signal),
        SaFlags::SA_ONSTACK,
        handler_mask,
    );
    for signal in FATAL_SIGNALS {
        // SAFETY: the handler restricts itself to async-signal-safe calls
        // plus the documented symbolication tradeoff.
        unsafe { signal::sigaction(signal, &action)? };
    }
    Ok(())
}

/// Put the whole fatal set back on its default disposition. First thing the
/// handler does: a repeat fault after that takes the default action instead
/// of re-entering the report.
pub(crate) unsafe fn reset_fatal_dispositions() {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    for signal in FATAL_SIGNALS {
        let _ = signal::sigaction(signal, &default);
    }
}

/// Allocates the signal altstack, with a guard page below it.
/// Inspired by <https://github.com/rust-lang/rust/pull/69969/files>
unsafe fn create_alt_stack() -> anyhow::Result<()> {
    // The default SIGSTKSZ (8KB on common targets) is not enough for
    // symbolication; 16 pages is.
    let page_size = page_size::get();
    let stack_size = std::cmp::max(libc::SIGSTKSZ, 16 * page_size);
    let stackp = libc::mmap(
        ptr::null_mut(),
        stack_size + page_size,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANON,
        -1,
        0,
    );
    anyhow::ensure!(
        stackp != libc::MAP_FAILED,
        "failed to allocate the alternate stack"
    );
    let guard_result = libc::mprotect(stackp, page_size, libc::PROT_NONE);
    anyhow::ensure!(
        guard_result == 0,
        "failed to set up the alternate stack guard page"
    );
    let stackp = stackp.add(page_size);

    let stack = libc::stack_t {
        ss_sp: stackp,
        ss_flags: 0,
        ss_size: stack_size,
    };
    let rval = libc::sigaltstack(&stack, ptr::null_mut());
    anyhow::ensure!(rval == 0, "sigaltstack failed {rval}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_set_has_no_aliases() {
        let mut numbers: Vec<i32> = FATAL_SIGNALS.iter().map(|s| *s as i32).collect();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), FATAL_SIGNALS.len());
    }
}
