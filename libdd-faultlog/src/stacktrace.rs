// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Call-stack capture and symbolication.
//!
//! Capture records raw instruction pointers into a fixed slot array; nothing
//! on this path allocates. Symbolication resolves each address to a name,
//! runs it through the optional demangling capability and appends one frame
//! line per resolved address. Addresses without a resolvable name are
//! omitted, not reported as errors.
//!
//! SIGNAL SAFETY:
//!     Getting a backtrace on rust is not guaranteed to be signal safe.
//!     <https://github.com/rust-lang/backtrace-rs/issues/414>
//!     Collecting the frame ips appears safe; resolving them may allocate.
//!     The crash path accepts that tradeoff knowingly.

use crate::buffer::OutputBuffer;
use crate::demangler::{DemangleStatus, Demangler};
use crate::error::EngineError;
use std::ffi::c_void;

/// Depth limit of a single capture.
pub(crate) const MAX_FRAMES: usize = 32;

pub(crate) type CaptureSlots = [usize; MAX_FRAMES];

/// Record up to [`MAX_FRAMES`] return addresses of the current call chain.
///
/// # Safety
/// Callers must guarantee no concurrent unwinding of this thread's stack;
/// the crash path additionally relies on the unsynchronized variant because
/// the crashing thread may already hold arbitrary locks.
pub(crate) unsafe fn capture_into(slots: &mut CaptureSlots) -> usize {
    let mut depth = 0;
    backtrace::trace_unsynchronized(|frame| {
        if depth >= MAX_FRAMES {
            return false;
        }
        slots[depth] = frame.ip() as usize;
        depth += 1;
        true
    });
    depth
}

/// Resolve and append the captured frames as `[<n>] <name>()` lines, with
/// `n` counting down from the innermost frame.
///
/// # Safety
/// Same contract as [`capture_into`]; resolution must not race another
/// unsynchronized resolution on this thread.
pub(crate) unsafe fn symbolicate(
    slots: &[usize],
    buf: &mut OutputBuffer,
    demangler: Option<&dyn Demangler>,
    scratch: &mut String,
) -> Result<(), EngineError> {
    let depth = slots.len();
    for (index, &addr) in slots.iter().enumerate() {
        let mut outcome: Result<(), EngineError> = Ok(());
        let mut resolved = false;
        backtrace::resolve_unsynchronized(addr as *mut c_void, |symbol| {
            if resolved || outcome.is_err() {
                return;
            }
            // A symbol without a name is an unresolved frame: skip it.
            let name = match symbol.name().and_then(|name| name.as_str()) {
                Some(name) => name,
                None => return,
            };
            resolved = true;
            outcome = emit_frame(buf, depth - index, name, demangler, scratch);
        });
        outcome?;
    }
    Ok(())
}

fn emit_frame(
    buf: &mut OutputBuffer,
    number: usize,
    name: &str,
    demangler: Option<&dyn Demangler>,
    scratch: &mut String,
) -> Result<(), EngineError> {
    if let Some(demangler) = demangler {
        scratch.clear();
        if let DemangleStatus::Demangled = demangler.demangle(name, scratch)? {
            // The demangled form carries its own parameter list.
            return buf.append(format_args!("[{number}] {scratch}\n"));
        }
    }
    buf.append(format_args!("[{number}] {name}()\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demangler::{DemangleError, DEMANGLE_SCRATCH};

    struct Verbatim;
    impl Demangler for Verbatim {
        fn demangle(
            &self,
            _mangled: &str,
            _scratch: &mut String,
        ) -> Result<DemangleStatus, DemangleError> {
            Ok(DemangleStatus::NotMangled)
        }
    }

    struct Fixed;
    impl Demangler for Fixed {
        fn demangle(
            &self,
            _mangled: &str,
            scratch: &mut String,
        ) -> Result<DemangleStatus, DemangleError> {
            scratch.push_str("demo::frame(int)");
            Ok(DemangleStatus::Demangled)
        }
    }

    struct Broken;
    impl Demangler for Broken {
        fn demangle(
            &self,
            _mangled: &str,
            _scratch: &mut String,
        ) -> Result<DemangleStatus, DemangleError> {
            Err(DemangleError::Allocation)
        }
    }

    fn captured() -> (CaptureSlots, usize) {
        let mut slots = [0usize; MAX_FRAMES];
        let depth = unsafe { capture_into(&mut slots) };
        assert!(depth > 0);
        // A handful of frames keeps the rendered output well under the
        // buffer's soft capacity.
        (slots, depth.min(6))
    }

    #[test]
    fn failed_demangling_keeps_names_verbatim() {
        let (slots, depth) = captured();
        let mut buf = OutputBuffer::new();
        let mut scratch = String::with_capacity(DEMANGLE_SCRATCH);
        unsafe {
            symbolicate(&slots[..depth], &mut buf, Some(&Verbatim), &mut scratch).unwrap();
        }
        let out = std::str::from_utf8(buf.as_bytes()).unwrap();
        assert!(!out.is_empty());
        for line in out.lines() {
            assert!(line.starts_with('['));
            assert!(line.ends_with("()"));
        }
    }

    #[test]
    fn demangled_frames_drop_the_synthetic_suffix() {
        let (slots, depth) = captured();
        let mut buf = OutputBuffer::new();
        let mut scratch = String::with_capacity(DEMANGLE_SCRATCH);
        unsafe {
            symbolicate(&slots[..depth], &mut buf, Some(&Fixed), &mut scratch).unwrap();
        }
        let out = std::str::from_utf8(buf.as_bytes()).unwrap();
        assert!(out.contains("demo::frame(int)"));
        for line in out.lines() {
            assert!(!line.ends_with("()"));
        }
    }

    #[test]
    fn broken_demangler_is_fatal() {
        let (slots, depth) = captured();
        let mut buf = OutputBuffer::new();
        let mut scratch = String::with_capacity(DEMANGLE_SCRATCH);
        let result = unsafe { symbolicate(&slots[..depth], &mut buf, Some(&Broken), &mut scratch) };
        assert!(result.is_err());
    }

    #[test]
    fn frames_count_down_from_the_innermost() {
        let (slots, depth) = captured();
        let mut buf = OutputBuffer::new();
        let mut scratch = String::with_capacity(DEMANGLE_SCRATCH);
        unsafe {
            symbolicate(&slots[..depth], &mut buf, None, &mut scratch).unwrap();
        }
        let out = std::str::from_utf8(buf.as_bytes()).unwrap();
        let first = out.lines().next().unwrap();
        assert!(first.starts_with(&format!("[{depth}] ")));
    }
}
