// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use symbolic_common::Name;
use symbolic_demangle::{Demangle, DemangleOptions};

/// Size of the scratch buffer handed to [`Demangler::demangle`]. Allocated
/// once per path (logging surface and crash context each own one) so the
/// fault path never allocates for demangling itself.
pub const DEMANGLE_SCRATCH: usize = 1024;

/// Per-frame outcome of a demangling attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemangleStatus {
    /// `scratch` holds the demangled form. It carries its own parameter
    /// list, so callers must not append a synthetic `()` suffix.
    Demangled,
    /// The input is not a name this capability understands; the caller keeps
    /// the mangled text verbatim. Not an error.
    NotMangled,
}

/// Failures that indicate a broken capability or an exhausted environment,
/// never a problem with an individual frame. The engine terminates on these.
#[derive(Debug, thiserror::Error)]
pub enum DemangleError {
    #[error("demangler scratch allocation failed")]
    Allocation,
    #[error("demangler rejected its arguments: {0}")]
    InvalidArgument(&'static str),
}

/// A pluggable symbol-name demangling capability.
pub trait Demangler: Send + Sync {
    /// Demangle `mangled` into `scratch`. The scratch buffer arrives empty
    /// with [`DEMANGLE_SCRATCH`] bytes of capacity preallocated;
    /// implementations must stay within it.
    fn demangle(
        &self,
        mangled: &str,
        scratch: &mut String,
    ) -> Result<DemangleStatus, DemangleError>;
}

/// Default capability backed by the `symbolic` demangler (Rust, C++ and
/// MSVC schemes).
#[derive(Debug, Default, Clone, Copy)]
pub struct SymbolicDemangler;

impl SymbolicDemangler {
    pub fn new() -> Self {
        Self
    }
}

impl Demangler for SymbolicDemangler {
    fn demangle(
        &self,
        mangled: &str,
        scratch: &mut String,
    ) -> Result<DemangleStatus, DemangleError> {
        match Name::from(mangled).demangle(DemangleOptions::complete()) {
            Some(demangled) if demangled != mangled => {
                push_bounded(scratch, &demangled);
                Ok(DemangleStatus::Demangled)
            }
            _ => Ok(DemangleStatus::NotMangled),
        }
    }
}

// Copy into the scratch buffer without growing it past its preallocated
// capacity; oversized names are cut at a character boundary.
fn push_bounded(scratch: &mut String, text: &str) {
    let capacity = scratch.capacity();
    if text.len() <= capacity {
        scratch.push_str(text);
        return;
    }
    let mut end = capacity;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    scratch.push_str(&text[..end]);
}
