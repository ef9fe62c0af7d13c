// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Initializes the engine and then dies from a real fault, so the
//! integration tests can assert on the crash report and the exit status.

use anyhow::Context;
use libdd_faultlog::{log, Config, Logger, Options, SymbolicDemangler};
use std::env;
use std::sync::Arc;

const BOOT: u64 = 1 << 0;

#[inline(never)]
unsafe fn deref_ptr(p: *mut u8) {
    *std::hint::black_box(p) = std::hint::black_box(1);
}

fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let output = args.next().context("missing output path argument")?;
    let mode = args.next().context("missing mode argument")?;

    // No TIME here: the report should need nothing but capture, resolve and
    // write once the handler is running.
    let logger = Logger::init(
        Config::new(Options::empty(), 0)
            .with_log_path(output.as_str())
            .with_demangler(Arc::new(SymbolicDemangler::new())),
    );
    log!(logger, BOOT, "running in {} mode", mode);

    match mode.as_str() {
        "segv" => unsafe { deref_ptr(std::ptr::null_mut()) },
        "abort" => std::process::abort(),
        other => anyhow::bail!("unknown mode {other}"),
    }
    Ok(())
}
