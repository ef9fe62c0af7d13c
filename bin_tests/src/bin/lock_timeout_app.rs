// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wedges the logging lock through the test-fixtures hook and then logs from
//! another thread. The expected outcome is a fatal exit after the bounded
//! acquisition gives up, never a hang.

use anyhow::Context;
use libdd_faultlog::{Config, Logger, Options};
use std::env;

fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let output = args.next().context("missing output path argument")?;

    let logger: &'static Logger = Box::leak(Box::new(Logger::init(
        Config::new(Options::NOSIG, 0).with_log_path(output.as_str()),
    )));

    let _hold = logger.hold_lock();
    let starved = std::thread::spawn(move || {
        logger.log(1, format_args!("should never appear"));
    });

    // The starved thread terminates the whole process at the bound; joining
    // it only returns if the timeout discipline is broken.
    let _ = starved.join();
    anyhow::bail!("the starved logging call came back alive")
}
