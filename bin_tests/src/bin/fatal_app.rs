// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Exercises the controlled termination surface: `fatal!` and `ensure!`.
//! Runs with NOSIG, the fault handlers play no part in these paths.

use anyhow::Context;
use libdd_faultlog::{ensure, fatal, log, Config, Logger, Options};
use std::env;

const APP: u64 = 1 << 0;

fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let output = args.next().context("missing output path argument")?;
    let mode = args.next().context("missing mode argument")?;

    // The masked mode enables a single unused channel so nothing gated can
    // reach the descriptor; fatal must report anyway.
    let channels = if mode == "masked-fatal" { 1 << 63 } else { 0 };
    let logger = Logger::init(
        Config::new(Options::TIME | Options::NOSIG, channels).with_log_path(output.as_str()),
    );

    match mode.as_str() {
        "fatal" => {
            log!(logger, APP, "about to fail");
            fatal!(logger, "fatal mode requested: {}", 42);
        }
        "ensure-fail" => {
            let answer = 41;
            ensure!(logger, answer == 42, "bad answer {}", answer);
            unreachable!("a failed ensure never returns");
        }
        "ensure-pass" => {
            ensure!(logger, 1 + 1 == 2);
            log!(logger, APP, "survived the check");
        }
        "masked-fatal" => {
            log!(logger, APP, "this line is gated away");
            fatal!(logger, "fatal ignores the channel mask");
        }
        other => anyhow::bail!("unknown mode {other}"),
    }
    Ok(())
}
