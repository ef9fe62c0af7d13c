// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Minimal usage walkthrough: channels, the macro layer and a hexdump, all
//! on stderr. Doubles as a smoke binary for the integration tests.

use libdd_faultlog::{hexdump, log, Config, Logger, Options};

const FOO: u64 = 1 << 0;
const BAR: u64 = 1 << 1;
const BAZ: u64 = 1 << 2;

fn main() {
    let logger = Logger::init(Config::new(Options::TIME, FOO | BAZ));

    log!(logger, FOO, "these messages only appear in debug configuration");
    log!(logger, BAR, "channel for this message is disabled so it never appears");
    log!(logger, BAZ, "baz");

    let x: u32 = 0xdeadbeef;
    hexdump!(logger, FOO, &x.to_le_bytes());
}
