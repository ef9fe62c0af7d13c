// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! End-to-end coverage of the logging surface against a real descriptor.
//! Everything here initializes with NOSIG: fault-handler installation is
//! process-global and once-only, and the terminating paths are exercised by
//! the bin_tests member instead.

use libdd_faultlog::{Config, Logger, Options};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CH_A: u64 = 1 << 0;
const CH_B: u64 = 1 << 1;

fn log_file(dir: &TempDir) -> PathBuf {
    dir.path().join("out.log")
}

#[test]
fn log_line_matches_the_documented_shape() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let logger = Logger::init(
        Config::new(Options::TIME | Options::NOSIG, 0).with_log_path(&path),
    );

    logger.log(CH_A, format_args!("hello {}", 5));

    let content = fs::read_to_string(&path).unwrap();
    // [HH:MM:SS] hello 5
    assert_eq!(content.len(), "[00:00:00] hello 5\n".len());
    let bytes = content.as_bytes();
    assert_eq!(bytes[0], b'[');
    assert_eq!(bytes[9], b']');
    assert_eq!(bytes[3], b':');
    assert_eq!(bytes[6], b':');
    for i in [1, 2, 4, 5, 7, 8] {
        assert!(bytes[i].is_ascii_digit());
    }
    assert!(content.ends_with("] hello 5\n"));
}

#[test]
fn disabled_channels_write_nothing() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let logger = Logger::init(Config::new(Options::NOSIG, CH_A).with_log_path(&path));

    logger.log(CH_B, format_args!("silent"));
    logger.hexdump(CH_B, "silent", b"abc");
    logger.bindump(CH_B, "silent", b"abc");
    assert_eq!(fs::read_to_string(&path).unwrap(), "");

    logger.log(CH_A, format_args!("audible"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "audible\n");
}

#[test]
fn zero_mask_enables_every_channel() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let logger = Logger::init(Config::new(Options::NOSIG, 0).with_log_path(&path));

    logger.log(1 << 63, format_args!("high bit"));
    logger.log(1 << 17, format_args!("middle bit"));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "high bit\nmiddle bit\n");
}

#[test]
fn hexdump_renders_label_and_rows() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let logger = Logger::init(Config::new(Options::NOSIG, 0).with_log_path(&path));

    let word: u32 = 0xdeadbeef;
    logger.hexdump(CH_A, "[CH_A::hexdump] word", &word.to_le_bytes());

    let content = fs::read_to_string(&path).unwrap();
    let expected_row = format!(
        "{:8}  {:<24} {:<24} |{:<16}|\n",
        0, "ef be ad de ", "", "...."
    );
    assert_eq!(content, format!("[CH_A::hexdump] word\n{expected_row}"));
}

#[test]
fn bindump_renders_label_and_rows() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let logger = Logger::init(Config::new(Options::NOSIG, 0).with_log_path(&path));

    logger.bindump(CH_A, "[CH_A::bindump] bytes", &[0b1010_1010, 0xff]);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "[CH_A::bindump] bytes\n       0   10101010 11111111 \n");
}

#[test]
fn suffix_stamps_the_file_name() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("app");
    let logger = Logger::init(
        Config::new(Options::SUFFIX | Options::NOSIG, 0).with_log_path(&prefix),
    );
    logger.log(CH_A, format_args!("stamped"));

    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    let name = &entries[0];
    assert!(name.starts_with("app_"));
    assert!(name.ends_with(".log"));
    assert_eq!(name.len(), "app".len() + 24);
}

#[test]
fn truncate_clears_previous_content() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    fs::write(&path, "stale content\n").unwrap();

    let _logger = Logger::init(
        Config::new(Options::TRUNCATE | Options::NOSIG, 0).with_log_path(&path),
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn append_is_the_default_open_mode() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    fs::write(&path, "kept content\n").unwrap();

    let logger = Logger::init(Config::new(Options::NOSIG, 0).with_log_path(&path));
    logger.log(CH_A, format_args!("appended"));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "kept content\nappended\n"
    );
}

#[test]
fn macro_layer_injects_channel_and_call_site() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let logger = Logger::init(Config::new(Options::NOSIG, 0).with_log_path(&path));

    libdd_faultlog::log!(logger, CH_A, "payload {}", 7);
    libdd_faultlog::hexdump!(logger, CH_A, b"ab");

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    let log_line = lines.next().unwrap();
    assert!(log_line.starts_with("[CH_A::logging:"));
    assert!(log_line.ends_with("] payload 7"));
    let dump_label = lines.next().unwrap();
    assert_eq!(dump_label, "[CH_A::hexdump] b\"ab\"");
}
