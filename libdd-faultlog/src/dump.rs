// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Row renderers for the hex and binary dump operations. Pure functions over
//! the output buffer; gating, locking and flushing stay with the logger.

use crate::buffer::OutputBuffer;
use crate::error::EngineError;
use std::str;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

// "xx " per byte, at most 8 bytes per group.
fn hex_group(bytes: &[u8]) -> ([u8; 24], usize) {
    let mut out = [0u8; 24];
    let mut len = 0;
    for &byte in bytes {
        out[len] = HEX_DIGITS[(byte >> 4) as usize];
        out[len + 1] = HEX_DIGITS[(byte & 0xf) as usize];
        out[len + 2] = b' ';
        len += 3;
    }
    (out, len)
}

fn printable(byte: u8) -> u8 {
    if byte > 0x1f && byte < 0x7f {
        byte
    } else {
        b'.'
    }
}

/// 16 bytes per row: offset, two 8-byte hex groups, ASCII gutter.
pub(crate) fn hex_rows(buf: &mut OutputBuffer, data: &[u8]) -> Result<(), EngineError> {
    for (index, row) in data.chunks(16).enumerate() {
        let (head, tail) = row.split_at(row.len().min(8));
        let (left, left_len) = hex_group(head);
        let (right, right_len) = hex_group(tail);

        let mut gutter = [0u8; 16];
        for (i, &byte) in row.iter().enumerate() {
            gutter[i] = printable(byte);
        }

        let left = str::from_utf8(&left[..left_len]).map_err(|_| EngineError::Format)?;
        let right = str::from_utf8(&right[..right_len]).map_err(|_| EngineError::Format)?;
        let gutter = str::from_utf8(&gutter[..row.len()]).map_err(|_| EngineError::Format)?;
        buf.append(format_args!(
            "{:8}  {:<24} {:<24} |{:<16}|\n",
            index * 16,
            left,
            right,
            gutter
        ))?;
    }
    Ok(())
}

/// 8 bytes per row: offset, then each byte as an 8-bit group, most
/// significant bit first.
pub(crate) fn bin_rows(buf: &mut OutputBuffer, data: &[u8]) -> Result<(), EngineError> {
    for (index, row) in data.chunks(8).enumerate() {
        buf.append(format_args!("{:8}   ", index * 8))?;
        for &byte in row {
            buf.append(format_args!("{byte:08b} "))?;
        }
        buf.append(format_args!("\n"))?;
    }
    Ok(())
}
