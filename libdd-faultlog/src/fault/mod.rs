// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The fault path: signal-handler installation and the restricted context it
//! is allowed to touch. Everything else in the crate is off limits from a
//! handler.

mod crash_handler;
mod sig_info;
mod signal_handler_manager;

pub use sig_info::SignalName;

pub(crate) use crash_handler::CrashContext;
pub(crate) use signal_handler_manager::install;
