// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Call-site convenience layer. Each macro stringifies the channel constant
//! and injects the module path and line so entries read
//! `[<CHANNEL>::<module>:<line>] <message>` without the caller spelling any
//! of it out.

/// Formatted output to a channel:
/// `log!(logger, NET, "connected in {} ms", elapsed)`.
#[macro_export]
macro_rules! log {
    ($logger:expr, $channel:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.log(
            $channel,
            format_args!(
                concat!("[", stringify!($channel), "::{}:{}] ", $fmt),
                module_path!(),
                line!()
                $(, $arg)*
            ),
        )
    };
}

/// Hex dump an object into the channel, labeled with the dumped expression.
#[macro_export]
macro_rules! hexdump {
    ($logger:expr, $channel:expr, $data:expr) => {
        $logger.hexdump(
            $channel,
            concat!("[", stringify!($channel), "::hexdump] ", stringify!($data)),
            $data,
        )
    };
}

/// Binary dump an object into the channel, labeled with the dumped
/// expression.
#[macro_export]
macro_rules! bindump {
    ($logger:expr, $channel:expr, $data:expr) => {
        $logger.bindump(
            $channel,
            concat!("[", stringify!($channel), "::bindump] ", stringify!($data)),
            $data,
        )
    };
}

/// Terminate with a stack trace, ignoring the channel mask.
#[macro_export]
macro_rules! fatal {
    ($logger:expr) => {
        $logger.fatal(format_args!(
            "[faultlog::fatal] {}:{}",
            module_path!(),
            line!()
        ))
    };
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.fatal(format_args!(
            concat!("[faultlog::fatal] {}:{} ", $fmt),
            module_path!(),
            line!()
            $(, $arg)*
        ))
    };
}

/// Terminate with a stack trace when the condition does not hold; a true
/// condition has no side effects, the message arguments are not evaluated.
#[macro_export]
macro_rules! ensure {
    ($logger:expr, $cond:expr) => {
        if !$cond {
            $logger.fatal(format_args!(
                "[faultlog::ensure] {} {}:{}",
                stringify!($cond),
                module_path!(),
                line!()
            ));
        }
    };
    ($logger:expr, $cond:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        if !$cond {
            $logger.fatal(format_args!(
                concat!("[faultlog::ensure] {} {}:{} ", $fmt),
                stringify!($cond),
                module_path!(),
                line!()
                $(, $arg)*
            ));
        }
    };
}
