// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::EngineError;
use chrono::{DateTime, Local};
use parking_lot::{Mutex, MutexGuard};
use std::time::Duration;

/// Upper bound on any lock acquisition. Contention past this point means a
/// logging call is wedged behind a stuck writer, which the engine treats as
/// unrecoverable.
pub(crate) const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Mutex with a bounded acquisition. A successful `lock` also returns the
/// wall-clock time at acquisition, which the caller reuses as the entry
/// timestamp; the clock is read exactly once per logging call.
pub(crate) struct TimedMutex<T> {
    inner: Mutex<T>,
    timeout: Duration,
}

impl<T> TimedMutex<T> {
    pub(crate) fn new(value: T) -> Self {
        Self::with_timeout(value, LOCK_TIMEOUT)
    }

    pub(crate) fn with_timeout(value: T, timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(value),
            timeout,
        }
    }

    pub(crate) fn lock(&self) -> Result<(MutexGuard<'_, T>, DateTime<Local>), EngineError> {
        let guard = self
            .inner
            .try_lock_for(self.timeout)
            .ok_or(EngineError::LockTimeout)?;
        Ok((guard, Local::now()))
    }

    #[cfg(feature = "test-fixtures")]
    pub(crate) fn lock_unbounded(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }
}
