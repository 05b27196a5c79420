// This file is part of the terraform-provider-civo project
//
// Copyright (C) The terraform-provider-civo contributors, 2024.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Eventually consistent deletion
//!
//! The backend acknowledges a delete request before the object is actually gone.
//! [`DeleteWaiter`] issues the delete, then polls the object until the backend
//! reports it missing, or until the timeout elapses.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout_at, Instant};

/// Observed state of an object being deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    /// The delete request has not been accepted yet
    Exists,
    /// The delete request was accepted, but the object is still visible
    Deleting,
    /// The backend reports the object missing
    Deleted,
}

impl Display for DeletePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DeletePhase::Exists => "exists",
            DeletePhase::Deleting => "deleting",
            DeletePhase::Deleted => "deleted",
        })
    }
}

/// Failure of a [`DeleteWaiter`]
#[derive(Debug, Error)]
pub enum ConvergenceError<E> {
    /// The delete request failed
    #[error("delete request failed: {0}")]
    Delete(E),
    /// An existence check failed with something else than "not found"
    #[error("checking the deletion failed: {0}")]
    Check(E),
    /// The object was still there when the timeout elapsed
    #[error("object still {phase} after {elapsed:?}")]
    Timeout {
        elapsed: Duration,
        phase: DeletePhase,
    },
}

impl<E> ConvergenceError<E> {
    /// Check if the deletion may still be in progress remotely
    pub fn is_timeout(&self) -> bool {
        matches!(self, ConvergenceError::Timeout { .. })
    }
}

/// Successful deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converged {
    /// Number of existence checks performed
    pub polls: u32,
    /// Time spent since the first delete request
    pub elapsed: Duration,
}

/// Bounded poll-until-deleted loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteWaiter {
    /// Overall time budget
    pub timeout: Duration,
    /// Wait between the accepted delete and the first existence check
    pub delay: Duration,
    /// Shortest wait between two requests
    pub min_interval: Duration,
    /// Longest wait between two requests
    pub max_interval: Duration,
}

impl Default for DeleteWaiter {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60 * 60),
            delay: Duration::from_secs(5),
            min_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(10),
        }
    }
}

impl DeleteWaiter {
    /// Create a waiter with the default delays and the given timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Delete an object and wait for the backend to report it gone
    ///
    /// # Arguments
    ///
    /// * `delete` - Issue the delete request: `Ok(true)` if accepted, `Ok(false)` to retry it later
    /// * `check` - Query the object: `Ok(_)` while it exists
    /// * `is_gone` - Tell if an error of `delete` or `check` means the object is missing
    ///
    /// # Remarks
    ///
    /// The number of existence checks is returned: when `check` first reports the object
    /// missing on its Nth call, the result has `polls == N`.
    pub async fn run<T, E, D, DF, C, CF, G>(
        &self,
        mut delete: D,
        mut check: C,
        is_gone: G,
    ) -> Result<Converged, ConvergenceError<E>>
    where
        D: FnMut() -> DF,
        DF: Future<Output = Result<bool, E>>,
        C: FnMut() -> CF,
        CF: Future<Output = Result<T, E>>,
        G: Fn(&E) -> bool,
    {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut phase = DeletePhase::Exists;
        let mut polls = 0;
        let mut interval = self.min_interval;

        loop {
            // (wait before the next request, whether the wait is a backoff step)
            let (wait, backoff) = match phase {
                DeletePhase::Exists => {
                    let result = match timeout_at(deadline, delete()).await {
                        Err(_) => return Err(self.timed_out(start, phase)),
                        Ok(result) => result,
                    };
                    match result {
                        Ok(true) => {
                            tracing::debug!("delete request accepted");
                            phase = DeletePhase::Deleting;
                            (self.delay.max(self.min_interval), false)
                        }
                        Ok(false) => {
                            tracing::debug!("delete request not accepted yet");
                            (interval, true)
                        }
                        Err(err) if is_gone(&err) => {
                            phase = DeletePhase::Deleted;
                            (Duration::ZERO, false)
                        }
                        Err(err) => return Err(ConvergenceError::Delete(err)),
                    }
                }
                DeletePhase::Deleting => {
                    polls += 1;
                    let result = match timeout_at(deadline, check()).await {
                        Err(_) => return Err(self.timed_out(start, phase)),
                        Ok(result) => result,
                    };
                    match result {
                        Ok(_) => {
                            tracing::debug!(polls, "object still visible");
                            (interval, true)
                        }
                        Err(err) if is_gone(&err) => {
                            phase = DeletePhase::Deleted;
                            (Duration::ZERO, false)
                        }
                        Err(err) => return Err(ConvergenceError::Check(err)),
                    }
                }
                DeletePhase::Deleted => (Duration::ZERO, false),
            };

            if phase == DeletePhase::Deleted {
                let elapsed = start.elapsed();
                tracing::debug!(polls, ?elapsed, "object deleted");
                return Ok(Converged { polls, elapsed });
            }

            if Instant::now() + wait > deadline {
                return Err(self.timed_out(start, phase));
            }
            sleep(wait).await;

            if backoff {
                interval = (interval * 2).min(self.max_interval).max(self.min_interval);
            }
        }
    }

    fn timed_out<E>(&self, start: Instant, phase: DeletePhase) -> ConvergenceError<E> {
        let elapsed = start.elapsed();
        tracing::warn!(?elapsed, %phase, "deletion timed out");
        ConvergenceError::Timeout { elapsed, phase }
    }
}
