//! Job state polling
//!
//! Both waits are a plain loop: wait one interval, fetch the job, check the
//! state. The creation wait runs that loop under a deadline; when the
//! deadline fires the loop future is dropped, so no poll can run afterwards
//! and only one outcome is ever produced.

use kiln_core::TaskState;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::JobOrchestrator;
use crate::api::MachineApi;
use crate::error::{ClientError, Result};

impl<A> JobOrchestrator<A>
where
    A: MachineApi + ?Sized + 'static,
{
    /// Wait until the machine reports the job as `created`
    ///
    /// Polls every `create_interval` until `create_timeout` elapses, then
    /// fails with [`ClientError::Timeout`]. Failed polls are logged and
    /// ignored; only the deadline ends the wait with an error.
    pub async fn wait_created(&self, job_id: &str) -> Result<()> {
        let timeout = self.poll.create_timeout;
        let deadline = Instant::now() + timeout;
        let mut ticker = poll_ticker(self.poll.create_interval);

        let polling = async {
            let mut polls = 0u32;
            loop {
                ticker.tick().await;
                polls += 1;

                match self.api.job_info(job_id).await {
                    Ok(info) if info.state == TaskState::Created => return polls,
                    Ok(info) => {
                        debug!(job_id, poll = polls, state = %info.state, "Job not created yet");
                    }
                    Err(e) => {
                        warn!(job_id, poll = polls, error = %e, "Creation poll failed, retrying");
                    }
                }
            }
        };

        match time::timeout_at(deadline, polling).await {
            Ok(polls) => {
                info!(job_id, polls, "Job created");
                Ok(())
            }
            Err(_) => {
                warn!(job_id, waited = ?timeout, "Gave up waiting for job creation");
                Err(ClientError::Timeout {
                    job_id: job_id.to_string(),
                    waited: timeout,
                })
            }
        }
    }

    /// Wait until the job reaches `done`, `error` or `cancelled`
    ///
    /// Polls every `done_interval` with no deadline and returns the terminal
    /// state. A failed poll ends the wait with that error.
    pub async fn wait_done(&self, job_id: &str) -> Result<TaskState> {
        let mut ticker = poll_ticker(self.poll.done_interval);
        let mut furthest: Option<TaskState> = None;

        loop {
            ticker.tick().await;

            let state = self.api.job_info(job_id).await?.state;
            if state.is_terminal() {
                info!(job_id, state = %state, "Job finished");
                return Ok(state);
            }

            match furthest {
                Some(previous) if state.rank() < previous.rank() => {
                    warn!(
                        job_id,
                        state = %state,
                        previous = %previous,
                        "Job reported an earlier state than before"
                    );
                }
                _ => furthest = Some(state),
            }

            debug!(job_id, state = %state, "Job still in progress");
        }
    }
}

/// Ticker whose first tick is one full period from now
fn poll_ticker(period: std::time::Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
