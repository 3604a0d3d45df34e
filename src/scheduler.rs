// src/scheduler.rs
//! Staggered scheduling of outbound calls.
//!
//! Each candidate gets a one-shot job offset a fixed number of seconds from
//! the previous one, so the vendor never receives a burst of simultaneous
//! call requests.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::core::{Candidate, CandidateRepository};
use crate::lifecycle::{run_call, CallContext};

pub struct CallScheduler {
    scheduler: JobScheduler,
    ctx: CallContext,
}

impl CallScheduler {
    pub async fn start(ctx: CallContext) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        scheduler
            .start()
            .await
            .context("Failed to start job scheduler")?;

        Ok(Self { scheduler, ctx })
    }

    /// Schedule one-shot call jobs for a batch of candidates, staggered by
    /// the configured interval. Returns the number of jobs scheduled.
    pub async fn schedule_batch(&self, candidates: Vec<Candidate>) -> Result<usize> {
        let stagger = self.ctx.timing.call_stagger_secs;
        let repo = CandidateRepository::new(self.ctx.db.pool());
        let mut scheduled = 0usize;

        for (index, candidate) in candidates.into_iter().enumerate() {
            let candidate_id = candidate.id;
            let offset_secs = stagger * index as u64;
            let run_at = Utc::now() + ChronoDuration::seconds(offset_secs as i64);

            // The stamp is advisory; a write failure must not strand the
            // rest of the batch.
            if let Err(e) = repo.record_scheduled(candidate_id, run_at).await {
                error!(
                    "Failed to record schedule time for candidate {}: {}",
                    candidate_id, e
                );
            }

            let ctx = self.ctx.clone();
            let job = Job::new_one_shot_async(
                Duration::from_secs(offset_secs),
                move |_uuid, _lock| {
                    let ctx = ctx.clone();
                    let candidate = candidate.clone();
                    Box::pin(async move {
                        let outcome = run_call(&ctx, &candidate).await;
                        info!(
                            "Scheduled call for candidate {} ended in phase {}",
                            candidate.id, outcome.phase
                        );
                    })
                },
            )
            .context("Failed to build one-shot call job")?;

            if let Err(e) = self.scheduler.add(job).await {
                error!("Failed to enqueue call job: {}", e);
                continue;
            }

            info!(
                "Scheduled call for candidate {} in {}s",
                candidate_id, offset_secs
            );
            scheduled += 1;
        }

        Ok(scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Database, DialerConfig, TimingConfig};
    use crate::dialer::DialerClient;
    use crate::lifecycle::WebhookTracker;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn test_ctx() -> CallContext {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(100))
            .connect_lazy("postgres://127.0.0.1:1/unreachable")
            .expect("lazy pool");

        let dialer = DialerClient::new(&DialerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            pathway_id: "pathway-1".to_string(),
            voice_id: None,
            webhook_url: None,
        })
        .expect("client");

        CallContext {
            db: Database::from_pool(pool),
            dialer,
            tracker: Arc::new(WebhookTracker::new()),
            timing: TimingConfig {
                poll_interval_secs: 0,
                max_poll_attempts: 1,
                webhook_wait_secs: 0,
                call_stagger_secs: 60,
            },
        }
    }

    fn candidate(id: i64) -> Candidate {
        Candidate {
            id,
            full_name: Some(format!("Candidate {}", id)),
            phone_numbers: Some("5551234567".to_string()),
            job_url: None,
            job_title: None,
            location: None,
            estimated_pay: None,
            call_id: None,
            intent: None,
            call_summary: None,
        }
    }

    // A failing schedule-time write must not strand the rest of the batch.
    #[tokio::test]
    async fn test_schedule_batch_survives_stamp_failures() {
        let scheduler = CallScheduler::start(test_ctx()).await.expect("scheduler");

        let scheduled = scheduler
            .schedule_batch(vec![candidate(1), candidate(2), candidate(3)])
            .await
            .expect("batch scheduled");

        assert_eq!(scheduled, 3);
    }
}
