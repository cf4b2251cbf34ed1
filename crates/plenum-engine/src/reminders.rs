//! Reminder sweep for upcoming planned meetings.
//!
//! A periodic task queries planned meetings inside the reminder window that
//! have not been reminded yet, hands each to the notifier, and marks
//! `reminder_sent` only after delivery succeeds. Failed deliveries are
//! retried on the next sweep. The sweep never alters meeting status.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use plenum_core::Meeting;
use plenum_store::MeetingStore;

/// Delivery outcome for a single reminder.
pub type NotifyResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Delivers a reminder for one upcoming meeting.
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    /// Deliver the reminder. An error leaves `reminder_sent` clear.
    async fn notify(&self, meeting: &Meeting) -> NotifyResult;
}

/// Notifier that records the reminder in the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl ReminderNotifier for LogNotifier {
    async fn notify(&self, meeting: &Meeting) -> NotifyResult {
        info!(
            meeting_id = %meeting.id,
            title = %meeting.title,
            scheduled_for = %meeting.scheduled_for,
            "Meeting reminder"
        );
        Ok(())
    }
}

/// Periodic reminder task.
pub struct ReminderSweep {
    store: Arc<MeetingStore>,
    notifier: Arc<dyn ReminderNotifier>,
    window_hours: u32,
    interval: Duration,
}

impl ReminderSweep {
    /// Create a sweep over the given store and notifier.
    pub fn new(
        store: Arc<MeetingStore>,
        notifier: Arc<dyn ReminderNotifier>,
        window_hours: u32,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            window_hours,
            interval,
        }
    }

    /// Run until the shutdown token fires. The first sweep happens
    /// immediately, then every `interval`.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("Reminder sweep stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let _ = self.sweep_once().await;
                }
            }
        }
    }

    /// One pass: notify every due meeting and mark the delivered ones.
    /// Returns how many reminders were delivered and marked.
    pub async fn sweep_once(&self) -> usize {
        let due = match self.store.due_reminders(i64::from(self.window_hours)) {
            Ok(meetings) => meetings,
            Err(err) => {
                error!(error = %err, "Reminder query failed");
                return 0;
            }
        };

        let mut sent = 0;
        for meeting in &due {
            match self.notifier.notify(meeting).await {
                Ok(()) => match self.store.mark_reminder_sent(meeting.id.as_str()) {
                    Ok(true) => {
                        metrics::counter!("reminders_sent_total").increment(1);
                        sent += 1;
                    }
                    Ok(false) => {
                        warn!(meeting_id = %meeting.id, "Reminder flag not set; meeting gone");
                    }
                    Err(err) => {
                        error!(
                            meeting_id = %meeting.id,
                            error = %err,
                            "Failed to mark reminder sent"
                        );
                    }
                },
                Err(err) => {
                    warn!(
                        meeting_id = %meeting.id,
                        error = %err,
                        "Reminder delivery failed; will retry next sweep"
                    );
                }
            }
        }
        sent
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
