//! Inter-round countdown with per-second status ticks.

use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::services::presenter::DisplayPresenter;

/// Drives the delay before the first round and between rounds, updating the
/// status line once per second and checking for cancellation before every
/// tick.
pub struct RoundScheduler {
    cancel: CancellationToken,
}

impl RoundScheduler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Count down `total`, showing `"<prefix> (next capture in Ns)"` or
    /// `"Next capture in Ns"` each tick (remaining time rounded up). Returns
    /// early when the cancellation token fires; exact tick boundaries are
    /// not a correctness requirement.
    pub async fn countdown(
        &self,
        presenter: &DisplayPresenter,
        total: Duration,
        prefix: Option<&str>,
    ) {
        let step = Duration::from_secs(1);
        let mut remaining = total;

        while !remaining.is_zero() {
            if self.cancel.is_cancelled() {
                return;
            }

            let secs = remaining.as_millis().div_ceil(1000).max(1);
            let status = match prefix {
                Some(p) if !p.trim().is_empty() => format!("{p} (next capture in {secs}s)"),
                _ => format!("Next capture in {secs}s"),
            };
            presenter.update_status(&status).await;

            let nap = step.min(remaining);
            tokio::select! {
                () = self.cancel.cancelled() => return,
                () = sleep(nap) => {}
            }
            remaining = remaining.saturating_sub(nap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::presenter::tests::RecordingDisplay;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_counting_down() {
        let display = RecordingDisplay::new();
        let presenter = DisplayPresenter::new(display.clone());
        let scheduler = RoundScheduler::new(CancellationToken::new());

        scheduler
            .countdown(&presenter, Duration::from_secs(3), None)
            .await;

        let statuses: Vec<String> = display.calls().into_iter().map(|(text, _)| text).collect();
        assert_eq!(
            statuses,
            vec![
                "Next capture in 3s".to_string(),
                "Next capture in 2s".to_string(),
                "Next capture in 1s".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn prefix_is_prepended_to_every_tick() {
        let display = RecordingDisplay::new();
        let presenter = DisplayPresenter::new(display.clone());
        let scheduler = RoundScheduler::new(CancellationToken::new());

        scheduler
            .countdown(
                &presenter,
                Duration::from_secs(2),
                Some("invalid request: blurry photo"),
            )
            .await;

        let statuses: Vec<String> = display.calls().into_iter().map(|(text, _)| text).collect();
        assert_eq!(
            statuses,
            vec![
                "invalid request: blurry photo (next capture in 2s)".to_string(),
                "invalid request: blurry photo (next capture in 1s)".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_remainder_rounds_up() {
        let display = RecordingDisplay::new();
        let presenter = DisplayPresenter::new(display.clone());
        let scheduler = RoundScheduler::new(CancellationToken::new());

        scheduler
            .countdown(&presenter, Duration::from_millis(1500), None)
            .await;

        let statuses: Vec<String> = display.calls().into_iter().map(|(text, _)| text).collect();
        assert_eq!(
            statuses,
            vec![
                "Next capture in 2s".to_string(),
                "Next capture in 1s".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_countdown_before_the_next_tick() {
        let display = RecordingDisplay::new();
        let presenter = DisplayPresenter::new(display.clone());
        let cancel = CancellationToken::new();
        let scheduler = RoundScheduler::new(cancel.clone());

        cancel.cancel();
        scheduler
            .countdown(&presenter, Duration::from_secs(30), None)
            .await;

        assert!(display.calls().is_empty());
    }
}
