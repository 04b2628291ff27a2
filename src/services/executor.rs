//! The auto-capture round loop: capture, stream, commit or rollback, wait.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::models::{Config, ConversationHistory, Message, RoundOutcome};
use crate::domain::ports::{CaptureDevice, CaptureOptions, ChatClient, ChatRequest, DisplayDevice};
use crate::services::classifier::StreamClassifier;
use crate::services::presenter::DisplayPresenter;
use crate::services::scheduler::RoundScheduler;

/// System prompt seeding every conversation.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer concisely and correctly.";

/// Fixed instructional text accompanying each captured image.
pub const ROUND_PROMPT: &str = concat!(
    "Please answer all questions shown in the current image. ",
    "A request is considered invalid if the image is irrelevant to this task. ",
    "If the request is valid, provide concise and correct answers with minimal analysis. ",
    "For a valid request, first return 'valid request' and then return one or more lines ",
    "in the format: '<question_id>: (<analysis>) **<answer>**'. ",
    "If the request is invalid due to text too small or blurred, still try your best to answer, ",
    "i.e., return 'valid request', a warning of 'the answer might be incorrect due to text too ",
    "small, please stay closer' and then return one or more lines in the format: ",
    "'<question_id>: (<analysis>) **answer**'. ",
    "If it is really hard to parse or invalid due to other reasons, return: ",
    "'invalid request: <brief_reason>'. ",
    "Ensure the output strictly matches the format above.",
);

/// Orchestrates the full cycle until externally cancelled:
/// capture -> build request -> stream -> commit or rollback -> display ->
/// schedule the next round.
///
/// All shared mutable state (the history log, the persistent answer, the
/// stream throttle timer) is touched only by this one sequential flow;
/// rounds never overlap. Every per-round failure is absorbed here — the only
/// exit is cancellation.
pub struct RoundExecutor {
    capture: Arc<dyn CaptureDevice>,
    chat: Arc<dyn ChatClient>,
    presenter: DisplayPresenter,
    scheduler: RoundScheduler,
    history: ConversationHistory,
    config: Config,
    cancel: CancellationToken,
}

impl RoundExecutor {
    pub fn new(
        capture: Arc<dyn CaptureDevice>,
        chat: Arc<dyn ChatClient>,
        display: Arc<dyn DisplayDevice>,
        config: Config,
        cancel: CancellationToken,
    ) -> Self {
        let history = ConversationHistory::with_max_rounds(SYSTEM_PROMPT, config.history.max_rounds);
        Self {
            capture,
            chat,
            presenter: DisplayPresenter::new(display),
            scheduler: RoundScheduler::new(cancel.clone()),
            history,
            config,
            cancel,
        }
    }

    /// Current conversation history (system message first).
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Run rounds until the cancellation token fires.
    pub async fn run(&mut self) {
        info!(model = %self.config.api.model, "exam solver started");

        self.scheduler
            .countdown(&self.presenter, self.config.timing.initial_delay(), None)
            .await;

        while !self.cancel.is_cancelled() {
            self.run_round().await;
        }

        info!("exam solver stopped");
    }

    /// One full cycle. Capture failures and stream errors are recovered
    /// locally; the loop continues.
    async fn run_round(&mut self) {
        let interval = self.config.timing.capture_interval();

        debug!("capturing");
        self.presenter.update_status("Capturing...").await;

        let options = CaptureOptions {
            quality: self.config.capture.quality,
            target_width: self.config.capture.target_width,
            target_height: self.config.capture.target_height,
        };
        let image = match self.capture.capture(options).await {
            Ok(image) => image,
            Err(err) => {
                warn!("capture failed: {err}");
                self.presenter.update_status("Capture failed").await;
                self.scheduler
                    .countdown(&self.presenter, interval, None)
                    .await;
                return;
            }
        };
        info!(bytes = image.jpeg.len(), "captured image");

        self.presenter.update_status("Calling AI...").await;
        let outcome = self.stream_round(&image.jpeg).await;

        match outcome {
            RoundOutcome::Valid { .. } => {
                self.scheduler
                    .countdown(&self.presenter, interval, None)
                    .await;
            }
            RoundOutcome::Rejected { reason } => {
                self.presenter.update_status(&reason).await;
                self.scheduler
                    .countdown(
                        &self.presenter,
                        self.config.timing.invalid_retry_delay(),
                        Some(&reason),
                    )
                    .await;
            }
            RoundOutcome::Failed { .. } => {
                self.presenter.update_status("AI call failed").await;
                self.scheduler
                    .countdown(&self.presenter, interval, None)
                    .await;
            }
        }
    }

    /// Stream one round's response and leave the history in exactly one of
    /// two states: pre-round snapshot (rollback) or snapshot plus the new
    /// User/Assistant pair, trimmed (commit).
    async fn stream_round(&mut self, jpeg: &[u8]) -> RoundOutcome {
        let image_url = format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg));

        let snapshot = self.history.snapshot();
        self.history
            .begin_round(Message::user_with_image(ROUND_PROMPT, image_url));

        let request = ChatRequest {
            model: self.config.api.model.clone(),
            messages: self.history.messages().to_vec(),
        };
        debug!(history_messages = self.history.len(), "sending streaming request");

        let mut stream = match self.chat.stream_chat(request).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!("chat request failed: {err}");
                self.history.rollback(snapshot);
                return RoundOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };

        let mut classifier = StreamClassifier::new(self.config.timing.stream_min_interval());
        loop {
            let next = tokio::select! {
                () = self.cancel.cancelled() => {
                    // Ambiguous cancellation timing favors rollback over
                    // commit; stop consuming the stream immediately.
                    self.history.rollback(snapshot);
                    return classifier.fail("cancelled mid-stream");
                }
                next = stream.next() => next,
            };
            match next {
                Some(Ok(fragment)) => {
                    if let Some(partial) = classifier.push_fragment(&fragment) {
                        self.presenter.stream_answer(&partial).await;
                    }
                }
                Some(Err(err)) => {
                    warn!("stream error: {err}");
                    self.history.rollback(snapshot);
                    return classifier.fail(err.to_string());
                }
                None => break,
            }
        }

        let outcome = classifier.finish();
        match &outcome {
            RoundOutcome::Valid {
                display_text,
                raw_text,
            } => {
                // The raw buffer, not the display-stripped text, is what
                // gets stored.
                self.history.commit_round(Message::assistant(raw_text.clone()));
                self.presenter.commit_answer(display_text).await;
                info!("round committed (valid)");
            }
            RoundOutcome::Rejected { reason } => {
                self.history.rollback(snapshot);
                info!(%reason, "model rejected round");
            }
            RoundOutcome::Failed { message } => {
                self.history.rollback(snapshot);
                warn!("round failed: {message}");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::domain::models::Role;
    use crate::domain::ports::{CaptureError, CapturedImage, ChatError, DeltaStream};
    use crate::services::presenter::tests::RecordingDisplay;

    /// Capture device that serves a fixed JPEG and cancels the loop after a
    /// given number of calls.
    struct ScriptedCapture {
        calls: AtomicUsize,
        fail_on: Option<usize>,
        cancel_after: usize,
        cancel: CancellationToken,
    }

    impl ScriptedCapture {
        fn new(cancel_after: usize, fail_on: Option<usize>, cancel: CancellationToken) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
                cancel_after,
                cancel,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CaptureDevice for ScriptedCapture {
        async fn capture(&self, _options: CaptureOptions) -> Result<CapturedImage, CaptureError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.cancel_after {
                self.cancel.cancel();
                return Err(CaptureError::Unavailable("loop stopped".to_string()));
            }
            if self.fail_on == Some(n) {
                return Err(CaptureError::Failed("lens blocked".to_string()));
            }
            Ok(CapturedImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        }
    }

    type Script = Vec<Result<String, ChatError>>;

    /// Chat client that replays one scripted fragment sequence per round and
    /// records every request it receives.
    struct ScriptedChat {
        scripts: Mutex<VecDeque<Script>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedChat {
        fn new(scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn stream_chat(&self, request: ChatRequest) -> Result<DeltaStream, ChatError> {
            self.requests.lock().unwrap().push(request);
            let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
            Ok(Box::pin(futures::stream::iter(script)))
        }
    }

    fn fragments(parts: &[&str]) -> Script {
        parts.iter().map(|p| Ok((*p).to_string())).collect()
    }

    /// Chat client whose stream never yields: cancels the loop as soon as
    /// the request arrives, leaving the executor waiting mid-stream.
    struct HangingChat {
        cancel: CancellationToken,
        requests: AtomicUsize,
    }

    #[async_trait]
    impl ChatClient for HangingChat {
        async fn stream_chat(&self, _request: ChatRequest) -> Result<DeltaStream, ChatError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.cancel.cancel();
            Ok(Box::pin(futures::stream::pending::<
                Result<String, ChatError>,
            >()))
        }
    }

    fn executor(
        rounds_before_stop: usize,
        fail_capture_on: Option<usize>,
        scripts: Vec<Script>,
    ) -> (RoundExecutor, Arc<RecordingDisplay>, Arc<ScriptedChat>, Arc<ScriptedCapture>) {
        let cancel = CancellationToken::new();
        let capture = Arc::new(ScriptedCapture::new(
            rounds_before_stop + 1,
            fail_capture_on,
            cancel.clone(),
        ));
        let chat = ScriptedChat::new(scripts);
        let display = RecordingDisplay::new();
        let executor = RoundExecutor::new(
            capture.clone(),
            chat.clone(),
            display.clone(),
            Config::default(),
            cancel,
        );
        (executor, display, chat, capture)
    }

    #[tokio::test(start_paused = true)]
    async fn valid_round_commits_raw_text_and_forces_display() {
        let (mut exec, display, chat, _) = executor(
            1,
            None,
            vec![fragments(&["valid request\n", "Q1: (x) **42**"])],
        );
        exec.run().await;

        // History holds the system message plus the committed pair, with the
        // raw (unstripped) assistant text.
        let messages = exec.history().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, ROUND_PROMPT);
        assert!(messages[1]
            .image
            .as_deref()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "valid request\nQ1: (x) **42**");

        // The committed answer was pushed with force=true.
        assert!(display
            .calls()
            .contains(&("Q1: (x) **42**".to_string(), true)));

        // The outbound request carried the provisional user message.
        let requests = chat.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[0].model, Config::default().api.model);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_round_rolls_back_and_shows_the_reason() {
        let (mut exec, display, _, _) = executor(
            1,
            None,
            vec![fragments(&["invalid request: blurry photo"])],
        );
        exec.run().await;

        assert_eq!(exec.history().len(), 1);

        let statuses: Vec<String> = display.calls().into_iter().map(|(t, _)| t).collect();
        assert!(statuses.contains(&"invalid request: blurry photo".to_string()));
        // Retry countdown carries the rejection reason as its prefix.
        assert!(statuses
            .contains(&"invalid request: blurry photo (next capture in 5s)".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_rolls_back_and_reports_failure() {
        let (mut exec, display, _, _) = executor(
            1,
            None,
            vec![vec![
                Ok("valid request\npart".to_string()),
                Err(ChatError::Transport("connection reset".to_string())),
            ]],
        );
        exec.run().await;

        assert_eq!(exec.history().len(), 1);
        let statuses: Vec<String> = display.calls().into_iter().map(|(t, _)| t).collect();
        assert!(statuses.iter().any(|s| s.contains("AI call failed")));
    }

    #[tokio::test(start_paused = true)]
    async fn capture_failure_waits_and_retries_without_touching_history() {
        let (mut exec, display, chat, capture) = executor(
            2,
            Some(1),
            vec![fragments(&["valid request\nanswer"])],
        );
        exec.run().await;

        // Round 1 failed at capture, round 2 succeeded.
        assert_eq!(capture.call_count(), 3);
        assert_eq!(chat.requests().len(), 1);
        assert_eq!(exec.history().len(), 3);

        let statuses: Vec<String> = display.calls().into_iter().map(|(t, _)| t).collect();
        assert!(statuses.contains(&"Capture failed".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn six_valid_rounds_keep_only_the_last_five_pairs() {
        let scripts = (1..=6)
            .map(|n| fragments(&["valid request\n", &format!("answer {n}")]))
            .collect();
        let (mut exec, _, _, _) = executor(6, None, scripts);
        exec.run().await;

        let messages = exec.history().messages();
        assert_eq!(messages.len(), 11);
        assert_eq!(messages[0].role, Role::System);
        // Round 1's pair was evicted; the oldest surviving answer is round 2.
        assert_eq!(messages[2].content, "valid request\nanswer 2");
        assert_eq!(messages[10].content, "valid request\nanswer 6");
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_token_stops_before_the_first_capture() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let capture = Arc::new(ScriptedCapture::new(100, None, cancel.clone()));
        let chat = ScriptedChat::new(vec![]);
        let display = RecordingDisplay::new();
        let mut exec = RoundExecutor::new(
            capture.clone(),
            chat,
            display,
            Config::default(),
            cancel,
        );
        exec.run().await;

        assert_eq!(capture.call_count(), 0);
        assert_eq!(exec.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_mid_stream_rolls_back_the_round() {
        let cancel = CancellationToken::new();
        let capture = Arc::new(ScriptedCapture::new(100, None, cancel.clone()));
        let chat = Arc::new(HangingChat {
            cancel: cancel.clone(),
            requests: AtomicUsize::new(0),
        });
        let display = RecordingDisplay::new();
        let mut exec = RoundExecutor::new(
            capture,
            chat.clone(),
            display.clone(),
            Config::default(),
            cancel,
        );
        exec.run().await;

        // The round was in flight when the token fired; the history must be
        // back at the pre-round snapshot, with nothing committed.
        assert_eq!(chat.requests.load(Ordering::SeqCst), 1);
        assert_eq!(exec.history().len(), 1);
        assert_eq!(exec.history().messages()[0].role, Role::System);

        let statuses: Vec<String> = display.calls().into_iter().map(|(t, _)| t).collect();
        assert!(statuses.iter().any(|s| s.contains("AI call failed")));
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_keeps_the_previous_answer_visible() {
        let (mut exec, display, _, _) = executor(
            2,
            None,
            vec![
                fragments(&["valid request\nfirst answer"]),
                fragments(&["invalid request: glare"]),
            ],
        );
        exec.run().await;

        // After the rejected round the previous answer stays underneath the
        // status line.
        let statuses: Vec<String> = display.calls().into_iter().map(|(t, _)| t).collect();
        assert!(statuses.contains(&"first answer\ninvalid request: glare".to_string()));
        assert_eq!(exec.history().len(), 3);
    }
}
