//! Mock implementations for testing
//!
//! These mocks enable end-to-end call flow tests without real I/O.

use super::traits::*;
use super::{RenderSettings, ResponseRenderer, TurnProcessor};
use crate::db::DbError;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, MessageRole};
use crate::telephony::TwilioError;
use crate::transcript::{TranscriptStore, Turn};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock LLM Clients
// ============================================================================

/// Mock LLM client that returns queued responses
#[derive(Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}

/// Replies with the latest user message, yielding first so concurrent turns
/// interleave
pub struct EchoLlmClient;

#[async_trait]
impl LlmService for EchoLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        tokio::task::yield_now().await;
        let last = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(LlmResponse::text(format!("echo: {last}")))
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}

// ============================================================================
// Mock Telephony
// ============================================================================

/// Records notifications; optionally fails every send
#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, to: &str, body: &str) -> Result<(), TwilioError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        if self.fail {
            return Err(TwilioError::Api {
                status: 400,
                message: "unreachable handset".to_string(),
            });
        }
        Ok(())
    }
}

/// Hands out sequential call identifiers, or fails when configured to
#[derive(Default)]
pub struct MockCallInitiator {
    pub placed: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl MockCallInitiator {
    pub fn failing() -> Self {
        Self {
            placed: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn placed(&self) -> Vec<(String, String)> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallInitiator for MockCallInitiator {
    async fn place_call(&self, to: &str, callback_url: &str) -> Result<String, TwilioError> {
        if self.fail {
            return Err(TwilioError::Api {
                status: 401,
                message: "Authenticate".to_string(),
            });
        }
        let mut placed = self.placed.lock().unwrap();
        placed.push((to.to_string(), callback_url.to_string()));
        Ok(format!("CA{:032}", placed.len()))
    }
}

// ============================================================================
// Mock Transcript Sink
// ============================================================================

/// Keeps the latest snapshot per call, like the database upsert
#[derive(Default)]
pub struct MockSink {
    pub saved: Mutex<Vec<(String, Vec<Turn>)>>,
    fail: bool,
}

impl MockSink {
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<(String, Vec<Turn>)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptSink for MockSink {
    async fn persist(&self, call_id: &str, turns: &[Turn]) -> Result<(), DbError> {
        if self.fail {
            return Err(DbError::Poisoned);
        }
        let mut saved = self.saved.lock().unwrap();
        saved.retain(|(id, _)| id != call_id);
        saved.push((call_id.to_string(), turns.to_vec()));
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub const TEST_ACTION: &str = "https://bot.example.com/voice_response";
pub const TEST_NOTIFY_TO: &str = "+15550000000";

pub fn test_settings() -> RenderSettings {
    RenderSettings {
        gather_action: TEST_ACTION.to_string(),
        notify_to: TEST_NOTIFY_TO.to_string(),
    }
}

/// Processor and renderer wired to shared mocks
pub struct Harness {
    pub store: Arc<TranscriptStore>,
    pub processor: TurnProcessor,
    pub renderer: ResponseRenderer,
    pub sink: Arc<MockSink>,
    pub notifier: Arc<MockNotifier>,
}

impl Harness {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self::with_effects(llm, MockSink::default(), MockNotifier::default())
    }

    pub fn with_effects(llm: Arc<dyn LlmService>, sink: MockSink, notifier: MockNotifier) -> Self {
        let store = Arc::new(TranscriptStore::new());
        let sink = Arc::new(sink);
        let notifier = Arc::new(notifier);
        let processor = TurnProcessor::new(store.clone(), llm);
        let renderer = ResponseRenderer::new(
            test_settings(),
            store.clone(),
            sink.clone(),
            notifier.clone(),
        );
        Self {
            store,
            processor,
            renderer,
            sink,
            notifier,
        }
    }

    /// Run one webhook end to end and return the markup
    pub async fn turn(&self, call_id: &str, speech: Option<&str>) -> Result<String, LlmError> {
        let decision = self.processor.process(call_id, speech).await?;
        Ok(self.renderer.render(call_id, &decision).await)
    }

    pub async fn turns_of(&self, call_id: &str) -> Vec<Turn> {
        self.store.snapshot(call_id).await.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use crate::runtime::renderer::{FAREWELL, GREETING};
    use crate::transcript::{Role, SYSTEM_INSTRUCTION};

    fn roles(turns: &[Turn]) -> Vec<Role> {
        turns.iter().map(|t| t.role).collect()
    }

    #[tokio::test]
    async fn test_conversation_grows_two_turns_per_exchange() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_reply("It is sunny.");
        llm.queue_reply("About 20 degrees.");
        let h = Harness::new(llm.clone());

        let xml = h.turn("CA1", Some("what's the weather")).await.unwrap();
        assert!(xml.contains("It is sunny."));
        assert!(xml.contains("<Gather"));
        h.turn("CA1", Some("how warm")).await.unwrap();

        let turns = h.turns_of("CA1").await;
        assert_eq!(turns.len(), 5);
        assert_eq!(turns[0], Turn::system(SYSTEM_INSTRUCTION));
        assert_eq!(
            roles(&turns),
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[1].messages.len(), 4);
        assert_eq!(requests[1].messages[2].content, "It is sunny.");
    }

    #[tokio::test]
    async fn test_reply_is_trimmed_before_storing() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_reply("  Sure thing.\n");
        let h = Harness::new(llm);

        h.turn("CA1", Some("hi")).await.unwrap();
        assert_eq!(h.turns_of("CA1").await[2].content, "Sure thing.");
    }

    #[tokio::test]
    async fn test_greeting_opens_session_without_turns() {
        let llm = Arc::new(MockLlmClient::new());
        let h = Harness::new(llm.clone());

        let xml = h.turn("CAfirst", None).await.unwrap();
        assert!(xml.contains(GREETING));
        let xml = h.turn("CAfirst", Some("   ")).await.unwrap();
        assert!(xml.contains(GREETING));

        assert_eq!(h.store.len().await, 1);
        assert_eq!(
            h.store.snapshot("CAfirst").await.unwrap(),
            vec![Turn::system(SYSTEM_INSTRUCTION)]
        );
        assert!(llm.recorded_requests().is_empty());
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_greeting_mid_call_keeps_transcript() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_reply("Hello.");
        let h = Harness::new(llm);

        h.turn("CA1", Some("hi")).await.unwrap();
        h.turn("CA1", None).await.unwrap();
        assert_eq!(h.turns_of("CA1").await.len(), 3);
    }

    #[tokio::test]
    async fn test_goodbye_ends_call_without_completion() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_reply("Hi there.");
        let h = Harness::new(llm.clone());

        h.turn("CA1", Some("hello")).await.unwrap();
        let xml = h.turn("CA1", Some("OK, Goodbye then")).await.unwrap();

        assert!(xml.contains(FAREWELL));
        assert!(xml.contains("<Hangup/>"));
        assert!(!xml.contains("<Gather"));
        assert_eq!(llm.recorded_requests().len(), 1);

        // Snapshot carries the closing user turn and nothing after it
        let saved = h.sink.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "CA1");
        assert_eq!(saved[0].1.len(), 4);
        assert_eq!(saved[0].1[3], Turn::user("OK, Goodbye then"));

        assert_eq!(
            h.notifier.sent(),
            vec![(
                TEST_NOTIFY_TO.to_string(),
                "Call CA1 has ended.".to_string()
            )]
        );
        assert!(h.store.get("CA1").await.is_none());
    }

    #[tokio::test]
    async fn test_goodbye_as_first_utterance() {
        let llm = Arc::new(MockLlmClient::new());
        let h = Harness::new(llm.clone());

        h.turn("CA9", Some("goodbye")).await.unwrap();

        let saved = h.sink.saved();
        assert_eq!(roles(&saved[0].1), vec![Role::System, Role::User]);
        assert!(llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_keeps_user_turn_only() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_reply("First answer.");
        llm.queue_error(LlmError::server_error("upstream 503"));
        let h = Harness::new(llm);

        h.turn("CA1", Some("one")).await.unwrap();
        let err = h.turn("CA1", Some("two")).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ServerError);

        let turns = h.turns_of("CA1").await;
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[3], Turn::user("two"));
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_blank_reply_is_malformed() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_reply("   ");
        let h = Harness::new(llm);

        let err = h.turn("CA1", Some("hi")).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::MalformedResponse);
        assert_eq!(
            roles(&h.turns_of("CA1").await),
            vec![Role::System, Role::User]
        );
    }

    #[tokio::test]
    async fn test_max_tokens_forwarded() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_reply("ok");
        let store = Arc::new(TranscriptStore::new());
        let processor = TurnProcessor::new(store, llm.clone()).with_max_tokens(Some(64));

        processor.process("CA1", Some("hi")).await.unwrap();
        assert_eq!(llm.recorded_requests()[0].max_tokens, Some(64));
    }

    #[tokio::test]
    async fn test_side_effect_failures_do_not_change_markup() {
        let llm = Arc::new(MockLlmClient::new());
        let h = Harness::with_effects(llm, MockSink::failing(), MockNotifier::failing());

        let xml = h.turn("CA1", Some("goodbye")).await.unwrap();
        assert!(xml.contains(FAREWELL));
        assert!(xml.contains("<Hangup/>"));
        assert_eq!(h.notifier.sent().len(), 1);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_goodbye_repeated_after_eviction() {
        let llm = Arc::new(MockLlmClient::new());
        let h = Harness::new(llm);

        h.turn("CA1", Some("goodbye")).await.unwrap();
        h.turn("CA1", Some("goodbye")).await.unwrap();

        // Second call of the same id starts fresh and replaces the snapshot
        let saved = h.sink.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].1.len(), 2);
        assert_eq!(h.notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_isolated() {
        let h = Arc::new(Harness::new(Arc::new(EchoLlmClient)));
        let calls: Vec<String> = (0..8).map(|i| format!("CA{i}")).collect();

        let runs = calls.iter().map(|call_id| {
            let h = h.clone();
            async move {
                for n in 0..3 {
                    let said = format!("{call_id} message {n}");
                    h.turn(call_id, Some(&said)).await.unwrap();
                }
            }
        });
        futures::future::join_all(runs).await;

        for call_id in &calls {
            let turns = h.turns_of(call_id).await;
            assert_eq!(turns.len(), 7);
            for pair in turns[1..].chunks(2) {
                assert!(pair[0].content.starts_with(call_id.as_str()));
                assert_eq!(pair[1].content, format!("echo: {}", pair[0].content));
            }
        }
    }

    #[tokio::test]
    async fn test_same_call_turns_are_serialized() {
        let h = Arc::new(Harness::new(Arc::new(EchoLlmClient)));

        let a = {
            let h = h.clone();
            tokio::spawn(async move { h.turn("CA1", Some("first")).await })
        };
        let b = {
            let h = h.clone();
            tokio::spawn(async move { h.turn("CA1", Some("second")).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let turns = h.turns_of("CA1").await;
        assert_eq!(
            roles(&turns),
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
        assert_eq!(turns[2].content, format!("echo: {}", turns[1].content));
        assert_eq!(turns[4].content, format!("echo: {}", turns[3].content));
    }

    #[tokio::test]
    async fn test_mock_call_initiator() {
        let calls = MockCallInitiator::default();
        let sid = calls.place_call("+15551234567", TEST_ACTION).await.unwrap();
        assert!(sid.starts_with("CA"));
        assert_eq!(calls.placed().len(), 1);

        assert!(MockCallInitiator::failing()
            .place_call("+15551234567", TEST_ACTION)
            .await
            .is_err());
    }
}
