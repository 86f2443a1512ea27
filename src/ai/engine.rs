//! Chat engine: the per-turn pipeline and the session that drives it.
//!
//! ```text
//! raw text ─┬─ EntityExtractor ─┐
//!           ├─ EmotionAnalyzer ─┼─ ConversationContext::apply_turn ─ ResponseSynthesizer ─ reply
//!           └─ IntentClassifier ┘
//! ```
//!
//! [`ChatEngine`] is stateless between calls: the context goes in by value
//! and the next context comes back with the reply. [`ChatSession`] owns one
//! context plus the message log and hands replies to a [`ReplyScheduler`].

use crate::ai::context::{ConversationContext, TurnAnalysis};
use crate::ai::entities::{Entity, EntityExtractor};
use crate::ai::intent::{Intent, IntentClassifier, IntentResult};
use crate::ai::lexicon::Lexicon;
use crate::ai::profile::BusinessProfile;
use crate::ai::responder::ResponseSynthesizer;
use crate::ai::sentiment::{EmotionAnalyzer, EmotionResult, Sentiment};
use crate::ai::summarizer::{summarize_conversation, ConversationSummary};
use crate::ai::typing_sim::{calculate_typing_delay, ReplyScheduler, TypingParams};
use crate::config::EngineConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tokio::sync::mpsc;
use uuid::Uuid;

// ── Messages ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    System,
}

/// One entry of the append-only conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl Message {
    /// A user message annotated with its analysis.
    pub fn user(text: impl Into<String>, analysis: &TurnAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            entities: Some(analysis.entities.clone()),
            intent: Some(analysis.intent.intent),
            confidence: Some(analysis.intent.confidence),
            sentiment: Some(analysis.emotion.sentiment),
            suggestions: None,
        }
    }

    pub fn system(text: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::System,
            timestamp: Utc::now(),
            entities: None,
            intent: None,
            confidence: None,
            sentiment: None,
            suggestions: Some(suggestions),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

// ── Engine ─────────────────────────────────────────────────

/// What a renderer needs to show for one reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub response: String,
    pub suggestions: Vec<String>,
    /// Entities found in the user's message.
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: GeneratedResponse,
    pub analysis: TurnAnalysis,
    /// The context after this turn. Feed it into the next call.
    pub context: ConversationContext,
}

pub struct ChatEngine {
    lexicon: Cow<'static, Lexicon>,
    config: EngineConfig,
    profile: BusinessProfile,
}

impl Default for ChatEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ChatEngine {
    /// Built-in lexicon and stock profile; file paths in `config` are ignored.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            lexicon: Cow::Borrowed(Lexicon::builtin()),
            config,
            profile: BusinessProfile::default(),
        }
    }

    pub fn with_parts(lexicon: Lexicon, config: EngineConfig, profile: BusinessProfile) -> Self {
        Self {
            lexicon: Cow::Owned(lexicon),
            config,
            profile,
        }
    }

    /// Resolve `lexicon_path` and `profile_path`. A broken lexicon is an
    /// error; a missing profile falls back to stock copy.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => Cow::Owned(Lexicon::load(path)?),
            None => Cow::Borrowed(Lexicon::builtin()),
        };
        let profile = match &config.profile_path {
            Some(path) => BusinessProfile::load(path),
            None => BusinessProfile::default(),
        };
        tracing::info!(
            custom_lexicon = config.lexicon_path.is_some(),
            company = %profile.company_name(),
            "[Engine] Ready"
        );
        Ok(Self {
            lexicon,
            config,
            profile,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    pub fn extract_entities(&self, text: &str) -> Vec<Entity> {
        EntityExtractor::new(&self.lexicon, &self.config).extract(text)
    }

    pub fn classify_intent(&self, text: &str, context: &ConversationContext) -> IntentResult {
        IntentClassifier::new(&self.lexicon, &self.config).classify(text, context)
    }

    pub fn analyze_emotion(&self, text: &str) -> EmotionResult {
        EmotionAnalyzer::new(&self.lexicon, &self.config).analyze(text)
    }

    /// Run all three analyzers. The classifier sees `context` as it was
    /// before this turn.
    pub fn analyze(&self, text: &str, context: &ConversationContext) -> TurnAnalysis {
        TurnAnalysis {
            entities: self.extract_entities(text),
            intent: self.classify_intent(text, context),
            emotion: self.analyze_emotion(text),
        }
    }

    pub fn generate_response(&self, text: &str, context: ConversationContext) -> TurnOutcome {
        let analysis = self.analyze(text, &context);
        let context = context.apply_turn(text, &analysis, &self.config.retention);

        let reply = ResponseSynthesizer::new(&self.profile, &self.config.conversation).compose(
            &analysis.intent,
            analysis.emotion.mood,
            &analysis.entities,
            &context,
        );

        tracing::debug!(
            turn = context.turn_count,
            intent = %analysis.intent.intent,
            confidence = analysis.intent.confidence,
            mood = ?analysis.emotion.mood,
            entities = analysis.entities.len(),
            "[Engine] Turn analyzed"
        );

        TurnOutcome {
            reply: GeneratedResponse {
                response: reply.text,
                suggestions: reply.suggestions,
                entities: analysis.entities.clone(),
            },
            analysis,
            context,
        }
    }
}

/// [`ChatEngine::generate_response`] with the built-in lexicon and defaults.
pub fn generate_response(text: &str, context: ConversationContext) -> TurnOutcome {
    ChatEngine::default().generate_response(text, context)
}

// ── Session ────────────────────────────────────────────────

/// Result of submitting one user turn.
#[derive(Debug, Clone)]
pub struct Submitted {
    pub message: Message,
    pub typing: TypingParams,
}

/// One visitor's conversation: context, message log and the delayed reply.
pub struct ChatSession {
    engine: ChatEngine,
    context: ConversationContext,
    messages: Vec<Message>,
    scheduler: ReplyScheduler,
}

impl ChatSession {
    /// Replies arrive on the returned receiver once their typing delay
    /// elapses. Pass them back through [`ChatSession::record_reply`].
    pub fn new(engine: ChatEngine) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            engine,
            context: ConversationContext::new(),
            messages: Vec::new(),
            scheduler: ReplyScheduler::new(tx),
        };
        (session, rx)
    }

    /// Analyze `text`, update the context and schedule the reply. A reply
    /// still waiting from an earlier submission is dropped.
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, text: &str) -> Submitted {
        let context = std::mem::take(&mut self.context);
        let outcome = self.engine.generate_response(text, context);
        self.context = outcome.context;

        let message = Message::user(text, &outcome.analysis);
        self.messages.push(message.clone());

        let typing =
            calculate_typing_delay(outcome.reply.response.chars().count(), &self.engine.config.typing);
        let reply = Message::system(outcome.reply.response, outcome.reply.suggestions);
        self.scheduler.schedule(reply, typing.duration());

        tracing::debug!(
            turn = self.context.turn_count,
            delay_ms = typing.duration_ms,
            "[Session] Reply scheduled"
        );
        Submitted { message, typing }
    }

    /// Append a delivered reply to the log.
    pub fn record_reply(&mut self, reply: Message) {
        self.messages.push(reply);
    }

    pub fn is_typing(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn engine(&self) -> &ChatEngine {
        &self.engine
    }

    pub fn summarize(&self) -> ConversationSummary {
        summarize_conversation(&self.messages)
    }

    /// Start over: drop the pending reply, the log and the context.
    pub fn clear(&mut self) {
        self.scheduler.cancel();
        self.messages.clear();
        self.context = ConversationContext::new();
        tracing::info!("[Session] Conversation cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::entities::EntityKind;
    use std::time::Duration;

    fn fast_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.typing.min_delay_ms = 5;
        config.typing.max_delay_ms = 20;
        config
    }

    #[test]
    fn context_threads_through_turns() {
        let engine = ChatEngine::default();
        let first = engine.generate_response("How much does a website cost?", ConversationContext::new());
        assert_eq!(first.context.turn_count, 1);
        assert_eq!(first.analysis.intent.intent, Intent::GetQuote);

        let second = engine.generate_response("And how long would it take?", first.context);
        assert_eq!(second.context.turn_count, 2);
        assert_eq!(second.context.recent_topics[0], second.analysis.intent.intent);
    }

    #[test]
    fn reply_carries_turn_entities() {
        let outcome = generate_response("Can you build on Shopify?", ConversationContext::new());
        assert!(outcome
            .reply
            .entities
            .iter()
            .any(|e| e.kind == EntityKind::Technology && e.value == "shopify"));
        assert_eq!(outcome.reply.suggestions.len(), 3);
    }

    #[test]
    fn from_config_rejects_missing_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            lexicon_path: Some(dir.path().join("missing.json")),
            ..Default::default()
        };
        assert!(ChatEngine::from_config(config).is_err());
    }

    #[test]
    fn from_config_tolerates_missing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            profile_path: Some(dir.path().join("missing.json")),
            ..Default::default()
        };
        let engine = ChatEngine::from_config(config).unwrap();
        assert_eq!(engine.profile().company_name(), BusinessProfile::default().company_name());
    }

    #[test]
    fn message_json_uses_type_and_skips_empty_fields() {
        let msg = Message::system("hi", vec!["one".into()]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "system");
        assert!(json.get("intent").is_none());
        assert_eq!(json["suggestions"][0], "one");
    }

    #[tokio::test]
    async fn session_logs_user_then_reply() {
        let (mut session, mut rx) = ChatSession::new(ChatEngine::new(fast_config()));
        let submitted = session.submit("What is the price for a website?");
        assert_eq!(submitted.message.intent, Some(Intent::GetQuote));
        assert!(session.is_typing());

        let reply = rx.recv().await.unwrap();
        assert_eq!(reply.sender, Sender::System);
        session.record_reply(reply);

        assert_eq!(session.messages().len(), 2);
        assert!(session.messages()[0].is_user());
        assert_eq!(session.context().turn_count, 1);
    }

    #[tokio::test]
    async fn quick_resubmit_delivers_only_latest_reply() {
        let mut config = fast_config();
        config.typing.min_delay_ms = 50;
        config.typing.max_delay_ms = 50;
        let (mut session, mut rx) = ChatSession::new(ChatEngine::new(config));

        session.submit("Do you do SEO?");
        let second = session.submit("Actually, how much is a logo?");
        assert_eq!(session.context().turn_count, 2);

        let reply = rx.recv().await.unwrap();
        assert!(reply.text.contains("For an exact quote"), "{}", reply.text);
        assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .is_err());
        assert_eq!(second.message.intent, Some(Intent::GetQuote));
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let (mut session, _rx) = ChatSession::new(ChatEngine::new(fast_config()));
        session.submit("hello there");
        session.clear();
        assert!(session.messages().is_empty());
        assert_eq!(session.context().turn_count, 0);
        assert!(!session.is_typing());
    }
}
