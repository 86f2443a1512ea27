pub mod context;
pub mod engine;
pub mod entities;
pub mod intent;
pub mod lexicon;
pub mod matcher;
pub mod profile;
pub mod responder;
pub mod sentiment;
pub mod summarizer;
pub mod typing_sim;


pub use context::{
    CommunicationStyle, ConversationContext, MoodEntry, MoodState, TurnAnalysis, UserPreferences,
};
pub use engine::{
    generate_response, ChatEngine, ChatSession, GeneratedResponse, Message, Sender, Submitted,
    TurnOutcome,
};
pub use entities::{extract_entities, Entity, EntityExtractor, EntityKind};
pub use intent::{classify_intent, Intent, IntentClassifier, IntentResult, SubIntent};
pub use lexicon::Lexicon;
pub use profile::BusinessProfile;
pub use responder::{Reply, ResponseSynthesizer};
pub use sentiment::{analyze_emotion, EmotionAnalyzer, EmotionCategory, EmotionResult, Mood, Sentiment};
pub use summarizer::{summarize_conversation, ConversationSummary};
pub use typing_sim::{calculate_typing_delay, ReplyScheduler, TypingParams, TypingSpeed};
