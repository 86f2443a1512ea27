//! Conversation context: everything the assistant remembers within one
//! session.
//!
//! The context is a plain value owned by the caller. [`ConversationContext::apply_turn`]
//! consumes the previous context and returns the next one, so a turn either
//! fully applies or not at all and nothing is shared between sessions.

use crate::ai::entities::{Entity, EntityKind};
use crate::ai::intent::{Intent, IntentResult};
use crate::ai::sentiment::{EmotionResult, Mood};
use crate::config::RetentionConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Everything the analyzers produced for one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnAnalysis {
    pub entities: Vec<Entity>,
    pub intent: IntentResult,
    pub emotion: EmotionResult,
}

// ── Mood ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: Mood,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodState {
    pub current: Mood,
    pub intensity: f32,
    /// Oldest first, bounded by `RetentionConfig::max_mood_history`.
    pub history: VecDeque<MoodEntry>,
}

// ── Preferences ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Brief,
    Conversational,
    Detailed,
}

impl CommunicationStyle {
    pub fn from_message(text: &str) -> Self {
        match text.split_whitespace().count() {
            0..=5 => Self::Brief,
            6..=30 => Self::Conversational,
            _ => Self::Detailed,
        }
    }
}

/// What the visitor has told us about themselves so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Insertion-ordered set of technology identifiers.
    pub preferred_technologies: Vec<String>,
    pub business_type: Option<String>,
    pub urgency_level: Option<String>,
    pub industry: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub communication_style: Option<CommunicationStyle>,
}

impl UserPreferences {
    /// Fold one message's entities in. Later mentions overwrite earlier ones;
    /// technologies accumulate without duplicates.
    pub fn absorb(&mut self, entities: &[Entity]) {
        let first = |kind: EntityKind| {
            entities
                .iter()
                .find(|e| e.kind == kind)
                .map(|e| e.value.clone())
        };

        if let Some(v) = first(EntityKind::BusinessType) {
            self.business_type = Some(v);
        }
        if let Some(v) = first(EntityKind::Urgency) {
            self.urgency_level = Some(v);
        }
        if let Some(v) = first(EntityKind::Industry) {
            self.industry = Some(v);
        }
        // Bare keywords like "cost" or "cheap" are not a budget.
        if let Some(amount) = entities
            .iter()
            .find(|e| e.kind == EntityKind::Price && e.value.bytes().any(|b| b.is_ascii_digit()))
        {
            self.budget = Some(amount.value.clone());
        }
        if let Some(v) = first(EntityKind::Timeline) {
            self.timeline = Some(v);
        }

        for tech in entities.iter().filter(|e| e.kind == EntityKind::Technology) {
            if !self.preferred_technologies.contains(&tech.value) {
                self.preferred_technologies.push(tech.value.clone());
            }
        }
    }
}

// ── Context ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    pub turn_count: u32,
    pub last_topic: Option<Intent>,
    /// Raw user messages, oldest first.
    pub conversation_history: VecDeque<String>,
    /// Newest first.
    pub recent_topics: VecDeque<Intent>,
    /// Every distinct `(type, value)` seen this session, in discovery order.
    pub entities: Vec<Entity>,
    pub user_preferences: UserPreferences,
    pub mood: MoodState,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one user turn into the context.
    pub fn apply_turn(self, text: &str, turn: &TurnAnalysis, retention: &RetentionConfig) -> Self {
        self.apply_turn_at(text, turn, retention, Utc::now())
    }

    pub fn apply_turn_at(
        mut self,
        text: &str,
        turn: &TurnAnalysis,
        retention: &RetentionConfig,
        now: DateTime<Utc>,
    ) -> Self {
        self.turn_count += 1;

        self.conversation_history.push_back(text.to_string());
        truncate_front(&mut self.conversation_history, retention.max_history);

        self.last_topic = Some(turn.intent.intent);
        self.recent_topics.push_front(turn.intent.intent);
        self.recent_topics.truncate(retention.max_recent_topics);

        for entity in &turn.entities {
            if !self.has_entity(entity.kind, &entity.value) {
                self.entities.push(entity.clone());
            }
        }

        self.user_preferences.absorb(&turn.entities);
        self.user_preferences.communication_style = Some(CommunicationStyle::from_message(text));

        self.mood.current = turn.emotion.mood;
        self.mood.intensity = turn.emotion.intensity;
        self.mood.history.push_back(MoodEntry {
            mood: turn.emotion.mood,
            timestamp: now,
        });
        truncate_front(&mut self.mood.history, retention.max_mood_history);

        self
    }

    pub fn has_entity(&self, kind: EntityKind, value: &str) -> bool {
        self.entities
            .iter()
            .any(|e| e.kind == kind && e.value == value)
    }

    /// Mood labels from history, newest first.
    pub fn mood_history(&self) -> Vec<Mood> {
        self.mood.history.iter().rev().map(|e| e.mood).collect()
    }
}

/// Drop the oldest entries beyond `max`. A limit of 0 disables the cap.
fn truncate_front<T>(items: &mut VecDeque<T>, max: usize) {
    if max == 0 {
        return;
    }
    while items.len() > max {
        items.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::sentiment::Sentiment;

    fn turn(intent: Intent, entities: Vec<Entity>, mood: Mood) -> TurnAnalysis {
        TurnAnalysis {
            entities,
            intent: IntentResult {
                intent,
                confidence: 0.5,
                sub_intent: None,
            },
            emotion: EmotionResult {
                sentiment: Sentiment::Neutral,
                emotions: Vec::new(),
                intensity: 0.4,
                mood,
            },
        }
    }

    fn tech(value: &str) -> Entity {
        Entity::new(EntityKind::Technology, value, 0.95)
    }

    #[test]
    fn turn_updates_counters_and_topics() {
        let retention = RetentionConfig::default();
        let ctx = ConversationContext::new().apply_turn(
            "how much?",
            &turn(Intent::GetQuote, vec![], Mood::Neutral),
            &retention,
        );
        assert_eq!(ctx.turn_count, 1);
        assert_eq!(ctx.last_topic, Some(Intent::GetQuote));
        assert_eq!(ctx.conversation_history, vec!["how much?".to_string()]);
        assert_eq!(ctx.recent_topics.front(), Some(&Intent::GetQuote));
        assert_eq!(ctx.mood.history.len(), 1);
        assert!((ctx.mood.intensity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn recent_topics_capped_newest_first() {
        let retention = RetentionConfig::default();
        let intents = [
            Intent::GetQuote,
            Intent::Portfolio,
            Intent::Timeline,
            Intent::Process,
            Intent::Support,
            Intent::ScheduleMeeting,
        ];
        let mut ctx = ConversationContext::new();
        for intent in intents {
            ctx = ctx.apply_turn("x", &turn(intent, vec![], Mood::Neutral), &retention);
        }
        assert_eq!(ctx.recent_topics.len(), 5);
        assert_eq!(ctx.recent_topics[0], Intent::ScheduleMeeting);
        assert_eq!(ctx.recent_topics[4], Intent::Portfolio);
    }

    #[test]
    fn technologies_are_not_duplicated() {
        let retention = RetentionConfig::default();
        let ctx = ConversationContext::new()
            .apply_turn("react?", &turn(Intent::TechnicalInfo, vec![tech("react")], Mood::Neutral), &retention)
            .apply_turn(
                "react and vue",
                &turn(Intent::TechnicalInfo, vec![tech("react"), tech("vue")], Mood::Neutral),
                &retention,
            );
        assert_eq!(
            ctx.user_preferences.preferred_technologies,
            vec!["react".to_string(), "vue".to_string()]
        );
        assert_eq!(ctx.entities.len(), 2);
    }

    #[test]
    fn later_turns_overwrite_scalar_preferences() {
        let retention = RetentionConfig::default();
        let bakery = Entity::new(EntityKind::BusinessType, "restaurant", 0.9);
        let shop = Entity::new(EntityKind::BusinessType, "retail", 0.9);
        let ctx = ConversationContext::new()
            .apply_turn("a", &turn(Intent::GetQuote, vec![bakery], Mood::Neutral), &retention)
            .apply_turn("b", &turn(Intent::GetQuote, vec![], Mood::Neutral), &retention);
        assert_eq!(ctx.user_preferences.business_type.as_deref(), Some("restaurant"));

        let ctx = ctx.apply_turn("c", &turn(Intent::GetQuote, vec![shop], Mood::Neutral), &retention);
        assert_eq!(ctx.user_preferences.business_type.as_deref(), Some("retail"));
    }

    #[test]
    fn budget_timeline_and_style_are_projected() {
        let retention = RetentionConfig::default();
        let entities = vec![
            Entity::new(EntityKind::Price, "$5,000", 0.9),
            Entity::new(EntityKind::Timeline, "within 3 weeks", 0.9),
        ];
        let ctx = ConversationContext::new().apply_turn(
            "budget $5,000 within 3 weeks",
            &turn(Intent::GetQuote, entities, Mood::Neutral),
            &retention,
        );
        let prefs = &ctx.user_preferences;
        assert_eq!(prefs.budget.as_deref(), Some("$5,000"));
        assert_eq!(prefs.timeline.as_deref(), Some("within 3 weeks"));
        assert_eq!(prefs.communication_style, Some(CommunicationStyle::Brief));
    }

    #[test]
    fn price_keywords_never_touch_the_budget() {
        let retention = RetentionConfig::default();
        let keyword = |word: &str| vec![Entity::new(EntityKind::Price, word, 0.7)];

        let ctx = ConversationContext::new().apply_turn(
            "what would it cost?",
            &turn(Intent::GetQuote, keyword("cost"), Mood::Neutral),
            &retention,
        );
        assert_eq!(ctx.user_preferences.budget, None);

        let amount = vec![
            Entity::new(EntityKind::Price, "cheap", 0.7),
            Entity::new(EntityKind::Price, "$5,000", 0.9),
        ];
        let ctx = ctx
            .apply_turn("cheap, $5,000 tops", &turn(Intent::GetQuote, amount, Mood::Neutral), &retention)
            .apply_turn(
                "is it expensive?",
                &turn(Intent::GetQuote, keyword("expensive"), Mood::Neutral),
                &retention,
            );
        assert_eq!(ctx.user_preferences.budget.as_deref(), Some("$5,000"));
    }

    #[test]
    fn histories_respect_retention() {
        let retention = RetentionConfig {
            max_recent_topics: 5,
            max_history: 3,
            max_mood_history: 2,
        };
        let mut ctx = ConversationContext::new();
        for (i, mood) in [Mood::Positive, Mood::Negative, Mood::Confused, Mood::Impatient]
            .into_iter()
            .enumerate()
        {
            ctx = ctx.apply_turn(&format!("turn {}", i), &turn(Intent::Support, vec![], mood), &retention);
        }
        assert_eq!(ctx.turn_count, 4);
        assert_eq!(
            ctx.conversation_history,
            vec!["turn 1".to_string(), "turn 2".to_string(), "turn 3".to_string()]
        );
        assert_eq!(ctx.mood_history(), vec![Mood::Impatient, Mood::Confused]);
        assert_eq!(ctx.mood.current, Mood::Impatient);
    }

    #[test]
    fn zero_limit_means_unbounded() {
        let retention = RetentionConfig {
            max_recent_topics: 5,
            max_history: 0,
            max_mood_history: 0,
        };
        let mut ctx = ConversationContext::new();
        for _ in 0..150 {
            ctx = ctx.apply_turn("again", &turn(Intent::Support, vec![], Mood::Neutral), &retention);
        }
        assert_eq!(ctx.conversation_history.len(), 150);
        assert_eq!(ctx.mood.history.len(), 150);
    }

    #[test]
    fn style_thresholds() {
        assert_eq!(CommunicationStyle::from_message("hi"), CommunicationStyle::Brief);
        assert_eq!(
            CommunicationStyle::from_message("I would like to know more about your services"),
            CommunicationStyle::Conversational
        );
        let long = "word ".repeat(40);
        assert_eq!(CommunicationStyle::from_message(&long), CommunicationStyle::Detailed);
    }
}
