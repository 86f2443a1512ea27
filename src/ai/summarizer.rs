//! Conversation summary: post-hoc aggregation over the message log.
//!
//! Only user messages contribute. Their stored entities, intents and
//! sentiments are folded into one overview a human can skim before
//! following up with the visitor.

use crate::ai::context::{CommunicationStyle, UserPreferences};
use crate::ai::engine::Message;
use crate::ai::entities::{dedup_entities, Entity, EntityKind};
use crate::ai::intent::Intent;
use crate::ai::sentiment::Sentiment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub summary: String,
    /// Services, technologies and industries in first-seen order.
    pub topics: Vec<String>,
    /// Distinct intents in first-seen order.
    pub intents: Vec<Intent>,
    pub entities: Vec<Entity>,
    pub sentiment: Sentiment,
    pub user_preferences: UserPreferences,
}

pub fn summarize_conversation(messages: &[Message]) -> ConversationSummary {
    let user_messages: Vec<&Message> = messages.iter().filter(|m| m.is_user()).collect();

    let mut all_entities = Vec::new();
    let mut intents: Vec<Intent> = Vec::new();
    let mut intent_counts: Vec<(Intent, usize)> = Vec::new();
    let mut preferences = UserPreferences::default();
    let (mut positive, mut negative, mut neutral) = (0usize, 0usize, 0usize);

    for msg in &user_messages {
        if let Some(entities) = &msg.entities {
            preferences.absorb(entities);
            all_entities.extend(entities.iter().cloned());
        }
        if let Some(intent) = msg.intent {
            match intent_counts.iter_mut().find(|(i, _)| *i == intent) {
                Some((_, n)) => *n += 1,
                None => {
                    intents.push(intent);
                    intent_counts.push((intent, 1));
                }
            }
        }
        match msg.sentiment {
            Some(Sentiment::Positive) => positive += 1,
            Some(Sentiment::Negative) => negative += 1,
            Some(Sentiment::Neutral) => neutral += 1,
            None => {}
        }
    }
    if let Some(last) = user_messages.last() {
        preferences.communication_style = Some(CommunicationStyle::from_message(&last.text));
    }

    let entities = dedup_entities(all_entities);
    let mut topics: Vec<String> = Vec::new();
    for e in &entities {
        let is_topic = matches!(
            e.kind,
            EntityKind::Service | EntityKind::Technology | EntityKind::Industry
        );
        if is_topic && !topics.contains(&e.value) {
            topics.push(e.value.clone());
        }
    }

    let sentiment = majority_sentiment(positive, negative, neutral);

    // First-seen order breaks ties.
    let main_intent = intent_counts
        .iter()
        .fold(None::<(Intent, usize)>, |best, &(intent, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((intent, n)),
        })
        .map(|(intent, _)| intent);

    let summary = match main_intent {
        None if user_messages.is_empty() => "No visitor messages yet.".to_string(),
        _ => format!(
            "{} visitor message{} about {}. Main interest: {}. Overall sentiment: {}.",
            user_messages.len(),
            if user_messages.len() == 1 { "" } else { "s" },
            if topics.is_empty() {
                "general questions".to_string()
            } else {
                topics.join(", ")
            },
            main_intent.unwrap_or(Intent::GeneralInquiry),
            sentiment.label()
        ),
    };

    ConversationSummary {
        summary,
        topics,
        intents,
        entities,
        sentiment,
        user_preferences: preferences,
    }
}

/// Most frequent label; any tie for first place is neutral.
fn majority_sentiment(positive: usize, negative: usize, neutral: usize) -> Sentiment {
    if positive > negative && positive > neutral {
        Sentiment::Positive
    } else if negative > positive && negative > neutral {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::context::TurnAnalysis;
    use crate::ai::intent::IntentResult;
    use crate::ai::sentiment::{EmotionResult, Mood};

    fn user(text: &str, intent: Intent, sentiment: Sentiment, entities: Vec<Entity>) -> Message {
        Message::user(
            text,
            &TurnAnalysis {
                entities,
                intent: IntentResult {
                    intent,
                    confidence: 0.4,
                    sub_intent: None,
                },
                emotion: EmotionResult {
                    sentiment,
                    emotions: Vec::new(),
                    intensity: 0.3,
                    mood: Mood::from(sentiment),
                },
            },
        )
    }

    #[test]
    fn empty_log() {
        let summary = summarize_conversation(&[]);
        assert_eq!(summary.summary, "No visitor messages yet.");
        assert!(summary.topics.is_empty());
        assert_eq!(summary.sentiment, Sentiment::Neutral);
        assert_eq!(summary.user_preferences, UserPreferences::default());
    }

    #[test]
    fn aggregates_user_messages_only() {
        let messages = vec![
            user(
                "website with react please",
                Intent::GetQuote,
                Sentiment::Positive,
                vec![
                    Entity::new(EntityKind::Service, "website", 0.95),
                    Entity::new(EntityKind::Technology, "react", 0.95),
                ],
            ),
            Message::system("Sure!", vec![]),
            user(
                "react, for a clinic",
                Intent::TechnicalInfo,
                Sentiment::Positive,
                vec![
                    Entity::new(EntityKind::Technology, "react", 0.95),
                    Entity::new(EntityKind::Industry, "healthcare", 0.9),
                    Entity::new(EntityKind::Question, "question", 0.9),
                ],
            ),
            user("how much again", Intent::GetQuote, Sentiment::Negative, vec![]),
        ];

        let summary = summarize_conversation(&messages);
        assert_eq!(summary.topics, vec!["website", "react", "healthcare"]);
        assert_eq!(summary.intents, vec![Intent::GetQuote, Intent::TechnicalInfo]);
        assert_eq!(summary.entities.len(), 4);
        assert_eq!(summary.sentiment, Sentiment::Positive);
        assert_eq!(summary.user_preferences.preferred_technologies, vec!["react"]);
        assert_eq!(summary.user_preferences.industry.as_deref(), Some("healthcare"));
        assert_eq!(
            summary.summary,
            "3 visitor messages about website, react, healthcare. Main interest: get_quote. Overall sentiment: positive."
        );
    }

    #[test]
    fn sentiment_ties_are_neutral() {
        let messages = vec![
            user("a", Intent::Support, Sentiment::Positive, vec![]),
            user("b", Intent::Support, Sentiment::Negative, vec![]),
        ];
        assert_eq!(summarize_conversation(&messages).sentiment, Sentiment::Neutral);
    }

    #[test]
    fn single_message_without_topics() {
        let messages = vec![user("hi", Intent::GeneralInquiry, Sentiment::Neutral, vec![])];
        let summary = summarize_conversation(&messages);
        assert_eq!(
            summary.summary,
            "1 visitor message about general questions. Main interest: general_inquiry. Overall sentiment: neutral."
        );
        assert_eq!(
            summary.user_preferences.communication_style,
            Some(CommunicationStyle::Brief)
        );
    }
}
