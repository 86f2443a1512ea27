//! Intent classification: weighted pattern scoring with context boosts.
//!
//! Each intent in the lexicon carries a list of trigger patterns. A pattern
//! scores 1.0 when it appears verbatim, 0.5 when one word of a multi-word
//! pattern appears, and 0.3 when an input word shares a prefix stem with it.
//! The sum is normalized by the pattern count, so intents with long pattern
//! lists are not favoured.

use crate::ai::context::ConversationContext;
use crate::ai::lexicon::{IntentDefinition, Lexicon};
use crate::config::{EngineConfig, IntentConfig, MatchingConfig};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    GetQuote,
    Portfolio,
    TechnicalInfo,
    ScheduleMeeting,
    Timeline,
    Process,
    Support,
    /// Fallback when nothing scores above the confidence floor.
    GeneralInquiry,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::GetQuote => "get_quote",
            Intent::Portfolio => "portfolio",
            Intent::TechnicalInfo => "technical_info",
            Intent::ScheduleMeeting => "schedule_meeting",
            Intent::Timeline => "timeline",
            Intent::Process => "process",
            Intent::Support => "support",
            Intent::GeneralInquiry => "general_inquiry",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubIntent {
    BudgetConstraint,
    DetailedPricing,
    IndustryExamples,
    RecentWork,
    Frontend,
    Backend,
    EcommercePlatform,
    VideoCall,
    InPerson,
    Rush,
    Flexible,
    GettingStarted,
    Revisions,
    BugFix,
    Maintenance,
}

impl SubIntent {
    pub fn label(&self) -> &'static str {
        match self {
            SubIntent::BudgetConstraint => "budget_constraint",
            SubIntent::DetailedPricing => "detailed_pricing",
            SubIntent::IndustryExamples => "industry_examples",
            SubIntent::RecentWork => "recent_work",
            SubIntent::Frontend => "frontend",
            SubIntent::Backend => "backend",
            SubIntent::EcommercePlatform => "ecommerce_platform",
            SubIntent::VideoCall => "video_call",
            SubIntent::InPerson => "in_person",
            SubIntent::Rush => "rush",
            SubIntent::Flexible => "flexible",
            SubIntent::GettingStarted => "getting_started",
            SubIntent::Revisions => "revisions",
            SubIntent::BugFix => "bug_fix",
            SubIntent::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for SubIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_intent: Option<SubIntent>,
}

impl IntentResult {
    fn fallback(config: &IntentConfig) -> Self {
        Self {
            intent: Intent::GeneralInquiry,
            confidence: config.fallback_confidence,
            sub_intent: None,
        }
    }
}

/// Borrowed view over the lexicon and the tunables the classifier needs.
pub struct IntentClassifier<'a> {
    lexicon: &'a Lexicon,
    config: &'a IntentConfig,
    matching: &'a MatchingConfig,
}

impl<'a> IntentClassifier<'a> {
    pub fn new(lexicon: &'a Lexicon, config: &'a EngineConfig) -> Self {
        Self {
            lexicon,
            config: &config.intent,
            matching: &config.matching,
        }
    }

    /// Pick the best intent for `text`. Reads `context`, never mutates it.
    pub fn classify(&self, text: &str, context: &ConversationContext) -> IntentResult {
        let lower = text.to_lowercase();
        let words = words_of(&lower);

        let mut scored: Vec<(&IntentDefinition, f32)> = self
            .lexicon
            .intents()
            .iter()
            .map(|def| {
                let base = self.base_score(&lower, &words, &def.patterns);
                (def, base * self.context_boost(def, context))
            })
            .collect();

        // Stable: equal scores keep declaration order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let Some(&(best, confidence)) = scored.first() else {
            return IntentResult::fallback(self.config);
        };
        if confidence < self.config.confidence_floor {
            return IntentResult::fallback(self.config);
        }

        IntentResult {
            intent: best.intent,
            confidence,
            sub_intent: self.resolve_sub_intent(&lower, best),
        }
    }

    fn base_score(&self, lower: &str, words: &[&str], patterns: &[String]) -> f32 {
        if patterns.is_empty() {
            return 0.0;
        }
        let total: f32 = patterns
            .iter()
            .map(|p| pattern_weight(lower, words, p, self.matching.stem_min_len))
            .sum();
        total / patterns.len() as f32
    }

    fn context_boost(&self, def: &IntentDefinition, context: &ConversationContext) -> f32 {
        let mut boost = 1.0;
        let label = def.intent.label();
        if context
            .conversation_history
            .iter()
            .any(|turn| turn.to_lowercase().contains(label))
        {
            boost *= self.config.history_boost;
        }
        if context.last_topic == Some(def.intent) {
            boost *= self.config.topic_boost;
        }
        boost
    }

    fn resolve_sub_intent(&self, lower: &str, def: &IntentDefinition) -> Option<SubIntent> {
        let mut best: Option<(SubIntent, f32)> = None;
        for sub in &def.sub_intents {
            if sub.patterns.is_empty() {
                continue;
            }
            let matches = sub.patterns.iter().filter(|p| lower.contains(p.as_str())).count();
            let score = matches as f32 / sub.patterns.len() as f32;
            if score <= self.config.sub_intent_threshold {
                continue;
            }
            match best {
                Some((_, s)) if s >= score => {}
                _ => best = Some((sub.name, score)),
            }
        }
        best.map(|(name, _)| name)
    }
}

/// Classify with the built-in lexicon and default tuning.
pub fn classify_intent(text: &str, context: &ConversationContext) -> IntentResult {
    let config = EngineConfig::default();
    IntentClassifier::new(Lexicon::builtin(), &config).classify(text, context)
}

fn pattern_weight(lower: &str, words: &[&str], pattern: &str, stem_min_len: usize) -> f32 {
    if lower.contains(pattern) {
        return 1.0;
    }
    if pattern.contains(' ') {
        return if pattern.split_whitespace().any(|part| lower.contains(part)) {
            0.5
        } else {
            0.0
        };
    }
    let stem_hit = words.iter().any(|w| {
        w.chars().count() >= stem_min_len && (pattern.starts_with(w) || w.starts_with(pattern))
    });
    if stem_hit {
        0.3
    } else {
        0.0
    }
}

/// Whitespace tokens with surrounding punctuation stripped.
pub(crate) fn words_of(lower: &str) -> Vec<&str> {
    lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
        .collect()
}
