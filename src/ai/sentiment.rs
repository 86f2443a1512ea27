//! User Sentiment Analysis: detect emotional tone from user messages.
//!
//! Keyword-based scoring (fast, no model call) over nine emotion
//! categories. Single words, substrings and 2–3 word phrase windows all
//! contribute; an intensifier anywhere in the message amplifies every
//! category, and a negation word flips positive feelings into frustration.
//! The result feeds the conversation's mood so replies can match the
//! visitor's tone.

use crate::ai::intent::words_of;
use crate::ai::lexicon::Lexicon;
use crate::config::{EmotionConfig, EngineConfig};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionCategory {
    Excited,
    Satisfied,
    Interested,
    Hopeful,
    Frustrated,
    Angry,
    Confused,
    Impatient,
    Concerned,
    /// Synthetic bucket that absorbs negated negative feelings.
    Neutral,
}

impl EmotionCategory {
    /// Categories that flip into frustration when negated.
    fn flips_under_negation(&self) -> bool {
        matches!(self, Self::Excited | Self::Satisfied | Self::Hopeful)
    }

    /// Categories that fade into the neutral bucket when negated.
    fn fades_under_negation(&self) -> bool {
        matches!(self, Self::Frustrated | Self::Angry | Self::Concerned)
    }

    fn is_positive(&self) -> bool {
        matches!(
            self,
            Self::Excited | Self::Satisfied | Self::Hopeful | Self::Interested
        )
    }

    fn is_negative(&self) -> bool {
        matches!(self, Self::Frustrated | Self::Angry | Self::Concerned)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Single label used to pick a reply's tone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Positive,
    Negative,
    #[default]
    Neutral,
    Confused,
    Impatient,
    Interested,
}

impl From<Sentiment> for Mood {
    fn from(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Positive => Mood::Positive,
            Sentiment::Negative => Mood::Negative,
            Sentiment::Neutral => Mood::Neutral,
        }
    }
}

/// Detected emotional state of one user message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub sentiment: Sentiment,
    /// Categories scoring above the dominance threshold, strongest first.
    pub emotions: Vec<EmotionCategory>,
    /// Total emotional signal, clamped to `0.0..=1.0`.
    pub intensity: f32,
    pub mood: Mood,
}

const EXACT_WEIGHT: f32 = 0.3;
const PARTIAL_WEIGHT: f32 = 0.1;
const PHRASE_WEIGHT: f32 = 0.2;

pub struct EmotionAnalyzer<'a> {
    lexicon: &'a Lexicon,
    config: &'a EmotionConfig,
}

impl<'a> EmotionAnalyzer<'a> {
    pub fn new(lexicon: &'a Lexicon, config: &'a EngineConfig) -> Self {
        Self {
            lexicon,
            config: &config.emotion,
        }
    }

    pub fn analyze(&self, text: &str) -> EmotionResult {
        let lower = text.to_lowercase();
        let words = words_of(&lower);
        if words.is_empty() {
            return EmotionResult::default();
        }
        let phrases = phrase_windows(&words);

        let negated = self.lexicon.has_negation(&lower);
        let multiplier = if self
            .lexicon
            .intensifiers()
            .iter()
            .any(|i| lower.contains(i.as_str()))
        {
            self.config.intensifier_multiplier
        } else {
            1.0
        };

        let mut scores: Vec<(EmotionCategory, f32)> = self
            .lexicon
            .emotions()
            .iter()
            .map(|entry| {
                let raw: f32 = entry
                    .keywords
                    .iter()
                    .map(|kw| keyword_score(kw, &words, &phrases))
                    .sum();
                (entry.category, raw * multiplier)
            })
            .collect();

        if negated {
            scores = apply_negation(scores);
        }

        let total: f32 = scores.iter().map(|(_, s)| s).sum();

        let mut dominant: Vec<(EmotionCategory, f32)> = scores
            .iter()
            .copied()
            .filter(|(_, s)| *s > self.config.dominant_threshold)
            .collect();
        dominant.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let sentiment = self.classify_sentiment(total, &dominant, &scores);
        let has = |cat: EmotionCategory| dominant.iter().any(|(c, _)| *c == cat);
        let mood = if has(EmotionCategory::Confused) {
            Mood::Confused
        } else if has(EmotionCategory::Impatient) {
            Mood::Impatient
        } else if has(EmotionCategory::Interested) {
            Mood::Interested
        } else {
            Mood::from(sentiment)
        };

        EmotionResult {
            sentiment,
            emotions: dominant.into_iter().map(|(c, _)| c).collect(),
            intensity: total.clamp(0.0, 1.0),
            mood,
        }
    }

    fn classify_sentiment(
        &self,
        total: f32,
        dominant: &[(EmotionCategory, f32)],
        scores: &[(EmotionCategory, f32)],
    ) -> Sentiment {
        if total <= self.config.neutral_intensity {
            return Sentiment::Neutral;
        }
        let has_positive = dominant.iter().any(|(c, _)| c.is_positive());
        let has_negative = dominant.iter().any(|(c, _)| c.is_negative());

        match (has_positive, has_negative) {
            (true, false) => Sentiment::Positive,
            (false, true) => Sentiment::Negative,
            (true, true) => {
                let positive: f32 = scores
                    .iter()
                    .filter(|(c, _)| c.is_positive())
                    .map(|(_, s)| s)
                    .sum();
                let negative: f32 = scores
                    .iter()
                    .filter(|(c, _)| c.is_negative())
                    .map(|(_, s)| s)
                    .sum();
                match positive.partial_cmp(&negative) {
                    Some(Ordering::Greater) => Sentiment::Positive,
                    Some(Ordering::Less) => Sentiment::Negative,
                    _ => Sentiment::Neutral,
                }
            }
            (false, false) => Sentiment::Neutral,
        }
    }
}

/// Analyze with the built-in lexicon and default tuning.
pub fn analyze_emotion(text: &str) -> EmotionResult {
    let config = EngineConfig::default();
    EmotionAnalyzer::new(Lexicon::builtin(), &config).analyze(text)
}

fn keyword_score(keyword: &str, words: &[&str], phrases: &[String]) -> f32 {
    let exact = words.iter().filter(|w| **w == keyword).count();
    let partial = words
        .iter()
        .filter(|w| **w != keyword && w.contains(keyword))
        .count();
    let phrase = phrases.iter().filter(|p| p.as_str() == keyword).count();

    EXACT_WEIGHT * exact as f32 + PARTIAL_WEIGHT * partial as f32 + PHRASE_WEIGHT * phrase as f32
}

/// All 2-word and 3-word sliding windows.
fn phrase_windows(words: &[&str]) -> Vec<String> {
    let mut phrases = Vec::new();
    for size in 2..=3 {
        if words.len() >= size {
            phrases.extend(words.windows(size).map(|w| w.join(" ")));
        }
    }
    phrases
}

/// Negation moves positive feelings into frustration and halves negative
/// feelings into a neutral bucket. Both transfers use pre-negation scores.
fn apply_negation(scores: Vec<(EmotionCategory, f32)>) -> Vec<(EmotionCategory, f32)> {
    let flipped: f32 = scores
        .iter()
        .filter(|(c, _)| c.flips_under_negation())
        .map(|(_, s)| s)
        .sum();
    let faded: f32 = scores
        .iter()
        .filter(|(c, _)| c.fades_under_negation())
        .map(|(_, s)| s * 0.5)
        .sum();

    let mut adjusted: Vec<(EmotionCategory, f32)> = scores
        .into_iter()
        .map(|(c, s)| {
            if c.flips_under_negation() || c.fades_under_negation() {
                (c, 0.0)
            } else {
                (c, s)
            }
        })
        .collect();

    match adjusted
        .iter_mut()
        .find(|(c, _)| *c == EmotionCategory::Frustrated)
    {
        Some((_, s)) => *s += flipped,
        None => adjusted.push((EmotionCategory::Frustrated, flipped)),
    }
    adjusted.push((EmotionCategory::Neutral, faded));
    adjusted
}
