//! Engine configuration and shared JSON config utilities.
//!
//! Every tunable constant of the pipeline lives here so a deployment can
//! adjust thresholds without touching the matching code. Missing fields in a
//! config file fall back to the defaults below.

use crate::error::{EngineError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match try_load_json::<T>(path, label) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "[{}] Loaded config", label);
            config
        }
        Err(EngineError::Io { .. }) => {
            tracing::info!(
                path = %path.display(),
                "[{}] No config file, using defaults",
                label
            );
            T::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "[{}] Unusable config, using defaults", label);
            T::default()
        }
    }
}

/// Strict variant of [`load_json_config`]: read and parse, or report why not.
pub fn try_load_json<T: DeserializeOwned>(path: &Path, label: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str::<T>(&content).map_err(|source| EngineError::Parse {
        label: format!("{} ({})", label, path.display()),
        source,
    })
}

/// Generic save for any Serde config type.
pub fn save_json_config<T: Serialize>(path: &Path, config: &T, label: &str) -> Result<()> {
    let io_err = |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(config).map_err(|source| EngineError::Parse {
        label: label.to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)?;
    tracing::info!(path = %path.display(), "[{}] Saved config", label);
    Ok(())
}

// ── Engine configuration ───────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub matching: MatchingConfig,
    pub intent: IntentConfig,
    pub emotion: EmotionConfig,
    pub retention: RetentionConfig,
    pub typing: TypingConfig,
    pub conversation: ConversationConfig,
    /// Replaces the built-in lexicon when set.
    pub lexicon_path: Option<PathBuf>,
    /// Business profile used to template replies.
    pub profile_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Similarity needed for a lexicon synonym to fuzzy-match a token.
    pub fuzzy_threshold: f32,
    /// Only synonyms longer than this are tried in the fuzzy pass.
    pub fuzzy_min_term_len: usize,
    /// Substring fallback ignores synonyms shorter than this. 0 keeps plain
    /// containment; 4 stops "bar" firing inside "barbershop".
    pub partial_min_len: usize,
    /// Input words shorter than this never count as stem matches. 1 lets
    /// every word count.
    pub stem_min_len: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
            fuzzy_min_term_len: 3,
            partial_min_len: 0,
            stem_min_len: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Below this the classifier answers `general_inquiry`.
    pub confidence_floor: f32,
    pub fallback_confidence: f32,
    /// Multiplier when an earlier turn mentions the intent by name.
    pub history_boost: f32,
    /// Multiplier when the intent equals the previous turn's topic.
    pub topic_boost: f32,
    pub sub_intent_threshold: f32,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.15,
            fallback_confidence: 0.1,
            history_boost: 1.2,
            topic_boost: 1.3,
            sub_intent_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    pub intensifier_multiplier: f32,
    /// Categories scoring above this are reported as dominant.
    pub dominant_threshold: f32,
    /// Total intensity at or below this is always neutral.
    pub neutral_intensity: f32,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            intensifier_multiplier: 1.5,
            dominant_threshold: 0.1,
            neutral_intensity: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub max_recent_topics: usize,
    pub max_history: usize,
    pub max_mood_history: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_recent_topics: 5,
            max_history: 100,
            max_mood_history: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Assumed reading speed of the visitor.
    pub words_per_minute: f64,
    pub avg_word_length: f64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200.0,
            avg_word_length: 5.0,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Turns that always open with the welcome greeting.
    pub welcome_turns: u32,
    /// Replies after this turn end with a closing offer.
    pub closing_after_turn: u32,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            welcome_turns: 2,
            closing_after_turn: 3,
        }
    }
}
