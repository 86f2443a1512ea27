//! Entity extraction: lexicon concepts plus fixed regex families.
//!
//! Lexicon families run a cascade per concept (exact → phrase → fuzzy →
//! partial) and stop at the first pass that fires, so each concept yields at
//! most one entity with the confidence of the strongest evidence. Price,
//! timeline, contact, location and question entities come from ordered
//! regex lists with a fixed confidence per pattern.

use crate::ai::lexicon::{Concept, Lexicon};
use crate::ai::matcher::{fuzzy_match, phrase_match};
use crate::config::{EngineConfig, MatchingConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Service,
    Technology,
    Price,
    Timeline,
    Location,
    Contact,
    BusinessType,
    Urgency,
    Industry,
    Question,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Service => "service",
            EntityKind::Technology => "technology",
            EntityKind::Price => "price",
            EntityKind::Timeline => "timeline",
            EntityKind::Location => "location",
            EntityKind::Contact => "contact",
            EntityKind::BusinessType => "business_type",
            EntityKind::Urgency => "urgency",
            EntityKind::Industry => "industry",
            EntityKind::Question => "question",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub value: String,
    pub confidence: f32,
}

impl Entity {
    pub fn new(kind: EntityKind, value: impl Into<String>, confidence: f32) -> Self {
        Self {
            kind,
            value: value.into(),
            confidence,
        }
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> (EntityKind, &str) {
        (self.kind, self.value.as_str())
    }
}

/// Keep the first occurrence of every `(type, value)` pair.
pub fn dedup_entities(entities: Vec<Entity>) -> Vec<Entity> {
    let mut seen: HashSet<(EntityKind, String)> = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert((e.kind, e.value.clone())))
        .collect()
}

// ── Lexicon family policies ────────────────────────────────

/// Confidence awarded by each pass of the concept cascade.
#[derive(Debug, Clone, Copy)]
struct FamilyPolicy {
    kind: EntityKind,
    exact: f32,
    phrase: f32,
    /// `None` disables the fuzzy pass for the family.
    fuzzy: Option<f32>,
    partial: f32,
}

const SERVICES: FamilyPolicy = FamilyPolicy {
    kind: EntityKind::Service,
    exact: 0.95,
    phrase: 0.90,
    fuzzy: Some(0.80),
    partial: 0.75,
};

const TECHNOLOGIES: FamilyPolicy = FamilyPolicy {
    kind: EntityKind::Technology,
    exact: 0.95,
    phrase: 0.90,
    fuzzy: Some(0.85),
    partial: 0.80,
};

const fn plain_family(kind: EntityKind) -> FamilyPolicy {
    FamilyPolicy {
        kind,
        exact: 0.90,
        phrase: 0.85,
        fuzzy: None,
        partial: 0.70,
    }
}

// ── Regex families ─────────────────────────────────────────

fn compile_patterns(patterns: &[(&str, f32)]) -> Vec<(Regex, f32)> {
    patterns
        .iter()
        .map(|(p, conf)| (Regex::new(p).expect("built-in entity pattern"), *conf))
        .collect()
}

static PRICE_PATTERNS: LazyLock<Vec<(Regex, f32)>> = LazyLock::new(|| {
    compile_patterns(&[
        // $5k - $10k, $2,000 to 3,000
        (
            r"\$\s?\d+(?:,\d{3})*k?\s*(?:-|to)\s*\$?\d+(?:,\d{3})*k?",
            0.95,
        ),
        (r"\$\s?\d+(?:,\d{3})*(?:\.\d{1,2})?k?", 0.9),
        (
            r"\bbudget\s+(?:of|is|around|about|under)\s+\$?\d+(?:,\d{3})*k?",
            0.9,
        ),
        (r"\b\d+(?:,\d{3})*k?\s?(?:dollars|usd|bucks)\b", 0.85),
        (
            r"\b(?:cheap|affordable|expensive|pricing|price|cost|quote|estimate)\b",
            0.7,
        ),
    ])
});

static TIMELINE_PATTERNS: LazyLock<Vec<(Regex, f32)>> = LazyLock::new(|| {
    compile_patterns(&[
        (r"\b(?:asap|urgent(?:ly)?|immediately|right away|rush)\b", 0.9),
        (r"\b(?:in|within)\s+\d+\s+(?:days?|weeks?|months?)\b", 0.9),
        (
            r"\b(?:today|tomorrow|tonight|this week|next week|this month|next month|end of (?:the )?(?:week|month|year))\b",
            0.85,
        ),
        (
            r"\b(?:by|before|on|next)\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
            0.85,
        ),
        (
            r"\b(?:by|before|in|until)\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)(?:\s+\d{1,2}(?:st|nd|rd|th)?)?\b",
            0.85,
        ),
        (r"\bdeadline\b", 0.8),
    ])
});

static CONTACT_PATTERNS: LazyLock<Vec<(Regex, f32)>> = LazyLock::new(|| {
    compile_patterns(&[
        (r"\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b", 0.95),
        (
            r"(?:\+?1[\s.-]?)?\(?\b\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b",
            0.9,
        ),
        (
            r"\b(?:call|email|contact|reach|phone|text|message)\s+(?:me|us)\b",
            0.75,
        ),
    ])
});

/// Runs on the original text so the place name keeps its capitalization.
static PLACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[Ii]n|[Ff]rom|[Aa]t|[Nn]ear|[Aa]round)\s+([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*)")
        .expect("built-in location pattern")
});

static REMOTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:remote(?:ly)?|work from home|wfh|virtual(?:ly)?|online meetings?)\b")
        .expect("built-in remote pattern")
});

static LOCAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:local(?:ly)?|on-?site|in[- ]person|nearby|same city)\b")
        .expect("built-in local pattern")
});

static QUESTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:what|how|why|when|where|who|which|can|could|would|will|do|does|did|is|are|should|may)\b",
    )
    .expect("built-in question pattern")
});

// ── Extractor ──────────────────────────────────────────────

pub struct EntityExtractor<'a> {
    lexicon: &'a Lexicon,
    matching: &'a MatchingConfig,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon, config: &'a EngineConfig) -> Self {
        Self {
            lexicon,
            matching: &config.matching,
        }
    }

    /// Extract every entity in `text`, deduplicated by `(type, value)`.
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let lower = text.to_lowercase();
        let mut found = Vec::new();

        let families: [(&[Concept], FamilyPolicy); 5] = [
            (self.lexicon.services(), SERVICES),
            (self.lexicon.technologies(), TECHNOLOGIES),
            (
                self.lexicon.business_types(),
                plain_family(EntityKind::BusinessType),
            ),
            (self.lexicon.urgency(), plain_family(EntityKind::Urgency)),
            (self.lexicon.industries(), plain_family(EntityKind::Industry)),
        ];
        for (concepts, policy) in families {
            for concept in concepts {
                if let Some(confidence) = self.match_concept(&lower, concept, policy) {
                    found.push(Entity::new(policy.kind, concept.name.clone(), confidence));
                }
            }
        }

        push_pattern_matches(&lower, &PRICE_PATTERNS, EntityKind::Price, &mut found);
        push_pattern_matches(&lower, &TIMELINE_PATTERNS, EntityKind::Timeline, &mut found);
        push_pattern_matches(&lower, &CONTACT_PATTERNS, EntityKind::Contact, &mut found);

        for caps in PLACE_PATTERN.captures_iter(text) {
            if let Some(place) = caps.get(1) {
                found.push(Entity::new(EntityKind::Location, place.as_str(), 0.80));
            }
        }
        if REMOTE_PATTERN.is_match(&lower) {
            found.push(Entity::new(EntityKind::Location, "remote", 0.85));
        }
        if LOCAL_PATTERN.is_match(&lower) {
            found.push(Entity::new(EntityKind::Location, "local", 0.85));
        }

        if lower.contains('?') || QUESTION_PATTERN.is_match(&lower) {
            found.push(Entity::new(EntityKind::Question, "question", 0.9));
        }

        dedup_entities(found)
    }

    fn match_concept(&self, lower: &str, concept: &Concept, policy: FamilyPolicy) -> Option<f32> {
        if concept.synonyms.iter().any(|s| s.boundary.is_match(lower)) {
            return Some(policy.exact);
        }
        if concept
            .synonyms
            .iter()
            .any(|s| phrase_match(lower, &s.text))
        {
            return Some(policy.phrase);
        }
        if let Some(fuzzy_confidence) = policy.fuzzy {
            let fuzzy_hit = concept.synonyms.iter().any(|s| {
                s.text.chars().count() > self.matching.fuzzy_min_term_len
                    && fuzzy_match(lower, &s.text, self.matching.fuzzy_threshold)
            });
            if fuzzy_hit {
                return Some(fuzzy_confidence);
            }
        }
        if concept.synonyms.iter().any(|s| {
            s.text.chars().count() >= self.matching.partial_min_len && lower.contains(&s.text)
        }) {
            return Some(policy.partial);
        }
        None
    }
}

fn push_pattern_matches(
    lower: &str,
    patterns: &[(Regex, f32)],
    kind: EntityKind,
    found: &mut Vec<Entity>,
) {
    for (re, confidence) in patterns {
        for m in re.find_iter(lower) {
            found.push(Entity::new(kind, m.as_str().trim(), *confidence));
        }
    }
}

/// Extract with the built-in lexicon and default tuning.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let config = EngineConfig::default();
    EntityExtractor::new(Lexicon::builtin(), &config).extract(text)
}
