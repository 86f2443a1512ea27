//! Lexicon tables: canonical concept → trigger phrases.
//!
//! The tables are declarative JSON (`lexicon.json` is embedded as the
//! default) so they can be extended without touching the matchers. Loading
//! normalizes every phrase to lowercase and precompiles the word-boundary
//! regexes the exact pass needs.

use crate::ai::intent::{Intent, SubIntent};
use crate::ai::matcher::boundary_regex;
use crate::ai::sentiment::EmotionCategory;
use crate::error::{EngineError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

const BUILTIN_LEXICON: &str = include_str!("lexicon.json");

static BUILTIN: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::from_json_str(BUILTIN_LEXICON).expect("embedded lexicon.json must be valid")
});

// ── Raw (serialized) form ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptEntry {
    pub concept: String,
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionEntry {
    pub category: EmotionCategory,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubIntentDefinition {
    pub name: SubIntent,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub intent: Intent,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub sub_intents: Vec<SubIntentDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconData {
    pub services: Vec<ConceptEntry>,
    pub technologies: Vec<ConceptEntry>,
    pub business_types: Vec<ConceptEntry>,
    pub urgency: Vec<ConceptEntry>,
    pub industries: Vec<ConceptEntry>,
    pub emotions: Vec<EmotionEntry>,
    pub negations: Vec<String>,
    pub intensifiers: Vec<String>,
    pub intents: Vec<IntentDefinition>,
}

// ── Compiled form ──────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Synonym {
    pub text: String,
    pub boundary: Regex,
}

#[derive(Debug, Clone)]
pub struct Concept {
    pub name: String,
    pub synonyms: Vec<Synonym>,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    services: Vec<Concept>,
    technologies: Vec<Concept>,
    business_types: Vec<Concept>,
    urgency: Vec<Concept>,
    industries: Vec<Concept>,
    emotions: Vec<EmotionEntry>,
    negation: Option<Regex>,
    intensifiers: Vec<String>,
    intents: Vec<IntentDefinition>,
}

impl Lexicon {
    /// The embedded default tables.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: LexiconData =
            serde_json::from_str(json).map_err(|source| EngineError::Parse {
                label: "lexicon".to_string(),
                source,
            })?;
        Self::compile(data)
    }

    /// Read a lexicon file in the same JSON shape as the embedded default.
    pub fn load(path: &Path) -> Result<Self> {
        let data: LexiconData = crate::config::try_load_json(path, "Lexicon")?;
        let lexicon = Self::compile(data)?;
        tracing::info!(
            path = %path.display(),
            intents = lexicon.intents.len(),
            "[Lexicon] Loaded custom lexicon"
        );
        Ok(lexicon)
    }

    pub fn compile(data: LexiconData) -> Result<Self> {
        let negations = normalize_list(data.negations);
        let negation = if negations.is_empty() {
            None
        } else {
            let alternation = negations
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
                .map_err(|e| EngineError::InvalidLexicon(format!("negations: {}", e)))?;
            Some(re)
        };

        let emotions = data
            .emotions
            .into_iter()
            .map(|e| EmotionEntry {
                category: e.category,
                keywords: normalize_list(e.keywords),
            })
            .collect();

        let mut intents = Vec::with_capacity(data.intents.len());
        for def in data.intents {
            let patterns = normalize_list(def.patterns);
            if patterns.is_empty() {
                return Err(EngineError::InvalidLexicon(format!(
                    "intent '{}' has no patterns",
                    def.intent
                )));
            }
            let mut sub_intents = Vec::with_capacity(def.sub_intents.len());
            for sub in def.sub_intents {
                let sub_patterns = normalize_list(sub.patterns);
                if sub_patterns.is_empty() {
                    return Err(EngineError::InvalidLexicon(format!(
                        "sub-intent '{}' has no patterns",
                        sub.name
                    )));
                }
                sub_intents.push(SubIntentDefinition {
                    name: sub.name,
                    patterns: sub_patterns,
                });
            }
            intents.push(IntentDefinition {
                intent: def.intent,
                patterns,
                sub_intents,
            });
        }

        Ok(Self {
            services: compile_family("services", data.services)?,
            technologies: compile_family("technologies", data.technologies)?,
            business_types: compile_family("business_types", data.business_types)?,
            urgency: compile_family("urgency", data.urgency)?,
            industries: compile_family("industries", data.industries)?,
            emotions,
            negation,
            intensifiers: normalize_list(data.intensifiers),
            intents,
        })
    }

    pub fn services(&self) -> &[Concept] {
        &self.services
    }

    pub fn technologies(&self) -> &[Concept] {
        &self.technologies
    }

    pub fn business_types(&self) -> &[Concept] {
        &self.business_types
    }

    pub fn urgency(&self) -> &[Concept] {
        &self.urgency
    }

    pub fn industries(&self) -> &[Concept] {
        &self.industries
    }

    pub fn emotions(&self) -> &[EmotionEntry] {
        &self.emotions
    }

    pub fn intensifiers(&self) -> &[String] {
        &self.intensifiers
    }

    pub fn intents(&self) -> &[IntentDefinition] {
        &self.intents
    }

    /// Whole-word search for any negation word.
    pub fn has_negation(&self, text: &str) -> bool {
        self.negation
            .as_ref()
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    }
}

fn normalize_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn compile_family(family: &str, entries: Vec<ConceptEntry>) -> Result<Vec<Concept>> {
    entries
        .into_iter()
        .map(|entry| {
            let synonyms = normalize_list(entry.synonyms)
                .into_iter()
                .map(|text| {
                    let boundary = boundary_regex(&text).map_err(|e| {
                        EngineError::InvalidLexicon(format!("{}/{}: {}", family, entry.concept, e))
                    })?;
                    Ok(Synonym { text, boundary })
                })
                .collect::<Result<Vec<_>>>()?;
            if synonyms.is_empty() {
                return Err(EngineError::InvalidLexicon(format!(
                    "{}/{} has no synonyms",
                    family, entry.concept
                )));
            }
            Ok(Concept {
                name: entry.concept.trim().to_lowercase(),
                synonyms,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lexicon_compiles() {
        let lexicon = Lexicon::builtin();
        assert!(!lexicon.services().is_empty());
        assert!(!lexicon.technologies().is_empty());
        assert_eq!(lexicon.emotions().len(), 9);
        assert_eq!(lexicon.intents().len(), 7);
        assert_eq!(lexicon.intents()[0].intent, Intent::GetQuote);
    }

    #[test]
    fn negation_is_whole_word() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.has_negation("i am not sure"));
        assert!(lexicon.has_negation("I don't like it"));
        assert!(!lexicon.has_negation("nothingness is a notion"));
        assert!(!lexicon.has_negation(""));
    }

    #[test]
    fn phrases_are_normalized() {
        let json = r#"{
            "services": [{ "concept": "Website", "synonyms": ["  Web Site ", ""] }],
            "technologies": [], "business_types": [], "urgency": [], "industries": [],
            "emotions": [], "negations": [], "intensifiers": [],
            "intents": [{ "intent": "support", "patterns": ["HELP"] }]
        }"#;
        let lexicon = Lexicon::from_json_str(json).unwrap();
        let website = &lexicon.services()[0];
        assert_eq!(website.name, "website");
        assert_eq!(website.synonyms.len(), 1);
        assert_eq!(website.synonyms[0].text, "web site");
        assert_eq!(lexicon.intents()[0].patterns, vec!["help".to_string()]);
        assert!(!lexicon.has_negation("not"));
    }

    #[test]
    fn empty_pattern_lists_are_rejected() {
        let json = r#"{
            "services": [], "technologies": [], "business_types": [], "urgency": [],
            "industries": [], "emotions": [], "negations": [], "intensifiers": [],
            "intents": [{ "intent": "portfolio", "patterns": [" "] }]
        }"#;
        let err = Lexicon::from_json_str(json).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLexicon(_)));
    }

    #[test]
    fn unknown_intent_name_is_a_parse_error() {
        let json = r#"{
            "services": [], "technologies": [], "business_types": [], "urgency": [],
            "industries": [], "emotions": [], "negations": [], "intensifiers": [],
            "intents": [{ "intent": "order_pizza", "patterns": ["pizza"] }]
        }"#;
        assert!(matches!(
            Lexicon::from_json_str(json),
            Err(EngineError::Parse { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        std::fs::write(&path, BUILTIN_LEXICON).unwrap();
        let lexicon = Lexicon::load(&path).unwrap();
        assert_eq!(lexicon.intents().len(), Lexicon::builtin().intents().len());

        let missing = Lexicon::load(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(EngineError::Io { .. })));
    }
}
