//! Response synthesizer: turns one analyzed turn into a scripted reply.
//!
//! A reply is `greeting + body [+ closing]`. The greeting depends on how far
//! into the conversation we are and on the visitor's mood; the body is the
//! intent's base copy plus at most one entity clause and one sub-intent
//! clause. Every branch also yields three follow-up suggestion chips.

use crate::ai::context::ConversationContext;
use crate::ai::entities::{Entity, EntityKind};
use crate::ai::intent::{Intent, IntentResult, SubIntent};
use crate::ai::profile::BusinessProfile;
use crate::ai::sentiment::Mood;
use crate::config::ConversationConfig;
use serde::{Deserialize, Serialize};

const WELCOME: &str = "Thanks for reaching out! ";
const CLOSING: &str = " Is there anything else you'd like to know?";
const CLOSING_MARKER: &str = "anything else";

/// Text and chips for one system turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub suggestions: Vec<String>,
}

pub struct ResponseSynthesizer<'a> {
    profile: &'a BusinessProfile,
    config: &'a ConversationConfig,
}

impl<'a> ResponseSynthesizer<'a> {
    pub fn new(profile: &'a BusinessProfile, config: &'a ConversationConfig) -> Self {
        Self { profile, config }
    }

    /// `context` must already include this turn.
    pub fn compose(
        &self,
        intent: &IntentResult,
        mood: Mood,
        entities: &[Entity],
        context: &ConversationContext,
    ) -> Reply {
        let greeting = self.greeting(context.turn_count, mood);

        let mut body = self.base_reply(intent.intent);
        if let Some(clause) = entity_clause(entities) {
            body.push(' ');
            body.push_str(&clause);
        }
        if let Some(sub) = intent.sub_intent {
            body.push(' ');
            body.push_str(sub_intent_clause(sub));
        }

        let mut text = format!("{}{}", greeting, body);
        if context.turn_count > self.config.closing_after_turn
            && !text.to_lowercase().contains(CLOSING_MARKER)
        {
            text.push_str(CLOSING);
        }

        Reply {
            text,
            suggestions: suggestions(intent.intent, intent.sub_intent)
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn greeting(&self, turn_count: u32, mood: Mood) -> &'static str {
        if turn_count <= self.config.welcome_turns {
            return WELCOME;
        }
        match mood {
            Mood::Negative => "I understand your concerns. ",
            Mood::Confused => "Let me clarify that for you. ",
            Mood::Impatient => "I'll get straight to the point. ",
            Mood::Interested => "Great question! ",
            Mood::Positive => "Glad to hear you're excited! ",
            Mood::Neutral => "",
        }
    }

    fn base_reply(&self, intent: Intent) -> String {
        let p = self.profile;
        match intent {
            Intent::GetQuote => format!(
                "{} For an exact quote we'd need a few details about your project.",
                p.pricing()
            ),
            Intent::Portfolio => format!(
                "{} I can point you to examples that match what you have in mind.",
                p.portfolio()
            ),
            Intent::TechnicalInfo => format!(
                "{} We pick the stack that fits your goals and budget.",
                p.technology()
            ),
            Intent::ScheduleMeeting => format!(
                "We'd love to talk it through! {} Consultations are free and take about 30 minutes.",
                p.contact()
            ),
            Intent::Timeline => format!(
                "{} Bigger projects take longer, and we confirm dates once the scope is clear.",
                p.turnaround()
            ),
            Intent::Process => p.process().to_string(),
            Intent::Support => format!(
                "{} Tell me what's going on and we'll take a look.",
                p.support()
            ),
            Intent::GeneralInquiry => {
                let intro = match p.tagline() {
                    Some(tagline) => format!("{}: {}", p.company_name(), tagline),
                    None => format!("Welcome to {}.", p.company_name()),
                };
                format!(
                    "{} {} Tell me a bit about your project and I'll point you in the right direction.",
                    intro,
                    p.services()
                )
            }
        }
    }
}

/// One clause about the most telling entity of the turn.
/// Priority: business type, urgency, industry, technology.
fn entity_clause(entities: &[Entity]) -> Option<String> {
    let find = |kind: EntityKind| entities.iter().find(|e| e.kind == kind);

    if let Some(e) = find(EntityKind::BusinessType) {
        return Some(format!(
            "We've built plenty of sites for {} clients, so we know what works.",
            display_name(&e.value).to_lowercase()
        ));
    }
    if let Some(e) = find(EntityKind::Urgency) {
        let clause = match e.value.as_str() {
            "urgent" => "We can fast-track urgent projects when our schedule allows.",
            "soon" => "We can usually get started within a week or two.",
            "flexible" => "A flexible schedule also helps keep costs down.",
            _ => "Let us know your dates and we'll plan around them.",
        };
        return Some(clause.to_string());
    }
    if let Some(e) = find(EntityKind::Industry) {
        return Some(format!(
            "We have experience in {} as well.",
            display_name(&e.value).to_lowercase()
        ));
    }
    find(EntityKind::Technology)
        .map(|e| format!("{} is one of our core tools.", display_name(&e.value)))
}

fn sub_intent_clause(sub: SubIntent) -> &'static str {
    match sub {
        SubIntent::BudgetConstraint => {
            "We also offer starter packages and payment plans for tighter budgets."
        }
        SubIntent::DetailedPricing => {
            "Every proposal comes with an itemized breakdown, so you see where each dollar goes."
        }
        SubIntent::IndustryExamples => "I can share projects from businesses similar to yours.",
        SubIntent::RecentWork => "Our latest launches are on the portfolio page.",
        SubIntent::Frontend => "Every front end we ship is responsive and fast on mobile.",
        SubIntent::Backend => "On the server side we build secure APIs and well-structured databases.",
        SubIntent::EcommercePlatform => {
            "For online stores we set up payments, checkout and inventory for you."
        }
        SubIntent::VideoCall => "We're happy to meet over Zoom, Google Meet or Teams.",
        SubIntent::InPerson => "If you're local, we can meet in person over coffee.",
        SubIntent::Rush => "Rush timelines are possible for an added fee.",
        SubIntent::Flexible => "With flexible timing we can schedule your project at the best rate.",
        SubIntent::GettingStarted => "Getting started is easy: a short call, then a written proposal.",
        SubIntent::Revisions => "Two rounds of revisions are included at every stage.",
        SubIntent::BugFix => "Send over what you're seeing and we'll diagnose it quickly.",
        SubIntent::Maintenance => "Care plans include monthly updates, backups and monitoring.",
    }
}

fn suggestions(intent: Intent, sub: Option<SubIntent>) -> [&'static str; 3] {
    match (intent, sub) {
        (Intent::GetQuote, Some(SubIntent::BudgetConstraint)) => [
            "What's in the starter package?",
            "Do you offer payment plans?",
            "What can I get for $1,000?",
        ],
        (Intent::GetQuote, _) => [
            "What affects the price?",
            "Can I see a sample proposal?",
            "Schedule a free consultation",
        ],
        (Intent::Portfolio, _) => [
            "Show me restaurant websites",
            "Do you have e-commerce examples?",
            "What was your latest project?",
        ],
        (Intent::TechnicalInfo, Some(SubIntent::EcommercePlatform)) => [
            "Shopify or WooCommerce?",
            "Which payment providers do you support?",
            "Can you migrate my current store?",
        ],
        (Intent::TechnicalInfo, _) => [
            "Do you build with React?",
            "Where do you host sites?",
            "Will my site work on mobile?",
        ],
        (Intent::ScheduleMeeting, _) => [
            "Book a video call",
            "What should I prepare?",
            "How long is the consultation?",
        ],
        (Intent::Timeline, Some(SubIntent::Rush)) => [
            "What does a rush project cost?",
            "Can you launch in two weeks?",
            "What can we launch first?",
        ],
        (Intent::Timeline, _) => [
            "How long does an online store take?",
            "What slows a project down?",
            "When could you start?",
        ],
        (Intent::Process, _) => [
            "How do we get started?",
            "How many revisions are included?",
            "Who will I be working with?",
        ],
        (Intent::Support, Some(SubIntent::BugFix)) => [
            "My site is down",
            "How fast can you fix it?",
            "Do you fix sites you didn't build?",
        ],
        (Intent::Support, _) => [
            "What's in a care plan?",
            "Do you handle updates?",
            "Report a problem",
        ],
        (Intent::GeneralInquiry, _) => [
            "What services do you offer?",
            "How much does a website cost?",
            "Can I see your portfolio?",
        ],
    }
}

/// Human-readable form of a canonical lexicon identifier.
fn display_name(value: &str) -> String {
    match value {
        "react" => "React".into(),
        "vue" => "Vue".into(),
        "angular" => "Angular".into(),
        "wordpress" => "WordPress".into(),
        "shopify" => "Shopify".into(),
        "node" => "Node.js".into(),
        "python" => "Python".into(),
        "php" => "PHP".into(),
        "javascript" => "JavaScript".into(),
        "css" => "CSS".into(),
        "database" => "Database design".into(),
        "cloud" => "Cloud hosting".into(),
        other => {
            let spaced = other.replace('_', " ");
            let mut chars = spaced.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
