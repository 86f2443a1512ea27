//! Business profile: the company copy replies are templated from.
//!
//! Every field is optional on disk; missing ones fall back to a stock
//! sentence so a half-filled profile still yields complete replies.

use crate::config::load_json_config;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_COMPANY: &str = "our studio";
const DEFAULT_SERVICES: &str =
    "We build websites, online stores, web apps and brand identities for small businesses.";
const DEFAULT_PORTFOLIO: &str =
    "We've shipped projects for restaurants, retailers, clinics and startups.";
const DEFAULT_PRICING: &str =
    "Most websites start around $2,500, and online stores start around $5,000.";
const DEFAULT_CONTACT: &str = "You can reach us any time through the contact form on this site.";
const DEFAULT_PROCESS: &str =
    "We start with a discovery call, then move through design, development, review and launch.";
const DEFAULT_TURNAROUND: &str = "A typical website takes 4 to 6 weeks from kickoff to launch.";
const DEFAULT_TECHNOLOGY: &str =
    "We work with React, Vue, WordPress, Shopify and Node, hosted on modern cloud platforms.";
const DEFAULT_SUPPORT: &str =
    "We offer monthly care plans covering updates, backups and fixes.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessProfile {
    pub company_name: Option<String>,
    pub tagline: Option<String>,
    pub services: Option<String>,
    pub portfolio: Option<String>,
    pub pricing: Option<String>,
    pub contact: Option<String>,
    pub process: Option<String>,
    pub turnaround: Option<String>,
    pub technology: Option<String>,
    pub support: Option<String>,
}

fn or_default<'a>(field: &'a Option<String>, fallback: &'static str) -> &'a str {
    match field.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => fallback,
    }
}

impl BusinessProfile {
    /// Missing or unreadable files yield the stock profile.
    pub fn load(path: &Path) -> Self {
        load_json_config(path, "BusinessProfile")
    }

    pub fn company_name(&self) -> &str {
        or_default(&self.company_name, DEFAULT_COMPANY)
    }

    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn services(&self) -> &str {
        or_default(&self.services, DEFAULT_SERVICES)
    }

    pub fn portfolio(&self) -> &str {
        or_default(&self.portfolio, DEFAULT_PORTFOLIO)
    }

    pub fn pricing(&self) -> &str {
        or_default(&self.pricing, DEFAULT_PRICING)
    }

    pub fn contact(&self) -> &str {
        or_default(&self.contact, DEFAULT_CONTACT)
    }

    pub fn process(&self) -> &str {
        or_default(&self.process, DEFAULT_PROCESS)
    }

    pub fn turnaround(&self) -> &str {
        or_default(&self.turnaround, DEFAULT_TURNAROUND)
    }

    pub fn technology(&self) -> &str {
        or_default(&self.technology, DEFAULT_TECHNOLOGY)
    }

    pub fn support(&self) -> &str {
        or_default(&self.support, DEFAULT_SUPPORT)
    }
}
