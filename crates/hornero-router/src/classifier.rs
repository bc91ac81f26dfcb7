// SPDX-FileCopyrightText: 2026 Hornero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic query complexity classification.
//!
//! Classifies user messages into Simple/Medium/Complex tiers using message
//! length and keyword hits. No LLM pre-call, no network, no latency.

use hornero_config::model::ClassifierConfig;
use hornero_core::Tier;

/// Messages longer than this many characters score 1.
const LONG_MESSAGE_CHARS: usize = 120;

/// Messages longer than this many characters score 2.
const VERY_LONG_MESSAGE_CHARS: usize = 240;

/// Per-signal breakdown of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityScore {
    /// 0, 1 or 2 depending on message length.
    pub length_score: u32,
    /// Number of complex keywords found.
    pub complex_hits: u32,
    /// Number of medium keywords found.
    pub medium_hits: u32,
    /// `length_score + 2 * complex_hits + medium_hits`.
    pub total: u32,
}

impl ComplexityScore {
    /// Map the total score to a tier.
    pub fn tier(&self) -> Tier {
        match self.total {
            t if t >= 3 => Tier::Complex,
            2 => Tier::Medium,
            _ => Tier::Simple,
        }
    }
}

/// Keyword-and-length classifier. Pure and stateless after construction.
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    complex_keywords: Vec<String>,
    medium_keywords: Vec<String>,
}

impl ComplexityClassifier {
    /// Build a classifier from configured keyword lists.
    ///
    /// Keywords are lowercased here so `classify` only lowercases the input.
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            complex_keywords: lowercase_all(&config.complex_keywords),
            medium_keywords: lowercase_all(&config.medium_keywords),
        }
    }

    /// Classify a message into a tier.
    pub fn classify(&self, text: &str) -> Tier {
        self.score(text).tier()
    }

    /// Score a message and return the per-signal breakdown.
    pub fn score(&self, text: &str) -> ComplexityScore {
        let lower = text.to_lowercase();

        let length_score = Self::length_score(text.chars().count());
        let complex_hits = count_hits(&lower, &self.complex_keywords);
        let medium_hits = count_hits(&lower, &self.medium_keywords);

        ComplexityScore {
            length_score,
            complex_hits,
            medium_hits,
            total: length_score + 2 * complex_hits + medium_hits,
        }
    }

    fn length_score(chars: usize) -> u32 {
        if chars > VERY_LONG_MESSAGE_CHARS {
            2
        } else if chars > LONG_MESSAGE_CHARS {
            1
        } else {
            0
        }
    }
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

// Substring containment: "plan" also matches inside "planta".
fn count_hits(haystack: &str, keywords: &[String]) -> u32 {
    keywords.iter().filter(|k| haystack.contains(k.as_str())).count() as u32
}
