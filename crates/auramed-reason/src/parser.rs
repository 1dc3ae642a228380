//! Multi-strategy parser for unstructured reasoning-engine responses.
//!
//! Strategies run in order and the first match wins:
//! 1. exact `STATUS: <token>` field
//! 2. negation-aware domain keyword scan
//! 3. inconclusive default
//!
//! Confidence and rationale are extracted independently of the strategy.

use auramed_core::{Disposition, Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{MatchStrategy, ParsedResponse, ProvisionalDecision};

/// Confidence when a disposition matched but no confidence field exists.
pub const MATCHED_DEFAULT_CONFIDENCE: f64 = 0.75;
/// Confidence when nothing matched.
pub const UNMATCHED_DEFAULT_CONFIDENCE: f64 = 0.5;

static STATUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bSTATUS\s*:\s*\**\s*(GREEN|YELLOW|RED|INCONCLUSIVE|NORMAL|PATHOLOGICAL|EMERGENCY)\b",
    )
    .unwrap()
});
static CONFIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bCONFIDENCE\s*:\s*\**\s*([0-9]*\.?[0-9]+)").unwrap());
static REASONING_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bREASONING\s*:").unwrap());
static STATUS_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bSTATUS\s*:").unwrap());
static ACTION_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:RECOMMENDED ACTIONS?|RECOMMENDATIONS?|ACTION PLAN|ACTIONS?|PLAN)\s*:").unwrap()
});
/// Start of a new labeled field, e.g. `FINDINGS:` or `**Assessment**:`.
static FIELD_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s*#-]*(?:[A-Z][A-Z ]{2,}|[A-Z][a-z]+(?: [A-Za-z]+)?)\**\s*:").unwrap()
});

/// Keyword lists driving the keyword strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserKeywords {
    /// Terms implying severe illness.
    pub emergency: Vec<String>,
    /// Terms implying airway pathology.
    pub pathological: Vec<String>,
    /// Terms implying normal findings.
    pub normal: Vec<String>,
    /// Cues that negate a following term.
    pub negation_cues: Vec<String>,
    /// How many preceding words are searched for a negation cue.
    pub negation_window: usize,
    /// Words or punctuation that end a negation's scope within a sentence.
    pub negation_terminators: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ParserKeywords {
    fn default() -> Self {
        Self {
            emergency: strings(&[
                "danger sign",
                "danger signs",
                "severe pneumonia",
                "severe respiratory distress",
                "respiratory distress",
                "chest indrawing",
                "stridor",
                "cyanosis",
                "convulsion",
                "convulsions",
                "unconscious",
                "lethargic",
                "immediate referral",
                "urgent referral",
                "emergency",
            ]),
            pathological: strings(&[
                "pneumonia",
                "crackle",
                "crackles",
                "wheeze",
                "wheezes",
                "wheezing",
                "fast breathing",
                "tachypnea",
                "bronchiolitis",
                "bronchitis",
                "infection",
                "adventitious",
                "abnormal",
            ]),
            normal: strings(&[
                "normal breath sounds",
                "no abnormalities",
                "no adventitious sounds",
                "clear lungs",
                "lungs are clear",
                "unremarkable",
                "healthy",
                "normal",
            ]),
            negation_cues: strings(&[
                "no",
                "not",
                "without",
                "absence of",
                "absent",
                "negative for",
                "denies",
                "ruled out",
                "free of",
            ]),
            negation_window: 5,
            negation_terminators: strings(&[
                ",", "but", "however", "although", "though", "yet", "whereas", "except",
            ]),
        }
    }
}

/// Compiled keyword matchers, one per disposition class.
pub struct KeywordIndex {
    classes: Vec<(Disposition, Option<Regex>)>,
    negation: Option<Regex>,
    terminators: Option<Regex>,
    window: usize,
}

impl KeywordIndex {
    pub fn compile(keywords: &ParserKeywords) -> Result<Self> {
        let mut classes = vec![
            (Disposition::Normal, alternation(&keywords.normal)?),
            (Disposition::Pathological, alternation(&keywords.pathological)?),
            (Disposition::Emergency, alternation(&keywords.emergency)?),
        ];
        classes.sort_by_key(|(disposition, _)| std::cmp::Reverse(disposition.severity_rank()));
        Ok(Self {
            classes,
            negation: alternation(&keywords.negation_cues)?,
            terminators: alternation(&keywords.negation_terminators)?,
            window: keywords.negation_window,
        })
    }

    /// Highest-precedence class with at least one non-negated hit.
    pub fn classify(&self, text: &str) -> Option<Disposition> {
        self.classes.iter().find_map(|(disposition, re)| {
            let re = re.as_ref()?;
            re.find_iter(text)
                .any(|m| !self.is_negated(&text[..m.start()]))
                .then_some(*disposition)
        })
    }

    /// Whether the clause ending at `preceding` negates the next term.
    fn is_negated(&self, preceding: &str) -> bool {
        let Some(negation) = &self.negation else {
            return false;
        };
        let clause_start = preceding
            .rfind(|c: char| matches!(c, '.' | ';' | '!' | '?' | '\n' | ':'))
            .map(|i| i + 1)
            .unwrap_or(0);
        let mut clause = &preceding[clause_start..];
        if let Some(last) = self.terminators.as_ref().and_then(|t| t.find_iter(clause).last()) {
            clause = &clause[last.end()..];
        }
        let words: Vec<&str> = clause.split_whitespace().collect();
        let tail = words[words.len().saturating_sub(self.window)..].join(" ");
        negation.is_match(&tail)
    }
}

/// Case-insensitive alternation, longest term first. Word terms match whole
/// words only; punctuation terms match anywhere.
fn alternation(terms: &[String]) -> Result<Option<Regex>> {
    let mut terms: Vec<&str> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return Ok(None);
    }
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let body = terms
        .iter()
        .map(|t| {
            let escaped = regex::escape(t);
            let lead = if t.starts_with(|c: char| c.is_alphanumeric()) { r"\b" } else { "" };
            let trail = if t.ends_with(|c: char| c.is_alphanumeric()) { r"\b" } else { "" };
            format!("{}{}{}", lead, escaped, trail)
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(?:{})", body))
        .map(Some)
        .map_err(|e| Error::Config(format!("invalid keyword pattern: {}", e)))
}

/// A parser strategy: text in, optional (disposition, confidence) out.
pub type Strategy = fn(&str, &KeywordIndex) -> Option<(Disposition, f64)>;

/// Strategy 1: explicit status field.
pub fn match_exact_format(text: &str, _index: &KeywordIndex) -> Option<(Disposition, f64)> {
    let token = STATUS_RE.captures_iter(text).last()?.get(1)?.as_str().to_string();
    let disposition = Disposition::from_token(&token)?;
    Some((
        disposition,
        parse_confidence(text).unwrap_or(MATCHED_DEFAULT_CONFIDENCE),
    ))
}

/// Strategy 2: domain keywords.
pub fn match_keywords(text: &str, index: &KeywordIndex) -> Option<(Disposition, f64)> {
    let disposition = index.classify(text)?;
    Some((
        disposition,
        parse_confidence(text).unwrap_or(MATCHED_DEFAULT_CONFIDENCE),
    ))
}

/// Strategy 3: always matches.
pub fn match_default(text: &str, _index: &KeywordIndex) -> Option<(Disposition, f64)> {
    Some((
        Disposition::Inconclusive,
        parse_confidence(text).unwrap_or(UNMATCHED_DEFAULT_CONFIDENCE),
    ))
}

/// Labeled confidence, clamped to [0, 1].
pub fn parse_confidence(text: &str) -> Option<f64> {
    let raw = CONFIDENCE_RE.captures_iter(text).last()?.get(1)?.as_str().to_string();
    raw.parse::<f64>().ok().map(|c| c.clamp(0.0, 1.0))
}

/// Text between the last `REASONING:` and the following `STATUS:`, with
/// recommendation and action fields removed. An action field runs until a
/// blank line or the next labeled field.
pub fn extract_rationale(text: &str) -> String {
    let body = match REASONING_LABEL_RE.find_iter(text).last() {
        Some(label) => {
            let rest = &text[label.end()..];
            match STATUS_LABEL_RE.find(rest) {
                Some(status) => &rest[..status.start()],
                None => rest,
            }
        }
        None => text,
    };

    let mut kept = Vec::new();
    let mut in_action = false;
    for line in body.lines() {
        if line.trim().is_empty() {
            in_action = false;
            continue;
        }
        if let Some(action) = ACTION_FIELD_RE.find(line) {
            in_action = true;
            kept.push(line[..action.start()].trim());
            continue;
        }
        if in_action && !FIELD_LABEL_RE.is_match(line) {
            continue;
        }
        in_action = false;
        kept.push(line.trim());
    }
    kept.retain(|l| !l.is_empty());
    kept.join("\n")
}

/// Ordered strategy chain over unstructured responses.
pub struct ResponseParser {
    index: KeywordIndex,
    strategies: Vec<(MatchStrategy, Strategy)>,
}

impl ResponseParser {
    pub fn new(keywords: &ParserKeywords) -> Result<Self> {
        Ok(Self {
            index: KeywordIndex::compile(keywords)?,
            strategies: vec![
                (MatchStrategy::ExactFormat, match_exact_format as Strategy),
                (MatchStrategy::Keyword, match_keywords as Strategy),
                (MatchStrategy::Default, match_default as Strategy),
            ],
        })
    }

    pub fn parse(&self, response: &str) -> ParsedResponse {
        let (strategy, (disposition, confidence)) = self
            .strategies
            .iter()
            .find_map(|(kind, strategy)| strategy(response, &self.index).map(|m| (*kind, m)))
            .unwrap_or((
                MatchStrategy::Default,
                (Disposition::Inconclusive, UNMATCHED_DEFAULT_CONFIDENCE),
            ));

        debug!(
            "Parsed response via {}: {} ({:.2})",
            strategy, disposition, confidence
        );

        ParsedResponse {
            decision: ProvisionalDecision::new(disposition, confidence, extract_rationale(response)),
            strategy,
        }
    }
}
