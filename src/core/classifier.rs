// src/core/classifier.rs — Query classification
//
// Pure functions over the raw question text. They decide the completion
// token budget, whether the retrieval-reasoning simulation is shown, which
// canned steps play, and how long each step is held. The step catalog is
// fixed; nothing here touches a data store.

use rand::Rng;
use std::time::Duration;

use super::types::{QueryComplexity, ReasoningPlan, StepTiming};

/// Token budget tiers, highest priority first.
pub const LARGE_TOKEN_BUDGET: u32 = 300;
pub const SMALL_TOKEN_BUDGET: u32 = 150;
pub const DEFAULT_TOKEN_BUDGET: u32 = 220;

/// Questions shorter than this (after trimming) never show reasoning.
pub const MIN_REASONING_LEN: usize = 6;

/// Questions shorter than this fall into the small token tier.
const SHORT_QUESTION_LEN: usize = 30;

/// Markers for questions that want a comprehensive answer.
const LARGE_BUDGET_MARKERS: &[&str] = &[
    "comprehensive",
    "detailed",
    "explain",
    "overview",
    "tell me about",
    "describe",
    "what are your plans",
    "plans",
    "policy",
    "strategy",
];

/// Markers for yes/no and lookup-style questions.
const SMALL_BUDGET_MARKERS: &[&str] = &["yes", "no", "when", "where"];

/// Greetings and acknowledgements that skip the reasoning simulation.
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "thanks",
    "thank you",
    "ok",
    "okay",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Keywords that always warrant the reasoning simulation.
const COMPLEX_KEYWORDS: &[&str] = &[
    "explain", "comprehensive", "detailed", "policy", "policies", "strategy", "plan", "compare",
    "why", "how",
];

/// Every reasoning sequence opens with the database-search step.
const OPENING_STEP: &str = "Searching District 2 resident database...";

struct TopicBucket {
    keywords: &'static [&'static str],
    steps: &'static [&'static str],
}

/// Topic buckets in priority order; matching buckets contribute their
/// steps in this order.
const BUCKETS: &[TopicBucket] = &[
    TopicBucket {
        keywords: &["william", "background", "experience"],
        steps: &[
            "Accessing City Council meeting archives...",
            "Retrieving William Go's background information...",
        ],
    },
    TopicBucket {
        keywords: &["great park", "development"],
        steps: &[
            "Connecting to Irvine planning department records...",
            "Analyzing Great Park development plans...",
        ],
    },
    TopicBucket {
        keywords: &["housing", "affordable"],
        steps: &[
            "Loading housing affordability data for Irvine...",
            "Retrieving housing policy positions...",
            "Analyzing zoning regulation updates...",
        ],
    },
    TopicBucket {
        keywords: &["transportation", "bike", "transit", "shuttle"],
        steps: &[
            "Connecting to Irvine transit planning documents...",
            "Accessing transportation initiatives...",
            "Loading traffic pattern studies...",
        ],
    },
    TopicBucket {
        keywords: &["student", "youth", "education"],
        steps: &[
            "Analyzing student concerns across District 2...",
            "Fetching community feedback from District 2 residents...",
        ],
    },
    TopicBucket {
        keywords: &["goal", "priority", "priorities", "plan"],
        steps: &[
            "Reviewing William Go's policy positions...",
            "Connecting to Orange County planning database...",
        ],
    },
    TopicBucket {
        keywords: &["cost", "budget", "funding"],
        steps: &[
            "Searching budget allocation records...",
            "Accessing environmental impact assessments...",
        ],
    },
];

/// Used when no bucket matches.
const FALLBACK_STEPS: &[&str] = &[
    "Gathering District 2 updates...",
    "Connecting to Irvine community data...",
    "Fetching public safety incident reports...",
];

/// Reserve pool for padding short sequences up to [`MIN_STEPS`].
const RESERVE_STEPS: &[&str] = &[
    "Retrieving demographic analysis for District 2...",
    "Searching community event participation data...",
    "Accessing environmental impact assessments...",
];

/// Minimum number of steps in any played sequence.
pub const MIN_STEPS: usize = 3;

/// Max completion tokens for a question. Tiers resolve in priority order:
/// large, then small, then the moderate default.
pub fn token_budget(question: &str) -> u32 {
    let lower = question.to_lowercase();

    if LARGE_BUDGET_MARKERS.iter().any(|m| lower.contains(m)) {
        return LARGE_TOKEN_BUDGET;
    }

    if SMALL_BUDGET_MARKERS.iter().any(|m| lower.contains(m)) || lower.len() < SHORT_QUESTION_LEN {
        return SMALL_TOKEN_BUDGET;
    }

    DEFAULT_TOKEN_BUDGET
}

/// Classify perceived complexity; shared by the reasoning gate and the
/// step delay tiers.
pub fn complexity(question: &str) -> QueryComplexity {
    let trimmed = question.trim();
    let lower = trimmed.to_lowercase();

    if is_greeting(&lower) || trimmed.len() < MIN_REASONING_LEN {
        return QueryComplexity::Greeting;
    }

    if LARGE_BUDGET_MARKERS.iter().any(|m| lower.contains(m)) {
        return QueryComplexity::Comprehensive;
    }

    if SMALL_BUDGET_MARKERS.iter().any(|m| lower.contains(m)) || lower.len() < SHORT_QUESTION_LEN {
        return QueryComplexity::Simple;
    }

    QueryComplexity::Moderate
}

/// Whether the retrieval-reasoning simulation plays at all.
///
/// Policy: greetings and sub-minimum questions never show reasoning; a
/// complex keyword always does; anything else shows it only when the text
/// carries at least one recognizable alphabetic word (the meaningful-words
/// fallback, which filters gibberish).
pub fn should_show_reasoning(question: &str) -> bool {
    let trimmed = question.trim();
    let lower = trimmed.to_lowercase();

    if is_greeting(&lower) || trimmed.len() < MIN_REASONING_LEN {
        return false;
    }

    if COMPLEX_KEYWORDS.iter().any(|k| contains_word(&lower, k)) {
        return true;
    }

    has_meaningful_word(&lower)
}

/// Canned steps for a question: the opening database step, then every
/// matching bucket's steps in priority order, padded from the reserve pool
/// (no duplicates) up to [`MIN_STEPS`] using the caller's RNG.
pub fn reasoning_steps<R: Rng>(question: &str, rng: &mut R) -> Vec<String> {
    let lower = question.to_lowercase();

    let mut steps: Vec<String> = vec![OPENING_STEP.to_string()];
    for bucket in BUCKETS {
        if bucket.keywords.iter().any(|k| lower.contains(k)) {
            steps.extend(bucket.steps.iter().map(|s| s.to_string()));
        }
    }

    if steps.len() < 2 {
        steps.extend(FALLBACK_STEPS.iter().map(|s| s.to_string()));
    }

    while steps.len() < MIN_STEPS {
        if RESERVE_STEPS.iter().all(|s| steps.iter().any(|x| x == s)) {
            break;
        }
        let candidate = RESERVE_STEPS[rng.gen_range(0..RESERVE_STEPS.len())];
        if !steps.iter().any(|s| s == candidate) {
            steps.push(candidate.to_string());
        }
    }

    steps
}

/// Per-step delay range, keyed off the complexity tiers.
pub fn step_timing(question: &str) -> StepTiming {
    let (base_ms, jitter_ms) = match complexity(question) {
        QueryComplexity::Greeting => (300, 200),
        QueryComplexity::Simple => (600, 300),
        QueryComplexity::Moderate => (1000, 500),
        QueryComplexity::Comprehensive => (1800, 700),
    };
    StepTiming {
        base: Duration::from_millis(base_ms),
        jitter: Duration::from_millis(jitter_ms),
    }
}

/// Full reasoning plan for a question.
pub fn plan<R: Rng>(question: &str, rng: &mut R) -> ReasoningPlan {
    ReasoningPlan {
        steps: reasoning_steps(question, rng),
        timing: step_timing(question),
    }
}

/// Exact or leading-word-boundary prefix match against the greeting list.
fn is_greeting(lower_trimmed: &str) -> bool {
    GREETINGS.iter().any(|g| {
        lower_trimmed == *g
            || (lower_trimmed.starts_with(g)
                && lower_trimmed[g.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| !c.is_alphanumeric()))
    })
}

/// Word-boundary containment check.
fn contains_word(lower: &str, word: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|w| w == word)
}

/// At least one alphabetic token longer than two characters.
fn has_meaningful_word(lower: &str) -> bool {
    lower
        .split_whitespace()
        .any(|w| w.len() > 2 && w.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_token_budget_large_for_policy_class() {
        assert_eq!(token_budget("What are your housing plans?"), LARGE_TOKEN_BUDGET);
    }

    #[test]
    fn test_token_budget_large_regardless_of_length() {
        assert_eq!(token_budget("policy?"), LARGE_TOKEN_BUDGET);
        assert_eq!(token_budget("Explain your transportation strategy in depth please"), 300);
    }

    #[test]
    fn test_token_budget_small_for_short_or_lookup() {
        assert_eq!(token_budget("when is the meeting held??????"), SMALL_TOKEN_BUDGET);
        assert_eq!(token_budget("bike lanes"), SMALL_TOKEN_BUDGET);
    }

    #[test]
    fn test_token_budget_default() {
        assert_eq!(
            token_budget("I want to understand the council's position on zoning"),
            DEFAULT_TOKEN_BUDGET
        );
    }

    #[test]
    fn test_large_tier_wins_ties() {
        // contains both "when" and "policy"; large tier has priority
        assert_eq!(token_budget("when does the policy take effect"), LARGE_TOKEN_BUDGET);
    }

    #[test]
    fn test_reasoning_gate_rejects_greetings() {
        assert!(!should_show_reasoning("hi"));
        assert!(!should_show_reasoning("Hello there"));
        assert!(!should_show_reasoning("thanks!"));
        assert!(!should_show_reasoning("Good morning"));
    }

    #[test]
    fn test_reasoning_gate_rejects_short_input() {
        assert!(!should_show_reasoning("a?"));
        assert!(!should_show_reasoning("    ok    "));
    }

    #[test]
    fn test_greeting_prefix_needs_word_boundary() {
        // "high housing costs" must not be treated as a greeting
        assert!(should_show_reasoning("high housing costs are a concern"));
    }

    #[test]
    fn test_reasoning_gate_accepts_complex_keywords() {
        assert!(should_show_reasoning("how will this work"));
        assert!(should_show_reasoning("explain the budget"));
    }

    #[test]
    fn test_reasoning_gate_meaningful_words_fallback() {
        assert!(should_show_reasoning("great park update"));
        assert!(!should_show_reasoning("zz 11 !!"));
    }

    #[test]
    fn test_steps_open_with_database_search() {
        let steps = reasoning_steps("What are your housing plans?", &mut rng());
        assert_eq!(steps[0], OPENING_STEP);
    }

    #[test]
    fn test_steps_include_matching_bucket() {
        let steps = reasoning_steps("What are your housing plans?", &mut rng());
        assert!(steps.iter().any(|s| s.contains("housing affordability")));
        assert!(steps.iter().any(|s| s.contains("zoning regulation")));
    }

    #[test]
    fn test_steps_concatenate_buckets_in_priority_order() {
        let steps = reasoning_steps("housing near the great park", &mut rng());
        let dev = steps
            .iter()
            .position(|s| s.contains("Great Park development"))
            .unwrap();
        let housing = steps
            .iter()
            .position(|s| s.contains("housing affordability"))
            .unwrap();
        assert!(dev < housing);
    }

    #[test]
    fn test_steps_minimum_count_without_duplicates() {
        let steps = reasoning_steps("what about the vote outcome", &mut rng());
        assert!(steps.len() >= MIN_STEPS);
        let mut sorted = steps.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), steps.len());
    }

    #[test]
    fn test_steps_deterministic_for_seed() {
        let a = reasoning_steps("tell me something", &mut StdRng::seed_from_u64(42));
        let b = reasoning_steps("tell me something", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_step_timing_tiers() {
        assert_eq!(step_timing("hi").base, Duration::from_millis(300));
        assert_eq!(
            step_timing("when is the next council meeting").base,
            Duration::from_millis(600)
        );
        assert_eq!(
            step_timing("I want to understand the council's position on zoning").base,
            Duration::from_millis(1000)
        );
        assert_eq!(
            step_timing("give me a comprehensive overview of the district"),
            StepTiming {
                base: Duration::from_millis(1800),
                jitter: Duration::from_millis(700),
            }
        );
    }

    #[test]
    fn test_complexity_greeting_for_short() {
        assert_eq!(complexity("hey"), QueryComplexity::Greeting);
        assert_eq!(complexity("no"), QueryComplexity::Greeting);
    }
}
