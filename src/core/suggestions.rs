// src/core/suggestions.rs — Follow-up question generation
//
// Pure function of the latest assistant reply and the user's prior
// questions in the session. Classifies the reply into a topic bucket,
// offers that bucket's canned follow-ups, filters near-duplicates of
// questions already asked, and caps the result.

use crate::util::leading_words;

/// At most this many follow-ups are offered per reply.
pub const MAX_SUGGESTIONS: usize = 2;

/// Near-duplicate matching compares this many leading words.
const DUP_KEY_WORDS: usize = 3;

struct SuggestionBucket {
    keywords: &'static [&'static str],
    candidates: &'static [&'static str],
}

/// Buckets in fixed priority order; the first whose keyword matches the
/// reply wins.
const BUCKETS: &[SuggestionBucket] = &[
    SuggestionBucket {
        keywords: &["policy", "policies"],
        candidates: &[
            "What's the timeline for policy implementation?",
            "How can residents provide input on these policies?",
            "How are these policies being funded?",
        ],
    },
    SuggestionBucket {
        keywords: &["housing", "development", "affordable"],
        candidates: &[
            "What's the timeline for new housing developments?",
            "Who qualifies for affordable housing programs?",
            "How will new housing impact traffic?",
        ],
    },
    SuggestionBucket {
        keywords: &["transport", "bike", "shuttle"],
        candidates: &[
            "What's the cost of these transportation projects?",
            "What safety measures are included in bike lane designs?",
            "When will shuttle service be expanded?",
        ],
    },
    SuggestionBucket {
        keywords: &["great park", "park"],
        candidates: &[
            "What's the construction timeline for Great Park phases?",
            "How is Great Park development funded?",
            "What recreational programs will be available?",
        ],
    },
    SuggestionBucket {
        keywords: &["budget", "cost", "funding"],
        candidates: &[
            "How can residents track budget spending?",
            "Will this impact local taxes?",
            "Are there alternative funding sources being considered?",
        ],
    },
    SuggestionBucket {
        keywords: &[],
        candidates: &[
            "When are the next community meetings?",
            "What are your top 3 priorities for 2025?",
            "How can students get more involved in local government?",
        ],
    },
];

/// Offered when the matched bucket is exhausted by the duplicate filter.
const GENERIC_CANDIDATES: &[&str] = &[
    "What challenges do you foresee with implementation?",
    "How does this compare to other Orange County cities?",
    "What role can local businesses play in this?",
];

/// Derive up to [`MAX_SUGGESTIONS`] follow-up questions for a reply.
///
/// Returns nothing when the reply already poses a question of its own.
/// Escalated replies are the engine's concern; this function reports
/// candidates regardless so the two signals stay independent.
pub fn follow_ups(reply: &str, prior_user_questions: &[String]) -> Vec<String> {
    if reply.contains('?') {
        return Vec::new();
    }

    let lower = reply.to_lowercase();
    let bucket = BUCKETS
        .iter()
        .find(|b| b.keywords.is_empty() || b.keywords.iter().any(|k| lower.contains(k)))
        .expect("catch-all bucket always matches");

    let mut out: Vec<String> = bucket
        .candidates
        .iter()
        .filter(|c| !already_asked(c, prior_user_questions))
        .take(MAX_SUGGESTIONS)
        .map(|c| c.to_string())
        .collect();

    if out.is_empty() {
        out = GENERIC_CANDIDATES
            .iter()
            .filter(|c| !already_asked(c, prior_user_questions))
            .take(MAX_SUGGESTIONS)
            .map(|c| c.to_string())
            .collect();
    }

    out
}

/// A candidate is a near-duplicate when its leading three words already
/// appear in one of the session's user questions (case-insensitive).
fn already_asked(candidate: &str, prior_user_questions: &[String]) -> bool {
    let key = leading_words(candidate, DUP_KEY_WORDS);
    if key.is_empty() {
        return false;
    }
    prior_user_questions
        .iter()
        .any(|q| q.to_lowercase().contains(&key))
}
