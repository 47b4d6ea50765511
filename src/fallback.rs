//! Fallback answer synthesis
//!
//! Deterministic, locally generated answers used when the live service
//! fails and fallback mode is enabled. The question is matched
//! case-insensitively against an ordered keyword table; the first matching
//! rule wins, so the table is a priority list rather than a scored match.
//! Synthesized answers never carry source citations and always report a
//! fixed processing time that mirrors the simulated latency.

use crate::service::Answer;
use uuid::Uuid;

/// Processing time reported for every synthesized answer, in seconds
pub const SYNTHESIZED_PROCESSING_TIME: f64 = 1.5;

/// Confidence reported when no keyword rule matches
pub const DEFAULT_CONFIDENCE: f64 = 0.75;

struct FallbackRule {
    keywords: &'static [&'static str],
    answer: &'static str,
    confidence: f64,
}

/// Ordered rule table; earlier rules take priority over later ones
const FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        keywords: &["fee", "cost", "tuition"],
        answer: "The annual tuition fee for the B.Tech Computer Science program is \
                 ₹1,50,000. This covers access to the library, laboratories, and basic \
                 hostel amenities. Specialized courses and international students may \
                 incur additional charges.",
        confidence: 0.92,
    },
    FallbackRule {
        keywords: &["hostel", "accommodation"],
        answer: "The university provides separate hostels for boys and girls, equipped \
                 with Wi-Fi, mess facilities, a gym, and 24/7 security. Annual charges \
                 are ₹60,000 for shared rooms and ₹90,000 for single rooms.",
        confidence: 0.88,
    },
    FallbackRule {
        keywords: &["placement", "job"],
        answer: "Our placement cell reports an 85% placement rate, with an average \
                 package of ₹6.5 LPA and a highest package of ₹45 LPA. Top recruiters \
                 include Google, Microsoft, Amazon, and TCS.",
        confidence: 0.90,
    },
    FallbackRule {
        keywords: &["admission", "eligibility"],
        answer: "Admission to the B.Tech program requires at least 75% in 12th grade \
                 with Physics, Chemistry, and Mathematics, along with a valid JEE Main \
                 score. Applications open in May.",
        confidence: 0.87,
    },
];

const DEFAULT_ANSWER: &str = "I can help with questions about fees, hostels, placements, \
                              and admissions. Could you rephrase your question or ask \
                              about one of those topics?";

/// Synthesize a deterministic answer for the given question
///
/// The answer text and confidence depend only on the question text
/// (case-insensitive); the generated id is unique per call. Sources are
/// always empty and the processing time is fixed at
/// [`SYNTHESIZED_PROCESSING_TIME`].
///
/// # Examples
///
/// ```
/// use uniqa::fallback::synthesize;
///
/// let answer = synthesize("What is the tuition fee?");
/// assert_eq!(answer.confidence_score, Some(0.92));
/// assert!(answer.sources.is_empty());
/// ```
pub fn synthesize(question: &str) -> Answer {
    let lowered = question.to_lowercase();
    let (text, confidence) = FALLBACK_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|rule| (rule.answer, rule.confidence))
        .unwrap_or((DEFAULT_ANSWER, DEFAULT_CONFIDENCE));

    Answer {
        text: text.to_string(),
        sources: Vec::new(),
        confidence_score: Some(confidence),
        processing_time: Some(SYNTHESIZED_PROCESSING_TIME),
        conversation_id: format!("fallback-{}", Uuid::new_v4()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_keywords_yield_tuition_answer() {
        for question in ["What is the fee?", "How much does it cost?", "tuition?"] {
            let answer = synthesize(question);
            assert_eq!(answer.confidence_score, Some(0.92), "question: {}", question);
            assert!(answer.text.contains("₹1,50,000"));
        }
    }

    #[test]
    fn test_hostel_keywords_yield_hostel_answer() {
        for question in ["Tell me about the hostel", "Is accommodation available?"] {
            let answer = synthesize(question);
            assert_eq!(answer.confidence_score, Some(0.88), "question: {}", question);
            assert!(answer.text.contains("hostels"));
        }
    }

    #[test]
    fn test_placement_keywords_yield_placement_answer() {
        for question in ["placement statistics?", "Will I get a job?"] {
            let answer = synthesize(question);
            assert_eq!(answer.confidence_score, Some(0.90), "question: {}", question);
            assert!(answer.text.contains("85%"));
        }
    }

    #[test]
    fn test_admission_keywords_yield_admission_answer() {
        for question in ["admission process?", "What is the eligibility?"] {
            let answer = synthesize(question);
            assert_eq!(answer.confidence_score, Some(0.87), "question: {}", question);
            assert!(answer.text.contains("JEE Main"));
        }
    }

    #[test]
    fn test_no_match_yields_default_answer() {
        let answer = synthesize("What time does the library open?");
        assert_eq!(answer.confidence_score, Some(DEFAULT_CONFIDENCE));
        assert_eq!(answer.text, DEFAULT_ANSWER);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "fee" and "hostel" both match; the fee rule comes first in the table
        let answer = synthesize("What is the hostel fee?");
        assert_eq!(answer.confidence_score, Some(0.92));
        assert!(answer.text.contains("₹1,50,000"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let lower = synthesize("tuition fee?");
        let upper = synthesize("TUITION FEE?");
        assert_eq!(lower.text, upper.text);
        assert_eq!(lower.confidence_score, upper.confidence_score);
    }

    #[test]
    fn test_answer_text_is_deterministic() {
        let first = synthesize("placement record");
        let second = synthesize("placement record");
        assert_eq!(first.text, second.text);
        assert_eq!(first.confidence_score, second.confidence_score);
    }

    #[test]
    fn test_sources_empty_and_processing_time_fixed() {
        let answer = synthesize("anything at all");
        assert!(answer.sources.is_empty());
        assert_eq!(answer.processing_time, Some(SYNTHESIZED_PROCESSING_TIME));
    }

    #[test]
    fn test_ids_carry_fallback_prefix_and_are_unique() {
        let first = synthesize("fee");
        let second = synthesize("fee");
        assert!(first.conversation_id.starts_with("fallback-"));
        assert!(second.conversation_id.starts_with("fallback-"));
        assert_ne!(first.conversation_id, second.conversation_id);
    }

    #[test]
    fn test_keyword_matches_inside_words() {
        // Substring matching: "fees" contains "fee"
        let answer = synthesize("Are the fees refundable?");
        assert_eq!(answer.confidence_score, Some(0.92));
    }
}
