//! Keyword-overlap answer evaluator.
//!
//! Scores a free-text answer by how many keywords of the reference answer
//! appear in it. Keywords are the whitespace-separated tokens of the
//! lower-cased reference that are longer than [`MIN_KEYWORD_LEN`] characters;
//! a keyword matches when it occurs anywhere in the lower-cased answer, including
//! inside a longer word.

use crate::model::{EvaluationResult, Grade};

/// Tokens of this many characters or fewer are never keywords.
pub const MIN_KEYWORD_LEN: usize = 3;

/// A strategy for scoring an answer against a reference answer.
pub trait AnswerEvaluator: Send + Sync {
    /// Short name used in logs (e.g. "keyword-overlap").
    fn name(&self) -> &str;

    /// Score `user_answer` against `reference`. Must be pure.
    fn evaluate(&self, user_answer: &str, reference: &str) -> EvaluationResult;
}

/// The lexical keyword-overlap evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordOverlapEvaluator;

impl AnswerEvaluator for KeywordOverlapEvaluator {
    fn name(&self) -> &str {
        "keyword-overlap"
    }

    fn evaluate(&self, user_answer: &str, reference: &str) -> EvaluationResult {
        evaluate(user_answer, reference)
    }
}

/// Score an answer against a reference answer.
pub fn evaluate(user_answer: &str, reference: &str) -> EvaluationResult {
    EvaluationResult::from_grade(Grade::from_ratio(match_ratio(user_answer, reference)))
}

/// Extract the keyword list from a reference answer.
///
/// Repeated words are kept, so each occurrence counts toward the ratio.
pub fn extract_keywords(reference: &str) -> Vec<String> {
    reference
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_KEYWORD_LEN)
        .map(str::to_string)
        .collect()
}

/// Fraction of reference keywords found in the answer, in `0.0..=1.0`.
///
/// A reference with no keywords yields 0.
pub fn match_ratio(user_answer: &str, reference: &str) -> f64 {
    let keywords = extract_keywords(reference);
    if keywords.is_empty() {
        return 0.0;
    }

    let answer = user_answer.to_lowercase();
    let matched = keywords
        .iter()
        .filter(|keyword| answer.contains(keyword.as_str()))
        .count();

    matched as f64 / keywords.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const MITOCHONDRIA_REF: &str =
        "The mitochondria is the powerhouse that produces energy for the cell";

    #[test]
    fn mitochondria_scores_good() {
        // "that" is four characters, so it is a keyword too: 4 of 6 match.
        let keywords = extract_keywords(MITOCHONDRIA_REF);
        assert_eq!(
            keywords,
            vec!["mitochondria", "powerhouse", "that", "produces", "energy", "cell"]
        );

        let result = evaluate(
            "The mitochondria produces energy for the cell",
            MITOCHONDRIA_REF,
        );
        assert_eq!(result.score, Grade::Good);
        assert_eq!(result.feedback, Grade::Good.feedback());
    }

    #[test]
    fn unrelated_answer_scores_one() {
        let reference = "Photosynthesis converts light energy into chemical energy";
        assert_eq!(
            extract_keywords(reference),
            vec![
                "photosynthesis",
                "converts",
                "light",
                "energy",
                "into",
                "chemical",
                "energy"
            ]
        );
        let result = evaluate("I don't know", reference);
        assert_eq!(result.score, Grade::NoMatch);
        assert_eq!(match_ratio("I don't know", reference), 0.0);
    }

    #[test]
    fn duplicate_keywords_count_separately() {
        // "energy" appears twice, so matching it alone is 2 of 7.
        let reference = "Photosynthesis converts light energy into chemical energy";
        let ratio = match_ratio("energy", reference);
        assert!((ratio - 2.0 / 7.0).abs() < 1e-12);
        assert_eq!(evaluate("energy", reference).score, Grade::Weak);
    }

    #[test]
    fn full_coverage_scores_excellent() {
        let result = evaluate(MITOCHONDRIA_REF, MITOCHONDRIA_REF);
        assert_eq!(result.score, Grade::Excellent);
    }

    #[test]
    fn zero_keywords_always_scores_one() {
        for answer in ["is a be to", "anything at all", "IS A BE TO"] {
            assert_eq!(match_ratio(answer, "is a be to"), 0.0);
            assert_eq!(evaluate(answer, "is a be to").score, Grade::NoMatch);
        }
    }

    #[test]
    fn short_words_do_not_affect_ratio() {
        let with_short = "the cell and its wall";
        let without_short = "cell wall";
        let answer = "cell wall";
        assert_eq!(
            match_ratio(answer, with_short),
            match_ratio(answer, without_short)
        );
        assert_eq!(match_ratio(answer, with_short), 1.0);
    }

    #[test]
    fn substring_matches_inside_longer_words() {
        assert_eq!(match_ratio("I am contesting this", "testing"), 1.0);
        assert_eq!(match_ratio("a classroom", "class"), 1.0);
        assert_eq!(evaluate("I am contesting this", "testing").score, Grade::Excellent);
    }

    #[test]
    fn case_insensitive() {
        let answer = "The Mitochondria PRODUCES energy for the cell";
        let lower = evaluate(answer, MITOCHONDRIA_REF);
        let upper = evaluate(&answer.to_uppercase(), &MITOCHONDRIA_REF.to_uppercase());
        assert_eq!(lower, upper);
    }

    #[test]
    fn deterministic() {
        let a = evaluate("energy in the cell", MITOCHONDRIA_REF);
        let b = evaluate("energy in the cell", MITOCHONDRIA_REF);
        assert_eq!(a, b);
    }

    #[test]
    fn more_keywords_never_lowers_score() {
        let steps = [
            "nothing relevant",
            "mitochondria",
            "mitochondria energy",
            "mitochondria energy cell",
            "mitochondria energy cell produces",
            "mitochondria energy cell produces powerhouse",
        ];
        let scores: Vec<Grade> = steps
            .iter()
            .map(|answer| evaluate(answer, MITOCHONDRIA_REF).score)
            .collect();
        assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]), "{scores:?}");
        assert_eq!(scores[0], Grade::NoMatch);
        assert_eq!(scores[5], Grade::Excellent);
    }

    #[test]
    fn every_ratio_step_lands_in_range() {
        // Ten keywords: walk k = 0..=10 matches.
        let words: Vec<String> = (0..10).map(|i| format!("keyword{i}")).collect();
        let reference = words.join(" ");
        for k in 0..=10 {
            let answer = words[..k].join(" ");
            let score = evaluate(&answer, &reference).score.value();
            assert!((1..=5).contains(&score));
        }
        assert_eq!(evaluate(&words[..3].join(" "), &reference).score, Grade::Weak);
        assert_eq!(evaluate(&words[..5].join(" "), &reference).score, Grade::Partial);
        assert_eq!(evaluate(&words[..7].join(" "), &reference).score, Grade::Good);
        assert_eq!(evaluate(&words[..9].join(" "), &reference).score, Grade::Excellent);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Three characters, six bytes: not a keyword.
        assert!(extract_keywords("äöü").is_empty());
        assert_eq!(extract_keywords("größe"), vec!["größe"]);
    }

    #[test]
    fn trait_object_delegates() {
        let evaluator: &dyn AnswerEvaluator = &KeywordOverlapEvaluator;
        assert_eq!(evaluator.name(), "keyword-overlap");
        assert_eq!(
            evaluator.evaluate("mitochondria", MITOCHONDRIA_REF),
            evaluate("mitochondria", MITOCHONDRIA_REF)
        );
    }
}
