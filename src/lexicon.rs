//! Lexical mood signal and deterministic post-parse correction.
//!
//! The analyzer counts occurrences of two small fixed keyword lists in the
//! raw diary text, independently of the model. The counts are fed into the
//! prompt to nudge the model away from `neutral`, and applied again after
//! parsing: a `neutral` answer is overridden toward the dominant side unless
//! the counts are exactly tied. A non-neutral model answer is never touched,
//! even when the counts disagree with it.
//!
//! Counting is a case-sensitive literal substring scan that counts a match at
//! every starting position, so overlapping and embedded matches each count.
//! This matches the existing service's behavior and is kept deliberately;
//! see DESIGN.md before changing it to a tokenized approach.

use tracing::debug;

use crate::schema::{DiaryAnalysis, Mood};

/// Positive lexicon (diary language).
pub const POSITIVE_WORDS: [&str; 8] = [
    "开心", "高兴", "满足", "成就", "骄傲", "愉快", "喜悦", "兴奋",
];

/// Negative lexicon (diary language).
pub const NEGATIVE_WORDS: [&str; 8] = [
    "累", "疲惫", "沮丧", "压力", "悲伤", "失落", "难过", "痛苦",
];

/// Fixed emoji applied when forcing a positive verdict.
pub const POSITIVE_EMOJI: &str = "😀";
/// Fixed emoji applied when forcing a negative verdict.
pub const NEGATIVE_EMOJI: &str = "😞";

/// Lexicon hit counts for one diary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodSignal {
    pub positive: usize,
    pub negative: usize,
}

/// Count occurrences of `word` in `text`, including overlapping matches.
fn count_occurrences(text: &str, word: &str) -> usize {
    if word.is_empty() {
        return 0;
    }
    text.char_indices()
        .filter(|(i, _)| text[*i..].starts_with(word))
        .count()
}

/// Scan a diary text against both lexicons.
pub fn scan(text: &str) -> MoodSignal {
    let positive = POSITIVE_WORDS
        .iter()
        .map(|w| count_occurrences(text, w))
        .sum();
    let negative = NEGATIVE_WORDS
        .iter()
        .map(|w| count_occurrences(text, w))
        .sum();
    MoodSignal { positive, negative }
}

/// Apply the mood-tie override to a parsed result.
///
/// Only a `neutral` verdict is ever rewritten; a strict tie stays neutral.
pub fn correct(mut result: DiaryAnalysis, signal: MoodSignal) -> DiaryAnalysis {
    if result.mood != Mood::Neutral {
        return result;
    }

    if signal.positive > signal.negative {
        debug!(
            positive = signal.positive,
            negative = signal.negative,
            "overriding neutral verdict to positive"
        );
        result.mood = Mood::Positive;
        result.emoji = POSITIVE_EMOJI.to_string();
    } else if signal.negative > signal.positive {
        debug!(
            positive = signal.positive,
            negative = signal.negative,
            "overriding neutral verdict to negative"
        );
        result.mood = Mood::Negative;
        result.emoji = NEGATIVE_EMOJI.to_string();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_result() -> DiaryAnalysis {
        DiaryAnalysis {
            mood: Mood::Neutral,
            emoji: "😐".to_string(),
            keywords: vec!["平淡".to_string()],
            suggestions: vec!["保持节奏".to_string()],
        }
    }

    #[test]
    fn scan_counts_both_sides() {
        let signal = scan("今天很开心，也有些压力，但总体高兴。");
        assert_eq!(signal.positive, 2);
        assert_eq!(signal.negative, 1);
    }

    #[test]
    fn scan_counts_repeated_words() {
        let signal = scan("开心开心开心");
        assert_eq!(signal.positive, 3);
    }

    #[test]
    fn scan_counts_embedded_matches() {
        // "累" occurs inside "劳累" and alone — literal substring scan counts both.
        let signal = scan("劳累了一天，很累。");
        assert_eq!(signal.negative, 2);
    }

    #[test]
    fn scan_empty_text() {
        assert_eq!(scan(""), MoodSignal { positive: 0, negative: 0 });
    }

    #[test]
    fn correct_forces_positive_when_positive_dominates() {
        let signal = MoodSignal { positive: 3, negative: 1 };
        let out = correct(neutral_result(), signal);
        assert_eq!(out.mood, Mood::Positive);
        assert_eq!(out.emoji, POSITIVE_EMOJI);
    }

    #[test]
    fn correct_forces_negative_when_negative_dominates() {
        let signal = MoodSignal { positive: 0, negative: 2 };
        let out = correct(neutral_result(), signal);
        assert_eq!(out.mood, Mood::Negative);
        assert_eq!(out.emoji, NEGATIVE_EMOJI);
    }

    #[test]
    fn correct_keeps_neutral_on_tie() {
        let signal = MoodSignal { positive: 2, negative: 2 };
        let out = correct(neutral_result(), signal);
        assert_eq!(out.mood, Mood::Neutral);
        assert_eq!(out.emoji, "😐");
    }

    #[test]
    fn correct_never_overrides_non_neutral() {
        let mut result = neutral_result();
        result.mood = Mood::Positive;
        result.emoji = "🎉".to_string();
        // Counts disagree with the model, but the verdict is not neutral.
        let signal = MoodSignal { positive: 0, negative: 5 };
        let out = correct(result, signal);
        assert_eq!(out.mood, Mood::Positive);
        assert_eq!(out.emoji, "🎉");
    }

    #[test]
    fn correct_preserves_keywords_and_suggestions() {
        let signal = MoodSignal { positive: 1, negative: 0 };
        let out = correct(neutral_result(), signal);
        assert_eq!(out.keywords, vec!["平淡"]);
        assert_eq!(out.suggestions, vec!["保持节奏"]);
    }
}
