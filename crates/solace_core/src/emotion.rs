//! Keyword-based emotion detection.
//!
//! Each utterance is tokenized and matched against the per-emotion lexicon.
//! The emotion with the highest raw score wins; ties go to the emotion listed
//! first in [`Emotion::ALL`], which puts negative affect ahead of HAPPY and
//! NEUTRAL.

use crate::lexicon::lexicon;
use crate::text::{emphasis_marks, phrase_haystack, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Weight of a single-word lexicon hit.
const WORD_WEIGHT: f32 = 1.0;
/// Multi-word phrases are more specific than single words.
const PHRASE_WEIGHT: f32 = 1.5;

const HIT_FACTOR: f32 = 0.25;
const INTENSIFIER_FACTOR: f32 = 0.15;
const EMPHASIS_FACTOR: f32 = 0.1;
const DENSITY_FACTOR: f32 = 0.2;
/// Intensifiers and emphasis marks stop adding intensity past this count.
const BOOST_CAP: usize = 3;

/// Discrete emotion classification.
///
/// Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Overwhelmed,
    Sad,
    Anxious,
    Stressed,
    Frustrated,
    Angry,
    Lonely,
    Tired,
    Bored,
    Happy,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 11] = [
        Emotion::Overwhelmed,
        Emotion::Sad,
        Emotion::Anxious,
        Emotion::Stressed,
        Emotion::Frustrated,
        Emotion::Angry,
        Emotion::Lonely,
        Emotion::Tired,
        Emotion::Bored,
        Emotion::Happy,
        Emotion::Neutral,
    ];

    /// Emotions that call for comfort rather than a mood lift.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Emotion::Overwhelmed
                | Emotion::Sad
                | Emotion::Anxious
                | Emotion::Stressed
                | Emotion::Frustrated
                | Emotion::Angry
                | Emotion::Lonely
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Overwhelmed => "overwhelmed",
            Emotion::Sad => "sad",
            Emotion::Anxious => "anxious",
            Emotion::Stressed => "stressed",
            Emotion::Frustrated => "frustrated",
            Emotion::Angry => "angry",
            Emotion::Lonely => "lonely",
            Emotion::Tired => "tired",
            Emotion::Bored => "bored",
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Emotion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Emotion::ALL
            .iter()
            .find(|e| e.label() == needle)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown emotion: '{}'", s))
    }
}

/// Outcome of [`detect_emotion`]. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub primary_emotion: Emotion,
    /// Normalized strength in `[0.0, 1.0]`.
    pub intensity: f32,
    /// Raw weighted match score per emotion; emotions with no hits are absent.
    pub scores: BTreeMap<Emotion, f32>,
}

impl EmotionResult {
    pub fn neutral() -> Self {
        Self {
            primary_emotion: Emotion::Neutral,
            intensity: 0.0,
            scores: BTreeMap::new(),
        }
    }

    /// Construct a result directly, clamping intensity into range.
    pub fn new(primary_emotion: Emotion, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            primary_emotion,
            intensity,
            scores: BTreeMap::new(),
        }
    }

    pub fn is_negative(&self) -> bool {
        self.primary_emotion.is_negative()
    }

    pub fn score(&self, emotion: Emotion) -> f32 {
        self.scores.get(&emotion).copied().unwrap_or(0.0)
    }

    /// Short human-readable description for status displays.
    pub fn describe(&self) -> String {
        if self.primary_emotion == Emotion::Neutral {
            return "calm / neutral".to_string();
        }
        let level = if self.intensity < 0.3 {
            "a little"
        } else if self.intensity < 0.6 {
            "fairly"
        } else if self.intensity < 0.85 {
            "very"
        } else {
            "extremely"
        };
        format!("{} {}", level, self.primary_emotion.label())
    }
}

impl Default for EmotionResult {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Classify an utterance.
///
/// Never fails: empty or whitespace-only text yields NEUTRAL with intensity 0.
pub fn detect_emotion(text: &str) -> EmotionResult {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return EmotionResult::neutral();
    }
    let haystack = phrase_haystack(&tokens);
    let lex = lexicon();

    let mut scores: BTreeMap<Emotion, f32> = BTreeMap::new();
    for entry in &lex.emotions {
        let score = entry.keywords.word_hits(&tokens) as f32 * WORD_WEIGHT
            + entry.keywords.phrase_hits(&haystack) as f32 * PHRASE_WEIGHT;
        if score > 0.0 {
            scores.insert(entry.emotion, score);
        }
    }

    // "not happy" / "not very good" count toward sadness instead.
    let negated = negated_positive_hits(&tokens);
    if negated > 0 {
        let happy = scores.entry(Emotion::Happy).or_insert(0.0);
        *happy = (*happy - negated as f32 * WORD_WEIGHT).max(0.0);
        if *happy <= 0.0 {
            scores.remove(&Emotion::Happy);
        }
        *scores.entry(Emotion::Sad).or_insert(0.0) += negated as f32 * WORD_WEIGHT;
    }

    let mut primary = Emotion::Neutral;
    let mut best = 0.0f32;
    for emotion in Emotion::ALL {
        let s = scores.get(&emotion).copied().unwrap_or(0.0);
        if s > best {
            best = s;
            primary = emotion;
        }
    }

    if primary == Emotion::Neutral {
        return EmotionResult {
            primary_emotion: Emotion::Neutral,
            intensity: 0.0,
            scores,
        };
    }

    let intensifiers = lex.intensifiers.word_hits(&tokens).min(BOOST_CAP);
    let emphasis = emphasis_marks(text).min(BOOST_CAP);
    let density = (best / tokens.len() as f32).min(1.0);

    let intensity = (HIT_FACTOR * best
        + INTENSIFIER_FACTOR * intensifiers as f32
        + EMPHASIS_FACTOR * emphasis as f32
        + DENSITY_FACTOR * density)
        .clamp(0.0, 1.0);

    EmotionResult {
        primary_emotion: primary,
        intensity,
        scores,
    }
}

/// Count positive keywords preceded by a negator, allowing one intensifier
/// in between ("not happy", "not very happy").
fn negated_positive_hits(tokens: &[String]) -> usize {
    let lex = lexicon();
    let Some(happy) = lex.keywords_for(Emotion::Happy) else {
        return 0;
    };
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            if !happy.contains_word(t) || *i == 0 {
                return false;
            }
            let prev = tokens[i - 1].as_str();
            if lex.negators.contains_word(prev) {
                return true;
            }
            *i >= 2
                && lex.intensifiers.contains_word(prev)
                && lex.negators.contains_word(&tokens[i - 2])
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let r = detect_emotion("");
        assert_eq!(r.primary_emotion, Emotion::Neutral);
        assert_eq!(r.intensity, 0.0);
        assert!(r.scores.is_empty());

        let r = detect_emotion("   \n\t ");
        assert_eq!(r.primary_emotion, Emotion::Neutral);
        assert_eq!(r.intensity, 0.0);
    }

    #[test]
    fn test_no_keywords_is_neutral() {
        let r = detect_emotion("I went to the store after lunch");
        assert_eq!(r.primary_emotion, Emotion::Neutral);
        assert_eq!(r.intensity, 0.0);
    }

    #[test]
    fn test_really_sad_and_down() {
        let r = detect_emotion("I'm feeling really sad and down");
        assert_eq!(r.primary_emotion, Emotion::Sad);
        assert!(r.intensity > 0.5, "intensity was {}", r.intensity);
        assert_eq!(r.score(Emotion::Sad), 2.0);
    }

    #[test]
    fn test_intensifiers_raise_intensity() {
        let plain = detect_emotion("I am worried");
        let boosted = detect_emotion("I am extremely worried!!");
        assert_eq!(plain.primary_emotion, Emotion::Anxious);
        assert_eq!(boosted.primary_emotion, Emotion::Anxious);
        assert!(boosted.intensity > plain.intensity);
    }

    #[test]
    fn test_tie_prefers_negative_affect() {
        // One happy hit, one sad hit.
        let r = detect_emotion("good day but sad evening");
        assert_eq!(r.primary_emotion, Emotion::Sad);
    }

    #[test]
    fn test_tie_between_negative_emotions_uses_priority() {
        // overwhelmed and stressed both hit once; Overwhelmed ranks first.
        let r = detect_emotion("stressed and overwhelmed");
        assert_eq!(r.primary_emotion, Emotion::Overwhelmed);
    }

    #[test]
    fn test_negated_positive_counts_as_sad() {
        let r = detect_emotion("I'm not happy");
        assert_eq!(r.primary_emotion, Emotion::Sad);
        assert_eq!(r.score(Emotion::Happy), 0.0);

        let r = detect_emotion("not very good at all");
        assert_eq!(r.primary_emotion, Emotion::Sad);
    }

    #[test]
    fn test_phrase_outweighs_single_word() {
        // "tired of" (frustrated phrase, 1.5) vs "tired" (tired word, 1.0)
        let r = detect_emotion("I'm tired of this");
        assert_eq!(r.primary_emotion, Emotion::Frustrated);
    }

    #[test]
    fn test_happy_detected() {
        let r = detect_emotion("I got an A, I'm so happy!");
        assert_eq!(r.primary_emotion, Emotion::Happy);
        assert!(!r.is_negative());
    }

    #[test]
    fn test_intensity_is_clamped() {
        let r = detect_emotion("SAD SAD SAD SAD SAD really really really!!! so so down down");
        assert!(r.intensity <= 1.0);
        assert!(r.intensity >= 0.0);
    }

    #[test]
    fn test_emotion_from_str_roundtrip() {
        for e in Emotion::ALL {
            assert_eq!(e.label().parse::<Emotion>().unwrap(), e);
        }
        assert!("ecstatic".parse::<Emotion>().is_err());
    }

    #[test]
    fn test_describe() {
        assert_eq!(EmotionResult::neutral().describe(), "calm / neutral");
        let r = EmotionResult::new(Emotion::Anxious, 0.9);
        assert_eq!(r.describe(), "extremely anxious");
    }

    #[test]
    fn test_new_sanitizes_intensity() {
        assert_eq!(EmotionResult::new(Emotion::Sad, 4.0).intensity, 1.0);
        assert_eq!(EmotionResult::new(Emotion::Sad, -1.0).intensity, 0.0);
        assert_eq!(EmotionResult::new(Emotion::Sad, f32::NAN).intensity, 0.0);
    }

    #[test]
    fn test_result_serializes_with_snake_case_names() {
        let r = detect_emotion("so stressed and worried");
        let json = serde_json::to_value(&r).unwrap();
        // Tied scores resolve to the earlier emotion
        assert_eq!(json["primary_emotion"], "anxious");
        assert!(json["scores"].get("stressed").is_some());
        let back: EmotionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.primary_emotion, Emotion::Anxious);
    }
}
