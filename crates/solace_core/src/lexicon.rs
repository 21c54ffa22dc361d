//! Process-wide keyword tables.
//!
//! Built once on first use and never mutated afterwards, so every session
//! (and every thread hosting sessions) shares the same read-only tables.

use crate::emotion::Emotion;
use crate::text::count_phrase;
use std::collections::HashSet;
use std::sync::LazyLock;

static LEXICON: LazyLock<Lexicon> = LazyLock::new(Lexicon::build);

/// Access the shared lexicon, building it on first call.
pub fn lexicon() -> &'static Lexicon {
    &LEXICON
}

// ============================================================================
// Keyword sets
// ============================================================================

/// A keyword list split into single tokens and multi-word phrases.
#[derive(Debug, Clone)]
pub struct Keywords {
    words: HashSet<&'static str>,
    phrases: Vec<&'static str>,
}

impl Keywords {
    pub fn new(entries: &[&'static str]) -> Self {
        let mut words = HashSet::new();
        let mut phrases = Vec::new();
        for entry in entries {
            if entry.contains(' ') {
                phrases.push(*entry);
            } else {
                words.insert(*entry);
            }
        }
        Self { words, phrases }
    }

    pub fn contains_word(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Number of single-word hits in `tokens`.
    pub fn word_hits(&self, tokens: &[String]) -> usize {
        tokens.iter().filter(|t| self.words.contains(t.as_str())).count()
    }

    /// Number of phrase hits in a padded haystack.
    pub fn phrase_hits(&self, haystack: &str) -> usize {
        self.phrases.iter().map(|p| count_phrase(haystack, p)).sum()
    }

    /// Whether any word or phrase occurs at all.
    pub fn matches(&self, tokens: &[String], haystack: &str) -> bool {
        tokens.iter().any(|t| self.words.contains(t.as_str()))
            || self.phrases.iter().any(|p| count_phrase(haystack, p) > 0)
    }

    /// First matching entry, phrases before words. Used for log lines and
    /// status output, never for scoring.
    pub fn first_match(&self, tokens: &[String], haystack: &str) -> Option<&'static str> {
        self.phrases
            .iter()
            .find(|p| count_phrase(haystack, p) > 0)
            .copied()
            .or_else(|| {
                tokens
                    .iter()
                    .find_map(|t| self.words.get(t.as_str()).copied())
            })
    }
}

/// Keywords for one emotion.
#[derive(Debug, Clone)]
pub struct EmotionLexicon {
    pub emotion: Emotion,
    pub keywords: Keywords,
}

/// Keywords for one named topic.
#[derive(Debug, Clone)]
pub struct TopicLexicon {
    pub name: &'static str,
    pub keywords: Keywords,
}

/// Vocabulary used by intent recognition.
#[derive(Debug, Clone)]
pub struct IntentLexicon {
    pub greetings: Keywords,
    pub farewells: Keywords,
    pub homework: Keywords,
    pub support: Keywords,
    pub gratitude: Keywords,
}

/// All read-only tables used by the pipeline.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Ordered by tie-break priority (same order as [`Emotion::ALL`]).
    pub emotions: Vec<EmotionLexicon>,
    pub intensifiers: Keywords,
    pub negators: Keywords,
    pub escalation: Keywords,
    pub topics: Vec<TopicLexicon>,
    pub intents: IntentLexicon,
}

impl Lexicon {
    fn build() -> Self {
        let emotions = Emotion::ALL
            .iter()
            .filter_map(|e| {
                emotion_keywords(*e).map(|kw| EmotionLexicon {
                    emotion: *e,
                    keywords: Keywords::new(kw),
                })
            })
            .collect();

        let topics = TOPICS
            .iter()
            .map(|&(name, kw)| TopicLexicon {
                name,
                keywords: Keywords::new(kw),
            })
            .collect();

        tracing::debug!("Lexicon tables built");

        Self {
            emotions,
            intensifiers: Keywords::new(INTENSIFIERS),
            negators: Keywords::new(NEGATORS),
            escalation: Keywords::new(ESCALATION),
            topics,
            intents: IntentLexicon {
                greetings: Keywords::new(GREETINGS),
                farewells: Keywords::new(FAREWELLS),
                homework: Keywords::new(HOMEWORK),
                support: Keywords::new(SUPPORT_REQUESTS),
                gratitude: Keywords::new(GRATITUDE),
            },
        }
    }

    pub fn keywords_for(&self, emotion: Emotion) -> Option<&Keywords> {
        self.emotions
            .iter()
            .find(|l| l.emotion == emotion)
            .map(|l| &l.keywords)
    }
}

// ============================================================================
// Raw tables
// ============================================================================

fn emotion_keywords(emotion: Emotion) -> Option<&'static [&'static str]> {
    match emotion {
        Emotion::Overwhelmed => Some(OVERWHELMED),
        Emotion::Sad => Some(SAD),
        Emotion::Anxious => Some(ANXIOUS),
        Emotion::Stressed => Some(STRESSED),
        Emotion::Frustrated => Some(FRUSTRATED),
        Emotion::Angry => Some(ANGRY),
        Emotion::Lonely => Some(LONELY),
        Emotion::Tired => Some(TIRED),
        Emotion::Bored => Some(BORED),
        Emotion::Happy => Some(HAPPY),
        Emotion::Neutral => None,
    }
}

const OVERWHELMED: &[&str] = &[
    "overwhelmed", "overwhelming", "drowning", "swamped", "buried", "too much",
    "can't cope", "cant cope", "can't handle", "cant handle", "falling apart",
    "so much to do", "can't keep up",
];

const SAD: &[&str] = &[
    "sad", "down", "unhappy", "depressed", "miserable", "crying", "cry", "cried", "tears",
    "heartbroken", "hopeless", "worthless", "empty", "gloomy", "upset", "hurt", "hurting",
    "grief", "grieving", "broken", "feeling low", "feel low",
];

const ANXIOUS: &[&str] = &[
    "anxious", "anxiety", "worried", "worry", "worrying", "nervous", "scared", "afraid",
    "panic", "panicking", "fear", "uneasy", "terrified", "dread", "on edge", "freaking out",
];

const STRESSED: &[&str] = &[
    "stressed", "stress", "stressful", "pressure", "tense", "deadline", "deadlines", "hectic",
    "burnout", "under pressure", "burned out", "burnt out",
];

const FRUSTRATED: &[&str] = &[
    "frustrated", "frustrating", "annoyed", "annoying", "irritated", "stuck", "ugh", "argh",
    "fed up", "sick of", "tired of",
];

const ANGRY: &[&str] = &[
    "angry", "mad", "furious", "hate", "rage", "pissed", "livid", "outraged",
];

const LONELY: &[&str] = &[
    "lonely", "alone", "isolated", "ignored", "no friends", "left out", "nobody cares",
    "no one cares", "by myself",
];

const TIRED: &[&str] = &[
    "tired", "exhausted", "exhausting", "drained", "sleepy", "fatigued", "worn out",
    "no energy",
];

const BORED: &[&str] = &[
    "bored", "boring", "dull", "meh", "uninterested", "nothing to do",
];

const HAPPY: &[&str] = &[
    "happy", "glad", "great", "good", "awesome", "excited", "joy", "joyful", "amazing",
    "wonderful", "fantastic", "proud", "grateful", "thankful", "fun", "relieved", "better",
    "love",
];

const INTENSIFIERS: &[&str] = &[
    "really", "so", "very", "extremely", "totally", "completely", "super", "incredibly",
    "absolutely", "too", "truly", "deeply", "utterly",
];

const NEGATORS: &[&str] = &[
    "not", "never", "don't", "dont", "isn't", "isnt", "wasn't", "wasnt", "aren't", "no",
    "hardly", "can't", "cannot",
];

const ESCALATION: &[&str] = &[
    "hopeless", "worthless", "suicide", "suicidal", "no point", "give up", "giving up",
    "kill myself", "end it all", "want to die", "better off without me", "hurt myself",
    "self harm", "can't go on", "cant go on", "no reason to live",
];

const TOPICS: &[(&str, &[&str])] = &[
    (
        "school",
        &[
            "school", "homework", "exam", "test", "class", "teacher", "grade", "study",
            "assignment", "essay", "quiz", "math", "science", "lesson", "project",
        ],
    ),
    (
        "work",
        &["job", "boss", "work", "deadline", "meeting", "office", "coworker", "shift", "career"],
    ),
    (
        "family",
        &["mom", "dad", "parent", "family", "brother", "sister", "grandma", "grandpa", "home"],
    ),
    (
        "friends",
        &["friend", "party", "classmate", "group", "hangout", "bestie"],
    ),
    (
        "relationships",
        &["boyfriend", "girlfriend", "partner", "breakup", "crush", "dating", "relationship"],
    ),
    (
        "health",
        &["sleep", "sick", "doctor", "headache", "eat", "eating", "tired", "body", "health"],
    ),
    (
        "hobbies",
        &["game", "music", "movie", "book", "drawing", "sport", "guitar", "art", "show"],
    ),
    (
        "future",
        &["college", "university", "future", "plan", "dream", "goal"],
    ),
];

const GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "howdy", "yo", "hiya", "good morning", "good afternoon",
    "good evening", "what's up",
];

// Bare "exit"/"quit" live in `EXIT_COMMANDS`; inside a sentence they are not goodbyes.
const FAREWELLS: &[&str] = &[
    "bye", "goodbye", "goodnight", "farewell", "cya", "see you", "see ya", "good night",
    "talk later", "gotta go", "i have to go now",
];

/// Commands that end the conversation when typed on their own.
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

const HOMEWORK: &[&str] = &[
    "homework", "assignment", "essay", "worksheet", "quiz", "exam", "studying", "study",
    "math", "science", "help with my", "help me study",
];

const SUPPORT_REQUESTS: &[&str] = &[
    "vent", "advice", "need to talk", "can we talk", "help me", "i need help",
    "listen to me", "what should i do", "need someone",
];

const GRATITUDE: &[&str] = &[
    "thanks", "thx", "appreciate", "thank you", "that helps", "that helped",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{phrase_haystack, tokenize};

    #[test]
    fn test_every_non_neutral_emotion_has_keywords() {
        let lex = lexicon();
        for e in Emotion::ALL {
            if e == Emotion::Neutral {
                assert!(lex.keywords_for(e).is_none());
            } else {
                assert!(lex.keywords_for(e).is_some(), "missing keywords for {:?}", e);
            }
        }
    }

    #[test]
    fn test_emotion_tables_follow_priority_order() {
        let order: Vec<Emotion> = lexicon().emotions.iter().map(|l| l.emotion).collect();
        let expected: Vec<Emotion> = Emotion::ALL
            .iter()
            .copied()
            .filter(|e| *e != Emotion::Neutral)
            .collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_escalation_phrase_match() {
        let tokens = tokenize("honestly there's no point anymore");
        let hay = phrase_haystack(&tokens);
        assert!(lexicon().escalation.matches(&tokens, &hay));
        assert_eq!(
            lexicon().escalation.first_match(&tokens, &hay),
            Some("no point")
        );
    }

    #[test]
    fn test_keywords_split_words_and_phrases() {
        let kw = Keywords::new(&["sad", "feeling low"]);
        assert!(kw.contains_word("sad"));
        assert!(!kw.contains_word("feeling low"));
        let tokens = tokenize("sad and feeling low");
        let hay = phrase_haystack(&tokens);
        assert_eq!(kw.word_hits(&tokens), 1);
        assert_eq!(kw.phrase_hits(&hay), 1);
    }

    #[test]
    fn test_shared_instance() {
        assert!(std::ptr::eq(lexicon(), lexicon()));
    }
}
