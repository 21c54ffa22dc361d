//! Text normalization shared by every lexicon lookup.
//!
//! All matching in the pipeline is done on lowercase word tokens. Multi-word
//! phrases are matched against a space-padded haystack so that "down" never
//! matches inside "download".

/// Split text into lowercase word tokens.
///
/// Curly apostrophes are folded to `'` so "I’m" and "I'm" tokenize the same.
pub fn tokenize(text: &str) -> Vec<String> {
    text.chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '`' => '\'',
            _ => c,
        })
        .collect::<String>()
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tokens into `" tok1 tok2 ... "` for word-boundary phrase matching.
pub fn phrase_haystack(tokens: &[String]) -> String {
    let mut hay = String::with_capacity(tokens.iter().map(|t| t.len() + 1).sum::<usize>() + 1);
    hay.push(' ');
    for t in tokens {
        hay.push_str(t);
        hay.push(' ');
    }
    hay
}

/// Count non-overlapping occurrences of `phrase` in a haystack built by
/// [`phrase_haystack`].
pub fn count_phrase(haystack: &str, phrase: &str) -> usize {
    if phrase.trim().is_empty() {
        return 0;
    }
    let needle = format!(" {} ", phrase.trim());
    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(&needle) {
        count += 1;
        // Step past the phrase but keep the trailing space so adjacent
        // occurrences still see their leading boundary.
        start += pos + needle.len() - 1;
    }
    count
}

/// Reduce a word to a simple singular form for topic labels.
pub fn normalize_term(word: &str) -> String {
    let w = word.trim().to_lowercase();
    let len = w.chars().count();
    if len > 4 && w.ends_with("ies") {
        format!("{}y", &w[..w.len() - 3])
    } else if len > 3 && w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") {
        w[..w.len() - 1].to_string()
    } else {
        w
    }
}

/// Count emphasis markers: runs of two or more `!`/`?` and shouted words
/// (fully uppercase, at least three letters).
pub fn emphasis_marks(text: &str) -> usize {
    let mut runs = 0;
    let mut run_len = 0;
    for c in text.chars() {
        if c == '!' || c == '?' {
            run_len += 1;
        } else {
            if run_len >= 2 {
                runs += 1;
            }
            run_len = 0;
        }
    }
    if run_len >= 2 {
        runs += 1;
    }

    let shouted = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() >= 3 && w.chars().all(|c| c.is_uppercase()))
        .count();

    runs + shouted
}

/// Words that never make a useful topic label.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "but", "for", "with", "that", "this", "have", "has", "had", "was", "were",
    "are", "you", "your", "i'm", "im", "i've", "i'll", "i'd", "its", "it's", "just", "really",
    "very", "so", "too", "about", "what", "when", "where", "which", "who", "why", "how", "they",
    "them", "their", "there", "then", "than", "from", "into", "out", "not", "don't", "dont",
    "can't", "cant", "won't", "didn't", "doesn't", "isn't", "aren't", "feel", "feeling", "feels",
    "felt", "like", "know", "think", "want", "need", "get", "got", "getting", "going", "been",
    "being", "some", "much", "many", "more", "most", "also", "all", "any", "anything",
    "something", "nothing", "everything", "again", "still", "even", "today", "now", "right",
    "maybe", "because", "since", "would", "could", "should", "will", "can", "did", "does",
    "doing", "make", "made", "things", "thing", "stuff", "lot", "kind", "sort", "little", "bit",
    "well", "yeah", "yes", "okay", "ok", "hey", "hello", "hi", "thanks", "thank", "please",
    "my", "me", "myself", "our", "we", "she", "he", "her", "him", "his", "one", "time",
    "extremely", "totally", "completely", "super", "incredibly", "absolutely", "sad", "happy",
];

/// True when `token` is a stopword or too short to carry a topic.
pub fn is_stopword(token: &str) -> bool {
    token.chars().count() < 3 || STOPWORDS.contains(&token)
}
