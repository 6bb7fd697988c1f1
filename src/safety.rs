//! Safety layer: crisis interception and forbidden-content filtering.
//!
//! Both checks are plain case-insensitive substring containment against fixed
//! phrase lists. No stemming, no language detection.

/// Phrases that indicate possible self-harm or suicidal ideation.
///
/// Stored lower-case; covers English, Hindi, Japanese, Spanish and Portuguese.
pub const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "self harm",
    "hurt myself",
    "i want to die",
    "i want to end it",
    "i can't go on",
    "आत्महत्या",
    "मैं मरना चाहता हूँ",
    "自殺",
    "自分を殺す",
    "me quiero morir",
    "vou me matar",
];

/// Topic words that externally-sourced text must not contain.
pub const FORBIDDEN_WORDS: &[&str] = &[
    "porn",
    "xxx",
    "nude",
    "nsfw",
    "explicit sex",
    "cocaine",
    "heroin",
    "methamphetamine",
    "buy drugs",
    "weed dealer",
    "gore",
    "beheading",
    "mass shooting",
    "bomb making",
    "terrorist attack",
    "racial slur",
    "white supremacy",
    "hate speech",
    "kill them all",
    "gambling",
    "betting tips",
];

/// Shown instead of any model output when a crisis phrase is detected.
pub const CRISIS_MESSAGE: &str = "⚠️ I hear that you’re going through something very painful right now.\n\n\
👉 You are not alone. If you are in immediate danger, please call your local emergency number.\n\n\
Here are some helplines:\n\
📞 India: AASRA – 91-22-27546669 or 1800-599-0019\n\
📞 USA: 988 (Suicide & Crisis Lifeline)\n\
📞 UK: Samaritans – 116 123\n\n\
💙 Please reach out to someone who can support you immediately. Your life matters.";

/// Stateless phrase matcher shared by the dispatcher and the HTTP gates.
#[derive(Debug, Clone)]
pub struct SafetyLayer {
    crisis_phrases: Vec<String>,
    forbidden_words: Vec<String>,
}

impl SafetyLayer {
    /// Create a safety layer with the built-in phrase lists.
    pub fn new() -> Self {
        Self::with_lists(CRISIS_PHRASES, FORBIDDEN_WORDS)
    }

    /// Create a safety layer with custom lists. Entries are lower-cased once here.
    fn with_lists(crisis_phrases: &[&str], forbidden_words: &[&str]) -> Self {
        Self {
            crisis_phrases: crisis_phrases.iter().map(|p| p.to_lowercase()).collect(),
            forbidden_words: forbidden_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Whether the text contains any crisis phrase.
    pub fn is_crisis(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.crisis_phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    pub fn crisis_message(&self) -> &'static str {
        CRISIS_MESSAGE
    }

    /// Whether the text contains any forbidden word.
    pub fn contains_forbidden(&self, text: &str) -> bool {
        !self.forbidden_matches(text).is_empty()
    }

    /// All forbidden words found in the text, in list order.
    pub fn forbidden_matches(&self, text: &str) -> Vec<&str> {
        let lower = text.to_lowercase();
        self.forbidden_words
            .iter()
            .filter(|w| lower.contains(w.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl Default for SafetyLayer {
    fn default() -> Self {
        Self::new()
    }
}
