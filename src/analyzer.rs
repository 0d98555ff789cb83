//! Keyword and question-word analysis of a user message, used by the local composer.

use serde::Serialize;

use crate::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    HowTo,
    Definition,
    Explanation,
    Assistance,
    Examples,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Specificity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentAnalysis {
    /// Unique topic tags, in table order.
    pub topics: Vec<&'static str>,
    /// Every matched keyword, in table order.
    pub keywords: Vec<&'static str>,
    pub intent: Intent,
    pub specificity: Specificity,
}

impl IntentAnalysis {
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| *t == topic)
    }
}

type TopicTable = &'static [(&'static str, &'static [&'static str])];

const STORY_DEVELOPMENT_TOPICS: TopicTable = &[
    ("plot", &["plot", "story", "narrative", "structure", "beginning", "middle", "end", "climax"]),
    ("pacing", &["pacing", "tempo", "rhythm", "flow", "speed", "slow", "fast"]),
    ("conflict", &["conflict", "tension", "problem", "obstacle", "struggle", "opposition"]),
    ("theme", &["theme", "meaning", "message", "moral", "deeper", "symbolism"]),
    ("genre", &["fantasy", "sci-fi", "romance", "mystery", "horror", "thriller", "literary"]),
];

const CHARACTER_CREATION_TOPICS: TopicTable = &[
    ("personality", &["personality", "traits", "quirks", "behavior", "psychology"]),
    ("backstory", &["backstory", "history", "past", "background", "origin"]),
    ("motivation", &["motivation", "goals", "wants", "needs", "desires", "drive"]),
    ("relationships", &["relationships", "family", "friends", "romance", "enemies"]),
    ("dialogue", &["dialogue", "speech", "voice", "conversation", "talking", "speaking"]),
];

const PLOT_BRAINSTORMING_TOPICS: TopicTable = &[
    ("ideas", &["ideas", "concepts", "brainstorm", "thinking", "stuck", "blank"]),
    ("twists", &["twist", "surprise", "unexpected", "shock", "reveal"]),
    ("scenes", &["scene", "chapter", "moment", "event", "sequence"]),
    ("endings", &["ending", "conclusion", "finale", "resolution", "finish"]),
];

const WRITING_STYLE_TOPICS: TopicTable = &[
    ("prose", &["prose", "writing", "style", "voice", "tone", "flow"]),
    ("description", &["description", "imagery", "sensory", "details", "vivid"]),
    ("dialogue", &["dialogue", "conversation", "speech", "talking"]),
    ("grammar", &["grammar", "punctuation", "sentence", "paragraph"]),
];

fn topic_table(category: &Category) -> TopicTable {
    match category {
        Category::StoryDevelopment => STORY_DEVELOPMENT_TOPICS,
        Category::CharacterCreation => CHARACTER_CREATION_TOPICS,
        Category::PlotBrainstorming => PLOT_BRAINSTORMING_TOPICS,
        Category::WritingStyle => WRITING_STYLE_TOPICS,
        _ => &[],
    }
}

/// First match wins; the order matters ("show" also contains "how").
fn classify_intent(message: &str) -> Intent {
    if message.contains("how") {
        Intent::HowTo
    } else if message.contains("what") || message.contains("which") {
        Intent::Definition
    } else if message.contains("why") {
        Intent::Explanation
    } else if message.contains("help") || message.contains("stuck") {
        Intent::Assistance
    } else if message.contains("example") || message.contains("show") {
        Intent::Examples
    } else {
        Intent::General
    }
}

fn rate_specificity(keyword_count: usize, message_len: usize) -> Specificity {
    if keyword_count > 3 || message_len > 50 {
        Specificity::High
    } else if keyword_count > 1 || message_len > 20 {
        Specificity::Medium
    } else {
        Specificity::Low
    }
}

pub fn analyze(message: &str, category: &Category) -> IntentAnalysis {
    let message = message.to_lowercase();

    let mut topics = Vec::new();
    let mut keywords = Vec::new();
    for (topic, topic_keywords) in topic_table(category) {
        let before = keywords.len();
        keywords.extend(topic_keywords.iter().copied().filter(|k| message.contains(k)));
        if keywords.len() > before {
            topics.push(*topic);
        }
    }

    let specificity = rate_specificity(keywords.len(), message.chars().count());

    IntentAnalysis {
        topics,
        keywords,
        intent: classify_intent(&message),
        specificity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tension_question_in_story_development() {
        let analysis = analyze("How do I build tension in my story?", &Category::StoryDevelopment);
        assert_eq!(analysis.intent, Intent::HowTo);
        assert_eq!(analysis.topics, vec!["plot", "conflict"]);
        assert_eq!(analysis.keywords, vec!["story", "tension"]);
        assert_eq!(analysis.specificity, Specificity::Medium);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let analysis = analyze("PLOT TWIST", &Category::StoryDevelopment);
        assert_eq!(analysis.topics, vec!["plot"]);
        assert_eq!(analysis.keywords, vec!["plot"]);
    }

    #[test]
    fn test_keywords_follow_table_order() {
        let analysis = analyze("romance dialogue and romance", &Category::CharacterCreation);
        assert_eq!(analysis.topics, vec!["relationships", "dialogue"]);
        assert_eq!(analysis.keywords, vec!["romance", "dialogue"]);

        let analysis = analyze("my story has a slow end", &Category::StoryDevelopment);
        assert_eq!(analysis.topics, vec!["plot", "pacing"]);
        assert_eq!(analysis.keywords, vec!["story", "end", "slow"]);
    }

    #[test]
    fn test_intent_ladder_priority() {
        let cases = [
            ("how does this work", Intent::HowTo),
            ("show me", Intent::HowTo),
            ("what is a foil", Intent::Definition),
            ("which pov", Intent::Definition),
            ("why bother", Intent::Explanation),
            ("help", Intent::Assistance),
            ("i am stuck", Intent::Assistance),
            ("an example please", Intent::Examples),
            ("tell me a tale", Intent::General),
            ("why am i stuck", Intent::Explanation),
        ];
        for (message, expected) in cases {
            assert_eq!(analyze(message, &Category::General).intent, expected, "{message}");
        }
    }

    #[test]
    fn test_specificity_thresholds_are_exclusive() {
        assert_eq!(rate_specificity(0, 20), Specificity::Low);
        assert_eq!(rate_specificity(0, 21), Specificity::Medium);
        assert_eq!(rate_specificity(1, 0), Specificity::Low);
        assert_eq!(rate_specificity(2, 0), Specificity::Medium);
        assert_eq!(rate_specificity(3, 50), Specificity::Medium);
        assert_eq!(rate_specificity(4, 0), Specificity::High);
        assert_eq!(rate_specificity(0, 51), Specificity::High);
    }

    #[test]
    fn test_categories_without_tables_detect_no_topics() {
        for category in [Category::General, Category::GenreGuidance, Category::Other("poetry".into())] {
            let analysis = analyze("plot dialogue story ideas", &category);
            assert!(analysis.topics.is_empty());
            assert!(analysis.keywords.is_empty());
        }
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let message = "Why does my villain's backstory feel flat next to the hero's goals?";
        let first = analyze(message, &Category::CharacterCreation);
        let second = analyze(message, &Category::CharacterCreation);
        assert_eq!(first, second);
        assert_eq!(first.specificity, Specificity::High);
    }
}
