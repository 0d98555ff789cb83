//! Conversation categories and everything keyed by them: system prompts, titles,
//! welcome messages and starter prompts.

use std::fmt;

use serde::Serialize;

/// The advice domain a conversation runs in.
///
/// Parsing never fails: tags outside the known set are kept verbatim as
/// [`Category::Other`] and fall back to story-development or general content
/// wherever a table lookup needs a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    StoryDevelopment,
    CharacterCreation,
    PlotBrainstorming,
    WritingStyle,
    General,
    GenreGuidance,
    WritingPrompts,
    Other(String),
}

impl Category {
    /// Categories offered to users when starting a conversation.
    pub const PRIMARY: [Category; 5] = [
        Category::StoryDevelopment,
        Category::CharacterCreation,
        Category::PlotBrainstorming,
        Category::WritingStyle,
        Category::General,
    ];

    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "story-development" => Category::StoryDevelopment,
            "character-creation" | "character-development" => Category::CharacterCreation,
            "plot-brainstorming" => Category::PlotBrainstorming,
            "writing-style" => Category::WritingStyle,
            "general" => Category::General,
            "genre-guidance" => Category::GenreGuidance,
            "writing-prompts" => Category::WritingPrompts,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::StoryDevelopment => "story-development",
            Category::CharacterCreation => "character-creation",
            Category::PlotBrainstorming => "plot-brainstorming",
            Category::WritingStyle => "writing-style",
            Category::General => "general",
            Category::GenreGuidance => "genre-guidance",
            Category::WritingPrompts => "writing-prompts",
            Category::Other(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Category::Other(_))
    }

    pub fn is_character(&self) -> bool {
        matches!(self, Category::CharacterCreation)
    }

    /// Lower-case name used inside generated sentences.
    pub fn label(&self) -> &'static str {
        match self {
            Category::StoryDevelopment => "story development",
            Category::CharacterCreation => "character creation",
            Category::PlotBrainstorming => "plot brainstorming",
            Category::WritingStyle => "writing style",
            Category::GenreGuidance => "genre guidance",
            Category::WritingPrompts => "writing prompts",
            Category::General | Category::Other(_) => "general writing",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::StoryDevelopment => "Story Development",
            Category::CharacterCreation => "Character Creation",
            Category::PlotBrainstorming => "Plot Brainstorming",
            Category::WritingStyle => "Writing Style",
            Category::GenreGuidance => "Genre Guidance",
            Category::WritingPrompts => "Writing Prompts",
            Category::General | Category::Other(_) => "General Writing Chat",
        }
    }

    pub fn welcome(&self) -> &'static str {
        match self {
            Category::StoryDevelopment => "Welcome to Story Development! I'm here to help you craft compelling narratives and build strong plot structures. What story are you working on, or what aspect of storytelling would you like to explore?",
            Category::CharacterCreation => "Welcome to Character Creation! I specialize in helping you develop rich, multi-dimensional characters. Whether you're creating protagonists, antagonists, or supporting characters, I'm here to help bring them to life. What character are you working on?",
            Category::PlotBrainstorming => "Welcome to Plot Brainstorming! Let's generate some exciting ideas for your story. I can help you develop plot twists, scene concepts, story premises, and more. What kind of story or scene are you imagining?",
            Category::WritingStyle => "Welcome to Writing Style coaching! I'm here to help you refine your prose, improve your dialogue, and develop your unique narrative voice. What aspect of your writing would you like to work on?",
            _ => "Hello! I'm Artemis, your creative writing assistant. I'm here to help with all aspects of creative writing - from story development to character creation, plot brainstorming to style improvement. What would you like to work on today?",
        }
    }

    pub fn starter_prompts(&self) -> [&'static str; 3] {
        match self {
            Category::StoryDevelopment => [
                "Help me develop a compelling plot structure",
                "I'm stuck on my story's pacing",
                "How can I create better conflict in my narrative?",
            ],
            Category::CharacterCreation => [
                "Help me create a complex protagonist",
                "How do I develop realistic character flaws?",
                "I need help with character backstories",
            ],
            Category::PlotBrainstorming => [
                "Generate some plot twist ideas",
                "Help me brainstorm scene ideas",
                "I need a unique story premise",
            ],
            Category::WritingStyle => [
                "How can I improve my dialogue?",
                "Help me show instead of tell",
                "I want to develop my narrative voice",
            ],
            _ => [
                "What writing project should I start?",
                "Help me overcome writer's block",
                "Give me some creative writing exercises",
            ],
        }
    }

    /// Persona handed to hosted providers as the system message.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Category::CharacterCreation => CHARACTER_CREATION_PROMPT,
            Category::PlotBrainstorming => PLOT_BRAINSTORMING_PROMPT,
            Category::WritingStyle => WRITING_STYLE_PROMPT,
            Category::General => GENERAL_PROMPT,
            Category::GenreGuidance => GENRE_GUIDANCE_PROMPT,
            Category::WritingPrompts => WRITING_PROMPTS_PROMPT,
            Category::StoryDevelopment | Category::Other(_) => STORY_DEVELOPMENT_PROMPT,
        }
    }

    pub fn catalogue_entry(&self) -> CategoryInfo {
        CategoryInfo {
            id: self.as_str().to_string(),
            title: self.title(),
            welcome: self.welcome(),
            starter_prompts: self.starter_prompts(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Category::parse(tag)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub id: String,
    pub title: &'static str,
    pub welcome: &'static str,
    pub starter_prompts: [&'static str; 3],
}

const STORY_DEVELOPMENT_PROMPT: &str = "You are Artemis, a specialized Creative Writing Assistant AI focused on story development. You help writers:

- Develop compelling plots and story structures
- Create engaging beginnings, middles, and endings
- Build narrative tension and pacing
- Resolve plot holes and inconsistencies
- Adapt stories for different genres and audiences

Provide specific, actionable advice with examples. Ask clarifying questions to better understand the writer's vision.";

const CHARACTER_CREATION_PROMPT: &str = "You are Artemis, a Creative Writing Assistant specializing in character development. You help writers create:

- Multi-dimensional characters with clear motivations
- Realistic character flaws and growth arcs
- Compelling backstories and relationships
- Authentic dialogue that reflects personality
- Character-driven conflicts and resolutions

Always provide concrete examples and character development exercises.";

const PLOT_BRAINSTORMING_PROMPT: &str = "You are Artemis, focused on plot brainstorming and story ideation. You help writers:

- Generate creative plot ideas and concepts
- Develop interesting conflicts and obstacles
- Create surprising but logical plot twists
- Build satisfying story resolutions
- Connect subplots to the main narrative

Think creatively and offer multiple options for the writer to consider.";

const WRITING_STYLE_PROMPT: &str = "You are Artemis, a writing craft specialist. You help writers improve their prose through:

- Show vs. tell techniques
- Vivid imagery and sensory details
- Dialogue improvement and tags
- Point of view consistency
- Voice development and tone
- Genre-specific writing conventions

Provide before/after examples to illustrate improvements.";

const GENERAL_PROMPT: &str = "You are Artemis, a friendly Creative Writing Assistant. You help writers with every part of the craft:

- Choosing and shaping new writing projects
- Overcoming writer's block
- Story structure, characters and plot
- Prose style and revision habits

Be encouraging, give concrete next steps, and ask what the writer is working on.";

const GENRE_GUIDANCE_PROMPT: &str = "You are Artemis, a genre-specific writing guide. You help writers understand and master:

- Fantasy: World-building, magic systems, mythology
- Science Fiction: Technology, world-building, scientific accuracy
- Romance: Character chemistry, relationship development, emotional arcs
- Mystery/Thriller: Clues, red herrings, pacing, suspense
- Horror: Atmosphere, tension, psychological elements
- Historical Fiction: Research, authenticity, period details

Tailor advice to the specific genre requirements and conventions.";

const WRITING_PROMPTS_PROMPT: &str = "You are Artemis, a creative prompt generator. You provide:

- Unique story starters and scenario ideas
- Character development exercises
- World-building challenges
- Writing technique practice prompts
- Genre-specific creative exercises

Make prompts engaging, specific, and designed to spark creativity.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip() {
        for category in Category::PRIMARY {
            assert_eq!(Category::parse(category.as_str()), category);
            assert!(category.is_recognized());
        }
        assert_eq!(Category::parse("genre-guidance"), Category::GenreGuidance);
        assert_eq!(Category::parse("writing-prompts"), Category::WritingPrompts);
    }

    #[test]
    fn test_character_development_alias() {
        assert_eq!(Category::parse("character-development"), Category::CharacterCreation);
    }

    #[test]
    fn test_unrecognized_category_is_kept_verbatim() {
        let category = Category::parse("poetry");
        assert_eq!(category, Category::Other("poetry".to_string()));
        assert_eq!(category.as_str(), "poetry");
        assert!(!category.is_recognized());
        assert_eq!(category.system_prompt(), Category::StoryDevelopment.system_prompt());
        assert_eq!(category.welcome(), Category::General.welcome());
        assert_eq!(category.label(), "general writing");
    }

    #[test]
    fn test_every_prompt_names_the_persona() {
        for category in Category::PRIMARY
            .into_iter()
            .chain([Category::GenreGuidance, Category::WritingPrompts])
        {
            assert!(category.system_prompt().starts_with("You are Artemis"));
            assert!(!category.welcome().is_empty());
        }
    }

    #[test]
    fn test_catalogue_entry_serializes_camel_case() {
        let value = serde_json::to_value(Category::WritingStyle.catalogue_entry()).unwrap();
        assert_eq!(value["id"], "writing-style");
        assert_eq!(value["title"], "Writing Style");
        assert_eq!(value["starterPrompts"].as_array().unwrap().len(), 3);
    }
}
