//! Deterministic, offline answer builder. Used when no hosted provider answers.
//!
//! The reply is assembled from fixed blocks in this order, separated by blank lines:
//! opening, intent-specific body, topic addenda, follow-up questions.

use crate::analyzer::{self, Intent, IntentAnalysis, Specificity};
use crate::category::Category;

const MAX_FOLLOW_UPS: usize = 2;

pub const FOLLOW_UP_HEADER: &str = "**Let's dig deeper:**";

const FOLLOW_UP_INVITATION: &str =
    "Feel free to share more details about your project - the more specific you are, the better I can help!";

const PLOT_HOW_TO: &str = "Here's how to develop a compelling plot:

1. **Start with your character's goal** - What does your protagonist desperately want?
2. **Create obstacles** - What prevents them from getting it?
3. **Escalate the stakes** - What happens if they fail?
4. **Plan key turning points** - When does everything change?
5. **Build to a climax** - How will the main conflict be resolved?";

const CHARACTER_HOW_TO: &str = "Here's how to create compelling characters:

1. **Define their core motivation** - What drives them?
2. **Give them a fatal flaw** - What weakness will cause problems?
3. **Create a detailed backstory** - What shaped them?
4. **Establish their voice** - How do they speak and think?
5. **Plan their character arc** - How will they change?";

const CHARACTER_EXAMPLES: &str = "Here are some character examples:

**Complex Protagonist:** A detective who breaks rules to solve cases, but struggles with alcoholism and failed relationships. Their strength (determination) is also their weakness (obsession).

**Compelling Antagonist:** A corporate CEO who genuinely believes they're saving the world through technology, but their methods harm communities. They're not evil - they're convinced they're right.

**Supporting Character:** A wise mentor who appears helpful but secretly manipulates events for their own agenda, revealed only at the story's climax.";

const PLOT_EXAMPLES: &str = "Here are some plot structure examples:

**Three-Act Structure:**
- Act I: Harry Potter learns he's a wizard (Setup)
- Act II: He faces challenges at Hogwarts and discovers Voldemort's plan (Confrontation)
- Act III: Final confrontation and resolution (Resolution)

**Hero's Journey:**
- Ordinary World → Call to Adventure → Crossing the Threshold → Tests and Trials → Return Transformed";

const ASSISTANCE_INTRO: &str = "I understand you're feeling stuck! This is completely normal for writers. Here are some strategies to break through:

**Quick Exercises:**
- Write for just 10 minutes without stopping
- Change your writing environment
- Interview your characters about their secrets
- Write the scene you're avoiding";

const ASSISTANCE_PLOT: &str = "**If you're stuck on plot:**
- Ask \"What's the worst thing that could happen right now?\"
- Consider what your character fears most, then make them face it
- Try writing the ending first, then work backward";

const ASSISTANCE_CHARACTER: &str = "**If you're stuck on characters:**
- Write a scene of them doing something mundane (grocery shopping, etc.)
- Create a dialogue between two characters who disagree
- Write their internal monologue during a stressful moment";

const ASSISTANCE_OUTRO: &str = "What specifically are you stuck on? I can provide more targeted help!";

const STORY_DEVELOPMENT_ADVICE: &str = "Let's build your story foundation:

**Core Elements:**
- **Protagonist:** Who is your main character?
- **Goal:** What do they want more than anything?
- **Conflict:** What stands in their way?
- **Stakes:** What happens if they fail?

Start with these elements, and your plot will naturally emerge from your character's struggle to achieve their goal.";

const CHARACTER_CREATION_ADVICE: &str = "Character creation is about building believable people:

**The Character Diamond:**
- **Want:** What they consciously desire
- **Need:** What they unconsciously require for growth
- **Flaw:** The weakness that holds them back
- **Strength:** The quality that will eventually save them

Characters become compelling when their wants and needs conflict, forcing difficult choices.";

const PLOT_BRAINSTORMING_ADVICE: &str = "Let's generate some plot ideas:

**Plot Spark Techniques:**
- **What If:** Start with \"What if...\" and explore possibilities
- **Conflict Escalation:** Small problem → bigger problem → impossible situation
- **Character Collision:** Put two opposing characters in the same space
- **Secret Reveal:** What hidden truth would change everything?

The best plots come from character motivation meeting external obstacles.";

const WRITING_STYLE_ADVICE: &str = "Let's refine your writing craft:

**Style Fundamentals:**
- **Show vs. Tell:** Demonstrate emotions through actions and dialogue
- **Sensory Details:** Engage all five senses in your descriptions
- **Varied Sentences:** Mix short, punchy sentences with longer, flowing ones
- **Active Voice:** Use strong, specific verbs

Your unique voice develops through consistent practice and conscious choice.";

const PLOT_TIPS: &str = "**Plot Development Tips:**
- Consider the three-act structure: Setup → Confrontation → Resolution
- Each scene should either advance plot or develop character
- Build tension through escalating obstacles
- Give your protagonist both external and internal conflicts";

const CHARACTER_TIPS: &str = "**Character Development Techniques:**
- Give characters clear motivations and goals
- Create believable flaws alongside strengths
- Show character growth through actions, not just dialogue
- Develop unique voices for each character";

const DIALOGUE_TIPS: &str = "**Dialogue Tips:**
- Each character should have a distinct speaking style
- Use subtext - characters rarely say exactly what they mean
- Break up dialogue with action beats
- Read dialogue aloud to test if it sounds natural";

const CHARACTER_QUESTIONS: [&str; 2] = [
    "What's your character's biggest fear?",
    "How do they handle conflict?",
];
const PLOT_QUESTIONS: [&str; 2] = [
    "What genre are you writing in?",
    "What's at stake if your protagonist fails?",
];
const DIALOGUE_QUESTIONS: [&str; 1] = ["Do your characters have distinct speaking styles?"];
const GENERIC_QUESTIONS: [&str; 2] = [
    "What specific aspect would you like to explore further?",
    "What's the biggest challenge you're facing with this project?",
];

/// Analyzes `message` and composes the local answer in one step.
pub fn respond(message: &str, category: &Category) -> String {
    let analysis = analyzer::analyze(message, category);
    compose(&analysis, message, category)
}

pub fn compose(analysis: &IntentAnalysis, message: &str, category: &Category) -> String {
    let character_focus = analysis.has_topic("character") || category.is_character();

    let mut sections = vec![opening(analysis, category), body(analysis, message, category)];

    if analysis.has_topic("plot") {
        sections.push(PLOT_TIPS.to_string());
    }
    if character_focus {
        sections.push(CHARACTER_TIPS.to_string());
    }
    if analysis.has_topic("dialogue") {
        sections.push(DIALOGUE_TIPS.to_string());
    }

    sections.push(closing(analysis, category));
    sections.join("\n\n")
}

fn opening(analysis: &IntentAnalysis, category: &Category) -> String {
    if analysis.specificity == Specificity::High {
        let subject = if analysis.topics.is_empty() {
            "your creative writing".to_string()
        } else {
            analysis.topics.join(" and ")
        };
        format!("Great question about {subject}!")
    } else {
        format!("I'd love to help you with {}!", category.label())
    }
}

fn body(analysis: &IntentAnalysis, message: &str, category: &Category) -> String {
    match analysis.intent {
        Intent::HowTo => how_to(analysis, category),
        Intent::Examples => examples(analysis, category),
        _ if analysis.intent == Intent::Assistance || message.to_lowercase().contains("stuck") => {
            assistance(analysis, category)
        }
        _ => general_advice(category).to_string(),
    }
}

fn how_to(analysis: &IntentAnalysis, category: &Category) -> String {
    if analysis.has_topic("plot") {
        return PLOT_HOW_TO.to_string();
    }
    if analysis.has_topic("character") || category.is_character() {
        return CHARACTER_HOW_TO.to_string();
    }
    format!(
        "Here's a step-by-step approach to {}:

1. **Start with the basics** - Understand the fundamentals
2. **Practice specific techniques** - Focus on one skill at a time
3. **Study examples** - Read works in your genre
4. **Write regularly** - Consistency builds skill
5. **Seek feedback** - Get input from other writers",
        category.label()
    )
}

fn examples(analysis: &IntentAnalysis, category: &Category) -> String {
    if analysis.has_topic("character") || category.is_character() {
        return CHARACTER_EXAMPLES.to_string();
    }
    if analysis.has_topic("plot") {
        return PLOT_EXAMPLES.to_string();
    }
    format!(
        "Here are some practical examples for {}:

**Good:** Shows character emotion through action
**Better:** \"Sarah's hands trembled as she reached for the letter\"

**Good:** Describes the setting
**Better:** \"The abandoned house groaned in the wind, its broken shutters flapping like wounded birds\"",
        category.label()
    )
}

fn assistance(analysis: &IntentAnalysis, category: &Category) -> String {
    let plot = analysis.has_topic("plot");
    let character = analysis.has_topic("character") || category.is_character();

    let mut parts = vec![ASSISTANCE_INTRO];
    if plot || !character {
        parts.push(ASSISTANCE_PLOT);
    }
    if character || !plot {
        parts.push(ASSISTANCE_CHARACTER);
    }
    parts.push(ASSISTANCE_OUTRO);
    parts.join("\n\n")
}

fn general_advice(category: &Category) -> &'static str {
    match category {
        Category::CharacterCreation => CHARACTER_CREATION_ADVICE,
        Category::PlotBrainstorming => PLOT_BRAINSTORMING_ADVICE,
        Category::WritingStyle => WRITING_STYLE_ADVICE,
        _ => STORY_DEVELOPMENT_ADVICE,
    }
}

fn closing(analysis: &IntentAnalysis, category: &Category) -> String {
    let mut questions: Vec<&str> = Vec::new();

    if analysis.has_topic("character") || category.is_character() {
        questions.extend(CHARACTER_QUESTIONS);
    }
    if analysis.has_topic("plot") || *category == Category::StoryDevelopment {
        questions.extend(PLOT_QUESTIONS);
    }
    if analysis.has_topic("dialogue") {
        questions.extend(DIALOGUE_QUESTIONS);
    }
    if questions.is_empty() {
        questions.extend(GENERIC_QUESTIONS);
    }

    let lines = questions
        .iter()
        .take(MAX_FOLLOW_UPS)
        .map(|q| format!("- {q}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{FOLLOW_UP_HEADER}\n{lines}\n\n{FOLLOW_UP_INVITATION}")
}
