//! Prompt builders.
//!
//! Each prompt opens with a fixed header line and carries a `Language:`
//! line, so the text collaborator can be routed and scripted by prompt kind.

use super::brief::{SceneBrief, SceneExcerpt};
use super::config::NarratorConfig;
use super::keywords::archetype_tag;
use super::text::truncate_chars;

/// First line of every coherence-check prompt.
pub const VALIDATION_HEADER: &str = "You are a narrative coherence checker.";
/// First line of every scene-narration prompt.
pub const NARRATOR_HEADER: &str = "You are an omniscient narrator";
/// First line of every image-prompt design request.
pub const IMAGE_DESIGNER_HEADER: &str = "You are a visual scene designer";
/// First line of every summary request.
pub const SUMMARY_HEADER: &str = "Summarize the story";

/// Canon prefix embedded in the coherence prompt.
pub const CANON_EXCERPT_CHARS: usize = 2_000;

/// Asks for a leading VALID/INVALID verdict on `action`.
#[must_use]
pub fn validation_prompt(
    config: &NarratorConfig,
    action: &str,
    character_name: &str,
    recent: &[SceneExcerpt],
    canon: Option<&str>,
) -> String {
    let mut rules = vec![
        config.person.rule().to_owned(),
        format!("Action <= {} characters.", config.max_action_chars),
        "Keep coherence with the latest scenes.".to_owned(),
    ];
    rules.extend(config.coherence_directives.iter().cloned());

    let mut lines = vec![
        VALIDATION_HEADER.to_owned(),
        "Answer \"VALID\" or \"INVALID\"; when invalid, list brief reasons, one per line."
            .to_owned(),
        String::new(),
        "Rules:".to_owned(),
        rules.join("\n"),
    ];
    if let Some(canon) = canon.filter(|c| !c.trim().is_empty()) {
        lines.push(String::new());
        lines.push("Canon:".to_owned());
        lines.push(truncate_chars(canon, CANON_EXCERPT_CHARS).to_owned());
    }
    lines.extend([
        String::new(),
        "Latest scenes:".to_owned(),
        scene_context(recent, "No previous scenes."),
        String::new(),
        format!("Action proposed by {character_name}: \"{action}\""),
        String::new(),
        format!("Language: {}", config.language),
    ]);
    lines.join("\n")
}

/// Asks for the scene prose.
#[must_use]
pub fn narrative_prompt(config: &NarratorConfig, brief: &SceneBrief) -> String {
    let mut lines = vec![
        format!("{NARRATOR_HEADER} of {} stories.", config.genre),
        format!("Genre: {}.", config.genre),
        format!("Tone: {}.", config.tone),
        format!("Language: {}.", config.language),
        config.person.rule().to_owned(),
        format!(
            "Length {}-{} words, at most three paragraphs.",
            config.narrative_words_min, config.narrative_words_max
        ),
    ];

    if let Some(faction) = &brief.faction {
        lines.push(format!(
            "Faction of the character: {} (\"{}\"). {}",
            faction.name, faction.motto, faction.prompt_base
        ));
    }
    if let Some(region) = &brief.region {
        lines.push(format!(
            "Current region: {}. Atmosphere: {}.",
            region.name, region.atmosphere
        ));
    }
    if let Some(profession) = &brief.profession {
        lines.push(format!(
            "Profession of the character: {}. {}",
            profession.name, profession.description
        ));
    }

    lines.push(format!(
        "Event ({}, roll {}): {}",
        brief.event.event_type.as_str(),
        brief.event.dice.final_value,
        brief.event.narrative_instruction
    ));
    if let Some(enemy) = &brief.event.antagonist {
        lines.push(format!(
            "Antagonist: {}. {} Behavior: {} Weaknesses: {}",
            enemy.name, enemy.description, enemy.behavior, enemy.weaknesses
        ));
    }

    lines.push(format!(
        "Character: {}. {}",
        brief.character.name, brief.character.description
    ));
    lines.push(format!(
        "Action of the character ({}): \"{}\"",
        brief.character.name, brief.action
    ));
    if brief.prior.is_empty() {
        lines.push("No previous scenes.".to_owned());
    } else {
        lines.push(format!(
            "Previous context:\n{}",
            scene_context(&brief.prior, "")
        ));
    }

    lines.push("Style guidelines:".to_owned());
    if config.style_guidelines.is_empty() {
        lines.push("-".to_owned());
    } else {
        lines.extend(config.style_guidelines.iter().map(|g| format!("- {g}")));
    }
    lines.push("End with a hook sentence that invites the story to continue.".to_owned());
    lines.join("\n")
}

/// Asks for a single-line text-to-image prompt of at most `max_chars`.
///
/// When `narrative` is `None` the request is built from the brief alone and
/// can run alongside narration.
#[must_use]
pub fn image_prompt_request(
    brief: &SceneBrief,
    narrative: Option<&str>,
    max_chars: usize,
) -> String {
    let mut lines = vec![
        format!("{IMAGE_DESIGNER_HEADER} for an illustrated story."),
        "Write one concise text-to-image prompt: a comma-separated tag list or a single descriptive sentence."
            .to_owned(),
        "Requirements:".to_owned(),
        "- English only.".to_owned(),
        format!("- Max {max_chars} characters."),
        "- No line breaks.".to_owned(),
        "- Focus on visual elements: setting, mood, lighting, style.".to_owned(),
        "- No camera jargon or text overlays.".to_owned(),
        format!(
            "Subject: {}",
            archetype_tag(brief.character.archetype.as_deref())
        ),
    ];
    if let Some(profession) = &brief.profession {
        lines.push(format!("Subject look: {}", profession.visual_descriptor));
    }
    if let Some(region) = &brief.region {
        lines.push(format!("Setting style: {}", region.visual_style));
    }
    lines.push(format!("Event direction: {}", brief.event.image_instruction));
    if let Some(enemy) = &brief.event.antagonist {
        lines.push(format!("Antagonist look: {}", enemy.description));
    }
    lines.push(format!("Action: {}", brief.action));
    if let Some(narrative) = narrative {
        lines.push("Narrative:".to_owned());
        lines.push(narrative.to_owned());
    }
    lines.join("\n")
}

/// Asks for a condensed summary of the first `summary_input_chars` of the
/// manuscript.
#[must_use]
pub fn summary_prompt(config: &NarratorConfig, manuscript: &str) -> String {
    [
        format!(
            "{SUMMARY_HEADER} in {}-{} lines, highlighting events and character development.",
            config.summary_length_lines,
            config.summary_length_lines + 2
        ),
        "Clear editorial tone, chronological order.".to_owned(),
        format!("Language: {}", config.language),
        String::new(),
        truncate_chars(manuscript, config.summary_input_chars).to_owned(),
    ]
    .join("\n")
}

fn scene_context(excerpts: &[SceneExcerpt], empty: &str) -> String {
    if excerpts.is_empty() {
        return empty.to_owned();
    }
    excerpts
        .iter()
        .map(|e| format!("#{}: {}", e.scene_number, e.text))
        .collect::<Vec<_>>()
        .join("\n")
}
