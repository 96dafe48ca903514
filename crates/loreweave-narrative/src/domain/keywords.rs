//! Keyword-table image prompts.
//!
//! No external call: the prompt is assembled from the archetype, the
//! profession and region descriptors, keywords found in the action and the
//! rolled beat.

use loreweave_rules::domain::events::EventType;

use super::brief::SceneBrief;
use super::text::{join_within, single_line, truncate_chars};

const STYLE: &str = "digital painting, cinematic, highly detailed";

const ACTION_KEYWORDS: &[(&[&str], &str)] = &[
    (
        &["tavern", "taberna", "inn", "posada", "bar"],
        "dim tavern interior, warm candlelight",
    ),
    (
        &["forest", "bosque", "jungle", "selva"],
        "dense forest, shafts of light",
    ),
    (
        &["city", "ciudad", "street", "calle"],
        "rain-soaked city street",
    ),
    (&["ruin", "ruins", "ruinas"], "crumbling ruins"),
    (
        &["fight", "attack", "battle", "lucha", "ataca", "batalla", "pelea"],
        "dynamic combat pose",
    ),
    (
        &["sea", "river", "shore", "mar", "río", "rio", "costa"],
        "stormy water",
    ),
    (&["night", "noche"], "night scene, moonlight"),
    (
        &["cave", "tunnel", "cueva", "túnel", "tunel"],
        "dark cave, torchlight",
    ),
    (&["market", "mercado"], "crowded market stalls"),
    (
        &["rumor", "rumors", "rumores", "whisper", "susurra"],
        "hushed conversation",
    ),
];

/// Maps a free-form archetype to a small fixed visual vocabulary.
#[must_use]
pub fn archetype_tag(archetype: Option<&str>) -> &'static str {
    let Some(archetype) = archetype else {
        return "lone adventurer";
    };
    match archetype.trim().to_lowercase().as_str() {
        "female" | "woman" | "f" | "mujer" | "femenino" => "young woman",
        "male" | "man" | "m" | "hombre" | "masculino" => "young man",
        "nonbinary" | "non-binary" | "androgynous" | "no binario" => "androgynous person",
        _ => "lone adventurer",
    }
}

/// Visual tags for a beat.
#[must_use]
pub fn event_tags(event_type: EventType) -> &'static str {
    match event_type {
        EventType::HostileEncounter => "menacing enemy, tense standoff",
        EventType::EnvironmentalHazard => "violent storm, hazardous terrain",
        EventType::ResourceFind => "glowing discovery amid ruins",
        EventType::EquipmentGain => "new gear in the foreground, dramatic lighting",
        EventType::EquipmentLoss => "broken equipment, somber mood",
        EventType::RestRefuge => "makeshift refuge, soft light",
        EventType::NarrativeTwist => "mysterious revelation, symbolic detail",
    }
}

/// Tags triggered by words of `action`, in table order, each at most once.
#[must_use]
pub fn action_tags(action: &str) -> Vec<&'static str> {
    let words: Vec<String> = action
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    ACTION_KEYWORDS
        .iter()
        .filter(|(needles, _)| words.iter().any(|w| needles.contains(&w.as_str())))
        .map(|(_, tags)| *tags)
        .collect()
}

/// Builds a comma-separated prompt of at most `max_chars` characters.
#[must_use]
pub fn keyword_prompt(brief: &SceneBrief, max_chars: usize) -> String {
    let mut tags = vec![archetype_tag(brief.character.archetype.as_deref()).to_owned()];
    if let Some(profession) = &brief.profession {
        tags.push(single_line(&profession.visual_descriptor));
    }
    tags.extend(action_tags(&brief.action).into_iter().map(str::to_owned));
    tags.push(event_tags(brief.event.event_type).to_owned());
    if let Some(enemy) = &brief.event.antagonist {
        tags.push(enemy.name.to_lowercase());
    }
    if let Some(region) = &brief.region {
        tags.push(single_line(&region.visual_style));
    }
    tags.push(STYLE.to_owned());

    let prompt = join_within(&tags, max_chars);
    if prompt.is_empty() {
        truncate_chars(&tags[0], max_chars).to_owned()
    } else {
        prompt
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use loreweave_core::model::{Character, Profession, Region};
    use loreweave_rules::domain::antagonists::AntagonistRegistry;
    use loreweave_rules::domain::dice::resolve;
    use loreweave_rules::domain::events::build_event_context;
    use loreweave_test_support::MockRng;
    use uuid::Uuid;

    use super::*;

    fn brief(action: &str, archetype: Option<&str>, base: i32) -> SceneBrief {
        SceneBrief {
            action: action.to_owned(),
            character: Character {
                id: Uuid::new_v4(),
                story_id: Uuid::nil(),
                user_id: "u-1".to_owned(),
                user_name: "user".to_owned(),
                name: "Aria".to_owned(),
                description: "scout".to_owned(),
                archetype: archetype.map(str::to_owned),
                profession_slug: None,
                faction_slug: None,
                region_slug: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            faction: None,
            region: Some(Region {
                slug: "neoterra".to_owned(),
                name: "Neoterra".to_owned(),
                atmosphere: "calm".to_owned(),
                visual_style: "white towers,\n neon blue".to_owned(),
            }),
            profession: Some(Profession {
                slug: "scout".to_owned(),
                name: "Scout".to_owned(),
                description: "Finds paths.".to_owned(),
                visual_descriptor: "hooded cloak, brass goggles".to_owned(),
            }),
            event: build_event_context(
                resolve(base, vec![]),
                Some("neoterra"),
                &AntagonistRegistry::standard(),
                &mut MockRng,
            ),
            prior: vec![],
        }
    }

    #[test]
    fn test_archetype_vocabulary_is_small_and_total() {
        assert_eq!(archetype_tag(Some("Female")), "young woman");
        assert_eq!(archetype_tag(Some("hombre")), "young man");
        assert_eq!(archetype_tag(Some("no binario")), "androgynous person");
        assert_eq!(archetype_tag(Some("dragon")), "lone adventurer");
        assert_eq!(archetype_tag(None), "lone adventurer");
    }

    #[test]
    fn test_action_keywords_match_whole_words_once() {
        let tags = action_tags("Enters the TAVERN, then another tavern; rumors fly");
        assert_eq!(
            tags,
            vec!["dim tavern interior, warm candlelight", "hushed conversation"]
        );
        assert!(action_tags("embarks on a barge").is_empty());
    }

    #[test]
    fn test_keyword_prompt_assembles_in_priority_order() {
        let prompt = keyword_prompt(&brief("enters the tavern", Some("female"), 12), 320);

        assert_eq!(
            prompt,
            "young woman, hooded cloak, brass goggles, dim tavern interior, warm candlelight, \
             mysterious revelation, symbolic detail, white towers, neon blue, \
             digital painting, cinematic, highly detailed"
        );
    }

    #[test]
    fn test_keyword_prompt_names_the_antagonist() {
        let prompt = keyword_prompt(&brief("waits", None, 1), 320);
        assert!(prompt.contains("lumen sentinel"));
        assert!(prompt.contains("menacing enemy"));
    }

    #[test]
    fn test_keyword_prompt_respects_budget() {
        for max in [10, 40, 80, 200] {
            let prompt = keyword_prompt(&brief("enters the tavern at night", Some("male"), 20), max);
            assert!(!prompt.is_empty());
            assert!(prompt.chars().count() <= max, "{prompt} exceeds {max}");
        }
    }
}
