//! Manuscript layout.

use loreweave_core::model::Scene;

/// Separator between two scene blocks.
pub const SCENE_DELIMITER: &str = "\n---\n";

/// Lays scenes out as labelled blocks in ascending sequence order.
///
/// Output depends only on the set of scenes passed in, not on their order.
#[must_use]
pub fn compile(scenes: &[Scene]) -> String {
    let mut ordered: Vec<&Scene> = scenes.iter().collect();
    ordered.sort_by_key(|s| s.scene_number);
    ordered
        .iter()
        .map(|s| format!("Scene #{}\n\n{}\n", s.scene_number, s.narrative))
        .collect::<Vec<_>>()
        .join(SCENE_DELIMITER)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn scene(number: i32, narrative: &str) -> Scene {
        Scene {
            id: Uuid::new_v4(),
            story_id: Uuid::nil(),
            scene_number: number,
            character_id: None,
            user_id: "u".to_owned(),
            action: "a".to_owned(),
            narrative: narrative.to_owned(),
            image_url: None,
            location: None,
            context_used: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_compile_labels_and_delimits_blocks() {
        let text = compile(&[scene(1, "Dawn."), scene(2, "Dusk.")]);
        assert_eq!(text, "Scene #1\n\nDawn.\n\n---\nScene #2\n\nDusk.\n");
    }

    #[test]
    fn test_compile_orders_by_sequence_number() {
        let shuffled = compile(&[scene(2, "Dusk."), scene(1, "Dawn.")]);
        let ordered = compile(&[scene(1, "Dawn."), scene(2, "Dusk.")]);
        assert_eq!(shuffled, ordered);
    }

    #[test]
    fn test_compile_of_empty_story_is_empty() {
        assert_eq!(compile(&[]), "");
    }
}
