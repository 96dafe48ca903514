//! Commands for the Story membership context.

use loreweave_core::command::Command;
use uuid::Uuid;

/// Command to register (or re-register) a user's character in a tenant's
/// story.
#[derive(Debug, Clone)]
pub struct RegisterCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tenant whose story the character joins.
    pub guild_id: String,
    /// The owning user.
    pub user_id: String,
    /// Display name of the user.
    pub user_name: String,
    /// Character name.
    pub name: String,
    /// Character description.
    pub description: String,
    /// Free-form archetype.
    pub archetype: Option<String>,
    /// Profession slug.
    pub profession_slug: Option<String>,
    /// Primary faction slug.
    pub faction_slug: Option<String>,
    /// Current region slug.
    pub region_slug: Option<String>,
}

impl Command for RegisterCharacter {
    fn command_type(&self) -> &'static str {
        "character.register_character"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
