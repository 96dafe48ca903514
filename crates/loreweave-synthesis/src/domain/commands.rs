//! Commands for the Synthesis context.

use loreweave_core::command::Command;
use uuid::Uuid;

/// Command to submit a user's action to a story.
#[derive(Debug, Clone)]
pub struct SubmitContribution {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The story being extended.
    pub story_id: Uuid,
    /// The submitting user.
    pub user_id: String,
    /// The proposed action, as typed.
    pub action: String,
}

impl Command for SubmitContribution {
    fn command_type(&self) -> &'static str {
        "synthesis.submit_contribution"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_type_and_correlation() {
        let correlation_id = Uuid::new_v4();
        let command = SubmitContribution {
            correlation_id,
            story_id: Uuid::new_v4(),
            user_id: "u-1".to_owned(),
            action: "waits".to_owned(),
        };

        assert_eq!(command.command_type(), "synthesis.submit_contribution");
        assert_eq!(command.correlation_id(), correlation_id);
    }
}
