//! # Step Sequencer
//!
//! Owns the ordered project history: every parsed action, wrapped with a
//! lifecycle status. Append-only; later model turns concatenate onto the
//! existing sequence and nothing is ever removed or reordered.

use crate::domain::types::{Action, Step, StepStatus};

#[derive(Debug, Default)]
pub struct StepSequencer {
    steps: Vec<Step>,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly parsed actions as `Pending` steps.
    pub fn append(&mut self, actions: Vec<Action>) {
        for action in actions {
            let id = self.steps.len();
            self.steps.push(Step {
                id,
                action,
                status: StepStatus::Pending,
            });
        }
    }

    /// Read-only snapshot of the full history.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<Step> {
        &mut self.steps
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_actions_become_pending_steps_in_order() {
        let mut seq = StepSequencer::new();
        seq.append(vec![
            Action::Description("hello".to_string()),
            Action::CreateFile {
                path: "a.txt".to_string(),
                content: "A".to_string(),
            },
        ]);
        seq.append(vec![Action::RunCommand {
            command: "npm install".to_string(),
        }]);

        let steps = seq.steps();
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(
            steps.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(matches!(steps[0].action, Action::Description(_)));
        assert!(matches!(steps[2].action, Action::RunCommand { .. }));
    }

    #[test]
    fn duplicate_descriptions_are_retained_as_a_transcript() {
        let mut seq = StepSequencer::new();
        seq.append(vec![Action::Description("same".to_string())]);
        seq.append(vec![Action::Description("same".to_string())]);
        assert_eq!(seq.steps().len(), 2);
    }
}
