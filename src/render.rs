//! Terminal rendering for batch results and undo records.

use calbulk_core::{BatchResult, BatchVerdict, Operation, UndoAction, UndoRecord};
use chrono::Local;
use owo_colors::OwoColorize;

use crate::utils::time::format_minutes;

pub trait Render {
    fn render(&self) -> String;
}

/// Words used to describe one operation to the user.
struct Wording {
    verb: &'static str,
    past: &'static str,
    /// Where failed events are left.
    aftermath: &'static str,
    /// What the user lacked permission to do.
    permission: &'static str,
}

impl Wording {
    fn of(operation: &Operation) -> Self {
        match operation {
            Operation::Delete => Wording {
                verb: "delete",
                past: "deleted",
                aftermath: "will remain on your calendar",
                permission: "delete",
            },
            Operation::MoveBy(_) => Wording {
                verb: "move",
                past: "moved",
                aftermath: "remain at their original times",
                permission: "modify",
            },
            Operation::Recreate => Wording {
                verb: "restore",
                past: "restored",
                aftermath: "are still missing from your calendar",
                permission: "create",
            },
        }
    }
}

pub struct BatchReport<'a> {
    operation: &'a Operation,
    result: &'a BatchResult,
}

impl<'a> BatchReport<'a> {
    pub fn new(operation: &'a Operation, result: &'a BatchResult) -> Self {
        BatchReport { operation, result }
    }
}

impl Render for BatchReport<'_> {
    fn render(&self) -> String {
        let words = Wording::of(self.operation);

        match self.result.verdict() {
            BatchVerdict::Inconsistent { failed_titles } => {
                let list = failed_titles
                    .iter()
                    .map(|title| format!("- {}", title))
                    .collect::<Vec<_>>()
                    .join("\n");

                format!(
                    "{}\n{}\n\n{}",
                    format!(
                        "Failed to {} {} event(s) after multiple retries:",
                        words.verb,
                        failed_titles.len()
                    )
                    .red(),
                    list,
                    format!(
                        "These events could not be {} and {}. Please try again later or {} them manually.",
                        words.past, words.aftermath, words.verb
                    )
                    .dimmed()
                )
            }
            BatchVerdict::NothingPermitted { .. } => format!(
                "No events were {}. You don't have permission to {} the selected events.",
                words.past, words.permission
            )
            .yellow()
            .to_string(),
            BatchVerdict::NothingToDo => format!(
                "No events were {}. None of the selected events could be found.",
                words.past
            )
            .dimmed()
            .to_string(),
            BatchVerdict::Applied { succeeded, skipped } => {
                let mut line = format!("Successfully {} {} event(s).", words.past, succeeded)
                    .green()
                    .to_string();
                if skipped > 0 {
                    line.push_str(&format!(" ({} skipped - no permission)", skipped));
                }
                line
            }
        }
    }
}

impl Render for UndoRecord {
    fn render(&self) -> String {
        let what = match (self.action, self.delta) {
            (UndoAction::Delete, _) => "Deleted".to_string(),
            (UndoAction::Move, Some(delta)) => format!("Moved by {}", format_minutes(delta)),
            (UndoAction::Move, None) => "Moved".to_string(),
        };

        format!(
            "{} {} {} {}",
            what,
            self.snapshots.len(),
            pluralize("event", self.snapshots.len()),
            format!(
                "at {}",
                self.created_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
            )
            .dimmed()
        )
    }
}

pub fn pluralize(word: &str, count: usize) -> &str {
    if count == 1 {
        word
    } else {
        match word {
            "event" => "events",
            _ => word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calbulk_core::{
        AttemptOutcome, EventBoundary, Failure, FailureReason, ResourceId, ResourceSnapshot,
        SkipReason,
    };

    fn snapshot(id: &str, title: &str) -> ResourceSnapshot {
        ResourceSnapshot {
            id: ResourceId::new(id),
            title: title.to_string(),
            description: String::new(),
            start: EventBoundary::all_day("2024-01-01"),
            end: EventBoundary::all_day("2024-01-02"),
        }
    }

    fn skipped(id: &str) -> AttemptOutcome {
        AttemptOutcome::Skipped {
            snapshot: snapshot(id, id),
            reason: SkipReason::NoPermission,
        }
    }

    #[test]
    fn test_success_with_skips() {
        let mut result = BatchResult::default();
        result.push(AttemptOutcome::Success(snapshot("a", "Standup")));
        result.push(skipped("b"));

        let text = BatchReport::new(&Operation::Delete, &result).render();
        assert!(text.contains("Successfully deleted 1 event(s)."));
        assert!(text.contains("(1 skipped - no permission)"));
    }

    #[test]
    fn test_failures_list_titles() {
        let mut result = BatchResult::default();
        result.push(AttemptOutcome::Success(snapshot("a", "Standup")));
        for (id, title) in [("b", "Dentist"), ("c", "Gym")] {
            result.push(AttemptOutcome::Failed {
                snapshot: snapshot(id, title),
                failure: Failure::new(FailureReason::MaxRetries),
            });
        }

        let text = BatchReport::new(&Operation::MoveBy(30), &result).render();
        assert!(text.contains("Failed to move 2 event(s) after multiple retries:"));
        assert!(text.contains("- Dentist\n- Gym"));
        assert!(text.contains("remain at their original times"));
        assert!(!text.contains("Successfully"));
    }

    #[test]
    fn test_all_skipped() {
        let mut result = BatchResult::default();
        result.push(skipped("a"));

        let text = BatchReport::new(&Operation::Delete, &result).render();
        assert!(text.contains(
            "No events were deleted. You don't have permission to delete the selected events."
        ));

        let text = BatchReport::new(&Operation::MoveBy(-5), &result).render();
        assert!(text.contains("You don't have permission to modify the selected events."));
    }

    #[test]
    fn test_undo_record_summary() {
        let record = UndoRecord::moved(vec![snapshot("a", "A"), snapshot("b", "B")], -60);
        let text = record.render();
        assert!(text.starts_with("Moved by -1h 2 events"));

        let record = UndoRecord::moved(vec![snapshot("a", "A")], 1530);
        assert!(record.render().starts_with("Moved by +1day 1h 30m 1 event"));
    }
}
