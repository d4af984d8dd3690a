use calbulk_core::{Operation, ProgressFn};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["-", "\\", "|", "/"])
            .template("{msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Spins while events are fetched; turns into a counter once the first wave starts.
pub fn create_progress_bar(operation: &Operation) -> ProgressBar {
    let message = match operation {
        Operation::Recreate => "Preparing to restore events...".to_string(),
        _ => format!("Fetching events to {}...", operation.verb()),
    };
    create_spinner(message)
}

fn counting_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

pub fn progress_message(operation: &Operation) -> &'static str {
    match operation {
        Operation::Delete => "Deleting events...",
        Operation::MoveBy(_) => "Moving events...",
        Operation::Recreate => "Restoring events...",
    }
}

pub fn progress_callback(bar: &ProgressBar, operation: &Operation) -> ProgressFn {
    let bar = bar.clone();
    let message = progress_message(operation);

    Arc::new(move |processed: usize, total: usize| {
        if processed == 0 {
            bar.set_style(counting_style());
            bar.set_message(message);
            bar.set_length(total as u64);
        }
        bar.set_position(processed as u64);
    })
}
