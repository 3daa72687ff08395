//! Completion filters for task views.
//!
//! A `Filter` is a view-level predicate selecting a subset of tasks by
//! completion state. Exactly one filter is active at a time; it never
//! mutates the underlying collection.

use clap::ValueEnum;

use crate::task::Task;

/// Predicate over a task's completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Filter {
    #[default]
    All,
    Pending,
    /// Accepts `done` as a synonym on the command line.
    #[value(alias = "done")]
    Completed,
}

impl Filter {
    /// Whether a task is visible under this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.done,
            Filter::Completed => task.done,
        }
    }

    /// Next filter in display order, wrapping around.
    pub fn cycle(self) -> Self {
        match self {
            Filter::All => Filter::Pending,
            Filter::Pending => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    /// Display label for the filter bar.
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Pending => "Pending",
            Filter::Completed => "Completed",
        }
    }

    /// Position in the filter bar, also used by the `1`/`2`/`3` shortcuts.
    pub fn index(self) -> usize {
        match self {
            Filter::All => 0,
            Filter::Pending => 1,
            Filter::Completed => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(done: bool) -> Task {
        Task {
            id: 1,
            text: "Buy milk".to_string(),
            done,
            created_at_utc: 0,
        }
    }

    #[test]
    fn test_filter_predicates() {
        assert!(Filter::All.matches(&task(false)));
        assert!(Filter::All.matches(&task(true)));
        assert!(Filter::Pending.matches(&task(false)));
        assert!(!Filter::Pending.matches(&task(true)));
        assert!(Filter::Completed.matches(&task(true)));
        assert!(!Filter::Completed.matches(&task(false)));
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(Filter::All.cycle(), Filter::Pending);
        assert_eq!(Filter::Pending.cycle(), Filter::Completed);
        assert_eq!(Filter::Completed.cycle(), Filter::All);
    }
}
