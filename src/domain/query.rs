//! Derives the displayed task list from the stored collection.
//!
//! Nothing here touches storage or mutates its inputs; front ends call
//! [`compute_view`] and [`compute_stats`] after every mutation and after every
//! change to a control value.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::task::Task;

/// Base filter fixed by the page being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageContext {
    #[default]
    All,
    Pending,
    Completed,
}

/// Extra status narrowing, only honoured on the `All` page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CreatedAsc,
    #[default]
    CreatedDesc,
    DueAsc,
    DueDesc,
    Priority,
}

impl PageContext {
    pub fn label(self) -> &'static str {
        match self { Self::All => "All", Self::Pending => "Pending", Self::Completed => "Completed" }
    }

    fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl StatusFilter {
    pub fn next(self) -> Self {
        match self { Self::All => Self::Pending, Self::Pending => Self::Completed, Self::Completed => Self::All }
    }

    pub fn label(self) -> &'static str {
        match self { Self::All => "All", Self::Pending => "Pending", Self::Completed => "Completed" }
    }

    fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            Self::CreatedDesc => Self::CreatedAsc,
            Self::CreatedAsc => Self::DueAsc,
            Self::DueAsc => Self::DueDesc,
            Self::DueDesc => Self::Priority,
            Self::Priority => Self::CreatedDesc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CreatedAsc => "Oldest first",
            Self::CreatedDesc => "Newest first",
            Self::DueAsc => "Due date ↑",
            Self::DueDesc => "Due date ↓",
            Self::Priority => "Priority",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub search_query: String,
    pub status_filter: StatusFilter,
    pub sort_key: SortKey,
}

pub fn compute_view(tasks: &[Task], page: PageContext, controls: &Controls) -> Vec<Task> {
    let query = controls.search_query.trim().to_lowercase();
    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|t| page.admits(t))
        .filter(|t| page != PageContext::All || controls.status_filter.admits(t))
        .filter(|t| {
            query.is_empty()
                || t.title.to_lowercase().contains(&query)
                || t.description.to_lowercase().contains(&query)
        })
        .cloned()
        .collect();

    // Absent due dates compare as "" and therefore lead in ascending order.
    let due = |t: &Task| t.due_date.clone().unwrap_or_default();
    match controls.sort_key {
        SortKey::CreatedAsc => view.sort_by_key(|t| t.created_at),
        SortKey::CreatedDesc => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::DueAsc => view.sort_by(|a, b| due(a).cmp(&due(b))),
        SortKey::DueDesc => view.sort_by(|a, b| due(b).cmp(&due(a))),
        SortKey::Priority => view.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
    }
    view
}

/// Counts over the whole collection, independent of any filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub page: PageContext,
}

pub fn compute_stats(tasks: &[Task], page: PageContext) -> Stats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    Stats { total, pending: total - completed, completed, page }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return f.write_str("No tasks yet");
        }
        let prefix = match self.page {
            PageContext::All => "",
            PageContext::Pending => "Pending page • ",
            PageContext::Completed => "Completed page • ",
        };
        write!(f, "{prefix}{} total • {} pending • {} done", self.total, self.pending, self.completed)
    }
}

#[derive(Debug, Clone)]
pub struct View {
    pub tasks: Vec<Task>,
    pub stats: Stats,
}

pub fn compute(tasks: &[Task], page: PageContext, controls: &Controls) -> View {
    View { tasks: compute_view(tasks, page, controls), stats: compute_stats(tasks, page) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{Priority, TaskId};

    fn task(title: &str, priority: Priority, completed: bool, created_at: i64) -> Task {
        Task {
            id: TaskId(title.to_string()),
            title: title.to_string(),
            description: String::new(),
            due_date: None,
            priority,
            completed,
            created_at,
        }
    }

    fn titles(view: &[Task]) -> Vec<&str> { view.iter().map(|t| t.title.as_str()).collect() }

    fn sorted(sort_key: SortKey) -> Controls { Controls { sort_key, ..Controls::default() } }

    fn sample() -> Vec<Task> {
        vec![task("A", Priority::Low, false, 100), task("B", Priority::High, true, 200)]
    }

    #[test]
    fn priority_sort_and_page_filter() {
        let tasks = sample();
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &sorted(SortKey::Priority))), ["B", "A"]);
        assert_eq!(titles(&compute_view(&tasks, PageContext::Pending, &sorted(SortKey::Priority))), ["A"]);
        assert_eq!(titles(&compute_view(&tasks, PageContext::Completed, &sorted(SortKey::Priority))), ["B"]);
    }

    #[test]
    fn unknown_priority_sorts_last() {
        let tasks = vec![
            task("odd", Priority::Other("urgent".into()), false, 1),
            task("low", Priority::Low, false, 2),
            task("high", Priority::High, false, 3),
            task("mid", Priority::Medium, false, 4),
        ];
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &sorted(SortKey::Priority))), ["high", "mid", "low", "odd"]);
    }

    #[test]
    fn due_sort_puts_absent_first_ascending() {
        let mut tasks = vec![task("may", Priority::Medium, false, 1), task("none", Priority::Medium, false, 2), task("jan", Priority::Medium, false, 3)];
        tasks[0].due_date = Some("2024-05-01".into());
        tasks[2].due_date = Some("2024-01-01".into());
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &sorted(SortKey::DueAsc))), ["none", "jan", "may"]);
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &sorted(SortKey::DueDesc))), ["may", "jan", "none"]);
    }

    #[test]
    fn equal_priorities_keep_stored_order() {
        let tasks = vec![task("m1", Priority::Medium, false, 1), task("h", Priority::High, false, 2), task("m2", Priority::Medium, false, 3)];
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &sorted(SortKey::Priority))), ["h", "m1", "m2"]);
    }

    #[test]
    fn equal_due_dates_keep_stored_order() {
        let mut tasks = vec![task("none1", Priority::Medium, false, 1), task("jan", Priority::Medium, false, 2), task("none2", Priority::Medium, false, 3)];
        tasks[1].due_date = Some("2024-01-01".into());
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &sorted(SortKey::DueAsc))), ["none1", "none2", "jan"]);
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &sorted(SortKey::DueDesc))), ["jan", "none1", "none2"]);
    }

    #[test]
    fn created_orders_are_reverses() {
        let tasks = vec![task("b", Priority::Medium, false, 20), task("c", Priority::Medium, false, 30), task("a", Priority::Medium, false, 10)];
        let asc = compute_view(&tasks, PageContext::All, &sorted(SortKey::CreatedAsc));
        let mut desc = compute_view(&tasks, PageContext::All, &sorted(SortKey::CreatedDesc));
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(titles(&asc), ["a", "b", "c"]);
    }

    #[test]
    fn status_filter_only_applies_on_all_page() {
        let tasks = sample();
        let controls = Controls { status_filter: StatusFilter::Completed, ..Controls::default() };
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &controls)), ["B"]);
        assert_eq!(titles(&compute_view(&tasks, PageContext::Pending, &controls)), ["A"]);
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let mut tasks = sample();
        tasks[0].description = "Buy MILK".into();
        let search = |q: &str| Controls { search_query: q.into(), sort_key: SortKey::CreatedAsc, ..Controls::default() };
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &search("milk"))), ["A"]);
        assert_eq!(titles(&compute_view(&tasks, PageContext::All, &search("b"))), ["A", "B"]);
        assert!(compute_view(&tasks, PageContext::All, &search("zzz")).is_empty());
    }

    #[test]
    fn blank_search_equals_no_search() {
        let tasks = sample();
        let blank = Controls { search_query: "   ".into(), ..Controls::default() };
        assert_eq!(compute_view(&tasks, PageContext::All, &blank), compute_view(&tasks, PageContext::All, &Controls::default()));
    }

    #[test]
    fn view_is_pure() {
        let tasks = sample();
        let before = tasks.clone();
        let controls = sorted(SortKey::Priority);
        let first = compute_view(&tasks, PageContext::All, &controls);
        let second = compute_view(&tasks, PageContext::All, &controls);
        assert_eq!(first, second);
        assert_eq!(tasks, before);
    }

    #[test]
    fn stats_line() {
        let tasks: Vec<Task> = (0..5).map(|i| task(&i.to_string(), Priority::Medium, i < 2, i)).collect();
        assert_eq!(compute_stats(&tasks, PageContext::All).to_string(), "5 total • 3 pending • 2 done");
        assert_eq!(compute_stats(&tasks, PageContext::Pending).to_string(), "Pending page • 5 total • 3 pending • 2 done");
        assert_eq!(compute_stats(&[], PageContext::Completed).to_string(), "No tasks yet");
    }
}
