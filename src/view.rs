//! Derives the ordered list of visible tasks from the full collection and the
//! current filter/search criteria.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::{Priority, Task};
use crate::utils::parse_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [StatusFilter::All, StatusFilter::Pending, StatusFilter::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Pending => "Pending",
            StatusFilter::Completed => "Completed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(format!("Unknown status filter '{}' (expected All, Pending or Completed)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub const ALL: [PriorityFilter; 4] = [
        PriorityFilter::All,
        PriorityFilter::Only(Priority::Low),
        PriorityFilter::Only(Priority::Medium),
        PriorityFilter::Only(Priority::High),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityFilter::All => "All",
            PriorityFilter::Only(p) => p.as_str(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::High) => PriorityFilter::All,
            PriorityFilter::Only(p) => PriorityFilter::Only(p.next()),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => task.priority == *p,
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PriorityFilter::All),
            "low" => Ok(PriorityFilter::Only(Priority::Low)),
            "medium" => Ok(PriorityFilter::Only(Priority::Medium)),
            "high" => Ok(PriorityFilter::Only(Priority::High)),
            other => Err(format!("Unknown priority filter '{}' (expected All, Low, Medium or High)", other)),
        }
    }
}

/// The (status, priority, query) triple describing the requested view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub query: String,
}

impl FilterSpec {
    pub fn new(status: StatusFilter, priority: PriorityFilter, query: impl Into<String>) -> Self {
        Self {
            status,
            priority,
            query: query.into(),
        }
    }

    /// True when nothing is filtered out
    pub fn is_default(&self) -> bool {
        self.status == StatusFilter::All
            && self.priority == PriorityFilter::All
            && self.query.trim().is_empty()
    }

    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("Status: {}", self.status),
            format!("Priority: {}", self.priority),
        ];
        let query = self.query.trim();
        if !query.is_empty() {
            parts.push(format!("Search: \"{}\"", query));
        }
        parts.join(" | ")
    }
}

/// Filter and order tasks for display. The input is left untouched.
///
/// Order: incomplete before completed, then due date ascending (tasks without one
/// last), then newest `created_at` first. Remaining ties keep input order.
pub fn select_visible(tasks: &[Task], spec: &FilterSpec) -> Vec<Task> {
    let query = spec.query.trim().to_lowercase();

    let visible: Vec<Task> = tasks
        .iter()
        .filter(|task| spec.status.matches(task))
        .filter(|task| spec.priority.matches(task))
        .filter(|task| query.is_empty() || task.title.to_lowercase().contains(&query))
        .cloned()
        .collect();

    merge_sort(visible, &compare_for_display)
}

/// Three-level display comparator used by [`select_visible`]
pub fn compare_for_display(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| compare_due_dates(a.due_date.as_deref(), b.due_date.as_deref()))
        .then_with(|| compare_created_desc(&a.created_at, &b.created_at))
}

fn compare_due_dates(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a = a.filter(|s| !s.is_empty());
    let b = b.filter(|s| !s.is_empty());
    match (a, b) {
        (Some(a), Some(b)) => match (parse_timestamp(a), parse_timestamp(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            // An unreadable date on either side is a tie at this level
            _ => Ordering::Equal,
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_created_desc(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        _ => Ordering::Equal,
    }
}

// std's sort may panic on a comparator that is not a total order, and treating
// unreadable dates as ties makes this one partial.
fn merge_sort<T, F>(mut items: Vec<T>, cmp: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, cmp);
    let right = merge_sort(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
        // Left wins ties, which keeps the sort stable
        let next = if cmp(b, a) == Ordering::Less {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    merged
}
