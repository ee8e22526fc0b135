use taskdeck::validate::{DUE_DATE_INVALID, TITLE_TOO_LONG};
use taskdeck::{Field, FilterSpec, Priority, PriorityFilter, StatusFilter, Task, TaskDraft, select_visible, validate};

fn task(id: &str, title: &str, completed: bool, due: Option<&str>, created_at: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        priority: Priority::Low,
        due_date: due.map(str::to_string),
        completed,
        created_at: created_at.to_string(),
        updated_at: created_at.to_string(),
    }
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.title.as_str()).collect()
}

fn scenario_a_tasks() -> Vec<Task> {
    vec![
        task("1", "A", false, Some("2025-11-20"), "2025-11-01T10:00:00.000Z"),
        task("2", "B", true, Some("2025-11-01"), "2025-11-02T10:00:00.000Z"),
    ]
}

#[test]
fn incomplete_tasks_come_first() {
    let visible = select_visible(&scenario_a_tasks(), &FilterSpec::default());
    assert_eq!(titles(&visible), ["A", "B"]);
}

#[test]
fn completed_filter_keeps_only_completed() {
    let spec = FilterSpec::new(StatusFilter::Completed, PriorityFilter::All, "");
    let visible = select_visible(&scenario_a_tasks(), &spec);
    assert_eq!(titles(&visible), ["B"]);
}

#[test]
fn dated_task_sorts_before_undated() {
    let tasks = vec![
        task("1", "undated", false, None, "2025-11-05T10:00:00.000Z"),
        task("2", "dated", false, Some("2025-11-20"), "2025-11-01T10:00:00.000Z"),
    ];
    let visible = select_visible(&tasks, &FilterSpec::default());
    assert_eq!(titles(&visible), ["dated", "undated"]);
}

#[test]
fn query_is_case_insensitive_substring() {
    let tasks = vec![task("1", "Buy groceries", false, None, "2025-11-01T10:00:00.000Z")];
    let hit = FilterSpec::new(StatusFilter::All, PriorityFilter::All, "GROCER");
    let miss = FilterSpec::new(StatusFilter::All, PriorityFilter::All, "xyz");
    assert_eq!(select_visible(&tasks, &hit).len(), 1);
    assert!(select_visible(&tasks, &miss).is_empty());
}

#[test]
fn only_due_date_error_for_bad_date() {
    let draft = TaskDraft::new("Ok", Priority::Low).with_due_date("not-a-date");
    let errors = validate(&draft);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(Field::DueDate), Some(DUE_DATE_INVALID));
}

#[test]
fn title_length_boundary() {
    let ok = TaskDraft::new("x".repeat(100), Priority::High);
    let long = TaskDraft::new("x".repeat(101), Priority::High);
    assert!(validate(&ok).is_empty());
    assert_eq!(validate(&long).get(Field::Title), Some(TITLE_TOO_LONG));
}

#[test]
fn selection_is_pure_and_stable() {
    let created = "2025-11-01T10:00:00.000Z";
    let tasks = vec![
        task("1", "first", false, None, created),
        task("2", "second", false, None, created),
        task("3", "third", false, None, created),
        task("4", "done", true, None, created),
    ];
    let once = select_visible(&tasks, &FilterSpec::default());
    let twice = select_visible(&tasks, &FilterSpec::default());
    assert_eq!(once, twice);
    assert_eq!(titles(&once), ["first", "second", "third", "done"]);
}

#[test]
fn newest_first_when_no_due_dates() {
    let tasks = vec![
        task("1", "older", false, None, "2025-11-01T10:00:00.000Z"),
        task("2", "newer", false, None, "2025-11-03T10:00:00.000Z"),
    ];
    let visible = select_visible(&tasks, &FilterSpec::default());
    assert_eq!(titles(&visible), ["newer", "older"]);
}
