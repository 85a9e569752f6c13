use std::collections::BTreeSet;

use chrono::Duration;
use course_core::model::{CalendarEvent, CourseId, EventId, Task, TaskId, UserId, VideoId};
use course_core::time::fixed_now;
use storage::repository::{
    CompletionRepository, EventRepository, MilestoneRepository, TaskRepository,
};
use storage::sqlite::SqliteRepository;

fn user() -> UserId {
    UserId::new("u1")
}

fn course() -> CourseId {
    CourseId::new("rust-foundations")
}

fn video_set(ids: &[&str]) -> BTreeSet<VideoId> {
    ids.iter().map(|id| VideoId::new(*id)).collect()
}

#[tokio::test]
async fn sqlite_completions_roundtrip_and_replace() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_completions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let empty = repo.get_completions(&user(), &course()).await.unwrap();
    assert!(empty.is_empty());

    let two = video_set(&["rf-1-1", "rf-1-2"]);
    repo.put_completions(&user(), &course(), &two).await.unwrap();
    assert_eq!(repo.get_completions(&user(), &course()).await.unwrap(), two);

    // A later, larger set fully replaces the stored one.
    let four = video_set(&["rf-1-1", "rf-1-2", "rf-2-1", "rf-2-2"]);
    repo.put_completions(&user(), &course(), &four).await.unwrap();
    assert_eq!(repo.get_completions(&user(), &course()).await.unwrap(), four);
}

#[tokio::test]
async fn sqlite_completions_are_scoped_by_user_and_course() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_scoping?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put_completions(&user(), &course(), &video_set(&["rf-1-1"]))
        .await
        .unwrap();

    let other_user = repo
        .get_completions(&UserId::new("u2"), &course())
        .await
        .unwrap();
    assert!(other_user.is_empty());

    let other_course = repo
        .get_completions(&user(), &CourseId::new("practical-sql"))
        .await
        .unwrap();
    assert!(other_course.is_empty());
}

#[tokio::test]
async fn sqlite_milestone_first_write_wins() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_milestones?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.first_earned_at(&user(), &course()).await.unwrap(), None);

    let first = fixed_now();
    repo.record_first_earned(&user(), &course(), first)
        .await
        .unwrap();
    repo.record_first_earned(&user(), &course(), first + Duration::days(5))
        .await
        .unwrap();

    assert_eq!(
        repo.first_earned_at(&user(), &course()).await.unwrap(),
        Some(first)
    );
}

#[tokio::test]
async fn sqlite_tasks_preserve_order_and_fields() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_tasks?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut done = Task::new(TaskId::generate(), "Finish ch.3", fixed_now()).unwrap();
    done.toggle();
    let pending = Task::new(
        TaskId::generate(),
        "Watch lecture",
        fixed_now() + Duration::days(1),
    )
    .unwrap();

    repo.put_tasks(&user(), &[done.clone(), pending.clone()])
        .await
        .unwrap();

    let fetched = repo.list_tasks(&user()).await.unwrap();
    assert_eq!(fetched, vec![done, pending.clone()]);

    // Replacement drops rows that are no longer in the list.
    repo.put_tasks(&user(), &[pending.clone()]).await.unwrap();
    assert_eq!(repo.list_tasks(&user()).await.unwrap(), vec![pending]);
}

#[tokio::test]
async fn sqlite_events_roundtrip_with_optional_time() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_events?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let dated = CalendarEvent::new(
        EventId::generate(),
        "Study group",
        fixed_now().date_naive(),
        chrono::NaiveTime::from_hms_opt(18, 30, 0),
    )
    .unwrap();
    let untimed = CalendarEvent::new(
        EventId::generate(),
        "Exam week",
        fixed_now().date_naive() + Duration::days(10),
        None,
    )
    .unwrap();

    repo.put_events(&user(), &[dated.clone(), untimed.clone()])
        .await
        .unwrap();

    let fetched = repo.list_events(&user()).await.unwrap();
    assert_eq!(fetched, vec![dated, untimed]);
}
