use chrono::NaiveDateTime;
use diesel::prelude::*;
use timeline_shared::domain::now_utc;

use super::models::{NewTimelineTask, TaskDraft, TimelineTask};
use super::schema::timeline_tasks;
use super::timelines::timeline_exists;
use super::{StorageError, Store, new_id};

impl Store {
    pub async fn create_task(
        &self,
        timeline_id: &str,
        draft: TaskDraft,
    ) -> Result<TimelineTask, StorageError> {
        let timeline_id = timeline_id.to_string();
        self.interact(move |conn| {
            if !timeline_exists(conn, &timeline_id)? {
                return Err(StorageError::not_found("timeline", &timeline_id));
            }
            Ok(insert_task(conn, &timeline_id, &draft, now_utc())?)
        })
        .await
    }

    pub async fn get_task(&self, id: &str) -> Result<TimelineTask, StorageError> {
        let id = id.to_string();
        self.interact(move |conn| {
            timeline_tasks::table
                .find(&id)
                .select(TimelineTask::as_select())
                .first(conn)
                .optional()?
                .ok_or_else(|| StorageError::not_found("task", &id))
        })
        .await
    }

    /// Tasks of a timeline by start date, most important first on ties.
    pub async fn list_tasks_for_timeline(
        &self,
        timeline_id: &str,
    ) -> Result<Vec<TimelineTask>, StorageError> {
        let timeline_id = timeline_id.to_string();
        self.interact(move |conn| Ok(load_tasks(conn, &timeline_id)?))
            .await
    }

    /// The only mutation after creation. Bumps `updated_at`.
    pub async fn update_task_completion(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<TimelineTask, StorageError> {
        let id = id.to_string();
        self.interact(move |conn| {
            diesel::update(timeline_tasks::table.find(&id))
                .set((
                    timeline_tasks::completed.eq(completed),
                    timeline_tasks::updated_at.eq(now_utc()),
                ))
                .returning(TimelineTask::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or_else(|| StorageError::not_found("task", &id))
        })
        .await
    }
}

pub(super) fn insert_task(
    conn: &mut SqliteConnection,
    timeline_id: &str,
    draft: &TaskDraft,
    now: NaiveDateTime,
) -> QueryResult<TimelineTask> {
    let id = new_id();
    let row = NewTimelineTask {
        id: &id,
        timeline_id,
        title: &draft.title,
        description: &draft.description,
        start_date: draft.start_date,
        end_date: draft.end_date,
        duration: &draft.duration,
        priority: draft.priority,
        completed: false,
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(timeline_tasks::table)
        .values(&row)
        .returning(TimelineTask::as_returning())
        .get_result(conn)
}

pub(super) fn load_tasks(
    conn: &mut SqliteConnection,
    timeline_id: &str,
) -> QueryResult<Vec<TimelineTask>> {
    timeline_tasks::table
        .filter(timeline_tasks::timeline_id.eq(timeline_id))
        .order((
            timeline_tasks::start_date.asc(),
            timeline_tasks::priority.desc(),
        ))
        .select(TimelineTask::as_select())
        .load(conn)
}

#[cfg(test)]
mod tests {
    use super::TaskDraft;
    use crate::storage::models::{GoalFields, TimelineFields};
    use crate::storage::test_support::{day, temp_store};
    use crate::storage::{StorageError, Store};

    async fn timeline(store: &Store) -> String {
        let user = store.create_user("t@example.com").await.unwrap();
        let goal = store
            .create_goal(GoalFields {
                user_id: user.id,
                title: "Learn Rust".into(),
                description: "From zero".into(),
                current_level: "None".into(),
                target_level: "Comfortable".into(),
                start_date: day(2025, 1, 1),
                target_date: day(2025, 4, 1),
            })
            .await
            .unwrap();
        store
            .create_timeline(TimelineFields {
                goal_id: goal.id,
                title: "Plan".into(),
                description: "Three months".into(),
                start_date: day(2025, 1, 1),
                end_date: day(2025, 4, 1),
            })
            .await
            .unwrap()
            .id
    }

    fn draft(title: &str, start: chrono::NaiveDateTime, priority: i32) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            description: format!("{title} description"),
            start_date: start,
            end_date: start + chrono::Duration::days(7),
            duration: "7 days".into(),
            priority,
        }
    }

    #[tokio::test]
    async fn task_round_trips_by_id() {
        let (store, _dir) = temp_store().await;
        let tl = timeline(&store).await;
        let created = store
            .create_task(&tl, draft("Read chapter 1", day(2025, 1, 2), 3))
            .await
            .unwrap();
        assert!(!created.completed);

        let fetched = store.get_task(&created.id).await.unwrap();
        assert_eq!(fetched.title, "Read chapter 1");
        assert_eq!(fetched.description, "Read chapter 1 description");
        assert_eq!(fetched.start_date, day(2025, 1, 2));
        assert_eq!(fetched.end_date, day(2025, 1, 9));
        assert_eq!(fetched.duration, "7 days");
        assert_eq!(fetched.priority, 3);
        assert!(!fetched.completed);
        assert_eq!(fetched.timeline_id, tl);
    }

    #[tokio::test]
    async fn tasks_order_by_start_then_priority_desc() {
        let (store, _dir) = temp_store().await;
        let tl = timeline(&store).await;
        let d1 = day(2025, 1, 5);
        let d2 = day(2025, 1, 12);
        store.create_task(&tl, draft("late", d2, 5)).await.unwrap();
        store.create_task(&tl, draft("early-3", d1, 3)).await.unwrap();
        store.create_task(&tl, draft("early-5", d1, 5)).await.unwrap();

        let tasks = store.list_tasks_for_timeline(&tl).await.unwrap();
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["early-5", "early-3", "late"]);
    }

    #[tokio::test]
    async fn completion_toggles_and_bumps_updated_at() {
        let (store, _dir) = temp_store().await;
        let tl = timeline(&store).await;
        let created = store
            .create_task(&tl, draft("toggle", day(2025, 2, 1), 1))
            .await
            .unwrap();

        let done = store.update_task_completion(&created.id, true).await.unwrap();
        assert!(done.completed);
        assert!(done.updated_at >= created.updated_at);
        assert_eq!(done.created_at, created.created_at);
        assert!(store.get_task(&created.id).await.unwrap().completed);

        let undone = store
            .update_task_completion(&created.id, false)
            .await
            .unwrap();
        assert!(!undone.completed);
    }

    #[tokio::test]
    async fn missing_task_and_timeline_are_not_found() {
        let (store, _dir) = temp_store().await;
        let err = store.update_task_completion("nope", true).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "task", .. }));

        let err = store
            .create_task("no-timeline", draft("x", day(2025, 1, 1), 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::NotFound {
                entity: "timeline",
                ..
            }
        ));
    }
}
