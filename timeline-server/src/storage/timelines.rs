use diesel::prelude::*;
use timeline_shared::domain::now_utc;

use super::goals::goal_exists;
use super::models::{NewTimeline, TaskDraft, Timeline, TimelineFields, TimelineWithTasks};
use super::schema::timelines;
use super::tasks::{insert_task, load_tasks};
use super::{StorageError, Store, new_id};

impl Store {
    pub async fn create_timeline(&self, fields: TimelineFields) -> Result<Timeline, StorageError> {
        self.interact(move |conn| insert_timeline(conn, &fields)).await
    }

    /// Persists a timeline and all its tasks atomically.
    pub async fn create_timeline_with_tasks(
        &self,
        fields: TimelineFields,
        drafts: Vec<TaskDraft>,
    ) -> Result<TimelineWithTasks, StorageError> {
        self.interact(move |conn| {
            conn.transaction::<_, StorageError, _>(|conn| {
                let timeline = insert_timeline(conn, &fields)?;
                let now = now_utc();
                for draft in &drafts {
                    insert_task(conn, &timeline.id, draft, now)?;
                }
                let tasks = load_tasks(conn, &timeline.id)?;
                Ok(TimelineWithTasks { timeline, tasks })
            })
        })
        .await
    }

    /// Fetches a timeline and attaches its tasks.
    pub async fn get_timeline(&self, id: &str) -> Result<TimelineWithTasks, StorageError> {
        let id = id.to_string();
        self.interact(move |conn| {
            let timeline = timelines::table
                .find(&id)
                .select(Timeline::as_select())
                .first(conn)
                .optional()?
                .ok_or_else(|| StorageError::not_found("timeline", &id))?;
            let tasks = load_tasks(conn, &timeline.id)?;
            Ok(TimelineWithTasks { timeline, tasks })
        })
        .await
    }

    /// Timelines of a goal, without tasks.
    pub async fn list_timelines_for_goal(
        &self,
        goal_id: &str,
    ) -> Result<Vec<Timeline>, StorageError> {
        let goal_id = goal_id.to_string();
        self.interact(move |conn| {
            Ok(timelines::table
                .filter(timelines::goal_id.eq(&goal_id))
                .order((timelines::start_date.asc(), timelines::created_at.asc()))
                .select(Timeline::as_select())
                .load(conn)?)
        })
        .await
    }
}

fn insert_timeline(
    conn: &mut SqliteConnection,
    fields: &TimelineFields,
) -> Result<Timeline, StorageError> {
    if !goal_exists(conn, &fields.goal_id)? {
        return Err(StorageError::not_found("goal", &fields.goal_id));
    }
    let now = now_utc();
    let id = new_id();
    let row = NewTimeline {
        id: &id,
        goal_id: &fields.goal_id,
        title: &fields.title,
        description: &fields.description,
        start_date: fields.start_date,
        end_date: fields.end_date,
        created_at: now,
        updated_at: now,
    };
    Ok(diesel::insert_into(timelines::table)
        .values(&row)
        .returning(Timeline::as_returning())
        .get_result(conn)?)
}

pub(super) fn timeline_exists(conn: &mut SqliteConnection, id: &str) -> QueryResult<bool> {
    let count: i64 = timelines::table.find(id).count().get_result(conn)?;
    Ok(count > 0)
}
