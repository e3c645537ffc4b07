use chrono::{Days, Months, NaiveDateTime};
use diesel::prelude::*;
use timeline_shared::domain::now_utc;

use super::models::{NewGoal, NewTimeline, NewUser, TaskDraft};
use super::schema::{goals, timeline_tasks, timelines, users};
use super::tasks::insert_task;
use super::{StorageError, Store, new_id};

/// Identifiers of the rows written by [`Store::reset_and_seed`].
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub user_id: String,
    pub goal_id: String,
    pub timeline_id: String,
    pub task_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub users: i64,
    pub goals: i64,
    pub timelines: i64,
    pub tasks: i64,
}

const SEED_USER_ID: &str = "1";
const SEED_EMAIL: &str = "test@example.com";

impl Store {
    /// Wipes all four tables and writes the demo account, goal, timeline and
    /// two tasks, all in one transaction.
    pub async fn reset_and_seed(&self) -> Result<SeedSummary, StorageError> {
        self.interact(|conn| {
            conn.transaction::<_, StorageError, _>(|conn| {
                delete_all(conn)?;
                create_all(conn, now_utc())
            })
        })
        .await
    }

    pub async fn table_counts(&self) -> Result<TableCounts, StorageError> {
        self.interact(|conn| {
            Ok(TableCounts {
                users: users::table.count().get_result(conn)?,
                goals: goals::table.count().get_result(conn)?,
                timelines: timelines::table.count().get_result(conn)?,
                tasks: timeline_tasks::table.count().get_result(conn)?,
            })
        })
        .await
    }
}

fn delete_all(conn: &mut SqliteConnection) -> QueryResult<()> {
    // Children before parents
    let tasks = diesel::delete(timeline_tasks::table).execute(conn)?;
    let tls = diesel::delete(timelines::table).execute(conn)?;
    let gs = diesel::delete(goals::table).execute(conn)?;
    let us = diesel::delete(users::table).execute(conn)?;
    tracing::debug!(tasks, timelines = tls, goals = gs, users = us, "seed: cleared tables");
    Ok(())
}

fn create_all(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
) -> Result<SeedSummary, StorageError> {
    let in_three_months = now
        .checked_add_months(Months::new(3))
        .ok_or_else(|| StorageError::InvalidInput("seed end date out of range".into()))?;
    let plus_days = |n: u64| {
        now.checked_add_days(Days::new(n))
            .ok_or_else(|| StorageError::InvalidInput("seed task date out of range".into()))
    };

    diesel::insert_into(users::table)
        .values(&NewUser {
            id: SEED_USER_ID,
            email: SEED_EMAIL,
            created_at: now,
            updated_at: now,
        })
        .execute(conn)?;
    tracing::info!(user_id = SEED_USER_ID, "seed: inserted user");

    let goal_id = new_id();
    diesel::insert_into(goals::table)
        .values(&NewGoal {
            id: &goal_id,
            user_id: SEED_USER_ID,
            title: "Master Rust Programming",
            description: "Become proficient in Rust",
            current_level: "Beginner",
            target_level: "Advanced",
            start_date: now,
            target_date: in_three_months,
            created_at: now,
            updated_at: now,
        })
        .execute(conn)?;

    let timeline_id = new_id();
    diesel::insert_into(timelines::table)
        .values(&NewTimeline {
            id: &timeline_id,
            goal_id: &goal_id,
            title: "Learning Rust Programming",
            description: "A complete pathway to master the Rust programming language",
            start_date: now,
            end_date: in_three_months,
            created_at: now,
            updated_at: now,
        })
        .execute(conn)?;

    let drafts = [
        TaskDraft {
            title: "Setup Rust Environment".into(),
            description: "Install rustup and set up the development environment".into(),
            start_date: now,
            end_date: plus_days(7)?,
            duration: "7 days".into(),
            priority: 1,
        },
        TaskDraft {
            title: "Learn Rust Basics".into(),
            description: "Learn basic syntax, ownership, and control flow".into(),
            start_date: plus_days(8)?,
            end_date: plus_days(21)?,
            duration: "14 days".into(),
            priority: 1,
        },
    ];
    let mut task_ids = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        task_ids.push(insert_task(conn, &timeline_id, draft, now)?.id);
    }

    Ok(SeedSummary {
        user_id: SEED_USER_ID.to_string(),
        goal_id,
        timeline_id,
        task_ids,
    })
}
