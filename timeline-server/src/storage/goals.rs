use diesel::prelude::*;
use timeline_shared::domain::now_utc;

use super::models::{Goal, GoalFields, NewGoal};
use super::schema::goals;
use super::users::user_exists;
use super::{StorageError, Store, new_id};

impl Store {
    pub async fn create_goal(&self, fields: GoalFields) -> Result<Goal, StorageError> {
        self.interact(move |conn| {
            if !user_exists(conn, &fields.user_id)? {
                return Err(StorageError::not_found("user", &fields.user_id));
            }
            let now = now_utc();
            let id = new_id();
            let row = NewGoal {
                id: &id,
                user_id: &fields.user_id,
                title: &fields.title,
                description: &fields.description,
                current_level: &fields.current_level,
                target_level: &fields.target_level,
                start_date: fields.start_date,
                target_date: fields.target_date,
                created_at: now,
                updated_at: now,
            };
            Ok(diesel::insert_into(goals::table)
                .values(&row)
                .returning(Goal::as_returning())
                .get_result(conn)?)
        })
        .await
    }

    pub async fn get_goal(&self, id: &str) -> Result<Goal, StorageError> {
        let id = id.to_string();
        self.interact(move |conn| {
            goals::table
                .find(&id)
                .select(Goal::as_select())
                .first(conn)
                .optional()?
                .ok_or_else(|| StorageError::not_found("goal", &id))
        })
        .await
    }

    pub async fn list_goals_for_user(&self, user_id: &str) -> Result<Vec<Goal>, StorageError> {
        let user_id = user_id.to_string();
        self.interact(move |conn| {
            Ok(goals::table
                .filter(goals::user_id.eq(&user_id))
                .order((goals::start_date.asc(), goals::created_at.asc()))
                .select(Goal::as_select())
                .load(conn)?)
        })
        .await
    }
}

pub(super) fn goal_exists(conn: &mut SqliteConnection, id: &str) -> QueryResult<bool> {
    let count: i64 = goals::table.find(id).count().get_result(conn)?;
    Ok(count > 0)
}
