use crate::storage::schema::{goals, timeline_tasks, timelines, users};
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = goals)]
#[diesel(belongs_to(User, foreign_key = user_id))]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub current_level: String,
    pub target_level: String,
    pub start_date: NaiveDateTime,
    pub target_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = goals)]
pub struct NewGoal<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub current_level: &'a str,
    pub target_level: &'a str,
    pub start_date: NaiveDateTime,
    pub target_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = timelines)]
#[diesel(belongs_to(Goal, foreign_key = goal_id))]
pub struct Timeline {
    pub id: String,
    pub goal_id: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = timelines)]
pub struct NewTimeline<'a> {
    pub id: &'a str,
    pub goal_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = timeline_tasks)]
#[diesel(belongs_to(Timeline, foreign_key = timeline_id))]
pub struct TimelineTask {
    pub id: String,
    pub timeline_id: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub duration: String,
    pub priority: i32,
    pub completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = timeline_tasks)]
pub struct NewTimelineTask<'a> {
    pub id: &'a str,
    pub timeline_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub duration: &'a str,
    pub priority: i32,
    pub completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A timeline together with its tasks, ordered for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineWithTasks {
    pub timeline: Timeline,
    pub tasks: Vec<TimelineTask>,
}

/// Owned goal fields supplied by callers of [`crate::storage::Store::create_goal`].
#[derive(Debug, Clone)]
pub struct GoalFields {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub current_level: String,
    pub target_level: String,
    pub start_date: NaiveDateTime,
    pub target_date: NaiveDateTime,
}

/// Owned timeline fields (without tasks).
#[derive(Debug, Clone)]
pub struct TimelineFields {
    pub goal_id: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
}

/// Owned task fields, minus the owning timeline. New tasks always start out
/// not completed.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub duration: String,
    pub priority: i32,
}
