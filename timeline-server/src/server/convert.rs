//! Internal record → wire shape. Dates become `YYYY-MM-DD`; owner references
//! are dropped.

use timeline_shared::api::{GoalDto, TimelineDto, TimelineTaskDto, UserDto};
use timeline_shared::domain::{format_date, format_rfc3339};

use crate::storage::models::{Goal, Timeline, TimelineTask, TimelineWithTasks, User};

pub fn timeline_to_dto(timeline: Timeline, tasks: Vec<TimelineTask>) -> TimelineDto {
    TimelineDto {
        id: Some(timeline.id),
        title: timeline.title,
        description: timeline.description,
        start_date: format_date(timeline.start_date),
        end_date: format_date(timeline.end_date),
        tasks: tasks.into_iter().map(task_to_dto).collect(),
    }
}

impl From<TimelineWithTasks> for TimelineDto {
    fn from(value: TimelineWithTasks) -> Self {
        timeline_to_dto(value.timeline, value.tasks)
    }
}

pub fn task_to_dto(task: TimelineTask) -> TimelineTaskDto {
    TimelineTaskDto {
        id: Some(task.id),
        title: task.title,
        description: task.description,
        start_date: format_date(task.start_date),
        end_date: format_date(task.end_date),
        duration: task.duration,
        priority: task.priority,
        completed: task.completed,
    }
}

pub fn goal_to_dto(goal: Goal) -> GoalDto {
    GoalDto {
        id: goal.id,
        title: goal.title,
        description: goal.description,
        current_level: goal.current_level,
        target_level: goal.target_level,
        start_date: format_date(goal.start_date),
        target_date: format_date(goal.target_date),
    }
}

pub fn user_to_dto(user: User) -> UserDto {
    UserDto {
        id: user.id,
        email: user.email,
        created_at: format_rfc3339(user.created_at),
    }
}
