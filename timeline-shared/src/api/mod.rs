use serde::{Deserialize, Serialize};

pub mod endpoints;
#[cfg(feature = "client")]
pub mod client;

// Timeline generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
pub struct TimelineInput {
    pub current_level: String,
    pub goal: String,
    pub objectives: String,
    pub current_date: String,
    pub target_date: Option<String>,
}

// Timeline/tasks. `id` is absent for freshly generated, unsaved timelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[cfg_attr(feature = "graphql", graphql(name = "Timeline"))]
pub struct TimelineDto {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub start_date: String, // YYYY-MM-DD
    pub end_date: String,   // YYYY-MM-DD
    pub tasks: Vec<TimelineTaskDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[cfg_attr(feature = "graphql", graphql(name = "TimelineTask"))]
pub struct TimelineTaskDto {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub priority: i32,
    pub completed: bool,
}

// Accounts/goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[cfg_attr(feature = "graphql", graphql(name = "User"))]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub created_at: String, // RFC3339 UTC
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[cfg_attr(feature = "graphql", graphql(name = "Goal"))]
pub struct GoalDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub current_level: String,
    pub target_level: String,
    pub start_date: String,
    pub target_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
pub struct CreateGoalInput {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub current_level: String,
    pub target_level: String,
    pub start_date: String,
    pub target_date: String,
}

// Persisting a (usually generated) timeline under a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
pub struct SaveTimelineInput {
    pub goal_id: String,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub tasks: Vec<SaveTaskInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
pub struct SaveTaskInput {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub priority: i32,
}

impl SaveTimelineInput {
    /// Builds a save request from a generated timeline.
    pub fn from_generated(goal_id: impl Into<String>, timeline: &TimelineDto) -> Self {
        Self {
            goal_id: goal_id.into(),
            title: timeline.title.clone(),
            description: timeline.description.clone(),
            start_date: timeline.start_date.clone(),
            end_date: timeline.end_date.clone(),
            tasks: timeline
                .tasks
                .iter()
                .map(|t| SaveTaskInput {
                    title: t.title.clone(),
                    description: t.description.clone(),
                    start_date: t.start_date.clone(),
                    end_date: t.end_date.clone(),
                    duration: t.duration.clone(),
                    priority: t.priority,
                })
                .collect(),
        }
    }
}

/// Priorities accepted for persisted tasks, lowest to highest.
pub const PRIORITY_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_camel_case() {
        let input: TimelineInput = serde_json::from_value(serde_json::json!({
            "currentLevel": "Beginner",
            "goal": "Learn Rust",
            "objectives": "Ship a CLI",
            "currentDate": "2025-01-01",
            "targetDate": null
        }))
        .unwrap();
        assert_eq!(input.current_level, "Beginner");
        assert!(input.target_date.is_none());

        let task = TimelineTaskDto {
            id: None,
            title: "t".into(),
            description: "d".into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-01-02".into(),
            duration: "1 days".into(),
            priority: 2,
            completed: false,
        };
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["startDate"], "2025-01-01");
        assert_eq!(v["endDate"], "2025-01-02");
    }

    #[test]
    fn save_input_keeps_task_order() {
        let mk = |title: &str, priority| TimelineTaskDto {
            id: None,
            title: title.into(),
            description: String::new(),
            start_date: "2025-02-01".into(),
            end_date: "2025-02-03".into(),
            duration: "2 days".into(),
            priority,
            completed: false,
        };
        let generated = TimelineDto {
            id: None,
            title: "Plan".into(),
            description: "All of it".into(),
            start_date: "2025-02-01".into(),
            end_date: "2025-03-01".into(),
            tasks: vec![mk("first", 5), mk("second", 1)],
        };
        let save = SaveTimelineInput::from_generated("goal-1", &generated);
        assert_eq!(save.goal_id, "goal-1");
        let titles: Vec<_> = save.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(save.tasks[0].priority, 5);
    }
}
