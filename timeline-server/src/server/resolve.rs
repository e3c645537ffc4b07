//! Operations behind the GraphQL fields, in API-boundary error terms.

use timeline_shared::api::{
    CreateGoalInput, GoalDto, PRIORITY_RANGE, SaveTimelineInput, TimelineDto, TimelineInput,
    TimelineTaskDto, UserDto,
};
use timeline_shared::domain::parse_date;

use super::convert::{goal_to_dto, task_to_dto, timeline_to_dto, user_to_dto};
use super::{AppError, AppState};
use crate::storage::models::{GoalFields, TaskDraft, TimelineFields};

impl AppState {
    pub async fn generate_timeline(&self, input: &TimelineInput) -> Result<TimelineDto, AppError> {
        tracing::info!(model = %self.generator.model(), "generate_timeline");
        Ok(self.generator.generate(input).await?)
    }

    pub async fn create_user(&self, email: &str) -> Result<UserDto, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::invalid_input("email must not be empty"));
        }
        Ok(user_to_dto(self.store.create_user(email).await?))
    }

    pub async fn user(&self, id: &str) -> Result<UserDto, AppError> {
        Ok(user_to_dto(self.store.get_user(id).await?))
    }

    pub async fn user_by_email(&self, email: &str) -> Result<UserDto, AppError> {
        Ok(user_to_dto(self.store.get_user_by_email(email.trim()).await?))
    }

    pub async fn create_goal(&self, input: CreateGoalInput) -> Result<GoalDto, AppError> {
        let fields = GoalFields {
            start_date: parse_date(&input.start_date)?,
            target_date: parse_date(&input.target_date)?,
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            current_level: input.current_level,
            target_level: input.target_level,
        };
        Ok(goal_to_dto(self.store.create_goal(fields).await?))
    }

    pub async fn goal(&self, id: &str) -> Result<GoalDto, AppError> {
        Ok(goal_to_dto(self.store.get_goal(id).await?))
    }

    pub async fn goals_for_user(&self, user_id: &str) -> Result<Vec<GoalDto>, AppError> {
        let goals = self.store.list_goals_for_user(user_id).await?;
        Ok(goals.into_iter().map(goal_to_dto).collect())
    }

    /// Persists a timeline and its tasks under an existing goal.
    pub async fn save_timeline(&self, input: SaveTimelineInput) -> Result<TimelineDto, AppError> {
        let fields = TimelineFields {
            start_date: parse_date(&input.start_date)?,
            end_date: parse_date(&input.end_date)?,
            goal_id: input.goal_id,
            title: input.title,
            description: input.description,
        };
        let drafts = input
            .tasks
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                if !PRIORITY_RANGE.contains(&t.priority) {
                    return Err(AppError::invalid_input(format!(
                        "task {} ({:?}): priority {} outside {}..={}",
                        i,
                        t.title,
                        t.priority,
                        PRIORITY_RANGE.start(),
                        PRIORITY_RANGE.end()
                    )));
                }
                Ok(TaskDraft {
                    start_date: parse_date(&t.start_date)?,
                    end_date: parse_date(&t.end_date)?,
                    title: t.title,
                    description: t.description,
                    duration: t.duration,
                    priority: t.priority,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        let saved = self.store.create_timeline_with_tasks(fields, drafts).await?;
        tracing::info!(
            timeline_id = %saved.timeline.id,
            goal_id = %saved.timeline.goal_id,
            tasks = saved.tasks.len(),
            "timeline saved"
        );
        Ok(saved.into())
    }

    pub async fn timeline(&self, id: &str) -> Result<TimelineDto, AppError> {
        Ok(self.store.get_timeline(id).await?.into())
    }

    pub async fn timelines_for_goal(&self, goal_id: &str) -> Result<Vec<TimelineDto>, AppError> {
        let timelines = self.store.list_timelines_for_goal(goal_id).await?;
        let mut out = Vec::with_capacity(timelines.len());
        for timeline in timelines {
            let tasks = self.store.list_tasks_for_timeline(&timeline.id).await?;
            out.push(timeline_to_dto(timeline, tasks));
        }
        Ok(out)
    }

    pub async fn task(&self, id: &str) -> Result<TimelineTaskDto, AppError> {
        Ok(task_to_dto(self.store.get_task(id).await?))
    }

    pub async fn update_task_completion(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<TimelineTaskDto, AppError> {
        let task = self.store.update_task_completion(id, completed).await?;
        tracing::info!(task_id = %task.id, completed, "task completion updated");
        Ok(task_to_dto(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatCompletion, ChatRequest, LlmError, TimelineGenerator};
    use crate::server::AppConfig;
    use crate::storage::test_support::temp_store;
    use async_trait::async_trait;
    use std::sync::Arc;
    use timeline_shared::api::SaveTaskInput;

    struct Unreachable;

    #[async_trait]
    impl ChatCompletion for Unreachable {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            Err(LlmError::Http("connection refused".into()))
        }
    }

    async fn state() -> (AppState, tempfile::TempDir) {
        let (store, dir) = temp_store().await;
        let generator = TimelineGenerator::new(Arc::new(Unreachable), "m");
        (AppState::new(AppConfig::default(), store, generator), dir)
    }

    fn task(title: &str, start: &str, priority: i32) -> SaveTaskInput {
        SaveTaskInput {
            title: title.into(),
            description: "d".into(),
            start_date: start.into(),
            end_date: start.into(),
            duration: "1 days".into(),
            priority,
        }
    }

    async fn goal_id(state: &AppState) -> String {
        let user = state.create_user(" kim@example.com ").await.unwrap();
        assert_eq!(user.email, "kim@example.com");
        state
            .create_goal(CreateGoalInput {
                user_id: user.id,
                title: "Piano".into(),
                description: "Play a sonata".into(),
                current_level: "Grade 2".into(),
                target_level: "Grade 5".into(),
                start_date: "2025-01-01".into(),
                target_date: "2025-12-31".into(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn save_then_read_back() {
        let (state, _dir) = state().await;
        let goal_id = goal_id(&state).await;
        let saved = state
            .save_timeline(SaveTimelineInput {
                goal_id: goal_id.clone(),
                title: "Year plan".into(),
                description: "Scales then pieces".into(),
                start_date: "2025-01-01".into(),
                end_date: "2025-12-31".into(),
                tasks: vec![
                    task("pieces", "2025-06-01", 5),
                    task("scales", "2025-01-01", 2),
                    task("arpeggios", "2025-01-01", 4),
                ],
            })
            .await
            .unwrap();
        let titles: Vec<_> = saved.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["arpeggios", "scales", "pieces"]);
        assert_eq!(saved.start_date, "2025-01-01");

        let id = saved.id.clone().unwrap();
        assert_eq!(state.timeline(&id).await.unwrap(), saved);
        assert_eq!(state.timelines_for_goal(&goal_id).await.unwrap(), [saved]);
    }

    #[tokio::test]
    async fn bad_dates_and_priorities_are_invalid_input() {
        let (state, _dir) = state().await;
        let goal_id = goal_id(&state).await;
        let base = SaveTimelineInput {
            goal_id,
            title: "t".into(),
            description: "d".into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-02-01".into(),
            tasks: vec![],
        };

        let mut bad_date = base.clone();
        bad_date.end_date = "February".into();
        let err = state.save_timeline(bad_date).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let mut bad_priority = base.clone();
        bad_priority.tasks = vec![task("x", "2025-01-02", 9)];
        let err = state.save_timeline(bad_priority).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(err.to_string().contains("priority 9"), "{err}");

        let err = state.create_user("   ").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let (state, _dir) = state().await;
        assert_eq!(state.timeline("x").await.unwrap_err().code(), "NOT_FOUND");
        assert_eq!(state.task("x").await.unwrap_err().code(), "NOT_FOUND");
        assert_eq!(state.goal("x").await.unwrap_err().code(), "NOT_FOUND");
        assert_eq!(
            state.update_task_completion("x", true).await.unwrap_err().code(),
            "NOT_FOUND"
        );
        let err = state
            .save_timeline(SaveTimelineInput {
                goal_id: "missing".into(),
                title: "t".into(),
                description: "d".into(),
                start_date: "2025-01-01".into(),
                end_date: "2025-02-01".into(),
                tasks: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn llm_transport_failure_is_upstream() {
        let (state, _dir) = state().await;
        let err = state
            .generate_timeline(&TimelineInput {
                current_level: "a".into(),
                goal: "b".into(),
                objectives: "c".into(),
                current_date: "2025-01-01".into(),
                target_date: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UPSTREAM");
        assert!(err.to_string().contains("connection refused"));
    }
}
