use async_graphql::{Context, EmptySubscription, ErrorExtensions, ID, Object, Result, Schema};
use timeline_shared::api::{
    CreateGoalInput, GoalDto, SaveTimelineInput, TimelineDto, TimelineInput, TimelineTaskDto,
    UserDto,
};

use super::{AppError, AppState};

pub type TimelineSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: AppState) -> TimelineSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

/// SDL of the served schema, for `timeline-server schema`.
pub fn sdl() -> String {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .finish()
        .sdl()
}

fn state<'a>(ctx: &Context<'a>) -> Result<&'a AppState> {
    ctx.data::<AppState>()
}

fn api<T>(res: std::result::Result<T, AppError>) -> Result<T> {
    res.map_err(|e| e.extend())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<UserDto> {
        api(state(ctx)?.user(&id).await)
    }

    async fn user_by_email(&self, ctx: &Context<'_>, email: String) -> Result<UserDto> {
        api(state(ctx)?.user_by_email(&email).await)
    }

    async fn goal(&self, ctx: &Context<'_>, id: ID) -> Result<GoalDto> {
        api(state(ctx)?.goal(&id).await)
    }

    /// Goals owned by a user, earliest start first.
    async fn goals(&self, ctx: &Context<'_>, user_id: ID) -> Result<Vec<GoalDto>> {
        api(state(ctx)?.goals_for_user(&user_id).await)
    }

    /// A stored timeline with its tasks ordered by start date, then priority.
    async fn timeline(&self, ctx: &Context<'_>, id: ID) -> Result<TimelineDto> {
        api(state(ctx)?.timeline(&id).await)
    }

    async fn timelines(&self, ctx: &Context<'_>, goal_id: ID) -> Result<Vec<TimelineDto>> {
        api(state(ctx)?.timelines_for_goal(&goal_id).await)
    }

    async fn task(&self, ctx: &Context<'_>, id: ID) -> Result<TimelineTaskDto> {
        api(state(ctx)?.task(&id).await)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Asks the language model for a timeline. Nothing is persisted.
    async fn generate_timeline(
        &self,
        ctx: &Context<'_>,
        input: TimelineInput,
    ) -> Result<TimelineDto> {
        api(state(ctx)?.generate_timeline(&input).await)
    }

    async fn create_user(&self, ctx: &Context<'_>, email: String) -> Result<UserDto> {
        api(state(ctx)?.create_user(&email).await)
    }

    async fn create_goal(&self, ctx: &Context<'_>, input: CreateGoalInput) -> Result<GoalDto> {
        api(state(ctx)?.create_goal(input).await)
    }

    /// Stores a timeline and its tasks under an existing goal.
    async fn save_timeline(
        &self,
        ctx: &Context<'_>,
        input: SaveTimelineInput,
    ) -> Result<TimelineDto> {
        api(state(ctx)?.save_timeline(input).await)
    }

    async fn update_task_completion(
        &self,
        ctx: &Context<'_>,
        id: ID,
        completed: bool,
    ) -> Result<TimelineTaskDto> {
        api(state(ctx)?.update_task_completion(&id, completed).await)
    }
}
