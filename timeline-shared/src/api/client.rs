//! Minimal GraphQL client helpers for consumers (clients, integration tests).

use super::endpoints as ep;
use super::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

pub use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(String),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serde: {0}")]
    Serde(String),
    #[error("graphql: {}", join_messages(.0))]
    GraphQL(Vec<GraphQLError>),
}

impl ClientError {
    /// `extensions.code` of the first GraphQL error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::GraphQL(errs) => errs.first().and_then(GraphQLError::code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

fn join_messages(errs: &[GraphQLError]) -> String {
    errs.iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Deserialize)]
struct Envelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(180))
        // Generation waits on the LLM; keep the bound generous
        .timeout(Duration::from_secs(180))
        .build()
        .expect("failed to build HTTP client")
});

const TIMELINE_FIELDS: &str = r#"
fragment TimelineFields on Timeline {
  id title description startDate endDate
  tasks { id title description startDate endDate duration priority completed }
}"#;

const TASK_FIELDS: &str = r#"
fragment TaskFields on TimelineTask {
  id title description startDate endDate duration priority completed
}"#;

/// Runs one GraphQL operation and decodes `data.<field>` into `T`.
pub async fn execute<T: DeserializeOwned>(
    base: &str,
    query: &str,
    variables: Value,
    field: &str,
) -> Result<T, ClientError> {
    let res = HTTP_CLIENT
        .post(ep::graphql(base))
        .json(&json!({ "query": query, "variables": variables }))
        .send()
        .await
        .map_err(|e| ClientError::Http(e.to_string()))?;
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let env = res
        .json::<Envelope>()
        .await
        .map_err(|e| ClientError::Serde(e.to_string()))?;
    if !env.errors.is_empty() {
        return Err(ClientError::GraphQL(env.errors));
    }
    let mut data = env
        .data
        .ok_or_else(|| ClientError::Serde("response without data".into()))?;
    let value = data
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ClientError::Serde(format!("missing field {field}")))?;
    serde_json::from_value(value).map_err(|e| ClientError::Serde(e.to_string()))
}

pub async fn generate_timeline(
    base: &str,
    input: &TimelineInput,
) -> Result<TimelineDto, ClientError> {
    let query = format!(
        "mutation($input: TimelineInput!) {{ generateTimeline(input: $input) {{ ...TimelineFields }} }}{TIMELINE_FIELDS}"
    );
    execute(base, &query, json!({ "input": input }), "generateTimeline").await
}

pub async fn save_timeline(
    base: &str,
    input: &SaveTimelineInput,
) -> Result<TimelineDto, ClientError> {
    let query = format!(
        "mutation($input: SaveTimelineInput!) {{ saveTimeline(input: $input) {{ ...TimelineFields }} }}{TIMELINE_FIELDS}"
    );
    execute(base, &query, json!({ "input": input }), "saveTimeline").await
}

pub async fn timeline(base: &str, id: &str) -> Result<TimelineDto, ClientError> {
    let query = format!(
        "query($id: ID!) {{ timeline(id: $id) {{ ...TimelineFields }} }}{TIMELINE_FIELDS}"
    );
    execute(base, &query, json!({ "id": id }), "timeline").await
}

pub async fn timelines_for_goal(
    base: &str,
    goal_id: &str,
) -> Result<Vec<TimelineDto>, ClientError> {
    let query = format!(
        "query($goalId: ID!) {{ timelines(goalId: $goalId) {{ ...TimelineFields }} }}{TIMELINE_FIELDS}"
    );
    execute(base, &query, json!({ "goalId": goal_id }), "timelines").await
}

pub async fn task(base: &str, id: &str) -> Result<TimelineTaskDto, ClientError> {
    let query = format!("query($id: ID!) {{ task(id: $id) {{ ...TaskFields }} }}{TASK_FIELDS}");
    execute(base, &query, json!({ "id": id }), "task").await
}

pub async fn update_task_completion(
    base: &str,
    id: &str,
    completed: bool,
) -> Result<TimelineTaskDto, ClientError> {
    let query = format!(
        "mutation($id: ID!, $completed: Boolean!) {{ updateTaskCompletion(id: $id, completed: $completed) {{ ...TaskFields }} }}{TASK_FIELDS}"
    );
    execute(
        base,
        &query,
        json!({ "id": id, "completed": completed }),
        "updateTaskCompletion",
    )
    .await
}

pub async fn create_user(base: &str, email: &str) -> Result<UserDto, ClientError> {
    let query = "mutation($email: String!) { createUser(email: $email) { id email createdAt } }";
    execute(base, query, json!({ "email": email }), "createUser").await
}

pub async fn user_by_email(base: &str, email: &str) -> Result<UserDto, ClientError> {
    let query = "query($email: String!) { userByEmail(email: $email) { id email createdAt } }";
    execute(base, query, json!({ "email": email }), "userByEmail").await
}

const GOAL_SELECTION: &str =
    "id title description currentLevel targetLevel startDate targetDate";

pub async fn create_goal(base: &str, input: &CreateGoalInput) -> Result<GoalDto, ClientError> {
    let query = format!(
        "mutation($input: CreateGoalInput!) {{ createGoal(input: $input) {{ {GOAL_SELECTION} }} }}"
    );
    execute(base, &query, json!({ "input": input }), "createGoal").await
}

pub async fn goals_for_user(base: &str, user_id: &str) -> Result<Vec<GoalDto>, ClientError> {
    let query =
        format!("query($userId: ID!) {{ goals(userId: $userId) {{ {GOAL_SELECTION} }} }}");
    execute(base, &query, json!({ "userId": user_id }), "goals").await
}
