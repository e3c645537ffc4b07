//! Goal description → prompt → LLM reply → timeline.

use std::sync::Arc;

use serde::Deserialize;
use timeline_shared::api::{TimelineDto, TimelineInput, TimelineTaskDto};

use super::{ChatCompletion, ChatMessage, ChatRequest, LlmError};

pub const SYSTEM_PROMPT: &str =
    "You are a helpful timeline generator that creates detailed study/achievement plans.";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("error parsing timeline JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fixed reply schema requested from the model. Missing or `null` fields
/// decode to empty values; a value of the wrong type is still an error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GeneratedTimeline {
    #[serde(deserialize_with = "null_as_default")]
    title: String,
    #[serde(deserialize_with = "null_as_default")]
    description: String,
    #[serde(deserialize_with = "null_as_default")]
    start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    tasks: Vec<GeneratedTask>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GeneratedTask {
    #[serde(deserialize_with = "null_as_default")]
    title: String,
    #[serde(deserialize_with = "null_as_default")]
    description: String,
    #[serde(deserialize_with = "null_as_default")]
    start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    duration: String,
    #[serde(deserialize_with = "null_as_default")]
    priority: i32,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<GeneratedTimeline> for TimelineDto {
    fn from(g: GeneratedTimeline) -> Self {
        TimelineDto {
            id: None,
            title: g.title,
            description: g.description,
            start_date: g.start_date,
            end_date: g.end_date,
            tasks: g
                .tasks
                .into_iter()
                .map(|t| TimelineTaskDto {
                    id: None,
                    title: t.title,
                    description: t.description,
                    start_date: t.start_date,
                    end_date: t.end_date,
                    duration: t.duration,
                    priority: t.priority,
                    completed: false,
                })
                .collect(),
        }
    }
}

/// Renders the user prompt. Inputs are substituted verbatim.
pub fn render_prompt(input: &TimelineInput) -> String {
    let target_date = input.target_date.as_deref().unwrap_or_default();
    format!(
        r#"
Create a detailed timeline for achieving the following goal:

Current Level: {current_level}
Goal: {goal}
Objectives: {objectives}
Current Date: {current_date}
Target Date: {target_date}

Please provide a timeline with specific tasks, including:
- Task title
- Task description
- Start date
- End date
- Duration (in days)
- Priority level (1-5, with 5 being highest)

Format your response as a JSON object with the following structure:
{{
  "title": "Timeline title",
  "description": "Overall timeline description",
  "startDate": "YYYY-MM-DD",
  "endDate": "YYYY-MM-DD",
  "tasks": [
    {{
      "title": "Task 1 title",
      "description": "Task 1 description",
      "startDate": "YYYY-MM-DD",
      "endDate": "YYYY-MM-DD",
      "duration": "X days",
      "priority": 5
    }},
    ...
  ]
}}
"#,
        current_level = input.current_level,
        goal = input.goal,
        objectives = input.objectives,
        current_date = input.current_date,
    )
}

/// Returns the span from the first `{` to the last `}` of `reply`, or the whole
/// reply when there is no such span.
///
/// This is a textual span, not a brace-balanced scan: a reply holding two
/// separate objects yields one invalid span covering both.
pub fn extract_json(reply: &str) -> &str {
    match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply,
    }
}

/// Extracts and decodes the timeline object embedded in a model reply.
pub fn parse_reply(reply: &str) -> Result<TimelineDto, serde_json::Error> {
    let generated: GeneratedTimeline = serde_json::from_str(extract_json(reply))?;
    Ok(generated.into())
}

/// Turns [`TimelineInput`]s into timelines with one chat-completion call each.
#[derive(Clone)]
pub struct TimelineGenerator {
    backend: Arc<dyn ChatCompletion>,
    model: String,
    temperature: f32,
}

impl TimelineGenerator {
    pub fn new(backend: Arc<dyn ChatCompletion>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            temperature: TEMPERATURE,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_for(&self, input: &TimelineInput) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(render_prompt(input)),
            ],
            temperature: self.temperature,
        }
    }

    pub async fn generate(&self, input: &TimelineInput) -> Result<TimelineDto, GenerateError> {
        let request = self.request_for(input);
        let reply = self.backend.complete(&request).await?;
        let timeline = parse_reply(&reply).inspect_err(|e| {
            tracing::warn!(error = %e, reply_len = reply.len(), "llm: reply did not decode");
        })?;
        tracing::info!(tasks = timeline.tasks.len(), "llm: timeline generated");
        Ok(timeline)
    }
}
