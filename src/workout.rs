use std::sync::Arc;
use async_trait::async_trait;
use futures_util::FutureExt;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};
use crate::metrics::MetricSnapshot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("API key is missing. Set GEMINI_API_KEY or add gemini_api_key to the config file to enable this feature.")]
    MissingCredential,

    #[error("Request failed: {0}")]
    TransportFailure(String),

    #[error("API Error: {0}")]
    BadStatus(String),

    #[error("Unexpected response: {0}")]
    MalformedResponse(String),
}

/// Text generation backend for workout plans
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// A generated plan, one entry per line of the model's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub paragraphs: Vec<String>,
}

impl Plan {
    pub fn from_text(text: &str) -> Self {
        Self {
            paragraphs: text.split('\n').map(|line| line.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlanDisplay {
    #[default]
    Idle,
    Generating,
    Ready(Plan),
    Failed(String),
}

pub const GENERATING_TEXT: &str = "Generating your context-aware plan...";

pub fn failure_message(err: &GenerationError) -> String {
    match err {
        GenerationError::MissingCredential => err.to_string(),
        _ => format!(
            "Error generating workout. Please check your API key or the log. {}",
            err
        ),
    }
}

pub fn build_prompt(snapshot: &MetricSnapshot, user_focus: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Act as an elite AI fitness coach named GymER.\n");
    prompt.push_str(&format!(
        "A user has the following context: My sleep quality is {}, my heart rate is {} and my stress level is {}.\n",
        snapshot.sleep_quality, snapshot.heart_rate, snapshot.stress_level
    ));
    prompt.push_str(&format!("They want a workout focusing on: {}.\n\n", user_focus));

    prompt.push_str("Based on this context, generate a short, effective workout plan.\n");
    prompt.push_str("If the context is poor, prioritize recovery or lighter exercise.\n");
    prompt.push_str("If the context is good, create a more challenging workout.\n\n");

    prompt.push_str("Start with a 1-line \"Coach's Note\" explaining *why* you chose this plan based on their context.\n");
    prompt.push_str("Then, list 3-5 exercises.\n\n");

    prompt.push_str("Format the response clearly. Do not use markdown.\n");
    prompt.push_str("Example:\n");
    prompt.push_str("Coach's Note: Because your sleep was poor, we're focusing on light activity to promote recovery.\n");
    prompt.push_str("1. Warm-up: 5 min light jog\n");
    prompt.push_str("2. Exercise: ...");

    prompt
}

pub async fn generate_plan(
    generator: &dyn PlanGenerator,
    snapshot: &MetricSnapshot,
    user_focus: &str,
) -> Result<Plan, GenerationError> {
    let prompt = build_prompt(snapshot, user_focus);
    let text = generator.generate(&prompt).await?;
    Ok(Plan::from_text(&text))
}

/// Owns the plan display and the single outstanding generation request
pub struct WorkoutPlanner {
    generator: Arc<dyn PlanGenerator>,
    display: PlanDisplay,
    task: Option<JoinHandle<Result<Plan, GenerationError>>>,
}

impl WorkoutPlanner {
    pub fn new(generator: Arc<dyn PlanGenerator>) -> Self {
        Self {
            generator,
            display: PlanDisplay::Idle,
            task: None,
        }
    }

    pub fn display(&self) -> &PlanDisplay {
        &self.display
    }

    pub fn is_generating(&self) -> bool {
        self.task.is_some()
    }

    /// Start generating a plan in the background. Ignored while another
    /// request is still outstanding.
    pub fn request(&mut self, snapshot: MetricSnapshot, user_focus: &str) -> bool {
        if self.task.is_some() {
            debug!("workout request already in flight, ignoring");
            return false;
        }

        info!(focus = %user_focus, "generating workout plan");
        self.display = PlanDisplay::Generating;

        let generator = Arc::clone(&self.generator);
        let focus = user_focus.to_string();
        self.task = Some(tokio::spawn(async move {
            generate_plan(generator.as_ref(), &snapshot, &focus).await
        }));
        true
    }

    /// Pick up the result if the request has settled. Never blocks.
    pub fn poll(&mut self) -> bool {
        match &self.task {
            Some(handle) if handle.is_finished() => {}
            _ => return false,
        }

        if let Some(result) = self.task.take().and_then(|h| h.now_or_never()) {
            self.finish(result);
            return true;
        }
        false
    }

    #[cfg(test)]
    pub async fn settle(&mut self) {
        if let Some(handle) = self.task.take() {
            let result = handle.await;
            self.finish(result);
        }
    }

    fn finish(&mut self, result: Result<Result<Plan, GenerationError>, JoinError>) {
        let result = result.unwrap_or_else(|e| {
            Err(GenerationError::TransportFailure(format!("generation task failed: {}", e)))
        });

        self.display = match result {
            Ok(plan) => PlanDisplay::Ready(plan),
            Err(e) => {
                warn!(error = %e, "workout generation failed");
                PlanDisplay::Failed(failure_message(&e))
            }
        };
    }
}
