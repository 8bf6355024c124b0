//! Onboarding plan generation.

use std::sync::Arc;

use chrono::NaiveDate;

use onboarding_core::generation::GenerativeModel;
use onboarding_core::models::TaskRecord;
use onboarding_core::plan::{build_plan_prompt, parse_plan};

pub struct PlanGenerator {
    model: Arc<dyn GenerativeModel>,
    temperature: f32,
}

impl PlanGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>, temperature: f32) -> Self {
        Self { model, temperature }
    }

    /// Ask the model for a plan and parse it.
    ///
    /// Makes a single model call. A failed call or an unparseable reply
    /// yields an empty list; a partially parseable reply yields fewer
    /// than ten tasks.
    pub async fn generate_plan(
        &self,
        user_name: &str,
        role: &str,
        start_date: NaiveDate,
    ) -> Vec<TaskRecord> {
        let prompt = build_plan_prompt(user_name, role, start_date);

        let reply = match self.model.generate(&prompt, self.temperature).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(model = self.model.model_name(), error = %e, "plan generation failed");
                return Vec::new();
            }
        };

        let tasks = parse_plan(&reply, start_date);
        tracing::info!(user = user_name, role, tasks = tasks.len(), "plan generated");
        tasks
    }
}
