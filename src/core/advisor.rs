use crate::adapters::ChatCompletionClient;
use crate::domain::model::{CropRequirement, SoilConditions};
use crate::domain::ports::Advisor;
use async_trait::async_trait;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert agricultural advisor.";

/// Fail-soft advisor: any failure is returned as text starting with `Error:`.
#[derive(Debug, Clone)]
pub struct AdvisorClient {
    chat: ChatCompletionClient,
}

impl AdvisorClient {
    pub fn new(chat: ChatCompletionClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl Advisor for AdvisorClient {
    async fn advise(&self, prompt: &str) -> String {
        match self.chat.complete(SYSTEM_INSTRUCTION, prompt).await {
            Ok(text) => {
                tracing::debug!("Advisor ({}) answered with {} chars", self.chat.model(), text.len());
                text.trim().to_string()
            }
            Err(e) => {
                tracing::warn!("⚠️ Advisor request failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }
}

pub fn yield_prompt(conditions: &SoilConditions) -> String {
    format!(
        "Suggest how to improve crop yield for soil type {}, moisture {}%, temperature {}°C.",
        conditions.soil, conditions.moisture, conditions.temperature
    )
}

pub fn fertilizer_prompt(crop: &CropRequirement) -> String {
    format!(
        "What type of fertilizers are best for growing {} in {} soil?",
        crop.name,
        crop.soil_list()
    )
}

pub fn improvement_prompt(crop: &CropRequirement, conditions: &SoilConditions) -> String {
    format!(
        "The user wants to grow {} in {} soil with {}% moisture and {}°C temperature. Suggest improvements.",
        crop.name, conditions.soil, conditions.moisture, conditions.temperature
    )
}
