//! Triage prompt builders and the report generation flow.

use thiserror::Error;
use tracing::info;

use medichat_core::{ChatMessage, LLMProvider, ProviderError, Role};

use crate::sections::{ReportSection, parse_sections};

/// Reports shorter than this are treated as a failed generation.
const MIN_REPORT_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("the model returned an empty or very short report")]
    EmptyReport,

    #[error("no sections were found in the report")]
    NoSections,
}

/// Patient details interpolated into the detailed report.
///
/// Record lookup is the caller's concern; an unidentified patient renders
/// with placeholder fields.
#[derive(Debug, Clone)]
pub struct Patient {
    pub name: String,
    pub age: String,
    pub sex: String,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            age: "-".to_string(),
            sex: "-".to_string(),
        }
    }
}

/// Short, calm summary: a handful of bullets, no diagnosis.
#[must_use]
pub fn summary_prompt(last_reply: &str) -> String {
    format!(
        "Provide a short, calm triage summary (5-6 bullet points max).\n\
         Do not diagnose. Focus on reassurance and simple next steps.\n\n\
         Patient:\n{last_reply}\n"
    )
}

/// Full structured report with the fixed section skeleton.
#[must_use]
pub fn detailed_prompt(patient: &Patient, last_reply: &str) -> String {
    format!(
        "You are a medical triage assistant. Create a detailed clinical triage report \
         with the following EXACT structure.\n\n\
         Use this format for each section:\n\n\
         Section Name:\n\
         Content here (use dashes - for bullet points)\n\n\
         Patient Information:\n\
         Name: {name}\n\
         Age: {age}\n\
         Sex: {sex}\n\n\
         Based on this conversation:\n\
         {last_reply}\n\n\
         Now provide the following sections:\n\n\
         Risk Level:\n\
         [Provide risk assessment - Low, Moderate, or High with brief explanation]\n\n\
         Key Symptoms:\n\
         - [List main symptoms with dashes]\n\
         - [One symptom per line]\n\n\
         Chief Complaint:\n\
         [Brief description of main presenting issue]\n\n\
         History of Present Illness:\n\
         [Detailed narrative of the patient's condition]\n\n\
         Home Care Advice:\n\
         - [Provide specific home care recommendations]\n\
         - [Use dashes for each point]\n\n\
         OTC Guidance:\n\
         - [Over-the-counter medication suggestions if appropriate]\n\
         - [Include precautions]\n\n\
         Monitoring Advice:\n\
         - [What symptoms to monitor]\n\
         - [When to seek further care]\n\n\
         Health Checks:\n\
         [Recommended medical evaluations or tests if needed]\n\n\
         Reassurance:\n\
         [Calm, supportive message to patient]\n\n\
         Safety Disclaimer:\n\
         [Standard medical disclaimer about seeking professional care]\n\n\
         IMPORTANT:\n\
         - Use simple text, NO markdown symbols like ** or #\n\
         - Use dashes (-) for bullet points\n\
         - Each section must start with section name followed by colon (:)\n\
         - Provide actual medical content, not placeholders\n",
        name = patient.name,
        age = patient.age,
        sex = patient.sex,
    )
}

/// Generates triage text from the latest assistant reply.
///
/// Each generation is a fresh single-message exchange: the report prompts
/// carry the conversation excerpt themselves, the transcript is not
/// replayed.
pub struct TriageReporter<P> {
    provider: P,
    model: String,
}

impl<P: LLMProvider> TriageReporter<P> {
    #[must_use]
    pub const fn new(provider: P, model: String) -> Self {
        Self { provider, model }
    }

    pub async fn generate_summary(&self, last_reply: &str) -> Result<String, TriageError> {
        let reply = self.generate(&summary_prompt(last_reply)).await?;
        Ok(reply)
    }

    pub async fn generate_report(
        &self,
        patient: &Patient,
        last_reply: &str,
    ) -> Result<Vec<ReportSection>, TriageError> {
        let reply = self.generate(&detailed_prompt(patient, last_reply)).await?;
        if reply.trim().len() < MIN_REPORT_LEN {
            return Err(TriageError::EmptyReport);
        }
        let sections = parse_sections(&reply)?;
        info!("parsed triage report with {} sections", sections.len());
        Ok(sections)
    }

    async fn generate(&self, prompt: &str) -> Result<String, TriageError> {
        let messages = [ChatMessage::new(Role::User, prompt)];
        let response = self.provider.chat(&messages, &self.model).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use medichat_core::LLMResponse;

    struct CannedProvider(String);

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _model: &str,
        ) -> Result<LLMResponse, ProviderError> {
            Ok(LLMResponse {
                content: self.0.clone(),
                usage: None,
            })
        }

        fn get_default_model(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn detailed_prompt_interpolates_patient() {
        let patient = Patient {
            name: "Jordan Lee".to_string(),
            age: "34".to_string(),
            sex: "F".to_string(),
        };
        let prompt = detailed_prompt(&patient, "sore throat for two days");
        assert!(prompt.contains("Name: Jordan Lee"));
        assert!(prompt.contains("Age: 34"));
        assert!(prompt.contains("sore throat for two days"));
        assert!(prompt.contains("Risk Level:"));
    }

    #[test]
    fn summary_prompt_embeds_reply() {
        let prompt = summary_prompt("mild headache, started yesterday");
        assert!(prompt.contains("mild headache, started yesterday"));
        assert!(prompt.contains("Do not diagnose"));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "test failure should panic with context")]
    async fn report_parses_canned_sections() {
        let canned = "Risk Level:\nLow - mild viral symptoms, no red flags seen here\n\n\
             Key Symptoms:\n- Sore throat\n- Low-grade fever\n";
        let reporter = TriageReporter::new(CannedProvider(canned.to_string()), "m".to_string());

        let sections = reporter
            .generate_report(&Patient::default(), "sore throat")
            .await
            .expect("report generation failed");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Risk Level");
    }

    #[tokio::test]
    async fn short_report_is_rejected() {
        let reporter = TriageReporter::new(CannedProvider("Too short.".to_string()), "m".to_string());
        let result = reporter
            .generate_report(&Patient::default(), "anything")
            .await;
        assert!(matches!(result, Err(TriageError::EmptyReport)));
    }
}
