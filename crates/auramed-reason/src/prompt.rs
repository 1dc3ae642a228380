//! Prompt construction for text-generating engines.

use auramed_audio::Embedding;
use auramed_core::PatientVitals;

use crate::types::ChatMessage;

const SYSTEM_PROMPT: &str = "You are a clinical respiratory triage assistant. \
Ground every assessment in the stated WHO protocol and the supplied findings. \
Never invent findings that were not provided.";

/// Build the chat messages for one triage request.
pub fn build_messages(embedding: &Embedding, vitals: &PatientVitals) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(embedding, vitals)),
    ]
}

/// User turn: protocol, vitals, acoustic summary and the required format.
pub fn build_prompt(embedding: &Embedding, vitals: &PatientVitals) -> String {
    let mut prompt = format!(
        "Follow the {} protocol.\nAnalyze the following patient data:\n\
         - Age: {} months\n\
         - Respiratory Rate: {} breaths/min (fast breathing threshold for age: {})\n\
         - Danger Signs: {}\n",
        vitals.protocol(),
        vitals.age_months(),
        vitals.respiratory_rate(),
        vitals.fast_breathing_threshold(),
        if vitals.signs().is_empty() { "No" } else { "Yes" },
    );

    for (_, label) in vitals.danger_sign_details() {
        prompt.push_str(&format!("  - {}\n", label));
    }

    prompt.push_str(&format!(
        "- Cough acoustic embedding: {} dims over {} segments, norm {:.4}, mean {:.4}\n\n",
        embedding.dimension(),
        embedding.segments,
        embedding.l2_norm(),
        embedding.mean(),
    ));

    prompt.push_str(
        "Provide a reasoning trace and a final triage status (GREEN, YELLOW, RED).\n\n\
         Format your response as:\n\
         REASONING: [Your clinical reasoning]\n\
         STATUS: [GREEN/YELLOW/RED]\n\
         CONFIDENCE: [0.0-1.0]",
    );
    prompt
}
