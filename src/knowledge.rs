//! Static medical knowledge: trigger keywords, canned advice, and fixed replies.
//!
//! Every list keeps its declaration order because the first match wins.

use serde::{Deserialize, Serialize};

/// A lookup-table entry matched by substring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicEntry {
    pub key: String,
    pub advice: String,
}

impl TopicEntry {
    fn new(key: &str, advice: &str) -> Self {
        Self {
            key: key.into(),
            advice: advice.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeBase {
    pub emergency_keywords: Vec<String>,
    pub symptoms: Vec<TopicEntry>,
    pub advice: Vec<TopicEntry>,
    /// Phrases that mark a question for the retrieval pipeline.
    pub medical_keywords: Vec<String>,
    pub emergency_message: String,
    pub greeting: String,
    pub disclaimer: String,
    /// Sent when the retrieval pipeline fails or is not loaded.
    pub apology: String,
    pub symptom_note: String,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            emergency_keywords: strings(&[
                "emergency",
                "urgent",
                "10177",
                "help",
                "chest pain",
                "difficulty breathing",
                "bleeding",
                "unconscious",
            ]),
            symptoms: vec![
                TopicEntry::new(
                    "headache",
                    "Headaches can have many causes. If severe or persistent, consult a doctor. Rest and hydration may help.",
                ),
                TopicEntry::new(
                    "fever",
                    "Fever is often a sign of infection. Rest, stay hydrated, and monitor temperature. Seek help if above 103°F.",
                ),
                TopicEntry::new(
                    "cough",
                    "Stay hydrated and rest. If accompanied by difficulty breathing, seek immediate medical attention.",
                ),
                TopicEntry::new(
                    "fatigue",
                    "Ensure adequate sleep and nutrition. Persistent fatigue may require medical evaluation.",
                ),
                TopicEntry::new(
                    "nausea",
                    "Sip clear fluids and eat bland foods. If severe or with vomiting, consult a doctor.",
                ),
            ],
            advice: vec![
                TopicEntry::new(
                    "emergency",
                    "For emergencies like chest pain, difficulty breathing, or severe injury, call emergency services immediately.",
                ),
                TopicEntry::new(
                    "general",
                    "Maintain a healthy lifestyle with balanced diet, regular exercise, and adequate sleep.",
                ),
                TopicEntry::new(
                    "prevention",
                    "Wash hands regularly, stay up-to-date with vaccinations, and have regular check-ups.",
                ),
            ],
            medical_keywords: strings(&[
                "what is",
                "define",
                "symptoms",
                "treatment",
                "cause",
                "disease",
                "condition",
                "infection",
                "diagnosis",
                "medicine",
                "cholera",
                "diabetes",
                "hypertension",
                "cancer",
                "syndrome",
            ]),
            emergency_message: " **EMERGENCY ALERT** \n\nYour message contains keywords suggesting a medical emergency. \
Please call emergency services (10177 or your local emergency number) immediately or go to the nearest emergency room."
                .into(),
            greeting: "Hello! I’m here to help with medical questions. Ask me about a disease, symptom, or condition."
                .into(),
            disclaimer: "**IMPORTANT DISCLAIMER**\n\nThis chatbot provides general health information only and is not \
a substitute for professional medical advice, diagnosis, or treatment. Always seek the advice of your physician or \
other qualified health provider with any questions you may have regarding a medical condition."
                .into(),
            apology: "Sorry, I couldn't look that up right now. Please try again shortly, and contact a healthcare \
professional if your concern is pressing."
                .into(),
            symptom_note: "*Note: This is general information only. For personal medical advice, consult a healthcare professional.*"
                .into(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl KnowledgeBase {
    /// Emergency detection must always be possible, so an empty keyword list is rejected.
    pub fn validate(&self) -> Result<(), String> {
        if self.emergency_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err("knowledge.emergency_keywords must contain at least one keyword".into());
        }
        let blank_key = self
            .symptoms
            .iter()
            .chain(&self.advice)
            .any(|entry| entry.key.trim().is_empty());
        if blank_key {
            return Err("knowledge topic keys must not be empty".into());
        }
        if self.medical_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err("knowledge.medical_keywords must not contain empty entries".into());
        }
        Ok(())
    }

    pub fn symptom_reply(&self, entry: &TopicEntry) -> String {
        format!(
            "Regarding **{}**:\n\n{}\n\n{}",
            entry.key, entry.advice, self.symptom_note
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let kb = KnowledgeBase::default();
        assert!(kb.validate().is_ok());
        assert_eq!(kb.emergency_keywords.len(), 8);
        assert_eq!(kb.symptoms[0].key, "headache");
        assert_eq!(kb.advice.len(), 3);
    }

    #[test]
    fn empty_emergency_keywords_rejected() {
        let kb = KnowledgeBase {
            emergency_keywords: vec![],
            ..Default::default()
        };
        assert!(kb.validate().unwrap_err().contains("emergency_keywords"));

        let kb = KnowledgeBase {
            emergency_keywords: vec!["  ".into()],
            ..Default::default()
        };
        assert!(kb.validate().is_err());
    }

    #[test]
    fn symptom_reply_format() {
        let kb = KnowledgeBase::default();
        let reply = kb.symptom_reply(&kb.symptoms[0]);
        assert!(reply.starts_with("Regarding **headache**:\n\nHeadaches can have many causes."));
        assert!(reply.ends_with("consult a healthcare professional.*"));
    }
}
