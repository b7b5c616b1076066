use std::sync::Arc;

use crate::knowledge::{KnowledgeBase, TopicEntry};

/// What a message is asking for, in priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Emergency,
    Symptom(TopicEntry),
    Advice(TopicEntry),
    /// Goes to the retrieval pipeline.
    Medical,
    General,
}

/// Keyword classifier over lower-cased, trimmed messages.
///
/// Checks run emergency, symptom table, advice table, medical keywords, in that
/// order; the first hit decides. Classification is pure and never fails.
#[derive(Debug, Clone)]
pub struct IntentRouter {
    kb: Arc<KnowledgeBase>,
    emergency: Vec<String>,
    medical: Vec<String>,
}

impl IntentRouter {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        };
        Self {
            emergency: lower(&kb.emergency_keywords),
            medical: lower(&kb.medical_keywords),
            kb,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn is_emergency(&self, message: &str) -> bool {
        let text = message.trim().to_lowercase();
        self.emergency.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn classify(&self, message: &str) -> Intent {
        if self.is_emergency(message) {
            return Intent::Emergency;
        }
        let text = message.trim().to_lowercase();

        if let Some(entry) = find_topic(&self.kb.symptoms, &text) {
            return Intent::Symptom(entry.clone());
        }
        if let Some(entry) = find_topic(&self.kb.advice, &text) {
            return Intent::Advice(entry.clone());
        }
        if self.medical.iter().any(|k| text.contains(k.as_str())) {
            return Intent::Medical;
        }
        Intent::General
    }
}

fn find_topic<'a>(entries: &'a [TopicEntry], text: &str) -> Option<&'a TopicEntry> {
    entries
        .iter()
        .find(|e| text.contains(e.key.trim().to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> IntentRouter {
        IntentRouter::new(Arc::new(KnowledgeBase::default()))
    }

    #[test]
    fn emergency_keywords_are_case_insensitive() {
        let r = router();
        for msg in [
            "EMERGENCY",
            "my friend is Unconscious",
            "call 10177",
            "I can't breathe, chest pain",
            "please HELP me",
            "Heavy bleeding after a fall",
        ] {
            assert_eq!(r.classify(msg), Intent::Emergency, "{msg}");
            assert!(r.is_emergency(msg));
        }
    }

    #[test]
    fn emergency_beats_every_other_rule() {
        let r = router();
        // Contains a symptom, an advice topic and a medical keyword too.
        assert_eq!(
            r.classify("urgent: what is this fever, general prevention?"),
            Intent::Emergency
        );
    }

    #[test]
    fn symptom_table_in_declaration_order() {
        let r = router();
        match r.classify("I have a headache and a fever") {
            Intent::Symptom(entry) => assert_eq!(entry.key, "headache"),
            other => panic!("unexpected intent {other:?}"),
        }
    }

    #[test]
    fn symptom_beats_medical_keywords() {
        let r = router();
        assert!(matches!(
            r.classify("What is the treatment for a cough?"),
            Intent::Symptom(ref e) if e.key == "cough"
        ));
    }

    #[test]
    fn advice_topics() {
        let r = router();
        assert!(matches!(
            r.classify("any prevention tips?"),
            Intent::Advice(ref e) if e.key == "prevention"
        ));
    }

    #[test]
    fn medical_questions_route_to_rag() {
        let r = router();
        for msg in ["what is cholera", "  Define HYPERTENSION ", "diabetes diagnosis"] {
            assert_eq!(r.classify(msg), Intent::Medical, "{msg}");
        }
    }

    #[test]
    fn everything_else_is_general() {
        let r = router();
        for msg in ["hello", "", "   ", "thanks!"] {
            assert_eq!(r.classify(msg), Intent::General, "{msg:?}");
        }
    }

    #[test]
    fn custom_keywords_are_lowercased() {
        let kb = KnowledgeBase {
            emergency_keywords: vec!["  Overdose ".into()],
            ..Default::default()
        };
        let r = IntentRouter::new(Arc::new(kb));
        assert_eq!(r.classify("possible OVERDOSE"), Intent::Emergency);
        assert_eq!(r.classify("help"), Intent::General);
    }
}
