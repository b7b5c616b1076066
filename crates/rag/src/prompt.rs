use index::ScoredDocument;

/// The single model input produced for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub system: String,
    /// Context passages in retrieval order, possibly shortened to fit the budget.
    pub context: Vec<String>,
    pub question: String,
    /// Number of passages shortened or dropped to fit the budget.
    pub truncated: usize,
}

impl AssembledPrompt {
    /// Context and question, without the system instructions.
    pub fn user_section(&self) -> String {
        format!(
            "Context:\n{}\n\nQuestion: {}\nAnswer:",
            self.context.join("\n\n"),
            self.question
        )
    }

    /// The full prompt as sent to a plain text2text model.
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.system, self.user_section())
    }
}

/// Renders system instructions, retrieved passages and the question into one prompt
/// no longer than `max_chars` characters.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    max_chars: usize,
}

impl PromptAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// On overflow, passages are cut from the end of the lowest-ranked one first and
    /// emptied passages are dropped. System text and question are never shortened, so
    /// the result can still exceed the budget when they alone do.
    pub fn assemble(
        &self,
        system: &str,
        documents: &[ScoredDocument],
        question: &str,
    ) -> AssembledPrompt {
        let mut prompt = AssembledPrompt {
            system: system.to_string(),
            context: documents.iter().map(|d| d.document.text.trim().to_string()).collect(),
            question: question.trim().to_string(),
            truncated: 0,
        };

        let mut total = char_len(&prompt.render());
        while total > self.max_chars {
            let Some(last) = prompt.context.last_mut() else {
                break;
            };
            let excess = total - self.max_chars;
            let len = char_len(last);
            if len <= excess {
                prompt.context.pop();
            } else {
                *last = truncate_chars(last, len - excess);
            }
            prompt.truncated += 1;
            total = char_len(&prompt.render());
        }
        // Count each passage once even if it was shortened and later dropped.
        prompt.truncated = prompt.truncated.min(documents.len());
        prompt
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index::Document;

    fn hits(texts: &[&str]) -> Vec<ScoredDocument> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| ScoredDocument {
                document: Document::new(format!("d{i}"), *t, "src.txt"),
                score: 1.0 - i as f32 * 0.1,
            })
            .collect()
    }

    #[test]
    fn template_order_is_system_context_question() {
        let prompt = PromptAssembler::new(10_000).assemble(
            "SYSTEM",
            &hits(&["first passage", "second passage"]),
            "what is cholera?",
        );
        let text = prompt.render();
        let sys = text.find("SYSTEM").unwrap();
        let first = text.find("first passage").unwrap();
        let second = text.find("second passage").unwrap();
        let question = text.find("Question: what is cholera?").unwrap();
        assert!(sys < first && first < second && second < question);
        assert!(text.ends_with("Answer:"));
        assert_eq!(prompt.truncated, 0);
    }

    #[test]
    fn fits_budget_by_cutting_lowest_ranked_first() {
        let a = "A".repeat(100);
        let b = "B".repeat(100);
        let c = "C".repeat(100);
        let untrimmed = PromptAssembler::new(10_000).assemble("sys", &hits(&[&a, &b, &c]), "q");
        let full = char_len(&untrimmed.render());

        let prompt = PromptAssembler::new(full - 50).assemble("sys", &hits(&[&a, &b, &c]), "q");
        assert_eq!(char_len(&prompt.render()), full - 50);
        assert_eq!(prompt.context[0], a);
        assert_eq!(prompt.context[1], b);
        assert_eq!(prompt.context[2], "C".repeat(50));
        assert_eq!(prompt.truncated, 1);
    }

    #[test]
    fn drops_whole_passages_when_needed() {
        let a = "A".repeat(100);
        let b = "B".repeat(100);
        let c = "C".repeat(100);
        let full = char_len(
            &PromptAssembler::new(10_000)
                .assemble("sys", &hits(&[&a, &b, &c]), "q")
                .render(),
        );

        let prompt = PromptAssembler::new(full - 150).assemble("sys", &hits(&[&a, &b, &c]), "q");
        assert!(char_len(&prompt.render()) <= full - 150);
        assert_eq!(prompt.context.len(), 2);
        assert_eq!(prompt.context[0], a);
        assert!(prompt.context[1].starts_with('B'));
        assert!(prompt.context[1].len() < 100);
    }

    #[test]
    fn system_and_question_are_never_cut() {
        let system = "S".repeat(300);
        let question = "why does my head hurt";
        let prompt = PromptAssembler::new(50).assemble(&system, &hits(&["context"]), question);
        assert!(prompt.context.is_empty());
        assert_eq!(prompt.system, system);
        assert_eq!(prompt.question, question);
        assert!(prompt.render().contains(question));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let passage = "é".repeat(60);
        let base = char_len(&PromptAssembler::new(10_000).assemble("s", &hits(&[""]), "q").render());
        let prompt = PromptAssembler::new(base + 10).assemble("s", &hits(&[&passage]), "q");
        assert_eq!(prompt.context[0], "é".repeat(10));
    }
}
