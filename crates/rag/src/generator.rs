use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiGenerator;
use crate::{AssembledPrompt, GenerationError, GeneratorConfig};

/// Produces free text from an assembled prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &AssembledPrompt) -> Result<String, GenerationError>;
}

/// Builds the generator selected by `cfg.mode`.
pub fn build_generator(cfg: &GeneratorConfig) -> Result<Arc<dyn Generator>, GenerationError> {
    cfg.validate().map_err(GenerationError::InvalidConfig)?;
    match cfg.mode.as_str() {
        "api" => Ok(Arc::new(ApiGenerator::from_config(cfg)?)),
        _ => Ok(Arc::new(ExtractiveGenerator::new(cfg.max_sentences))),
    }
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "what", "which", "who", "how", "why", "when", "does",
    "with", "that", "this", "from", "have", "has", "can", "about", "into", "your", "you", "its",
    "is", "of", "a", "an", "to", "in", "on", "or", "it", "be", "do", "i", "my", "me",
];

/// Offline generator: returns the context sentences that share the most terms
/// with the question, in their original order.
#[derive(Debug, Clone)]
pub struct ExtractiveGenerator {
    max_sentences: usize,
}

impl ExtractiveGenerator {
    pub fn new(max_sentences: usize) -> Self {
        Self {
            max_sentences: max_sentences.max(1),
        }
    }
}

#[async_trait]
impl Generator for ExtractiveGenerator {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn generate(&self, prompt: &AssembledPrompt) -> Result<String, GenerationError> {
        let query_terms: HashSet<String> = terms(&prompt.question).collect();
        let sentences: Vec<&str> = prompt
            .context
            .iter()
            .flat_map(|passage| split_sentences(passage))
            .collect();
        if sentences.is_empty() {
            return Ok(String::new());
        }

        let mut ranked: Vec<(usize, usize)> = sentences
            .iter()
            .enumerate()
            .map(|(pos, s)| {
                let overlap = terms(s).collect::<HashSet<_>>().intersection(&query_terms).count();
                (pos, overlap)
            })
            .filter(|(_, overlap)| *overlap > 0)
            .collect();

        if ranked.is_empty() {
            // Nothing matches lexically; the best-ranked passage still leads.
            return Ok(sentences[0].to_string());
        }

        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(self.max_sentences);
        ranked.sort_by_key(|(pos, _)| *pos);

        Ok(ranked
            .into_iter()
            .map(|(pos, _)| sentences[pos])
            .collect::<Vec<_>>()
            .join(" "))
    }
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
}

/// Splits on `.`, `!`, `?` followed by whitespace, and on line breaks.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '\n' => Some(i),
            '.' | '!' | '?' => match chars.peek() {
                Some((_, next)) if next.is_whitespace() => Some(i + c.len_utf8()),
                None => Some(i + c.len_utf8()),
                _ => None,
            },
            _ => None,
        };
        if let Some(end) = boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}
