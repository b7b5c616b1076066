//! End-to-end routing tests: each message kind reaches exactly the stage it should.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use medchat::index::{Document, FlatIndex, VectorIndex};
use medchat::rag::{AssembledPrompt, LOW_CONFIDENCE_ANSWER};
use medchat::semantic::StubEmbedder;
use medchat::{
    Chatbot, Embedder, EmbeddingError, GenerationError, Generator, KnowledgeBase, RagConfig,
    RagOrchestrator, ResponseType, Retriever,
};

const DIM: usize = 256;

struct CountingEmbedder {
    inner: StubEmbedder,
    calls: AtomicUsize,
}

#[async_trait]
impl Embedder for CountingEmbedder {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }
}

enum Script {
    Echo,
    Empty,
    Fail,
}

struct CountingGenerator {
    script: Script,
    calls: AtomicUsize,
}

#[async_trait]
impl Generator for CountingGenerator {
    fn name(&self) -> &str {
        "counting"
    }

    async fn generate(&self, prompt: &AssembledPrompt) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Echo => Ok(format!("Based on {} passages: {}", prompt.context.len(), prompt.context[0])),
            Script::Empty => Ok("   ".into()),
            Script::Fail => Err(GenerationError::Request("model offline".into())),
        }
    }
}

struct Harness {
    bot: Chatbot,
    embedder: Arc<CountingEmbedder>,
    generator: Arc<CountingGenerator>,
}

impl Harness {
    fn embeds(&self) -> usize {
        self.embedder.calls.load(Ordering::SeqCst)
    }

    fn generations(&self) -> usize {
        self.generator.calls.load(Ordering::SeqCst)
    }
}

const CORPUS: &[(&str, &str)] = &[
    (
        "cholera.txt",
        "Cholera is an acute diarrhoeal infection caused by eating food or drinking water contaminated with Vibrio cholerae.",
    ),
    (
        "diabetes.txt",
        "Diabetes is a chronic disease that occurs when the pancreas does not produce enough insulin.",
    ),
    (
        "hypertension.txt",
        "Hypertension means blood pressure in the vessels is persistently raised.",
    ),
    (
        "malaria.txt",
        "Malaria is a life-threatening disease spread to humans by infected mosquitoes.",
    ),
];

async fn harness(corpus: &[(&str, &str)], script: Script) -> Harness {
    let stub = StubEmbedder::new(DIM);
    let mut index = FlatIndex::new(stub.name(), DIM);
    for (i, (source, text)) in corpus.iter().enumerate() {
        let vector = stub.embed(text).await.unwrap();
        index
            .insert(Document::new(format!("{source}#{i}"), *text, *source), vector)
            .unwrap();
    }

    let embedder = Arc::new(CountingEmbedder {
        inner: stub,
        calls: AtomicUsize::new(0),
    });
    let generator = Arc::new(CountingGenerator {
        script,
        calls: AtomicUsize::new(0),
    });
    let index: Arc<dyn VectorIndex> = Arc::new(index);
    let retriever = Retriever::new(embedder.clone(), index).unwrap();
    let rag = RagOrchestrator::new(retriever, generator.clone(), &RagConfig::default());

    Harness {
        bot: Chatbot::new(Arc::new(KnowledgeBase::default()), Some(Arc::new(rag))),
        embedder,
        generator,
    }
}

#[tokio::test]
async fn symptom_question_uses_static_table() {
    let h = harness(CORPUS, Script::Echo).await;
    let reply = h.bot.respond("I have a headache").await;
    assert_eq!(reply.kind, ResponseType::Symptom);
    assert!(reply.text.contains("Headaches can have many causes"));
    assert_eq!(h.embeds(), 0);
    assert_eq!(h.generations(), 0);
}

#[tokio::test]
async fn medical_question_goes_through_rag_once() {
    let h = harness(CORPUS, Script::Echo).await;
    let reply = h.bot.respond("what is cholera").await;
    assert_eq!(reply.kind, ResponseType::Rag);
    assert!(reply.text.contains("Vibrio cholerae"));
    assert_eq!(reply.sources[0].source, "cholera.txt");
    assert!(reply.sources.len() <= 3);
    assert_eq!(h.embeds(), 1);
    assert_eq!(h.generations(), 1);
}

#[tokio::test]
async fn emergency_never_touches_the_pipeline() {
    let h = harness(CORPUS, Script::Echo).await;
    let reply = h.bot.respond("I can't breathe, chest pain").await;
    assert_eq!(reply.kind, ResponseType::Emergency);
    assert!(reply.text.contains("EMERGENCY ALERT"));
    assert_eq!(h.embeds(), 0);
    assert_eq!(h.generations(), 0);
}

#[tokio::test]
async fn emergency_beats_medical_keywords() {
    let h = harness(CORPUS, Script::Echo).await;
    let reply = h.bot.respond("urgent: what is cholera").await;
    assert_eq!(reply.kind, ResponseType::Emergency);
    assert_eq!(h.generations(), 0);
}

#[tokio::test]
async fn greeting_for_everything_else() {
    let h = harness(CORPUS, Script::Echo).await;
    let reply = h.bot.respond("hello").await;
    assert_eq!(reply.kind, ResponseType::General);
    assert!(reply.text.starts_with("Hello!"));
    assert_eq!(h.embeds(), 0);
}

#[tokio::test]
async fn empty_retrieval_is_low_confidence_general() {
    let h = harness(&[], Script::Echo).await;
    let reply = h.bot.respond("what is cholera").await;
    assert_eq!(reply.kind, ResponseType::General);
    assert_eq!(reply.text, LOW_CONFIDENCE_ANSWER);
    assert!(reply.sources.is_empty());
    assert_eq!(h.embeds(), 1);
    assert_eq!(h.generations(), 0);
}

#[tokio::test]
async fn generator_failure_becomes_apology() {
    let h = harness(CORPUS, Script::Fail).await;
    let reply = h.bot.respond("what is cholera").await;
    assert_eq!(reply.kind, ResponseType::General);
    assert_eq!(reply.text, KnowledgeBase::default().apology);
    assert_eq!(h.generations(), 1);
}

#[tokio::test]
async fn blank_generation_becomes_apology() {
    let h = harness(CORPUS, Script::Empty).await;
    let reply = h.bot.respond("define diabetes").await;
    assert_eq!(reply.kind, ResponseType::General);
    assert_eq!(reply.text, KnowledgeBase::default().apology);
}

#[tokio::test]
async fn retrieval_is_deterministic_and_bounded() {
    let retriever = {
        let stub = StubEmbedder::new(DIM);
        let mut index = FlatIndex::new(stub.name(), DIM);
        for (i, (source, text)) in CORPUS.iter().enumerate() {
            let v = stub.embed(text).await.unwrap();
            index
                .insert(Document::new(format!("{source}#{i}"), *text, *source), v)
                .unwrap();
        }
        Retriever::new(Arc::new(stub), Arc::new(index)).unwrap()
    };

    let first = retriever.retrieve("disease caused by infected water").await.unwrap();
    let second = retriever.retrieve("disease caused by infected water").await.unwrap();
    assert!(first.len() <= medchat::TOP_K);
    assert_eq!(first, second);
    for pair in first.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
