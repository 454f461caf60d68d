//! Deterministic offline embeddings built from character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use council_core::AppResult;
use std::collections::{HashMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Trigram-hash embedding provider for tests and offline runs.
///
/// Vectors are content-dependent and stable across runs, so texts that share
/// vocabulary land close together under cosine similarity. They carry no real
/// semantics.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed synchronously. Used to seed fixture records.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let lower = text.to_lowercase();
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let hash = window
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % self.dimensions] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vector(text)).collect())
    }
}
