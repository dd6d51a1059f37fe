//! Sentence embedding backends: a hashed fallback and fastembed models.

use anyhow::Result;
use ndarray::ArrayViewMut1;
use thiserror::Error;
use tracing::info;

#[cfg(feature = "embeddings")]
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::config::{EmbedderKind, Settings};

/// Failures raised while turning sentences into vectors.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding backend failed: {0}")]
    Backend(String),
    #[error("embedder returned {got} vectors for {expected} sentences")]
    Shape { expected: usize, got: usize },
    #[error("unknown embedding model {0:?}")]
    UnknownModel(String),
    #[error("embedder {0:?} requires building with the `embeddings` feature")]
    Unavailable(&'static str),
}

/// Maps a batch of sentences to fixed-width vectors, one per sentence.
///
/// Implementations must be deterministic for identical input.
pub trait SentenceEmbedder {
    fn embed(&mut self, sentences: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed and verify that one vector came back per sentence.
    fn embed_checked(&mut self, sentences: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let vectors = self.embed(sentences)?;
        if vectors.len() != sentences.len() {
            return Err(EmbedError::Shape {
                expected: sentences.len(),
                got: vectors.len(),
            });
        }
        Ok(vectors)
    }
}

/// Feature-hashing embedder over lowercase words and character trigrams.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dims: usize,
}

impl HashedEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    fn embed_one(&self, sentence: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for word in sentence
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            self.bump(&mut vector, word.as_bytes(), 1.0);
            let padded: Vec<char> = format!("<{word}>").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.bump(&mut vector, gram.as_bytes(), 0.5);
            }
        }
        let mut view = ArrayViewMut1::from(&mut vector[..]);
        let norm = view.dot(&view).sqrt();
        if norm > 0.0 {
            view /= norm;
        }
        vector
    }

    fn bump(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let slot = (hash % self.dims as u64) as usize;
        // top bit picks the sign so colliding features tend to cancel
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[slot] += sign * weight;
    }
}

impl SentenceEmbedder for HashedEmbedder {
    fn embed(&mut self, sentences: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(sentences.iter().map(|s| self.embed_one(s)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

/// Pre-trained sentence embeddings through fastembed.
#[cfg(feature = "embeddings")]
pub struct FastEmbedder {
    model: TextEmbedding,
}

#[cfg(feature = "embeddings")]
impl FastEmbedder {
    /// Load (downloading on first use) the named model.
    pub fn try_new(model_name: &str) -> Result<Self, EmbedError> {
        let model = match model_name.to_ascii_lowercase().as_str() {
            "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
            "all-minilm-l12-v2" => EmbeddingModel::AllMiniLML12V2,
            "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            "bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
            other => return Err(EmbedError::UnknownModel(other.to_string())),
        };
        let model = TextEmbedding::try_new(InitOptions::new(model))
            .map_err(|err| EmbedError::Backend(err.to_string()))?;
        Ok(Self { model })
    }
}

#[cfg(feature = "embeddings")]
impl SentenceEmbedder for FastEmbedder {
    fn embed(&mut self, sentences: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let documents: Vec<&str> = sentences.iter().map(String::as_str).collect();
        self.model
            .embed(documents, None)
            .map_err(|err| EmbedError::Backend(err.to_string()))
    }
}

/// Build the embedder selected in settings.
pub fn load_embedder(settings: &Settings) -> Result<Box<dyn SentenceEmbedder>> {
    match settings.embedder {
        EmbedderKind::Hashed => {
            let embedder = HashedEmbedder::new(settings.embed_dims);
            info!(dims = embedder.dims(), "using hashed sentence embedder");
            Ok(Box::new(embedder))
        }
        #[cfg(feature = "embeddings")]
        EmbedderKind::Fastembed => {
            info!(model = %settings.embed_model, "loading fastembed model");
            Ok(Box::new(FastEmbedder::try_new(&settings.embed_model)?))
        }
        #[cfg(not(feature = "embeddings"))]
        EmbedderKind::Fastembed => Err(EmbedError::Unavailable("fastembed").into()),
    }
}
