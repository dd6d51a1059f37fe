//! Natural language processing layer: segmentation, embeddings and ranking.

pub mod embeddings;
pub mod similarity;
pub mod tokenize;

pub use embeddings::{load_embedder, EmbedError, HashedEmbedder, SentenceEmbedder};
pub use similarity::{rank, RankPolicy};
pub use tokenize::{load_tokenizer, RegexTokenizer, Tokenizer};
