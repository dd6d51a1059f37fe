//! Corpus plumbing: vocabulary, title records, record files and transcoding.

pub mod records;
pub mod split;
pub mod titles;
pub mod transcode;
pub mod vocab;

pub use titles::TitleRecords;
pub use vocab::{VocabIndex, UNKNOWN_ID};
