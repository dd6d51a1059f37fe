//! Corpus preparation toolkit for extractive summarisation oracles.
//!
//! The `prepare` pipeline turns a source corpus and an aligned title corpus
//! into the title, image and single-oracle label files consumed by
//! sentence-extraction summarisers. `map` and `split` cover the surrounding
//! vocabulary and segmentation chores.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod logging;
pub mod nlp;
pub mod oracle;
