//! Title records: the positional relation index -> title ID -> target text.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use rand::Rng;
use tracing::{info, warn};

use crate::{
    corpus::{records, vocab::VocabIndex},
    nlp::Tokenizer,
};

/// Generate a fresh identifier of the form `<prefix>-<32 hex chars>`.
pub fn new_title_id<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    format!("{prefix}-{:032x}", rng.gen::<u128>())
}

/// Ordered title ID -> target sentence map with positional access.
#[derive(Debug, Clone, Default)]
pub struct TitleRecords {
    entries: IndexMap<String, String>,
}

impl TitleRecords {
    /// Assign a fresh ID to every target sentence, preserving order.
    pub fn generate<I, S>(targets: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rng = rand::thread_rng();
        let mut entries = IndexMap::new();
        for target in targets {
            let mut id = new_title_id(&mut rng, prefix);
            while entries.contains_key(&id) {
                id = new_title_id(&mut rng, prefix);
            }
            entries.insert(id, target.into());
        }
        Self { entries }
    }

    /// Pair previously issued IDs with target sentences by position.
    pub fn from_pairs<I, S>(ids: Vec<String>, targets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        if ids.len() != targets.len() {
            warn!(
                ids = ids.len(),
                targets = targets.len(),
                "title file and target corpus differ in length; pairing the shorter prefix"
            );
        }
        let mut entries = IndexMap::new();
        for (id, target) in ids.into_iter().zip(targets) {
            if entries.insert(id.clone(), target).is_some() {
                bail!("duplicate title id {id}");
            }
        }
        Ok(Self { entries })
    }

    /// `(title ID, target text)` at position `index`.
    pub fn get(&self, index: usize) -> Option<(&str, &str)> {
        self.entries
            .get_index(index)
            .map(|(id, text)| (id.as_str(), text.as_str()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, text)| (id.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the title file: one `id\n<word IDs>\n\n` block per target.
    pub fn write_title_file(
        &self,
        path: &Path,
        vocab: &VocabIndex,
        tokenizer: &dyn Tokenizer,
    ) -> Result<()> {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for (id, target) in self.iter() {
            records::write_record(&mut writer, id, &vocab.encode_line(tokenizer, target))?;
        }
        writer.flush()?;
        info!(path = %path.display(), titles = self.len(), "wrote title file");
        Ok(())
    }
}

/// Read a target corpus, one sentence per line with line endings stripped.
pub fn read_targets(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("open target {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .map(|line| line.map(|l| l.trim_end_matches('\r').to_string()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("read target {}", path.display()))
}
