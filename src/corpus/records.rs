//! Blank-line separated record blocks shared by title, image and label files.
//!
//! ```text
//! usp-3f9c...\n
//! 12 7 1 4\n
//! \n
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result};

/// Write one `id\nbody\n\n` block.
pub fn write_record<W: Write>(writer: &mut W, id: &str, body: &str) -> std::io::Result<()> {
    writeln!(writer, "{id}")?;
    writeln!(writer, "{body}")?;
    writeln!(writer)
}

/// Render an oracle label vector as space separated `0`/`1`.
pub fn format_labels(labels: &[u8]) -> String {
    labels
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A parsed block: the identifier line followed by its body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub body: Vec<String>,
}

/// Parse every block of a record file. Runs of blank lines separate blocks.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("open records {}", path.display()))?;
    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("read records {}", path.display()))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            records.extend(current.take());
            continue;
        }
        match current.as_mut() {
            Some(record) => record.body.push(line.to_string()),
            None => {
                current = Some(Record {
                    id: line.to_string(),
                    body: Vec::new(),
                })
            }
        }
    }
    records.extend(current.take());
    Ok(records)
}

/// Identifiers of every block, in file order.
pub fn read_record_ids(path: &Path) -> Result<Vec<String>> {
    Ok(read_records(path)?.into_iter().map(|r| r.id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_id_body_blank() {
        let mut out = Vec::new();
        write_record(&mut out, "usp-1", &format_labels(&[1, 0, 1])).unwrap();
        write_record(&mut out, "usp-2", "").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "usp-1\n1 0 1\n\nusp-2\n\n\n");
    }

    #[test]
    fn reads_back_ids_and_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usp-test.title");
        std::fs::write(&path, "usp-a\n4 5\n\nusp-b\n6\n\n\nusp-c\n7\n").unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].body, vec!["4 5"]);
        assert_eq!(
            read_record_ids(&path).unwrap(),
            vec!["usp-a", "usp-b", "usp-c"]
        );
    }
}
