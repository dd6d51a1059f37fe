use std::{fs, io::Cursor, path::Path};

use oracle_prep::{
    config::Settings,
    corpus::{records, TitleRecords},
    nlp::{EmbedError, HashedEmbedder, RankPolicy, RegexTokenizer, SentenceEmbedder},
    oracle::{self, OracleOptions, OracleReport, OracleSink, PrepareJob, COMPLETION_MARKER},
};

/// Counts a few keywords; enough to make similarity predictable.
struct KeywordEmbedder {
    calls: usize,
    fail_on_call: Option<usize>,
}

impl KeywordEmbedder {
    fn new() -> Self {
        Self {
            calls: 0,
            fail_on_call: None,
        }
    }
}

impl SentenceEmbedder for KeywordEmbedder {
    fn embed(&mut self, sentences: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(EmbedError::Backend("model session lost".into()));
        }
        Ok(sentences
            .iter()
            .map(|s| {
                let s = s.to_lowercase();
                ["pool", "spa", "wifi", "breakfast"]
                    .iter()
                    .map(|kw| s.matches(kw).count() as f32)
                    .chain(std::iter::once(0.1))
                    .collect()
            })
            .collect())
    }
}

const SOURCE: &str = "\
Big pool. Slow wifi. Nice spa. Pool bar too.
Breakfast was great. The wifi dropped. Spa closed.
Extra line without a title.
";

fn titles() -> TitleRecords {
    TitleRecords::from_pairs(
        vec!["usp-one".into(), "usp-two".into()],
        ["pool", "wifi"],
    )
    .unwrap()
}

fn run(
    source: &str,
    sink: OracleSink,
    options: OracleOptions,
    embedder: &mut KeywordEmbedder,
) -> anyhow::Result<OracleReport> {
    oracle::run_single_oracle(
        Cursor::new(source.to_string()),
        &titles(),
        &RegexTokenizer,
        embedder,
        sink,
        &options,
    )
}

fn options(top_k: usize, line_start: usize) -> OracleOptions {
    OracleOptions {
        top_k,
        policy: RankPolicy::Nearest,
        line_start,
    }
}

#[test]
fn surplus_source_lines_are_logged_not_labelled() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels");
    let log = dir.path().join("log");
    let sink = OracleSink::create(&labels, &log).unwrap();

    let report = run(SOURCE, sink, options(2, 0), &mut KeywordEmbedder::new()).unwrap();

    assert_eq!(
        report,
        OracleReport {
            lines: 3,
            records: 2,
            skipped: 0,
            unaligned: 1
        }
    );
    assert_eq!(
        fs::read_to_string(&labels).unwrap(),
        "usp-one\n1 0 0 1\n\nusp-two\n1 1 0\n\n"
    );
    let log_text = fs::read_to_string(&log).unwrap();
    assert!(log_text.contains("INFO processing line 0"));
    assert!(log_text.contains("INFO number of sentences: 4"));
    assert!(log_text.contains("WARN line 2 is greater than target length 1"));
    assert!(log_text.trim_end().ends_with(COMPLETION_MARKER));
}

#[test]
fn resumed_run_continues_byte_identically() {
    let dir = tempfile::tempdir().unwrap();

    let full_labels = dir.path().join("full.labels");
    let full_log = dir.path().join("full.log");
    run(
        SOURCE,
        OracleSink::create(&full_labels, &full_log).unwrap(),
        options(1, 0),
        &mut KeywordEmbedder::new(),
    )
    .unwrap();

    // first attempt only got through line 0 before dying
    let labels = dir.path().join("resumed.labels");
    let log = dir.path().join("resumed.log");
    let first_line = SOURCE.lines().next().unwrap();
    run(
        &format!("{first_line}\n"),
        OracleSink::create(&labels, &log).unwrap(),
        options(1, 0),
        &mut KeywordEmbedder::new(),
    )
    .unwrap();
    let report = run(
        SOURCE,
        OracleSink::append(&labels, &log).unwrap(),
        options(1, 1),
        &mut KeywordEmbedder::new(),
    )
    .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(
        fs::read(&labels).unwrap(),
        fs::read(&full_labels).unwrap()
    );
    let log_text = fs::read_to_string(&log).unwrap();
    assert_eq!(log_text.matches("processing line 0").count(), 1);
    assert_eq!(log_text.matches(COMPLETION_MARKER).count(), 2);
}

#[test]
fn embedder_failure_aborts_and_keeps_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels");
    let log = dir.path().join("log");
    let mut embedder = KeywordEmbedder {
        calls: 0,
        fail_on_call: Some(2),
    };

    let err = run(
        SOURCE,
        OracleSink::create(&labels, &log).unwrap(),
        options(3, 0),
        &mut embedder,
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("model session lost"));
    assert_eq!(
        records::read_record_ids(&labels).unwrap(),
        vec!["usp-one".to_string()]
    );
    assert!(!fs::read_to_string(&log).unwrap().contains(COMPLETION_MARKER));
}

#[test]
fn empty_source_line_gets_empty_label_record() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels");
    let log = dir.path().join("log");
    let mut embedder = KeywordEmbedder::new();

    run(
        "\nSpa. Pool.\n",
        OracleSink::create(&labels, &log).unwrap(),
        options(1, 0),
        &mut embedder,
    )
    .unwrap();

    assert_eq!(
        fs::read_to_string(&labels).unwrap(),
        "usp-one\n\n\nusp-two\n1 0\n\n"
    );
    assert_eq!(embedder.calls, 1);
}

fn write_corpus(dir: &Path) -> PrepareJob {
    let input = dir.join("train.source.txt");
    let target = dir.join("train.target.txt");
    let vocab = dir.join("vocab.txt");
    fs::write(
        &input,
        "The pool is huge. Rooms are small. Staff were kind.\nGreat breakfast buffet. Noisy street.\n",
    )
    .unwrap();
    fs::write(&target, "huge pool\ngreat breakfast\n").unwrap();
    fs::write(&vocab, "<pad>\n<unk>\npool\nbreakfast\ngreat\nhuge\n.\n").unwrap();
    PrepareJob {
        input,
        target,
        vocab,
        data_type: "training".into(),
        output_dir: dir.to_path_buf(),
        options: OracleOptions::default(),
    }
}

#[test]
fn prepare_writes_all_artefacts() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_corpus(dir.path());
    let settings = Settings::default();

    let report = oracle::prepare(
        &job,
        &settings,
        &RegexTokenizer,
        &mut HashedEmbedder::new(256),
    )
    .unwrap();
    assert_eq!(report.records, 2);

    let artefacts = job.artefacts(&settings);
    assert_eq!(
        artefacts.label,
        dir.path().join("usp-training.label.singleoracle")
    );
    let title_records = records::read_records(&artefacts.title).unwrap();
    assert_eq!(title_records.len(), 2);
    assert_eq!(title_records[0].body, vec!["5 2"]);
    assert_eq!(title_records[1].body, vec!["4 3"]);

    let image = records::read_records(&artefacts.image).unwrap();
    assert_eq!(image.len(), 2);
    assert_eq!(image[0].id, title_records[0].id);
    assert_eq!(image[1].body, vec!["1 3 1 6 1 1 6"]);

    let labels = records::read_records(&artefacts.label).unwrap();
    assert_eq!(labels[0].id, title_records[0].id);
    assert_eq!(labels[0].body, vec!["1 1 1"]);
    assert_eq!(labels[1].body, vec!["1 1"]);
    assert!(fs::read_to_string(&artefacts.log)
        .unwrap()
        .contains(COMPLETION_MARKER));
}

#[test]
fn resumed_prepare_reuses_title_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = write_corpus(dir.path());
    let settings = Settings::default();
    oracle::prepare(&job, &settings, &RegexTokenizer, &mut HashedEmbedder::new(64)).unwrap();
    let artefacts = job.artefacts(&settings);
    let title_ids = records::read_record_ids(&artefacts.title).unwrap();

    job.options.line_start = 1;
    let report =
        oracle::prepare(&job, &settings, &RegexTokenizer, &mut HashedEmbedder::new(64)).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(records::read_record_ids(&artefacts.title).unwrap(), title_ids);
    let label_ids = records::read_record_ids(&artefacts.label).unwrap();
    assert_eq!(
        label_ids,
        vec![title_ids[0].clone(), title_ids[1].clone(), title_ids[1].clone()]
    );
}

#[test]
fn resume_without_title_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = write_corpus(dir.path());
    job.options.line_start = 1;
    let settings = Settings::default();
    let err = oracle::prepare(&job, &settings, &RegexTokenizer, &mut HashedEmbedder::new(64))
        .unwrap_err();
    assert!(err.to_string().contains("title file"));
    assert!(!job.artefacts(&settings).label.exists());
}
