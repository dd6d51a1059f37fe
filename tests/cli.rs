use std::fs;

use assert_cmd::Command;

fn oracle_prep() -> Command {
    let mut cmd = Command::cargo_bin("oracle-prep").expect("binary exists");
    cmd.env("ORACLE_EMBEDDER", "hashed").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn prepare_produces_title_image_label_and_log() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("src.txt"),
        "Pool was warm. Bar was loud.\nLobby smelled nice.\nNo title here.\n",
    )
    .unwrap();
    fs::write(dir.path().join("tgt.txt"), "warm pool\nnice lobby\n").unwrap();
    fs::write(dir.path().join("vocab.txt"), "<pad>\n<unk>\npool\nwarm\n").unwrap();

    oracle_prep()
        .current_dir(dir.path())
        .args([
            "prepare", "-i", "src.txt", "-t", "tgt.txt", "-v", "vocab.txt", "-d", "test", "-k",
            "1",
        ])
        .assert()
        .success();

    let title = fs::read_to_string(dir.path().join("usp-test.title")).unwrap();
    assert_eq!(title.matches("usp-").count(), 2);
    assert!(dir.path().join("usp-test.image").is_file());
    let labels = fs::read_to_string(dir.path().join("usp-test.label.singleoracle")).unwrap();
    let label_lines: Vec<&str> = labels.lines().filter(|l| !l.starts_with("usp-")).collect();
    assert_eq!(label_lines, vec!["1 0", "", "1", ""]);
    let log = fs::read_to_string(dir.path().join("usp-test.log.txt")).unwrap();
    assert!(log.contains("line 2 is greater than target length 1"));
}

#[test]
fn prepare_rejects_missing_inputs_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("src.txt"), "text\n").unwrap();

    oracle_prep()
        .current_dir(dir.path())
        .args([
            "prepare", "-i", "src.txt", "-t", "missing.txt", "-v", "vocab.txt", "-d", "test",
        ])
        .assert()
        .failure();

    let produced: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(produced, vec!["src.txt"]);
}

#[test]
fn map_dir_mode_requires_input_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("vocab.txt"), "<pad>\n<unk>\n").unwrap();

    oracle_prep()
        .current_dir(dir.path())
        .args(["map", "-v", "vocab.txt", "-m", "dir"])
        .assert()
        .failure();

    let produced: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(produced, vec!["vocab.txt"]);
}

#[test]
fn map_output_mode_rejects_titles_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("vocab.txt"), "<pad>\n<unk>\nclean\n").unwrap();
    fs::write(dir.path().join("ids.txt"), "2\n").unwrap();
    fs::write(dir.path().join("usp-x.title"), "usp-a\n2\n\n").unwrap();

    oracle_prep()
        .current_dir(dir.path())
        .args([
            "map", "-v", "vocab.txt", "-m", "output", "-o", "ids.txt", "-t", "usp-x.title",
        ])
        .assert()
        .failure();

    assert!(!dir.path().join("converted").exists());
}

#[test]
fn map_interleaves_title_ids_from_title_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("corpus.txt"), "clean pool .\nwarm spa\nextra line\n").unwrap();
    fs::write(dir.path().join("vocab.txt"), "<pad>\n<unk>\nclean\npool\n.\n").unwrap();
    fs::write(dir.path().join("usp-x.title"), "usp-a\n5 2\n\nusp-b\n4 3\n\n").unwrap();

    oracle_prep()
        .current_dir(dir.path())
        .args([
            "map", "-v", "vocab.txt", "-m", "dir", "-i", "corpus.txt", "-t", "usp-x.title",
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("converted/word-id-corpus.txt")).unwrap(),
        "usp-a\n2 3 4\n\nusp-b\n1 1\n\n"
    );
}

#[test]
fn map_round_trips_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir(&corpus).unwrap();
    fs::write(corpus.join("reviews.txt"), "clean pool .\n").unwrap();
    fs::write(dir.path().join("vocab.txt"), "<pad>\n<unk>\nclean\npool\n.\n").unwrap();

    oracle_prep()
        .current_dir(dir.path())
        .args(["map", "-v", "vocab.txt", "-m", "dir", "-i", "corpus"])
        .assert()
        .success();
    let encoded = corpus.join("converted/word-id-reviews.txt");
    assert_eq!(fs::read_to_string(&encoded).unwrap(), "2 3 4\n\n");

    oracle_prep()
        .current_dir(dir.path())
        .args(["map", "-v", "vocab.txt", "-m", "output", "-o"])
        .arg(&encoded)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(corpus.join("converted/vocab-output.txt")).unwrap(),
        "clean pool .\n"
    );
}

#[test]
fn split_writes_sentence_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hotel.txt"), "Nice view. Small bed.\n").unwrap();
    fs::create_dir(dir.path().join("out")).unwrap();

    oracle_prep()
        .current_dir(dir.path())
        .args(["split", "-f", "hotel.txt", "-o", "out"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("out/hotel/0-1-hotel.txt")).unwrap(),
        "Small bed ."
    );
}
