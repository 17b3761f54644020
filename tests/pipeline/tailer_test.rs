//! Incremental tailing over real files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use lobby_info::tailer::{LogPosition, LogTailer};

const HEADER: &str = "\
Log file open, 03/01/21 10:00:00
LogInit: Base Directory: C:/Games/DeadByDaylight/Binaries/Win64/
LogInit: Build: ++DeadByDaylight+Live
";

fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir should be created: {err}"),
    }
}

fn write(path: &Path, text: &str) {
    if let Err(err) = fs::write(path, text) {
        panic!("log should be written: {err}");
    }
}

fn append(path: &Path, text: &str) {
    let mut file = match OpenOptions::new().append(true).open(path) {
        Ok(file) => file,
        Err(err) => panic!("log should open for append: {err}"),
    };
    if let Err(err) = file.write_all(text.as_bytes()) {
        panic!("log should be appended: {err}");
    }
}

fn read(tailer: &LogTailer) -> Vec<String> {
    match tailer.read_new_lines() {
        Ok(lines) => lines,
        Err(err) => panic!("read should succeed: {err}"),
    }
}

fn expected_base() -> PathBuf {
    PathBuf::from(format!("C:{s}Games{s}DeadByDaylight", s = MAIN_SEPARATOR))
}

#[test]
fn first_read_only_scans() {
    let dir = temp_dir();
    let path = dir.path().join("DeadByDaylight.log");
    write(&path, HEADER);

    let tailer = LogTailer::new(path);
    assert_eq!(tailer.position(), LogPosition::Uninitialized);
    assert_eq!(tailer.position().as_raw(), -1);

    assert!(read(&tailer).is_empty());
    assert_eq!(tailer.position(), LogPosition::Consumed(3));
    assert_eq!(tailer.base_directory(), Some(expected_base()));
}

#[test]
fn appended_lines_are_returned_once() {
    let dir = temp_dir();
    let path = dir.path().join("DeadByDaylight.log");
    write(&path, HEADER);

    let tailer = LogTailer::new(path.clone());
    let _ = read(&tailer);

    append(&path, "LogCustomization: --> TR_Head01\nLogCustomization: --> TR_Body01\n");
    assert_eq!(
        read(&tailer),
        vec![
            "LogCustomization: --> TR_Head01".to_owned(),
            "LogCustomization: --> TR_Body01".to_owned()
        ]
    );
    assert_eq!(tailer.position(), LogPosition::Consumed(5));

    assert!(read(&tailer).is_empty());

    append(&path, "LogCustomization: --> TR_W01\n");
    assert_eq!(read(&tailer), vec!["LogCustomization: --> TR_W01".to_owned()]);
}

#[test]
fn partial_line_waits_for_newline() {
    let dir = temp_dir();
    let path = dir.path().join("DeadByDaylight.log");
    write(&path, HEADER);

    let tailer = LogTailer::new(path.clone());
    let _ = read(&tailer);

    append(&path, "LogCustomization: --> TR_");
    assert!(read(&tailer).is_empty());

    append(&path, "Head01\r\n");
    assert_eq!(read(&tailer), vec!["LogCustomization: --> TR_Head01".to_owned()]);
}

#[test]
fn reset_rescans_recreated_file() {
    let dir = temp_dir();
    let path = dir.path().join("DeadByDaylight.log");
    write(&path, HEADER);

    let tailer = LogTailer::new(path.clone());
    let _ = read(&tailer);
    append(&path, "line a\n");
    let _ = read(&tailer);

    write(
        &path,
        "LogInit: Base Directory: D:/DBD/Binaries/Win64/\nold line\n",
    );
    tailer.reset();
    assert_eq!(tailer.position(), LogPosition::Uninitialized);
    assert!(tailer.base_directory().is_none());

    assert!(read(&tailer).is_empty());
    assert_eq!(tailer.position(), LogPosition::Consumed(2));
    assert_eq!(
        tailer.base_directory(),
        Some(PathBuf::from(format!("D:{}DBD", MAIN_SEPARATOR)))
    );

    append(&path, "new line\n");
    assert_eq!(read(&tailer), vec!["new line".to_owned()]);
}

#[test]
fn truncation_is_treated_as_new_instance() {
    let dir = temp_dir();
    let path = dir.path().join("DeadByDaylight.log");
    write(&path, HEADER);

    let tailer = LogTailer::new(path.clone());
    let _ = read(&tailer);

    write(&path, "short\n");
    assert!(read(&tailer).is_empty());
    assert_eq!(tailer.position(), LogPosition::Consumed(1));
    assert!(tailer.base_directory().is_none());
}

#[test]
fn missing_file_is_an_error() {
    let dir = temp_dir();
    let tailer = LogTailer::new(dir.path().join("DeadByDaylight.log"));
    assert!(tailer.read_new_lines().is_err());
    assert_eq!(tailer.position(), LogPosition::Uninitialized);
}

#[test]
fn replay_from_start_matches_incremental_reads() {
    let dir = temp_dir();
    let path = dir.path().join("DeadByDaylight.log");
    write(&path, HEADER);

    let live = LogTailer::new(path.clone());
    let _ = read(&live);

    let mut seen = Vec::new();
    for chunk in ["a\n", "b\nc\n", "d\n"] {
        append(&path, chunk);
        seen.extend(read(&live));
    }

    let replay = LogTailer::from_start(path);
    let all = read(&replay);

    let header_lines = HEADER.lines().count();
    assert_eq!(all.len(), header_lines.saturating_add(seen.len()));
    assert_eq!(&all[header_lines..], seen.as_slice());
    assert_eq!(seen, vec!["a", "b", "c", "d"]);
}

#[test]
fn remaining_lines_include_unterminated_tail() {
    let dir = temp_dir();
    let path = dir.path().join("saved.log");
    write(&path, "first\nsecond");

    let live = LogTailer::from_start(path.clone());
    assert_eq!(read(&live), vec!["first".to_owned()]);

    let saved = LogTailer::from_start(path);
    let lines = match saved.read_remaining_lines() {
        Ok(lines) => lines,
        Err(err) => panic!("read should succeed: {err}"),
    };
    assert_eq!(lines, vec!["first".to_owned(), "second".to_owned()]);
    assert_eq!(saved.position(), LogPosition::Consumed(2));
}
