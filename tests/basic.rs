use assert_cmd::Command;
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

static SAMPLES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        (
            "a.eml",
            "From: Alice <alice@example.com>\n\
             Date: Thu, 29 Sep 2016 23:18:26 +0000\n\
             Subject: Hi\n\
             \n\
             Hello\n",
        ),
        (
            "b.eml",
            "From: bob@example.com\n\
             Subject: Re: Hi\n\
             \n\
             From here on it is all body.\n\
             Bye.\n",
        ),
    ]
});

fn setup_input_dir(samples: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in samples {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn run_import(input: &Path, output: &Path) -> Output {
    Command::cargo_bin(env!("CARGO_PKG_NAME"))
        .unwrap()
        .arg("--quiet")
        .arg("--in")
        .arg(input)
        .arg("--out")
        .arg(output)
        .output()
        .unwrap()
}

fn message_count(mbox: &str) -> usize {
    // Body lines colliding with the marker are escaped, so every
    // `From ` line left in the file is a message boundary.
    mbox.lines().filter(|line| line.starts_with("From ")).count()
}

#[test]
fn imports_all_matching_files() {
    let input = setup_input_dir(&SAMPLES);
    fs::write(input.path().join("notes.txt"), "not a mail").unwrap();
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("archive.mbox");

    let output = run_import(input.path(), &out_path);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported emails into"));

    let mbox = fs::read_to_string(&out_path).unwrap();
    assert_eq!(message_count(&mbox), 2);
    assert!(mbox.contains("Subject: Hi\n"));
    assert!(mbox.contains("Hello\n"));
    assert!(mbox.contains("Bye.\n"));
    assert!(!mbox.contains("not a mail"));
}

#[test]
fn marker_line_is_synthesized_from_headers() {
    let input = setup_input_dir(&SAMPLES[..1]);
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("archive.mbox");

    let output = run_import(input.path(), &out_path);
    assert!(output.status.success());

    let mbox = fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        mbox.lines().next(),
        Some("From alice@example.com Thu Sep 29 23:18:26 2016")
    );
}

#[test]
fn body_from_lines_are_escaped() {
    let input = setup_input_dir(&SAMPLES[1..]);
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("archive.mbox");

    let output = run_import(input.path(), &out_path);
    assert!(output.status.success());

    let mbox = fs::read_to_string(&out_path).unwrap();
    assert_eq!(message_count(&mbox), 1);
    assert!(mbox.contains("\n>From here on it is all body.\n"));
}

#[test]
fn broken_files_are_skipped_with_a_diagnostic() {
    let input = setup_input_dir(&SAMPLES[..1]);
    // Not decodable as UTF-8.
    fs::write(input.path().join("c.eml"), [0xff, 0xfe, 0x00, 0x01]).unwrap();
    // Decodable but not a message.
    fs::write(input.path().join("d.eml"), "no header block here\n\n").unwrap();
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("archive.mbox");

    let output = run_import(input.path(), &out_path);
    // Per-file failures do not fail the run.
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to import c.eml"));
    assert!(stderr.contains("Failed to import d.eml"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported emails into"));

    let mbox = fs::read_to_string(&out_path).unwrap();
    assert_eq!(message_count(&mbox), 1);
    assert!(mbox.contains("Subject: Hi\n"));
}

#[test]
fn missing_input_dir_is_fatal() {
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("archive.mbox");

    let output = run_import(&out_dir.path().join("no-such-dir"), &out_path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
    // The store was never touched.
    assert!(!out_path.exists());
}

#[test]
fn rerun_appends_duplicates() {
    let input = setup_input_dir(&SAMPLES);
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("archive.mbox");

    assert!(run_import(input.path(), &out_path).status.success());
    assert!(run_import(input.path(), &out_path).status.success());

    let mbox = fs::read_to_string(&out_path).unwrap();
    assert_eq!(message_count(&mbox), 4);
}

#[test]
fn existing_output_must_be_a_mailbox() {
    let input = setup_input_dir(&SAMPLES);
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("archive.mbox");
    fs::write(&out_path, "definitely not an mbox\n").unwrap();

    let output = run_import(input.path(), &out_path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not look like an mbox"));
    // The existing content is left alone.
    assert_eq!(
        fs::read_to_string(&out_path).unwrap(),
        "definitely not an mbox\n"
    );
}
