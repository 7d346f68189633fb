use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const MESSAGE_SUFFIX: &str = ".eml";

fn has_message_suffix(name: &str) -> bool {
    // Case-sensitive on purpose: "a.EML" is not a message file.
    name.ends_with(MESSAGE_SUFFIX)
}

/// Lists the message files of `dir` in whatever order the platform's
/// directory iteration yields them. The order is deliberately not
/// normalized; the mailbox keeps messages in listing order.
///
/// Entries that are not regular files, or whose name does not end with
/// `.eml`, are skipped.
pub fn list_message_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if has_message_suffix(name) => files.push(path),
            _ => {}
        }
    }
    Ok(files)
}
