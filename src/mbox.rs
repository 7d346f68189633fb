use crate::message::Message;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

const FROM_MARKER: &str = "From ";

/// The aggregate mbox store, held open for appending for the whole run.
///
/// Messages are written in the traditional mboxo convention: a
/// `From <sender> <timestamp>` marker line, the header block and body
/// verbatim with `From `-lines escaped by a `>` prefix, and a blank
/// line between consecutive messages.
#[derive(Debug)]
pub struct Mailbox {
    writer: BufWriter<File>,
    // Separator owed before the next message, if any. Repairs a missing
    // trailing newline on pre-existing content.
    separator: Option<&'static str>,
}

impl Mailbox {
    /// Opens `path` for appending, creating the file if absent. An
    /// existing non-empty file must already look like an mbox, i.e.
    /// start with a `From ` marker line; anything else is refused
    /// rather than silently corrupted.
    pub fn open_append(path: &Path) -> io::Result<Mailbox> {
        let mut separator = None;
        match File::open(path) {
            Ok(mut existing) => {
                if existing.metadata()?.len() > 0 {
                    let mut start = [0u8; FROM_MARKER.len()];
                    let looks_like_mbox = existing
                        .read_exact(&mut start)
                        .map(|_| start[..] == *FROM_MARKER.as_bytes())
                        .unwrap_or(false);
                    if !looks_like_mbox {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!(
                                "'{}' exists but does not look like an mbox file",
                                path.display()
                            ),
                        ));
                    }
                    existing.seek(SeekFrom::End(-1))?;
                    let mut last = [0u8; 1];
                    existing.read_exact(&mut last)?;
                    separator = Some(if last[0] == b'\n' { "\n" } else { "\n\n" });
                }
            }
            Err(ref err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Mailbox {
            writer: BufWriter::new(file),
            separator,
        })
    }

    /// Appends one message to the store.
    pub fn append(&mut self, message: &Message) -> io::Result<()> {
        if let Some(gap) = self.separator.take() {
            self.writer.write_all(gap.as_bytes())?;
        }
        writeln!(self.writer, "{}", marker_line(message))?;

        let mut text = String::new();
        for (name, value) in message.headers() {
            text.push_str(name);
            text.push(':');
            text.push_str(value);
            text.push('\n');
        }
        text.push('\n');
        text.push_str(message.body());
        if !text.ends_with('\n') {
            text.push('\n');
        }
        write_mangled(&mut self.writer, &text)?;

        self.separator = Some("\n");
        Ok(())
    }

    /// Flushes buffered writes and syncs the file to disk.
    pub fn close(self) -> io::Result<()> {
        let file = self.writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()
    }
}

/// Builds the marker line for a message. A Unix-from line carried over
/// from the source file wins; otherwise one is synthesized from the
/// message's sender and Date header, in the conventional UTC asctime
/// form. Messages without a usable Date get the current time, matching
/// what mail clients do when they import.
fn marker_line(message: &Message) -> String {
    if let Some(envelope) = message.envelope() {
        return format!("{}{}", FROM_MARKER, envelope);
    }
    let sender = message.envelope_sender().unwrap_or("MAILER-DAEMON");
    let date = message
        .date()
        .map(|dt| dt.naive_utc())
        .unwrap_or_else(|| Utc::now().naive_utc());
    format!(
        "{}{} {}",
        FROM_MARKER,
        sender,
        date.format("%a %b %e %H:%M:%S %Y")
    )
}

/// Writes `text` with every line that starts with the marker token
/// escaped by a `>` prefix, so the line cannot be mistaken for a
/// message boundary when the mailbox is parsed back.
fn write_mangled(out: &mut impl Write, text: &str) -> io::Result<()> {
    let mut first = true;
    for line in text.split('\n') {
        if !first {
            out.write_all(b"\n")?;
        }
        if line.starts_with(FROM_MARKER) {
            out.write_all(b">")?;
        }
        out.write_all(line.as_bytes())?;
        first = false;
    }
    Ok(())
}
