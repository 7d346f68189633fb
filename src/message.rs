use crate::datetime;
use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {0} is not a valid 'Name: value' header line")]
    MalformedHeader(usize),
    #[error("line {0} continues a header that was never started")]
    OrphanContinuation(usize),
    #[error("message has no header block")]
    Empty,
}

#[derive(Debug)]
struct Header {
    name: String,
    // Raw text after the colon, folded lines joined with '\n'. Kept
    // verbatim so the header block can be re-emitted byte for byte.
    value: String,
}

/// One mail message split into its header block and body.
///
/// Headers are an ordered list of (name, raw value) pairs; the body is
/// the verbatim text after the first blank line. Line endings are
/// normalized to LF when parsing.
#[derive(Debug)]
pub struct Message {
    envelope: Option<String>,
    headers: Vec<Header>,
    body: String,
}

fn is_header_name(name: &str) -> bool {
    // RFC 5322 field names are printable US-ASCII excluding the colon.
    !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b) && b != b':')
}

fn split_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    }
}

impl Message {
    pub fn parse(text: &str) -> Result<Message, ParseError> {
        let text: Cow<str> = if text.contains('\r') {
            Cow::Owned(text.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(text)
        };

        // Some exporters leave the mbox envelope line in the file; take
        // it over instead of treating it as a (malformed) header.
        let (envelope, rest) = match text.strip_prefix("From ") {
            Some(tail) => {
                let (line, rest) = split_line(tail);
                (Some(line.to_string()), rest)
            }
            None => (None, &text[..]),
        };

        let (head, body) = match rest.find("\n\n") {
            Some(pos) => (&rest[..pos], &rest[pos + 2..]),
            None => (rest.trim_end_matches('\n'), ""),
        };
        if head.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut headers: Vec<Header> = vec![];
        for (idx, line) in head.split('\n').enumerate() {
            let lineno = idx + 1;
            if line.starts_with(' ') || line.starts_with('\t') {
                match headers.last_mut() {
                    Some(header) => {
                        header.value.push('\n');
                        header.value.push_str(line);
                    }
                    None => return Err(ParseError::OrphanContinuation(lineno)),
                }
            } else {
                match line.find(':') {
                    Some(pos) if is_header_name(&line[..pos]) => headers.push(Header {
                        name: line[..pos].to_string(),
                        value: line[pos + 1..].to_string(),
                    }),
                    _ => return Err(ParseError::MalformedHeader(lineno)),
                }
            }
        }

        Ok(Message {
            envelope,
            headers,
            body: body.to_string(),
        })
    }

    /// The Unix-from line carried by the source file, without the
    /// leading `From ` token.
    pub fn envelope(&self) -> Option<&str> {
        self.envelope.as_deref().filter(|line| !line.trim().is_empty())
    }

    /// Header (name, raw value) pairs in original order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|header| (header.name.as_str(), header.value.as_str()))
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Trimmed value of the first header with the given name,
    /// compared ASCII case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.trim())
    }

    /// The address to put on the synthesized marker line: Return-Path
    /// when present, otherwise the From header's addr-spec.
    pub fn envelope_sender(&self) -> Option<&str> {
        self.get("Return-Path")
            .and_then(address_of)
            .or_else(|| self.get("From").and_then(address_of))
    }

    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.get("Date")
            .and_then(|value| datetime::parse_datetime(value.as_bytes()))
    }
}

fn address_of(value: &str) -> Option<&str> {
    let value = value.trim();
    let addr = match (value.find('<'), value.rfind('>')) {
        (Some(start), Some(end)) if start < end => &value[start + 1..end],
        _ => value,
    };
    let addr = addr.trim();
    if addr.is_empty() || addr.contains(char::is_whitespace) {
        None
    } else {
        Some(addr)
    }
}
