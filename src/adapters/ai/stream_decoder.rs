//! Incremental decoder for OpenAI-style `text/event-stream` completions.
//!
//! Bytes are buffered and split on `\n` before UTF-8 decoding. A multi-byte
//! sequence never contains `0x0A`, so a character split across two chunks is
//! reassembled before any line containing it is decoded.

use crate::domain::DomainError;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

const DATA_PREFIX: &str = "data: ";
const DONE_TOKEN: &str = "[DONE]";

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Accumulates `choices[0].delta.content` across an event stream.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    text: String,
    done: bool,
    skipped: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk. Returns the content appended by the complete
    /// lines it finished (empty when the chunk only extended a partial line).
    pub fn push(&mut self, chunk: &[u8]) -> String {
        if self.done {
            return String::new();
        }
        self.pending.extend_from_slice(chunk);

        let mut appended = String::new();
        while !self.done {
            let Some(nl) = self.pending.iter().position(|&b| b == b'\n') else {
                break;
            };
            let rest = self.pending.split_off(nl + 1);
            let mut line_bytes = std::mem::replace(&mut self.pending, rest);
            line_bytes.pop(); // the \n
            let line = String::from_utf8_lossy(&line_bytes);
            if let Some(delta) = self.process_line(&line) {
                appended.push_str(&delta);
            }
        }
        appended
    }

    /// Transport finished. Processes a trailing line that had no newline.
    pub fn finish(&mut self) -> String {
        if self.done || self.pending.is_empty() {
            self.pending.clear();
            return String::new();
        }
        let line_bytes = std::mem::take(&mut self.pending);
        let line = String::from_utf8_lossy(&line_bytes);
        self.process_line(&line).unwrap_or_default()
    }

    /// True once `[DONE]` was seen; later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Data lines that were not valid JSON (partial or malformed fragments).
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    fn process_line(&mut self, raw: &str) -> Option<String> {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() || line.starts_with(':') {
            return None;
        }
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();
        if payload == DONE_TOKEN {
            self.done = true;
            return None;
        }

        match serde_json::from_str::<StreamChunk>(payload) {
            Ok(chunk) => {
                let content = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta)
                    .and_then(|d| d.content)?;
                self.text.push_str(&content);
                Some(content)
            }
            Err(e) => {
                self.skipped += 1;
                debug!(error = %e, line_len = payload.len(), "skipping unparsable stream line");
                None
            }
        }
    }
}

/// Drive a [`StreamDecoder`] over a byte stream until `[DONE]` or end of transport.
/// `on_delta` sees each piece of content as it arrives. Transport errors are fatal.
pub async fn decode_stream<S, F>(mut stream: S, mut on_delta: F) -> Result<String, DomainError>
where
    S: Stream<Item = Result<Bytes, DomainError>> + Unpin,
    F: FnMut(&str),
{
    let mut decoder = StreamDecoder::new();
    while let Some(chunk) = stream.next().await {
        let delta = decoder.push(&chunk?);
        if !delta.is_empty() {
            on_delta(&delta);
        }
        if decoder.is_done() {
            break;
        }
    }
    let tail = decoder.finish();
    if !tail.is_empty() {
        on_delta(&tail);
    }
    if decoder.skipped_lines() > 0 {
        debug!(skipped = decoder.skipped_lines(), "stream lines skipped");
    }
    Ok(decoder.into_text())
}
