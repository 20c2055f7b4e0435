//! Transport stream handling
//!
//! Turns a streaming HTTP response body into an ordered sequence of text
//! deltas: bytes arrive in arbitrary chunks, `LineReader` reassembles them
//! into lines, and `DeltaStream` runs each line through the selected
//! adapter's extractor, dropping empty extractions.

use crate::errors::{ChatError, Result};
use crate::providers::WireAdapter;
use futures_util::StreamExt;
use reqwest::{Client, Request, Response};
use std::collections::VecDeque;

/// Incremental line splitter over a chunked byte stream.
///
/// Chunk boundaries carry no meaning; a line may span many chunks and a
/// chunk may hold many lines. CR before LF is stripped.
#[derive(Debug, Default)]
pub struct LineReader {
    buf: Vec<u8>,
}

impl LineReader {
    pub fn new() -> Self {
        LineReader { buf: Vec::new() }
    }

    /// Append one transport chunk, returning every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Flush a trailing unterminated line at EOF
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(line)
    }
}

/// Execute a built request, mapping error statuses to a fatal typed error
/// with the body echoed (the original printed it before exiting).
pub async fn send(client: &Client, request: Request) -> Result<Response> {
    let response = client.execute(request).await?;

    let status = response.status();
    if status.as_u16() >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(ChatError::Status { status: status.as_u16(), body });
    }

    Ok(response)
}

/// Ordered stream of non-empty text deltas for one response
pub struct DeltaStream<'a> {
    response: Response,
    adapter: &'a dyn WireAdapter,
    reader: LineReader,
    pending: VecDeque<String>,
    eof: bool,
}

impl<'a> DeltaStream<'a> {
    pub fn new(response: Response, adapter: &'a dyn WireAdapter) -> Self {
        DeltaStream {
            response,
            adapter,
            reader: LineReader::new(),
            pending: VecDeque::new(),
            eof: false,
        }
    }

    /// Next delta in arrival order, or `None` at end of stream.
    ///
    /// Lines whose extraction comes back empty are skipped here so the
    /// renderer only ever sees real fragments.
    pub async fn next(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                let delta = self.adapter.extract_delta(&line);
                if !delta.is_empty() {
                    return Ok(Some(delta));
                }
                continue;
            }

            if self.eof {
                return Ok(None);
            }

            match self.response.chunk().await? {
                Some(chunk) => {
                    self.pending.extend(self.reader.push(&chunk));
                }
                None => {
                    self.eof = true;
                    if let Some(line) = self.reader.finish() {
                        self.pending.push_back(line);
                    }
                }
            }
        }
    }

    /// Drain the whole stream, concatenating every delta
    pub async fn collect_text(&mut self) -> Result<String> {
        let mut full = String::new();
        while let Some(delta) = self.next().await? {
            full.push_str(&delta);
        }
        Ok(full)
    }
}

// chunk() is the natural fit above, but bytes_stream-based consumers (the
// image downloader) go through this helper instead.
pub async fn read_body(response: Response) -> Result<Vec<u8>> {
    let mut stream = response.bytes_stream();
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}
