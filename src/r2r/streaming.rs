//! Incremental text decoding for streamed R2R responses.
//!
//! Reads a response as a byte stream and yields UTF-8 text fragments as they
//! arrive. Multi-byte sequences split across chunk boundaries are held back
//! until the rest of the sequence arrives; invalid bytes become U+FFFD.

use std::fmt::Display;

use futures::stream::{self, Stream, StreamExt};

use super::errors::R2rError;

// ─── Decoder ─────────────────────────────────────────────────────────────────

/// Stateful UTF-8 decoder that tolerates sequences split across chunks.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Feed a chunk and return everything that can be decoded so far.
    fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the tail; wait for more bytes
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush whatever is left once the stream has ended.
    fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

// ─── Streams ─────────────────────────────────────────────────────────────────

/// Turn a byte stream into a stream of decoded text fragments.
///
/// Empty fragments (a chunk that only carried part of a code point) are not
/// emitted. A read error ends the stream after yielding `R2rError::Stream`.
pub fn decode_text_stream<S, B, E>(source: S) -> impl Stream<Item = Result<String, R2rError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    stream::unfold(
        (Box::pin(source), Utf8Decoder::default(), false),
        |(mut source, mut decoder, done)| async move {
            if done {
                return None;
            }
            loop {
                match source.next().await {
                    Some(Ok(bytes)) => {
                        let text = decoder.push(bytes.as_ref());
                        if !text.is_empty() {
                            return Some((Ok(text), (source, decoder, false)));
                        }
                    }
                    Some(Err(e)) => {
                        return Some((
                            Err(R2rError::Stream {
                                reason: format!("stream read error: {e}"),
                            }),
                            (source, decoder, true),
                        ));
                    }
                    None => {
                        let rest = decoder.finish();
                        if rest.is_empty() {
                            return None;
                        }
                        return Some((Ok(rest), (source, decoder, true)));
                    }
                }
            }
        },
    )
}

/// Drain a fragment stream into one string, stopping at the first error.
pub async fn collect_text<S>(fragments: S) -> Result<String, R2rError>
where
    S: Stream<Item = Result<String, R2rError>>,
{
    let mut fragments = Box::pin(fragments);
    let mut full = String::new();
    while let Some(fragment) = fragments.next().await {
        full.push_str(&fragment?);
    }
    Ok(full)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
