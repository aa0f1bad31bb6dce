//! UTF-8 decoding across chunk boundaries.

/// Longest possible incomplete UTF-8 tail (a 4-byte sequence missing its last byte).
const MAX_INCOMPLETE_TAIL: usize = 3;

/// Decodes a chunked byte stream as UTF-8.
///
/// A multi-byte sequence cut off at the end of a chunk is held back and
/// completed by the next chunk. Bytes that can never form a valid sequence
/// are replaced with U+FFFD.
#[derive(Debug, Default, Clone)]
pub struct Utf8Accumulator {
    pending: Vec<u8>,
}

impl Utf8Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk` (prefixed by any carried-over bytes) and append the
    /// text to `out`.
    pub fn decode(&mut self, chunk: &[u8], out: &mut String) {
        if self.pending.is_empty() {
            let rest = decode_into(chunk, out);
            self.pending.extend_from_slice(rest);
            return;
        }

        let mut joined = std::mem::take(&mut self.pending);
        joined.extend_from_slice(chunk);
        let rest = decode_into(&joined, out);
        self.pending.extend_from_slice(rest);
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop held-back bytes, returning how many there were.
    pub fn discard(&mut self) -> usize {
        let len = self.pending.len();
        self.pending.clear();
        len
    }
}

/// Append the decodable part of `bytes` to `out` and return the incomplete tail.
fn decode_into<'a>(bytes: &'a [u8], out: &mut String) -> &'a [u8] {
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                return &[];
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                // Borrowed, since `valid_up_to` bounds a well-formed prefix
                out.push_str(&String::from_utf8_lossy(valid));
                match err.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    }
                    None => {
                        debug_assert!(after.len() <= MAX_INCOMPLETE_TAIL);
                        return after;
                    }
                }
            }
        }
    }
}
