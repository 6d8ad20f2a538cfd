/// Incremental UTF-8 decoder plus newline framer
///
/// Bytes go in as they arrive from the socket; complete lines come out.
/// A multi-byte character split across reads is held until its remaining
/// bytes arrive, and the trailing partial line stays buffered.
pub struct LineBuffer {
    text: String,
    /// Start of the unread text; consumed lines are compacted on `extend`
    read: usize,
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            read: 0,
            pending: Vec::with_capacity(4),
        }
    }

    /// Decode and append a chunk of bytes
    pub fn extend(&mut self, bytes: &[u8]) {
        if self.read > 0 {
            self.text.drain(..self.read);
            self.read = 0;
        }
        self.pending.extend_from_slice(bytes);

        let mut start = 0;
        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    start = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_up_to = start + e.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&self.pending[start..valid_up_to]) {
                        self.text.push_str(valid);
                    }
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            start = valid_up_to;
                            break;
                        }
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            start = valid_up_to + len;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
    }

    /// Next complete line, trimmed; `None` until a `\n` has been seen
    pub fn next_line(&mut self) -> Option<String> {
        let unread = &self.text[self.read..];
        let newline_pos = unread.find('\n')?;
        let line = unread[..newline_pos].trim().to_string();
        self.read += newline_pos + 1;
        Some(line)
    }

    /// Text still waiting for its newline
    pub fn remainder(&self) -> &str {
        &self.text[self.read..]
    }

    /// Drop everything buffered, including undecoded bytes
    pub fn clear(&mut self) {
        self.text.clear();
        self.read = 0;
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.text.len() - self.read + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read == self.text.len() && self.pending.is_empty()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_capacity(4096)
    }
}
