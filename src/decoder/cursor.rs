use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

const CHUNK_SIZE: usize = 8 * 1024;

/// Streaming reader with a small look-ahead buffer and an exact byte position
///
/// Reads never fail on a short source: they return however many bytes were
/// available, which is how the decoder tells truncation from end of stream.
/// Only errors from the underlying reader are surfaced.
pub struct ByteCursor<R> {
    reader: R,
    lookahead: VecDeque<u8>,
    position: u64,
    exhausted: bool,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, lookahead: VecDeque::with_capacity(CHUNK_SIZE), position: 0, exhausted: false }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    fn fill(&mut self, wanted: usize) -> io::Result<()> {
        let mut chunk = [0u8; CHUNK_SIZE];
        while self.lookahead.len() < wanted && !self.exhausted {
            match self.reader.read(&mut chunk) {
                Ok(0) => self.exhausted = true,
                Ok(n) => self.lookahead.extend(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Returns up to `len` upcoming bytes without consuming them
    pub fn peek(&mut self, len: usize) -> io::Result<&[u8]> {
        self.fill(len)?;
        let available = len.min(self.lookahead.len());
        Ok(&self.lookahead.make_contiguous()[..available])
    }

    /// Consumes up to `len` bytes; fewer are returned only at end of stream
    pub fn take(&mut self, len: usize) -> io::Result<Vec<u8>> {
        self.fill(len)?;
        let available = len.min(self.lookahead.len());
        let bytes: Vec<u8> = self.lookahead.drain(..available).collect();
        self.position += bytes.len() as u64;
        Ok(bytes)
    }

    /// Consumes up to `len` bytes and returns how many were skipped
    pub fn skip(&mut self, len: usize) -> io::Result<u64> {
        self.fill(len)?;
        let available = len.min(self.lookahead.len());
        self.lookahead.drain(..available);
        self.position += available as u64;
        Ok(available as u64)
    }

    pub fn is_at_end(&mut self) -> io::Result<bool> {
        self.fill(1)?;
        Ok(self.lookahead.is_empty())
    }
}
