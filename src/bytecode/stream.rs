/*!
  Reads instructions out of a binary program.

  A program is a sequence of little-endian instruction words with no header, footer, or length
  prefix. `InstructionStream` walks it with a byte cursor, decoding one word per call to `next`.
  The stream is lazy and can only be consumed once.
*/

use super::{try_decode_instruction, Instruction, Word, WORD_SIZE};
use crate::error::DecodeError;

#[derive(Clone, Debug)]
pub struct InstructionStream<'a> {
  bytes  : &'a [u8],
  cursor : usize, // Byte offset of the next word
}

impl<'a> InstructionStream<'a> {
  /// Fails with `TruncatedStream` unless `bytes` holds a whole number of words.
  pub fn new(bytes: &'a [u8]) -> Result<InstructionStream<'a>, DecodeError> {
    if bytes.len() % WORD_SIZE != 0 {
      return Err(DecodeError::TruncatedStream { len: bytes.len() });
    }
    Ok(InstructionStream { bytes, cursor: 0 })
  }

  /// The byte offset of the next word to be read.
  pub fn position(&self) -> usize {
    self.cursor
  }

  pub fn is_eof(&self) -> bool {
    self.cursor >= self.bytes.len()
  }

  fn read_word(&mut self) -> Option<Word> {
    let end = self.cursor + WORD_SIZE;
    let bytes: [u8; WORD_SIZE] = self.bytes.get(self.cursor..end)?.try_into().ok()?;
    self.cursor = end;
    Some(Word::from_le_bytes(bytes))
  }
}

impl<'a> Iterator for InstructionStream<'a> {
  type Item = Result<Instruction, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.cursor;
    let word = self.read_word()?;
    Some(try_decode_instruction(word, offset))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = (self.bytes.len() - self.cursor) / WORD_SIZE;
    (remaining, Some(remaining))
  }
}
