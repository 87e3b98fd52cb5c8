//! Error types for assembling, decoding, and executing programs. Every error is fatal to the
//! run that produced it.

use thiserror::Error;

/// Errors raised while turning assembly text into instructions.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum AssemblyError {
  #[error("Error on line {line}: unknown command `{command}`")]
  UnknownCommand {
    line: usize,
    command: String
  },

  #[error("Error on line {line}: {reason}: `{text}`")]
  MalformedLine {
    line: usize,
    text: String,
    reason: String
  },
}

/// Errors raised while reading instruction words out of a byte stream.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum DecodeError {
  #[error("Unknown opcode {opcode} in the word at byte offset {offset}")]
  UnknownOpcode {
    opcode: u8,
    offset: usize
  },

  #[error("Instruction stream of {len} bytes is not a whole number of 8 byte words")]
  TruncatedStream {
    len: usize
  },
}

/// Errors raised by the virtual machine.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ExecutionError {
  #[error(transparent)]
  Decode(#[from] DecodeError),

  /// `index` is the ordinal of the offending instruction in the stream.
  #[error("Instruction {index} addresses memory[{address}], which is outside of 0..{size}")]
  AddressOutOfRange {
    index: usize,
    address: i64,
    size: usize
  },

  #[error("Invalid memory range {start}:{end}; expected start <= end <= {size}")]
  InvalidRange {
    start: usize,
    end: usize,
    size: usize
  },

  #[error("Malformed memory range `{0}`; expected `start:end`")]
  MalformedRange(String),
}
