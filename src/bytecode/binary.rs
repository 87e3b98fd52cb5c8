/*!
  This module is responsible for the encoding and decoding of binary instructions.

  Every instruction is one 64 bit word, most significant bit first:

    [OpCode:4][B:28][C:32]

  `WRITE` further splits the C field into [C':26][D:6].
*/

use super::{Instruction, Operation};
use crate::error::DecodeError;

// If you change this you must also change `encode_instruction` and `try_decode_instruction`.
pub type Word = u64;

/// Size in bytes of one encoded instruction.
pub const WORD_SIZE: usize = 8;

pub const OPCODE_SHIFT: u32 = 60;
pub const OPCODE_MASK: Word = 0xF;
pub const B_SHIFT: u32 = 32;
pub const B_MASK: u32 = 0x0FFF_FFFF;
pub const C_MASK: Word = 0xFFFF_FFFF;
pub const D_BITS: u32 = 6;
pub const D_MASK: u32 = 0x3F;
pub const C_PRIME_MASK: u32 = 0x03FF_FFFF;

/**
  Encodes the instruction into bytecode. Operands wider than their field are truncated to the
  field width.
*/
pub fn encode_instruction(instruction: &Instruction) -> Word {
  // [OpCode:4][B:28][C:32]
  ((instruction.operation.code() as Word) << OPCODE_SHIFT)
    | (((instruction.b & B_MASK) as Word) << B_SHIFT)
    | instruction.c_field() as Word
}

/**
  Unpacks the fields of `word`. The result has the same `Instruction` shape the assembler
  produces, so `WRITE` comes back with C' and D separated.

  The `offset` of the word in its stream is only used to annotate errors.
*/
pub fn try_decode_instruction(word: Word, offset: usize) -> Result<Instruction, DecodeError> {
  let opcode = ((word >> OPCODE_SHIFT) & OPCODE_MASK) as u8;
  let operation = Operation::try_from(opcode)
    .map_err(|_| DecodeError::UnknownOpcode { opcode, offset })?;

  let b = ((word >> B_SHIFT) as u32) & B_MASK;
  let c = (word & C_MASK) as u32;

  let instruction =
    match operation {
      Operation::Write => Instruction::write(b, c >> D_BITS, (c & D_MASK) as u8),
      _                => Instruction{ operation, b, c, d: None }
    };

  Ok(instruction)
}
