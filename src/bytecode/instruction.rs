use std::fmt::{Display, Formatter};

use serde::Serialize;
use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::binary::{C_PRIME_MASK, D_BITS, D_MASK};

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is its 4 bit opcode as it appears in the top nibble of an
  encoded instruction, and the `strum` serialization is its assembly mnemonic. Values not listed
  here are not valid opcodes.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive, Serialize,
Clone,        Copy,          Eq,         PartialEq,        Debug,         Hash
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Operation {
  Load  =  1, // memory[B] <- C
  Read  = 12, // memory[B] <- memory[C]
  Abs   = 13, // memory[B] <- |memory[C]|
  Write = 15, // memory[memory[B] + D] <- memory[C]
}

impl Operation{
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The largest number of operands the mnemonic accepts in assembly.
  pub fn max_operands(&self) -> usize {
    match self {
      Operation::Write => 3,
      _                => 2
    }
  }
}

/**
  Holds the unencoded components of an instruction.

  `b` is the 28 bit B field. For `LOAD`, `READ`, and `ABS`, `c` is the full 32 bit low field
  and `d` is `None`. For `WRITE`, `c` is the 26 bit C' and `d` is the 6 bit displacement that
  share the low field.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub operation : Operation,
  pub b         : u32,
  pub c         : u32,
  pub d         : Option<u8>,
}

impl Instruction {
  /// Builds a `LOAD` of a signed constant. The constant is stored as its two's complement.
  pub fn load(b: u32, constant: i32) -> Instruction {
    Instruction{ operation: Operation::Load, b, c: constant as u32, d: None }
  }

  pub fn read(b: u32, c: u32) -> Instruction {
    Instruction{ operation: Operation::Read, b, c, d: None }
  }

  pub fn abs(b: u32, c: u32) -> Instruction {
    Instruction{ operation: Operation::Abs, b, c, d: None }
  }

  pub fn write(b: u32, c: u32, d: u8) -> Instruction {
    Instruction{
      operation : Operation::Write,
      b,
      c         : c & C_PRIME_MASK,
      d         : Some(d & D_MASK as u8)
    }
  }

  /// The 32 bit low field exactly as it sits in the encoded word.
  pub fn c_field(&self) -> u32 {
    match self.d {
      Some(d) => (self.c << D_BITS) | d as u32,
      None    => self.c
    }
  }

  /// The `LOAD` immediate, reinterpreting the C field as a signed 32 bit integer.
  pub fn constant(&self) -> i32 {
    self.c as i32
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match (self.operation, self.d) {

      (Operation::Load, _) => {
        write!(f, "{} {} {}", self.operation, self.b, self.constant())
      }

      (_, Some(d)) => {
        write!(f, "{} {} {} {}", self.operation, self.b, self.c, d)
      }

      (_, None) => {
        write!(f, "{} {} {}", self.operation, self.b, self.c)
      }

    }
  }
}
