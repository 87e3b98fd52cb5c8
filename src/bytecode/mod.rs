/*!

  Instructions are single 64 bit words, written to a binary program in little-endian byte
  order. The sizes of instruction components are as follows:

    Opcode:  4 bits
    B:      28 bits
    C:      32 bits

  For `WRITE` the C field holds two operands, a 26 bit C' above a 6 bit displacement D.

  As in a register machine, B and C usually name memory cells. The exception is `LOAD`, whose C
  is an immediate constant. Stored constants are 32 bit two's complement, so negative values
  survive the trip through the binary.

  The instruction's arguments are stored as plain fields of `Instruction` rather than as data
  members of one enum variant per opcode. Every opcode has the same shape on the wire, so an
  enum is only used for the opcode itself.

*/

mod assembly;
mod binary;
mod instruction;
mod stream;

pub use assembly::{assemble, parse_line, Assembly, LogRecord};
pub use binary::{encode_instruction, try_decode_instruction, Word, WORD_SIZE,
                 OPCODE_SHIFT, OPCODE_MASK, B_SHIFT, B_MASK, C_MASK, D_BITS, D_MASK, C_PRIME_MASK};
pub use instruction::{Instruction, Operation};
pub use stream::InstructionStream;
