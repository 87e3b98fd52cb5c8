/*!
  An assembler and interpreter for a tiny virtual machine.

  Programs are written one instruction per line (`LOAD`, `READ`, `ABS`, `WRITE`), assembled
  into 64 bit instruction words, and executed against 1024 cells of memory. See `bytecode` for
  the instruction format and `uvm` for the machine.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod memory;
pub mod uvm;

pub use address::{Address, MemoryRange, MEMORY_SIZE};
pub use bytecode::{assemble, Assembly, Instruction, InstructionStream, LogRecord, Operation};
pub use config::{Config, WriteDecoding};
pub use error::{AssemblyError, DecodeError, ExecutionError};
pub use memory::{Memory, MemoryDump};
pub use uvm::{run, State, UVM};
