//! Structures and functions for the virtual machine that executes binary programs.
//!
//! There are no jumps, so a run is a single pass over the instruction stream. The machine is
//! `Running` until the stream is exhausted (`Halted`) or an instruction fails (`Failed`).

use std::fmt::{Display, Formatter};

use log::{debug, trace};
use prettytable::Table;

use crate::address::{Address, MemoryRange, MEMORY_SIZE};
use crate::bytecode::{Instruction, InstructionStream, Operation};
use crate::config::{Config, WriteDecoding};
use crate::error::ExecutionError;
use crate::memory::{Cell, Memory, MemoryDump, TABLE_DISPLAY_FORMAT};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
  Running,
  Halted,
  Failed
}

impl Display for State{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self{
      State::Running => {
        write!(f, "Running")
      },
      State::Halted => {
        write!(f, "Halted")
      },
      State::Failed => {
        write!(f, "Failed")
      }
    }
  }
}

pub struct UVM {
  config : Config,
  state  : State,

  // Memory Store
  memory : Memory,

  // Bookkeeping //
  executed   : usize,           // Number of instructions executed, a cursor
  last_write : Option<Address>, // Most recently written cell

  // For tracing computations :
  #[cfg(feature = "trace_computation")] current_instruction : Option<Instruction>,
}

impl UVM {

  // region Display methods

  /// Lists the cells that are nonzero or were just written.
  fn make_memory_table(memory: &Memory, highlight: Option<Address>) -> Table {

    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in memory.cells().iter().enumerate() {
      let highlighted = highlight.map(|a| a.idx()) == Some(i);
      match (highlighted, *cell != 0) {

        (true, _) => {
          table.add_row(row![r->format!("* --> memory[{}] =", i), cell]);
        }

        (false, true) => {
          table.add_row(row![r->format!("memory[{}] =", i), cell]);
        }

        (false, false) => {}

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  // region Low-level utility methods

  pub fn new(config: Config) -> UVM {
    UVM {
      config,
      state      : State::Running,
      memory     : Memory::new(),
      executed   : 0,
      last_write : None,

      #[cfg(feature = "trace_computation")] current_instruction : None,
    }
  }

  pub fn config(&self) -> Config {
    self.config
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  /// Number of instructions executed so far.
  pub fn executed(&self) -> usize {
    self.executed
  }

  /// Checks an operand or computed target, blaming the instruction being executed.
  fn address(&self, address: i64) -> Result<Address, ExecutionError> {
    Address::try_new(address).ok_or(
      ExecutionError::AddressOutOfRange {
        index   : self.executed,
        address,
        size    : MEMORY_SIZE
      }
    )
  }

  fn value_at(&self, address: i64) -> Result<Cell, ExecutionError> {
    Ok(self.memory.value_at(self.address(address)?))
  }

  fn set_value_at(&mut self, address: Address, value: Cell) {
    self.memory.set_value_at(address, value);
    self.last_write = Some(address);
  }

  // endregion

  // region Interpretation

  /**
    Executes every instruction of a binary program in order. On error the machine is left in the
    `Failed` state, and its memory should not be trusted.
  */
  pub fn execute(&mut self, bytes: &[u8]) -> Result<(), ExecutionError> {
    self.state = State::Running;

    let result = self.execute_stream(bytes);
    self.state = match result {
      Ok(())  => State::Halted,
      Err(_)  => State::Failed
    };

    debug!("{} after {} instructions.", self.state, self.executed);
    result
  }

  fn execute_stream(&mut self, bytes: &[u8]) -> Result<(), ExecutionError> {
    for instruction in InstructionStream::new(bytes)? {
      self.step(&instruction?)?;
    }
    Ok(())
  }

  /// Executes a single instruction.
  pub fn step(&mut self, instruction: &Instruction) -> Result<(), ExecutionError> {
    trace!("{:>5}: {}", self.executed, instruction);

    let b = instruction.b as i64;
    match instruction.operation {
      Operation::Load  => self.load(b, instruction.constant() as Cell)?,
      Operation::Read  => self.read(b, instruction.c as i64)?,
      Operation::Abs   => self.abs(b, instruction.c as i64)?,
      Operation::Write => {
        let source =
          match self.config.write_decoding {
            WriteDecoding::Raw     => instruction.c_field(),
            WriteDecoding::Shifted => instruction.c
          };
        self.write(b, source as i64, instruction.d.unwrap_or(0) as i64)?
      }
    }
    self.executed += 1;

    #[cfg(feature = "trace_computation")]
      {
        self.current_instruction = Some(*instruction);
        trace!("{}", self);
      }

    Ok(())
  }

  /// Copies out the cells in `range`.
  pub fn dump(&self, range: MemoryRange) -> MemoryDump {
    self.memory.dump(range)
  }

  // endregion

  // region VM instruction methods

  /// `memory[b] <- constant`
  fn load(&mut self, b: i64, constant: Cell) -> Result<(), ExecutionError> {
    let target = self.address(b)?;
    self.set_value_at(target, constant);
    Ok(())
  }

  /// `memory[b] <- memory[c]`
  fn read(&mut self, b: i64, c: i64) -> Result<(), ExecutionError> {
    let target = self.address(b)?;
    let value  = self.value_at(c)?;
    self.set_value_at(target, value);
    Ok(())
  }

  /// `memory[b] <- |memory[c]|`
  fn abs(&mut self, b: i64, c: i64) -> Result<(), ExecutionError> {
    let target = self.address(b)?;
    let value  = self.value_at(c)?;
    self.set_value_at(target, value.abs());
    Ok(())
  }

  /// `memory[memory[b] + d] <- memory[c]`
  fn write(&mut self, b: i64, c: i64, d: i64) -> Result<(), ExecutionError> {
    let value  = self.value_at(c)?;
    let base   = self.value_at(b)?;
    let target = self.address(base.saturating_add(d))?;
    self.set_value_at(target, value);
    Ok(())
  }

  // endregion

}

/**
  Runs a binary program on a fresh machine and returns the requested range of memory. Nothing is
  returned if the program fails.
*/
pub fn run(bytes: &[u8], range: MemoryRange, config: Config) -> Result<MemoryDump, ExecutionError> {
  let mut machine = UVM::new(config);
  machine.execute(bytes)?;
  Ok(machine.dump(range))
}

impl Display for UVM {

  // We print the instruction just executed if `trace_computation` is on.
  #[cfg(feature = "trace_computation")]
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let m_table = UVM::make_memory_table(&self.memory, self.last_write);
    let current = match &self.current_instruction {
      Some(instruction) => instruction.to_string(),
      None              => "-".to_string()
    };

    write!(
      f,
      "State: {}\tExecuted: {}\tLast: {}\n{}",
      self.state, self.executed, current, m_table
    )
  }

  #[cfg(not(feature = "trace_computation"))]
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let m_table = UVM::make_memory_table(&self.memory, self.last_write);

    write!(f, "State: {}\tExecuted: {}\n{}", self.state, self.executed, m_table)
  }
}
