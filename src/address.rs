//! Addresses of memory cells, and ranges of them, with some convenience functions.

use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::str::FromStr;

use crate::error::ExecutionError;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

/// Number of cells in the machine's memory.
pub const MEMORY_SIZE: AddressNumberType = 1024;

/// The address of a memory cell. An `Address` is always less than `MEMORY_SIZE`.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(AddressNumberType);

impl Address {
  /// Checks that `address` names a memory cell. Instruction operands and computed targets may
  /// be negative or too large, so the argument is signed.
  pub fn try_new(address: i64) -> Option<Address> {
    match address {
      a if a >= 0 && (a as u64) < MEMORY_SIZE as u64 => Some(Address(a as AddressNumberType)),
      _ => None
    }
  }

  /// Converts the address to an index into the memory vector.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }
}

impl Display for Address{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "memory[{}]", self.0)
  }
}


/// A half open range `start..end` of memory addresses.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemoryRange {
  start : AddressNumberType,
  end   : AddressNumberType,
}

impl MemoryRange {
  /// Fails unless `start <= end <= MEMORY_SIZE`.
  pub fn new(start: AddressNumberType, end: AddressNumberType) -> Result<MemoryRange, ExecutionError> {
    if start > end || end > MEMORY_SIZE {
      return Err(ExecutionError::InvalidRange { start, end, size: MEMORY_SIZE });
    }
    Ok(MemoryRange { start, end })
  }

  pub fn start(&self) -> AddressNumberType {
    self.start
  }

  pub fn end(&self) -> AddressNumberType {
    self.end
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  pub fn indices(&self) -> Range<AddressNumberType> {
    self.start..self.end
  }
}

impl Display for MemoryRange{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.start, self.end)
  }
}

/// Parses `"start:end"`.
impl FromStr for MemoryRange {
  type Err = ExecutionError;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    let malformed = || ExecutionError::MalformedRange(text.to_string());

    let (start, end) = text.split_once(':').ok_or_else(malformed)?;
    let start = start.trim().parse::<AddressNumberType>().map_err(|_| malformed())?;
    let end   = end.trim().parse::<AddressNumberType>().map_err(|_| malformed())?;

    MemoryRange::new(start, end)
  }
}
