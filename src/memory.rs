//! The machine's memory store and snapshots of it.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::address::{Address, AddressNumberType, MemoryRange, MEMORY_SIZE};

/// Contents of a memory cell.
pub type Cell = i64;

/// A fixed block of `MEMORY_SIZE` cells, all initially zero.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<Cell>,
}

impl Memory {
  pub fn new() -> Memory {
    Memory{ cells: vec![0; MEMORY_SIZE] }
  }

  pub fn value_at(&self, address: Address) -> Cell {
    self.cells[address.idx()]
  }

  pub fn set_value_at(&mut self, address: Address, value: Cell) {
    self.cells[address.idx()] = value;
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  /// Copies out the cells in `range`.
  pub fn dump(&self, range: MemoryRange) -> MemoryDump {
    MemoryDump{
      entries: range.indices().map(|i| (i, self.cells[i])).collect()
    }
  }
}

impl Default for Memory {
  fn default() -> Self {
    Memory::new()
  }
}


/**
  A snapshot of a range of memory in ascending address order.

  It serializes as a map from `"memory[i]"` to the value of cell `i`. The entries are written in
  address order rather than key order, so `memory[2]` comes before `memory[10]`.
*/
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryDump {
  entries: Vec<(AddressNumberType, Cell)>,
}

impl MemoryDump {
  pub fn entries(&self) -> &[(AddressNumberType, Cell)] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// The value recorded for `address`, if it lies in the dumped range.
  pub fn get(&self, address: AddressNumberType) -> Option<Cell> {
    self.entries
        .iter()
        .find(|(a, _)| *a == address)
        .map(|(_, value)| *value)
  }
}

impl Serialize for MemoryDump {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
  {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (address, value) in &self.entries {
      map.serialize_entry(&format!("memory[{}]", address), value)?;
    }
    map.end()
  }
}

impl Display for MemoryDump {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (address, value) in &self.entries {
      table.add_row(row![r->format!("memory[{}] =", address), value]);
    }

    write!(f, "{}", table)
  }
}


lazy_static! {
  pub(crate) static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}
