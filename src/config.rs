//! Runtime options of the virtual machine.

use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

/**
  How `WRITE` picks its source cell from the 32 bit C field.

  The assembler packs `WRITE B C D` as `C << 6 | D`, but binaries in the wild were produced for
  an interpreter that reads the source cell from the whole field, displacement bits included.
  `Raw` keeps that behavior so existing binaries run unchanged. `Shifted` drops the displacement
  bits first, so the source cell is the C that was written in the assembly.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString,
Clone,        Copy,          Eq,         PartialEq, Debug, Hash, Default
)]
#[strum(serialize_all = "lowercase")]
pub enum WriteDecoding {
  #[default]
  Raw,
  Shifted,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Config {
  pub write_decoding: WriteDecoding,
}

impl Config {
  pub fn with_write_decoding(write_decoding: WriteDecoding) -> Config {
    Config{ write_decoding }
  }
}
