/*!
  The human readable textual form of bytecode is called assembly. Each line holds at most one
  instruction:

  ```text
  LOAD  B C
  READ  B C
  ABS   B C
  WRITE B C [D]
  ```

  Tokens are separated by runs of whitespace, and anything after a `;` is a comment. A line
  with fewer than three tokens carries no instruction and is skipped. Operands are decimal
  integers, optionally signed, and are truncated to the width of their field when packed.

  Assembly is all or nothing: the first bad line aborts the whole batch.
*/

use std::str::FromStr;

use log::{debug, trace};
use nom::{
  bytes::complete::{take_till1, take_while, take_while1},
  character::complete::{
    char as one_char,
    digit1,
    one_of
  },
  combinator::{all_consuming, map_res, opt, recognize, rest},
  multi::separated_list0,
  sequence::{
    delimited,
    pair,
    preceded,
    terminated
  },
  IResult
};
use serde::Serialize;

use crate::bytecode::{encode_instruction, Instruction, Operation, Word, WORD_SIZE};
use crate::error::AssemblyError;

/// Lines with fewer tokens than this are skipped.
const MIN_TOKENS: usize = 3;

/// One entry of the assembly log, keeping the operands as they were written in the source.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LogRecord {
  pub command: Operation,
  #[serde(rename = "A")]
  pub opcode: u8,
  #[serde(rename = "B")]
  pub b: i64,
  #[serde(rename = "C")]
  pub c: i64,
  #[serde(rename = "D")]
  pub d: Option<i64>,
}

/// The output of a successful run of the assembler.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Assembly {
  instructions : Vec<Instruction>,
  log          : Vec<LogRecord>,
}

impl Assembly {
  pub fn instructions(&self) -> &[Instruction] {
    &self.instructions
  }

  pub fn log(&self) -> &[LogRecord] {
    &self.log
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  pub fn words(&self) -> Vec<Word> {
    self.instructions.iter().map(encode_instruction).collect()
  }

  /// The binary program: every instruction word in little-endian order, back to back.
  pub fn to_bytes(&self) -> Vec<u8> {
    self.words()
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect()
  }

  /// The binary program as space separated upper case hex bytes.
  pub fn hex_dump(&self) -> String {
    self.to_bytes()
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<String>>()
        .join(" ")
  }
}

fn is_separator(ch: char) -> bool {
  ch.is_whitespace()
}

/// Splits a line into its whitespace separated tokens, discarding any trailing comment.
fn tokens(line: &str) -> IResult<&str, Vec<&str>> {
  all_consuming(
    terminated(
      delimited(
        take_while(is_separator),
        separated_list0(
          take_while1(is_separator),
          take_till1(|ch: char| is_separator(ch) || ch == ';')
        ),
        take_while(is_separator)
      ),
      opt(preceded(one_char(';'), rest))
    )
  )(line)
}

fn integer(input: &str) -> IResult<&str, i64> {
  map_res(
    recognize(pair(opt(one_of("+-")), digit1)),
    |out: &str| out.parse::<i64>()
  )(input)
}

fn parse_operand(line: usize, text: &str, token: &str) -> Result<i64, AssemblyError> {
  match all_consuming(integer)(token) {
    Ok((_, value)) => Ok(value),
    Err(_e) => Err(AssemblyError::MalformedLine {
      line,
      text: text.trim().to_string(),
      reason: format!("operand `{}` is not an integer", token)
    })
  }
}

/**
  Parses a single line of assembly. Returns `Ok(None)` for lines that carry no instruction.

  `line` is the one-based line number, used for error reporting.
*/
pub fn parse_line(line: usize, text: &str) -> Result<Option<(Instruction, LogRecord)>, AssemblyError> {
  let tokens = match tokens(text) {
    Ok((_, tokens)) => tokens,
    Err(_e) => {
      return Err(AssemblyError::MalformedLine {
        line,
        text: text.trim().to_string(),
        reason: "unable to split line into tokens".to_string()
      });
    }
  };

  if tokens.len() < MIN_TOKENS {
    return Ok(None);
  }

  let operation =
    Operation::from_str(tokens[0]).map_err(|_| AssemblyError::UnknownCommand {
      line,
      command: tokens[0].to_string()
    })?;

  let operands = &tokens[1..];
  if operands.len() > operation.max_operands() {
    return Err(AssemblyError::MalformedLine {
      line,
      text: text.trim().to_string(),
      reason: format!(
        "{} takes at most {} operands but was given {}",
        operation, operation.max_operands(), operands.len()
      )
    });
  }

  let values =
    operands.iter()
            .map(|token| parse_operand(line, text, token))
            .collect::<Result<Vec<i64>, AssemblyError>>()?;
  let (b, c, d) = (values[0], values[1], values.get(2).copied());

  // Operands are truncated to their field width here and by `encode_instruction`.
  let instruction =
    match operation {
      Operation::Load  => Instruction::load(b as u32, c as i32),
      Operation::Read  => Instruction::read(b as u32, c as u32),
      Operation::Abs   => Instruction::abs(b as u32, c as u32),
      Operation::Write => Instruction::write(b as u32, c as u32, d.unwrap_or(0) as u8),
    };

  let record = LogRecord {
    command: operation,
    opcode: operation.code(),
    b,
    c,
    d
  };

  Ok(Some((instruction, record)))
}

/// Assembles a whole program.
pub fn assemble(text: &str) -> Result<Assembly, AssemblyError> {
  let mut assembly = Assembly::default();

  for (idx, line) in text.lines().enumerate() {
    if let Some((instruction, record)) = parse_line(idx + 1, line)? {
      trace!("line {}: {}", idx + 1, instruction);
      assembly.instructions.push(instruction);
      assembly.log.push(record);
    }
  }

  debug!("Assembled {} instructions ({} bytes).", assembly.len(), assembly.len() * WORD_SIZE);
  Ok(assembly)
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokenizing(){
    assert_eq!(tokens("  LOAD\t0   5 ").unwrap().1, vec!["LOAD", "0", "5"]);
    assert_eq!(tokens("").unwrap().1, Vec::<&str>::new());
    assert_eq!(tokens("   ").unwrap().1, Vec::<&str>::new());
    assert_eq!(tokens("ABS 1 2 ; take the absolute value").unwrap().1, vec!["ABS", "1", "2"]);
    assert_eq!(tokens("; LOAD 1 2").unwrap().1, Vec::<&str>::new());
  }

  #[test]
  fn any_whitespace_separates(){
    assert_eq!(tokens("LOAD 0\x0c5").unwrap().1, vec!["LOAD", "0", "5"]);
    assert_eq!(tokens("LOAD\x0b1 7").unwrap().1, vec!["LOAD", "1", "7"]);
    assert_eq!(tokens("\r").unwrap().1, Vec::<&str>::new());
    assert_eq!(tokens("ABS 2 0\r").unwrap().1, vec!["ABS", "2", "0"]);
    assert_eq!(tokens("READ\u{a0}3 4").unwrap().1, vec!["READ", "3", "4"]);
  }

  #[test]
  fn stray_carriage_returns_and_feeds(){
    let assembly = assemble("LOAD 0\x0c5\nLOAD\x0b1 7").unwrap();
    assert_eq!(assembly.instructions(), &[Instruction::load(0, 5), Instruction::load(1, 7)]);

    let assembly = assemble("LOAD 0 5\n\r\nLOAD 1 7\r").unwrap();
    assert_eq!(assembly.len(), 2);
    assert_eq!(parse_line(2, "\r"), Ok(None));
  }

  #[test]
  fn integers(){
    assert_eq!(integer("42").unwrap(), ("", 42));
    assert_eq!(integer("-3").unwrap(), ("", -3));
    assert_eq!(integer("+7").unwrap(), ("", 7));
    assert!(integer("x1").is_err());
    assert!(all_consuming(integer)("1x").is_err());
  }

  #[test]
  fn short_lines_are_skipped(){
    assert_eq!(parse_line(1, ""), Ok(None));
    assert_eq!(parse_line(1, "LOAD 0"), Ok(None));
    assert_eq!(parse_line(1, "BOGUS"), Ok(None));
  }

  #[test]
  fn load_line(){
    let (instruction, record) = parse_line(1, "LOAD 0 5").unwrap().unwrap();
    assert_eq!(instruction, Instruction::load(0, 5));
    assert_eq!(
      record,
      LogRecord{ command: Operation::Load, opcode: 1, b: 0, c: 5, d: None }
    );
  }

  #[test]
  fn write_line_with_and_without_displacement(){
    let (instruction, record) = parse_line(1, "WRITE 1 2 3").unwrap().unwrap();
    assert_eq!(instruction, Instruction::write(1, 2, 3));
    assert_eq!(record.d, Some(3));
    assert_eq!(record.opcode, 15);

    let (instruction, record) = parse_line(1, "WRITE 1 2").unwrap().unwrap();
    assert_eq!(instruction, Instruction::write(1, 2, 0));
    assert_eq!(record.d, None);
  }

  #[test]
  fn unknown_command(){
    assert_eq!(
      parse_line(4, "JUMP 1 2"),
      Err(AssemblyError::UnknownCommand{ line: 4, command: "JUMP".to_string() })
    );
  }

  #[test]
  fn non_integer_operand(){
    assert!(matches!(
      parse_line(2, "READ 1 x"),
      Err(AssemblyError::MalformedLine{ line: 2, .. })
    ));
  }

  #[test]
  fn too_many_operands(){
    assert!(matches!(
      parse_line(3, "LOAD 1 2 3"),
      Err(AssemblyError::MalformedLine{ line: 3, .. })
    ));
    assert!(parse_line(3, "WRITE 1 2 3 4").is_err());
  }

  #[test]
  fn assemble_program(){
    let text = "LOAD 0 5\n\n   ; comment\nLOAD 1 7\nABS 2 0\n";
    let assembly = assemble(text).unwrap();
    assert_eq!(assembly.len(), 3);
    assert_eq!(assembly.to_bytes().len(), 24);
    assert_eq!(&assembly.to_bytes()[..8], &[0x05, 0, 0, 0, 0, 0, 0, 0x10]);
    assert_eq!(
      assembly.log().iter().map(|r| r.command).collect::<Vec<_>>(),
      vec![Operation::Load, Operation::Load, Operation::Abs]
    );
  }

  #[test]
  fn assembly_is_atomic(){
    let text = "LOAD 0 5\nNOPE 1 2\nLOAD 1 7";
    assert_eq!(
      assemble(text),
      Err(AssemblyError::UnknownCommand{ line: 2, command: "NOPE".to_string() })
    );
  }

  #[test]
  fn assembly_is_deterministic(){
    let text = "LOAD 0 -3\nABS 1 0\nWRITE 1 0 2\nREAD 4 1";
    assert_eq!(assemble(text).unwrap().to_bytes(), assemble(text).unwrap().to_bytes());
  }

  #[test]
  fn hex_dump(){
    let assembly = assemble("LOAD 0 5").unwrap();
    assert_eq!(assembly.hex_dump(), "05 00 00 00 00 00 00 10");
  }

  #[test]
  fn log_serialization(){
    let assembly = assemble("WRITE 1 2\nLOAD 0 5").unwrap();
    let json = serde_json::to_value(assembly.log()).unwrap();
    assert_eq!(
      json,
      serde_json::json!([
        { "command": "WRITE", "A": 15, "B": 1, "C": 2, "D": null },
        { "command": "LOAD",  "A": 1,  "B": 0, "C": 5, "D": null }
      ])
    );
  }
}
