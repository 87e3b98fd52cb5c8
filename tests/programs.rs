use env_logger::{try_init_from_env, Env, DEFAULT_FILTER_ENV};

use uvm::bytecode::{try_decode_instruction, Word, WORD_SIZE};
use uvm::{
  assemble, run, AssemblyError, Config, DecodeError, ExecutionError, InstructionStream,
  MemoryRange, Operation, WriteDecoding, UVM
};

fn init_logger() {
  let _ = try_init_from_env(Env::default().filter_or(DEFAULT_FILTER_ENV, "info"));
}

fn execute(text: &str, range: &str) -> Result<Vec<(usize, i64)>, ExecutionError> {
  init_logger();
  let bytes = assemble(text).unwrap().to_bytes();
  let dump  = run(&bytes, range.parse()?, Config::default())?;
  Ok(dump.entries().to_vec())
}

#[test]
fn load_five(){
  let assembly = assemble("LOAD 0 5").unwrap();
  assert_eq!(assembly.words(), vec![0x1000_0000_0000_0005]);
  assert_eq!(execute("LOAD 0 5", "0:1").unwrap(), vec![(0, 5)]);
}

#[test]
fn absolute_values(){
  assert_eq!(
    execute("LOAD 0 5\nLOAD 1 7\nABS 2 0", "0:3").unwrap(),
    vec![(0, 5), (1, 7), (2, 5)]
  );
  assert_eq!(execute("LOAD 0 -3\nABS 1 0", "0:2").unwrap(), vec![(0, -3), (1, 3)]);
}

#[test]
fn read_program(){
  let result = execute("LOAD 0 10\nLOAD 1 99\nREAD 2 0", "0:3").unwrap();
  assert_eq!(result[2], (2, 10));
}

#[test]
fn abs_in_place(){
  // Takes the absolute value of memory[10..14] in place.
  let text = "
    LOAD 10 -1
    LOAD 11 2
    LOAD 12 -30
    LOAD 13 0
    ABS 10 10
    ABS 11 11
    ABS 12 12
    ABS 13 13
  ";
  let result = execute(text, "10:14").unwrap();
  assert_eq!(result, vec![(10, 1), (11, 2), (12, 30), (13, 0)]);
}

#[test]
fn round_trip_fields(){
  let text = "LOAD 7 -12\nREAD 3 900\nABS 1023 4\nWRITE 5 1000 63\nWRITE 6 2";
  let assembly = assemble(text).unwrap();
  let bytes = assembly.to_bytes();
  let decoded: Vec<_> = InstructionStream::new(&bytes).unwrap().map(Result::unwrap).collect();

  assert_eq!(decoded, assembly.instructions().to_vec());
  for (instruction, record) in decoded.iter().zip(assembly.log()) {
    assert_eq!(instruction.operation, record.command);
    assert_eq!(instruction.operation.code(), record.opcode);
    assert_eq!(instruction.b as i64, record.b);
    match instruction.operation {
      Operation::Load  => assert_eq!(instruction.constant() as i64, record.c),
      _                => assert_eq!(instruction.c as i64, record.c),
    }
    assert_eq!(instruction.d.map(i64::from), record.d.or(match record.command {
      Operation::Write => Some(0),
      _                => None
    }));
  }
}

#[test]
fn write_decoding_modes(){
  // memory[memory[0] + 2] <- memory[C]: raw reads memory[(3 << 6) | 2], shifted reads memory[3].
  let text = "LOAD 0 100\nLOAD 3 -5\nLOAD 194 8\nWRITE 0 3 2";
  let bytes = assemble(text).unwrap().to_bytes();
  let range = MemoryRange::new(102, 103).unwrap();

  let raw = run(&bytes, range, Config::with_write_decoding(WriteDecoding::Raw)).unwrap();
  assert_eq!(raw.get(102), Some(8));

  let shifted = run(&bytes, range, Config::with_write_decoding(WriteDecoding::Shifted)).unwrap();
  assert_eq!(shifted.get(102), Some(-5));
}

#[test]
fn empty_and_invalid_ranges(){
  assert_eq!(execute("LOAD 0 5", "4:4").unwrap(), Vec::<(usize, i64)>::new());
  assert!(matches!(execute("LOAD 0 5", "4:3"), Err(ExecutionError::InvalidRange{ .. })));
  assert!(matches!(execute("LOAD 0 5", "0:1025"), Err(ExecutionError::InvalidRange{ .. })));
  assert!(matches!(execute("LOAD 0 5", "0-3"), Err(ExecutionError::MalformedRange(_))));
}

#[test]
fn unknown_opcode_produces_no_result(){
  init_logger();
  let word: Word = 0x0000_0002_0000_0005;
  assert_eq!(
    try_decode_instruction(word, 0),
    Err(DecodeError::UnknownOpcode{ opcode: 0, offset: 0 })
  );
  let result = run(&word.to_le_bytes(), MemoryRange::new(0, 4).unwrap(), Config::default());
  assert_eq!(
    result,
    Err(ExecutionError::Decode(DecodeError::UnknownOpcode{ opcode: 0, offset: 0 }))
  );
}

#[test]
fn truncated_binary(){
  let mut bytes = assemble("LOAD 0 5\nLOAD 1 6").unwrap().to_bytes();
  bytes.pop();
  let mut machine = UVM::new(Config::default());
  assert_eq!(
    machine.execute(&bytes),
    Err(ExecutionError::Decode(DecodeError::TruncatedStream{ len: 2 * WORD_SIZE - 1 }))
  );
}

#[test]
fn assembly_errors(){
  assert!(matches!(
    assemble("LOAD 0 1\nload 1 2"),
    Err(AssemblyError::UnknownCommand{ line: 2, .. })
  ));
  assert!(matches!(
    assemble("ABS 1 two"),
    Err(AssemblyError::MalformedLine{ line: 1, .. })
  ));
}

#[test]
fn log_file_contents(){
  let assembly = assemble("LOAD 0 5\nWRITE 1 2 3").unwrap();
  let log = serde_json::to_string(assembly.log()).unwrap();
  assert_eq!(
    log,
    r#"[{"command":"LOAD","A":1,"B":0,"C":5,"D":null},{"command":"WRITE","A":15,"B":1,"C":2,"D":3}]"#
  );
}

#[test]
fn result_file_contents(){
  let bytes = assemble("LOAD 0 -3\nABS 1 0").unwrap().to_bytes();
  let dump = run(&bytes, MemoryRange::new(0, 3).unwrap(), Config::default()).unwrap();
  assert_eq!(
    serde_json::to_string(&dump).unwrap(),
    r#"{"memory[0]":-3,"memory[1]":3,"memory[2]":0}"#
  );
}
