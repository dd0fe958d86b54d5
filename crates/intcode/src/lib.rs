//! Intcode - a small deterministic integer VM
//!
//! - Program text is a comma-separated list of `i64` words
//! - Variable-length instructions with position/immediate addressing
//! - Single-threaded fetch/decode/execute with optional fuel metering
//! - Output goes through a pluggable [`OutputSink`]
//! - `parallel` feature: noun/verb search on rayon

pub mod error;
pub mod exec;
pub mod instruction;
pub mod memory;
pub mod mode;
pub mod opcode;
pub mod program;
pub mod report;
pub mod search;
pub mod sink;

pub use error::{DecodeError, ParseError, Result, RuntimeError, VmError};
pub use exec::{Fuel, State, Trace, Vm, VmConfig, VmOutcome};
pub use instruction::{decode, Instruction, Param, Step};
pub use memory::Memory;
pub use mode::{decode_modes, Mode};
pub use opcode::Opcode;
pub use program::Program;
pub use report::RunReport;
pub use search::{run_restored, search, solutions, NounVerb};
#[cfg(feature = "parallel")]
pub use search::{par_search, par_solutions};
pub use sink::{diagnostic_line, DiagnosticWriter, Discard, OutputSink, Tee};
