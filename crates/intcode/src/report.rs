use serde::Serialize;

use crate::exec::VmOutcome;
use crate::program::Program;

/// Summary of a halted run, serialized by the CLI's `--json` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub result: i64,
    pub steps: u64,
    pub instruction_pointer: usize,
    pub outputs: Vec<i64>,
    /// `b3:<hex>` over the serialized final memory.
    pub memory_cid: String,
}

impl RunReport {
    pub fn new(outcome: &VmOutcome, program: &Program, outputs: Vec<i64>) -> Self {
        Self {
            result: outcome.result,
            steps: outcome.steps,
            instruction_pointer: outcome.instruction_pointer,
            outputs,
            memory_cid: program.memory().cid(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
