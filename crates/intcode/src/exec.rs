use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Result, RuntimeError, VmError};
use crate::instruction::{Instruction, Step};
use crate::program::Program;
use crate::sink::OutputSink;

pub type Fuel = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    /// Maximum number of instructions to execute. `None` runs until halt,
    /// which may be forever.
    pub fuel_limit: Option<Fuel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Failed(VmError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VmOutcome {
    pub result: i64,
    pub steps: u64,
    pub instruction_pointer: usize,
}

pub struct Vm<O: OutputSink> {
    cfg: VmConfig,
    program: Program,
    output: O,
    input: Option<i64>,
    state: State,
    steps: u64,
}

impl<O: OutputSink> Vm<O> {
    pub fn new(cfg: VmConfig, program: Program, output: O) -> Self {
        Self { cfg, program, output, input: None, state: State::Running, steps: 0 }
    }

    /// Value handed to every input instruction of this run.
    pub fn with_input(mut self, input: i64) -> Self {
        self.input = Some(input);
        self
    }

    pub fn set_input(&mut self, input: Option<i64>) {
        self.input = input;
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_parts(self) -> (Program, O) {
        (self.program, self.output)
    }

    fn charge(&mut self) -> std::result::Result<(), RuntimeError> {
        if let Some(limit) = self.cfg.fuel_limit {
            if self.steps >= limit {
                return Err(RuntimeError::FuelExhausted { limit });
            }
        }
        self.steps += 1;
        Ok(())
    }

    /// Execute one instruction. Terminal states are sticky: a halted VM
    /// reports `Halted` again, a failed one returns its error again.
    pub fn step(&mut self) -> Result<State> {
        self.cycle().map(|_| self.state.clone())
    }

    /// Step until halt.
    pub fn run(&mut self) -> Result<VmOutcome> {
        debug!(len = self.program.len(), input = ?self.input, "run start");
        while self.cycle()?.is_some() {}

        let outcome = VmOutcome {
            result: self.program.result(),
            steps: self.steps,
            instruction_pointer: self.program.instruction_pointer(),
        };
        debug!(result = outcome.result, steps = outcome.steps, "run halted");
        Ok(outcome)
    }

    /// Lazily execute the program, yielding each instruction after it ran.
    pub fn trace(&mut self) -> Trace<'_, O> {
        Trace { vm: self, done: false }
    }

    /// `Ok(Some(ins))` after executing `ins`, `Ok(None)` once halted.
    fn cycle(&mut self) -> Result<Option<Instruction>> {
        match &self.state {
            State::Running => {}
            State::Halted => return Ok(None),
            State::Failed(err) => return Err(err.clone()),
        }

        match self.fetch_execute() {
            Ok(Some(ins)) => Ok(Some(ins)),
            Ok(None) => {
                self.state = State::Halted;
                Ok(None)
            }
            Err(err) => {
                warn!(ip = self.program.instruction_pointer(), error = %err, "run failed");
                self.state = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn fetch_execute(&mut self) -> Result<Option<Instruction>> {
        let ins = match self.program.fetch()? {
            Step::Halt => return Ok(None),
            Step::Next(ins) => ins,
        };
        self.charge()?;
        trace!(ip = self.program.instruction_pointer(), %ins, "exec");
        self.execute(ins)?;
        Ok(Some(ins))
    }

    fn execute(&mut self, ins: Instruction) -> std::result::Result<(), RuntimeError> {
        let ip = self.program.instruction_pointer();
        let overflow = RuntimeError::Overflow { address: ip, opcode: ins.opcode() };
        let p = &self.program;

        let jump = match ins {
            Instruction::Add { lhs, rhs, out } => {
                let v = p.resolve(lhs)?.checked_add(p.resolve(rhs)?).ok_or(overflow)?;
                self.program.write(out, v)?;
                None
            }
            Instruction::Multiply { lhs, rhs, out } => {
                let v = p.resolve(lhs)?.checked_mul(p.resolve(rhs)?).ok_or(overflow)?;
                self.program.write(out, v)?;
                None
            }
            Instruction::Input { out } => {
                let v = self.input.ok_or(RuntimeError::MissingInput { address: ip })?;
                self.program.write(out, v)?;
                None
            }
            Instruction::Output { src } => {
                let v = p.resolve(src)?;
                self.output.emit(v)?;
                None
            }
            Instruction::JumpIfTrue { cond, target } => {
                let (c, t) = (p.resolve(cond)?, p.resolve(target)?);
                (c != 0).then_some(t)
            }
            Instruction::JumpIfFalse { cond, target } => {
                let (c, t) = (p.resolve(cond)?, p.resolve(target)?);
                (c == 0).then_some(t)
            }
            Instruction::LessThan { lhs, rhs, out } => {
                let v = (p.resolve(lhs)? < p.resolve(rhs)?) as i64;
                self.program.write(out, v)?;
                None
            }
            Instruction::Equals { lhs, rhs, out } => {
                let v = (p.resolve(lhs)? == p.resolve(rhs)?) as i64;
                self.program.write(out, v)?;
                None
            }
        };

        match jump {
            Some(target) => self.program.jump(target),
            None => {
                self.program.advance(ins.size());
                Ok(())
            }
        }
    }
}

/// Iterator returned by [`Vm::trace`]. Ends on halt; a failure is
/// yielded once and then the iterator is exhausted.
pub struct Trace<'a, O: OutputSink> {
    vm: &'a mut Vm<O>,
    done: bool,
}

impl<O: OutputSink> Trace<'_, O> {
    /// Sink of the traced VM, as left by the last yielded instruction.
    pub fn output(&self) -> &O {
        self.vm.output()
    }
}

impl<O: OutputSink> Iterator for Trace<'_, O> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.vm.cycle() {
            Ok(Some(ins)) => Some(Ok(ins)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<O: OutputSink> std::iter::FusedIterator for Trace<'_, O> {}
