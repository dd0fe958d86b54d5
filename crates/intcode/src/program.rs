use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, Result, RuntimeError};
use crate::instruction::{decode, Param, Step};
use crate::memory::Memory;
use crate::mode::Mode;

/// A loaded program: memory plus the instruction pointer.
///
/// Memory is only reachable through these accessors, so the interpreter is
/// the sole writer once execution starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    memory: Memory,
    ip: usize,
}

impl Program {
    pub fn new(memory: Memory) -> Self {
        Self { memory, ip: 0 }
    }

    pub fn load(source: &str) -> std::result::Result<Self, ParseError> {
        Memory::parse(source).map(Self::new)
    }

    /// Overwrite a cell before execution, e.g. to set up inputs.
    pub fn patch(&mut self, address: i64, value: i64) -> std::result::Result<(), RuntimeError> {
        self.memory.write(address, value)
    }

    /// Place `noun` at address 1 and `verb` at address 2.
    pub fn restore(&mut self, noun: i64, verb: i64) -> std::result::Result<(), RuntimeError> {
        self.patch(1, noun)?;
        self.patch(2, verb)
    }

    pub fn read(&self, address: i64) -> std::result::Result<i64, RuntimeError> {
        self.memory.read(address)
    }

    pub fn write(&mut self, address: i64, value: i64) -> std::result::Result<(), RuntimeError> {
        self.memory.write(address, value)
    }

    /// Value of address 0. Only meaningful once the program has halted.
    pub fn result(&self) -> i64 {
        // memory is never empty
        self.memory.cells()[0]
    }

    pub fn resolve(&self, param: Param) -> std::result::Result<i64, RuntimeError> {
        match param.mode {
            Mode::Position => self.read(param.raw),
            Mode::Immediate => Ok(param.raw),
        }
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    /// Decode the instruction at the instruction pointer.
    pub fn fetch(&self) -> Result<Step> {
        decode(&self.memory, self.ip)
    }

    pub(crate) fn advance(&mut self, words: usize) {
        self.ip += words;
    }

    pub(crate) fn jump(&mut self, target: i64) -> std::result::Result<(), RuntimeError> {
        self.ip = usize::try_from(target)
            .map_err(|_| RuntimeError::OutOfBounds { address: target, len: self.memory.len() })?;
        Ok(())
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn serialize(&self) -> String {
        self.memory.serialize()
    }
}

impl FromStr for Program {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::load(s)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.memory, f)
    }
}
