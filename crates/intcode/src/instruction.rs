//! Instruction set and decoder.
//!
//! Every opcode except halt becomes one [`Instruction`] variant. Read
//! parameters keep their raw word and decoded [`Mode`]; write targets are
//! always plain addresses and are never mode-resolved.

use std::fmt;

use crate::error::{DecodeError, Result, RuntimeError};
use crate::memory::Memory;
use crate::mode::{decode_modes, Mode};
use crate::opcode::Opcode;

/// A parameter that is resolved through its mode before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub raw: i64,
    pub mode: Mode,
}

impl Param {
    pub fn position(raw: i64) -> Self {
        Self { raw, mode: Mode::Position }
    }

    pub fn immediate(raw: i64) -> Self {
        Self { raw, mode: Mode::Immediate }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Add { lhs: Param, rhs: Param, out: i64 },
    Multiply { lhs: Param, rhs: Param, out: i64 },
    Input { out: i64 },
    Output { src: Param },
    JumpIfTrue { cond: Param, target: Param },
    JumpIfFalse { cond: Param, target: Param },
    LessThan { lhs: Param, rhs: Param, out: i64 },
    Equals { lhs: Param, rhs: Param, out: i64 },
}

/// Result of fetching at the instruction pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next(Instruction),
    Halt,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Add { .. } => Opcode::Add,
            Instruction::Multiply { .. } => Opcode::Multiply,
            Instruction::Input { .. } => Opcode::Input,
            Instruction::Output { .. } => Opcode::Output,
            Instruction::JumpIfTrue { .. } => Opcode::JumpIfTrue,
            Instruction::JumpIfFalse { .. } => Opcode::JumpIfFalse,
            Instruction::LessThan { .. } => Opcode::LessThan,
            Instruction::Equals { .. } => Opcode::Equals,
        }
    }

    pub fn size(&self) -> usize {
        self.opcode().size()
    }
}

struct Operands<'a> {
    memory: &'a Memory,
    address: usize,
    modes: Vec<Mode>,
}

impl Operands<'_> {
    fn raw(&self, n: usize) -> std::result::Result<i64, RuntimeError> {
        let at = i64::try_from(self.address + 1 + n).unwrap_or(i64::MAX);
        self.memory.read(at)
    }

    fn param(&self, n: usize) -> std::result::Result<Param, RuntimeError> {
        Ok(Param { raw: self.raw(n)?, mode: self.modes[n] })
    }
}

/// Decode the instruction starting at `address` without executing it.
pub fn decode(memory: &Memory, address: usize) -> Result<Step> {
    let at = i64::try_from(address).unwrap_or(i64::MAX);
    let word = memory.read(at)?;
    let opcode = Opcode::from_word(word).map_err(|e| e.at(address))?;
    if opcode == Opcode::Halt {
        return Ok(Step::Halt);
    }

    let modes = decode_modes(word, opcode.params()).map_err(|e: DecodeError| e.at(address))?;
    let ops = Operands { memory, address, modes };

    let ins = match opcode {
        Opcode::Add => Instruction::Add { lhs: ops.param(0)?, rhs: ops.param(1)?, out: ops.raw(2)? },
        Opcode::Multiply => {
            Instruction::Multiply { lhs: ops.param(0)?, rhs: ops.param(1)?, out: ops.raw(2)? }
        }
        Opcode::Input => Instruction::Input { out: ops.raw(0)? },
        Opcode::Output => Instruction::Output { src: ops.param(0)? },
        Opcode::JumpIfTrue => Instruction::JumpIfTrue { cond: ops.param(0)?, target: ops.param(1)? },
        Opcode::JumpIfFalse => {
            Instruction::JumpIfFalse { cond: ops.param(0)?, target: ops.param(1)? }
        }
        Opcode::LessThan => {
            Instruction::LessThan { lhs: ops.param(0)?, rhs: ops.param(1)?, out: ops.raw(2)? }
        }
        Opcode::Equals => {
            Instruction::Equals { lhs: ops.param(0)?, rhs: ops.param(1)?, out: ops.raw(2)? }
        }
        Opcode::Halt => return Ok(Step::Halt),
    };
    Ok(Step::Next(ins))
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Position => write!(f, "[{}]", self.raw),
            Mode::Immediate => write!(f, "{}", self.raw),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode().mnemonic();
        match self {
            Instruction::Add { lhs, rhs, out }
            | Instruction::Multiply { lhs, rhs, out }
            | Instruction::LessThan { lhs, rhs, out }
            | Instruction::Equals { lhs, rhs, out } => {
                write!(f, "{name} {lhs}, {rhs} -> [{out}]")
            }
            Instruction::Input { out } => write!(f, "{name} -> [{out}]"),
            Instruction::Output { src } => write!(f, "{name} {src}"),
            Instruction::JumpIfTrue { cond, target } | Instruction::JumpIfFalse { cond, target } => {
                write!(f, "{name} {cond}, {target}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem(src: &str) -> Memory {
        Memory::parse(src).unwrap()
    }

    #[test]
    fn decodes_mixed_modes() {
        let step = decode(&mem("1002,4,3,4,33"), 0).unwrap();
        assert_eq!(
            step,
            Step::Next(Instruction::Multiply {
                lhs: Param::position(4),
                rhs: Param::immediate(3),
                out: 4,
            })
        );
    }

    #[test]
    fn write_target_mode_is_ignored() {
        let step = decode(&mem("10101,1,2,3"), 0).unwrap();
        assert_eq!(
            step,
            Step::Next(Instruction::Add { lhs: Param::immediate(1), rhs: Param::position(2), out: 3 })
        );
    }

    #[test]
    fn halt_at_any_offset() {
        assert_eq!(decode(&mem("1,0,0,0,99"), 4).unwrap(), Step::Halt);
    }

    #[test]
    fn decode_errors_carry_address() {
        let err = decode(&mem("99,42"), 1).unwrap_err();
        assert_eq!(err, DecodeError::UnknownOpcode { address: 1, word: 42 }.into());

        let err = decode(&mem("1,1,1,1,201,0,0,0"), 4).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownMode { address: 4, word: 201, param: 1, digit: 2 }.into()
        );
    }

    #[test]
    fn truncated_instruction_is_out_of_bounds() {
        let err = decode(&mem("1,0,0"), 0).unwrap_err();
        assert_eq!(err, RuntimeError::OutOfBounds { address: 3, len: 3 }.into());
    }

    #[test]
    fn display() {
        let Step::Next(ins) = decode(&mem("1002,4,3,4,33"), 0).unwrap() else {
            panic!("expected instruction");
        };
        assert_eq!(ins.to_string(), "mul [4], 3 -> [4]");

        let Step::Next(ins) = decode(&mem("1105,1,9"), 0).unwrap() else {
            panic!("expected instruction");
        };
        assert_eq!(ins.to_string(), "jnz 1, 9");
    }
}
