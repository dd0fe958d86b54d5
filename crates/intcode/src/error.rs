use thiserror::Error;

use crate::opcode::Opcode;

/// Malformed program source. Nothing is loaded when this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty program")]
    Empty,
    #[error("token {index} is not an integer: {token:?}")]
    InvalidToken { index: usize, token: String },
}

/// The word at the instruction pointer does not describe an instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unrecognised opcode {word} at {address}")]
    UnknownOpcode { address: usize, word: i64 },
    #[error("unrecognised mode {digit} for parameter {param} of {word} at {address}")]
    UnknownMode { address: usize, word: i64, param: usize, digit: i64 },
    #[error("{word} at {address} carries modes for more than {params} parameters")]
    ExcessModes { address: usize, word: i64, params: usize },
}

impl DecodeError {
    /// Re-anchor an error produced without knowing where the word lives.
    pub(crate) fn at(self, address: usize) -> Self {
        match self {
            DecodeError::UnknownOpcode { word, .. } => DecodeError::UnknownOpcode { address, word },
            DecodeError::UnknownMode { word, param, digit, .. } => {
                DecodeError::UnknownMode { address, word, param, digit }
            }
            DecodeError::ExcessModes { word, params, .. } => {
                DecodeError::ExcessModes { address, word, params }
            }
        }
    }
}

/// Fatal condition hit while executing a decoded instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("address {address} out of bounds (memory length {len})")]
    OutOfBounds { address: i64, len: usize },
    #[error("input requested at {address} but no input was supplied")]
    MissingInput { address: usize },
    #[error("{opcode:?} at {address} overflowed")]
    Overflow { address: usize, opcode: Opcode },
    #[error("fuel exhausted after {limit} instructions")]
    FuelExhausted { limit: u64 },
    #[error("output failed: {0}")]
    Output(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("parse: {0}")]
    Parse(#[from] ParseError),
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("runtime: {0}")]
    Runtime(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, VmError>;
