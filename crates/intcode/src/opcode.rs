use crate::error::DecodeError;

/// Operation selected by the two low decimal digits of an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Add = 1,
    Multiply = 2,
    Input = 3,
    Output = 4,
    JumpIfTrue = 5,
    JumpIfFalse = 6,
    LessThan = 7,
    Equals = 8,
    Halt = 99,
}

impl Opcode {
    /// Extract the opcode from a full instruction word, ignoring mode digits.
    ///
    /// The returned error carries address 0; callers that know where the
    /// word was fetched from re-anchor it.
    pub fn from_word(word: i64) -> Result<Self, DecodeError> {
        let unknown = DecodeError::UnknownOpcode { address: 0, word };
        if word < 0 {
            return Err(unknown);
        }
        match word % 100 {
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Multiply),
            3 => Ok(Opcode::Input),
            4 => Ok(Opcode::Output),
            5 => Ok(Opcode::JumpIfTrue),
            6 => Ok(Opcode::JumpIfFalse),
            7 => Ok(Opcode::LessThan),
            8 => Ok(Opcode::Equals),
            99 => Ok(Opcode::Halt),
            _ => Err(unknown),
        }
    }

    /// Width in words, opcode cell included.
    pub fn size(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 4,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 3,
            Opcode::Input | Opcode::Output => 2,
            Opcode::Halt => 1,
        }
    }

    pub fn params(self) -> usize {
        self.size() - 1
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Multiply => "mul",
            Opcode::Input => "in",
            Opcode::Output => "out",
            Opcode::JumpIfTrue => "jnz",
            Opcode::JumpIfFalse => "jz",
            Opcode::LessThan => "lt",
            Opcode::Equals => "eq",
            Opcode::Halt => "halt",
        }
    }
}
