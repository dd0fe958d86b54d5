use crate::error::DecodeError;

/// How a parameter word is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// The word is an address to dereference.
    #[default]
    Position,
    /// The word is the value itself.
    Immediate,
}

impl Mode {
    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(Mode::Position),
            1 => Some(Mode::Immediate),
            _ => None,
        }
    }

    pub fn digit(self) -> i64 {
        match self {
            Mode::Position => 0,
            Mode::Immediate => 1,
        }
    }
}

/// Mode digits an instruction word can carry: one per parameter of the
/// widest instruction.
pub const MAX_MODES: usize = 3;

/// Decode the modes of the first `count` parameters of `word`.
///
/// Digits above the opcode are read least-significant first, so the
/// hundreds digit is parameter 1. Parameters without a digit default to
/// [`Mode::Position`]. Every digit present is validated; digits past
/// `count` are then dropped. A word with more than [`MAX_MODES`] mode
/// digits is rejected.
pub fn decode_modes(word: i64, count: usize) -> Result<Vec<Mode>, DecodeError> {
    let mut rest = word / 100;
    if rest >= 1000 {
        return Err(DecodeError::ExcessModes { address: 0, word, params: MAX_MODES });
    }

    let mut modes = Vec::with_capacity(MAX_MODES);
    for param in 1..=MAX_MODES {
        let digit = rest % 10;
        rest /= 10;
        let mode = Mode::from_digit(digit)
            .ok_or(DecodeError::UnknownMode { address: 0, word, param, digit })?;
        modes.push(mode);
    }

    modes.truncate(count);
    Ok(modes)
}
