use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, RuntimeError};

/// Flat, zero-indexed program memory. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
}

impl Memory {
    /// Parse comma-separated decimal integers.
    ///
    /// A single trailing newline (`\n` or `\r\n`) is accepted; any other
    /// whitespace makes the surrounding token invalid.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let body = match source.strip_suffix('\n') {
            Some(line) => line.strip_suffix('\r').unwrap_or(line),
            None => source,
        };
        if body.is_empty() {
            return Err(ParseError::Empty);
        }

        let cells = body
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                token.parse::<i64>().map_err(|_| ParseError::InvalidToken {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    fn index(&self, address: i64) -> Result<usize, RuntimeError> {
        usize::try_from(address)
            .ok()
            .filter(|&i| i < self.cells.len())
            .ok_or(RuntimeError::OutOfBounds { address, len: self.cells.len() })
    }

    pub fn read(&self, address: i64) -> Result<i64, RuntimeError> {
        let i = self.index(address)?;
        Ok(self.cells[i])
    }

    pub fn write(&mut self, address: i64, value: i64) -> Result<(), RuntimeError> {
        let i = self.index(address)?;
        self.cells[i] = value;
        Ok(())
    }

    /// Comma-joined decimal text, the inverse of [`Memory::parse`].
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Content id of the serialized memory: `b3:<hex>`.
    pub fn cid(&self) -> String {
        let hash = blake3::hash(self.serialize().as_bytes());
        format!("b3:{}", hex::encode(hash.as_bytes()))
    }
}

impl TryFrom<Vec<i64>> for Memory {
    type Error = ParseError;

    fn try_from(cells: Vec<i64>) -> Result<Self, Self::Error> {
        if cells.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(Self { cells })
    }
}

impl FromStr for Memory {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn parse_accepts_one_trailing_newline() {
        assert_eq!(Memory::parse("1,2,3\n").unwrap().cells(), &[1, 2, 3]);
        assert_eq!(Memory::parse("1,2,3\r\n").unwrap().cells(), &[1, 2, 3]);
        assert_eq!(Memory::parse("-7").unwrap().cells(), &[-7]);
    }

    #[test]
    fn parse_rejects_whitespace_and_garbage() {
        for (src, index) in [("1, 2", 1), (" 1,2", 0), ("1,2\n\n", 1), ("1,,2", 1), ("1,x", 1)] {
            match Memory::parse(src) {
                Err(ParseError::InvalidToken { index: got, .. }) => {
                    assert_eq!(got, index, "wrong token index for {src:?}")
                }
                other => panic!("expected invalid token for {src:?}, got {other:?}"),
            }
        }
        assert_eq!(Memory::parse(""), Err(ParseError::Empty));
        assert_eq!(Memory::parse("\n"), Err(ParseError::Empty));
    }

    #[test]
    fn serialize_round_trips_random_programs() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let len = rng.gen_range(1..40);
            let text = (0..len)
                .map(|_| rng.gen_range(-100_000i64..100_000).to_string())
                .collect::<Vec<_>>()
                .join(",");
            assert_eq!(Memory::parse(&text).unwrap().serialize(), text);
        }
    }

    #[test]
    fn bounds_checked_access() {
        let mut mem = Memory::parse("5,6,7").unwrap();
        assert_eq!(mem.read(2).unwrap(), 7);
        mem.write(0, 9).unwrap();
        assert_eq!(mem.serialize(), "9,6,7");

        assert_eq!(mem.read(3), Err(RuntimeError::OutOfBounds { address: 3, len: 3 }));
        assert_eq!(mem.write(-1, 0), Err(RuntimeError::OutOfBounds { address: -1, len: 3 }));
    }

    #[test]
    fn empty_vec_is_not_memory() {
        assert_eq!(Memory::try_from(Vec::new()), Err(ParseError::Empty));
        assert_eq!(Memory::try_from(vec![99]).unwrap().len(), 1);
    }

    #[test]
    fn cid_tracks_content() {
        let a = Memory::parse("1,0,0,0,99").unwrap();
        let mut b = a.clone();
        assert_eq!(a.cid(), b.cid());
        assert!(a.cid().starts_with("b3:"));
        assert_eq!(a.cid().len(), 3 + 64);

        b.write(0, 2).unwrap();
        assert_ne!(a.cid(), b.cid());
    }
}
