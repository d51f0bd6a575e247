use std::convert::TryFrom;

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[non_exhaustive]
pub enum Opcode {
    Return,
    Constant,
    Nil,
    True,
    False,
    Negate,
    Add,
    Subtract,
    Multiply,
    Divide,
    Not,
    Equal,
    Greater,
    Less,
    Concat,
}

impl Opcode {
    pub fn to_str(self) -> &'static str {
        match self {
            Opcode::Return => "Return",
            Opcode::Constant => "Constant",
            Opcode::Nil => "Nil",
            Opcode::True => "True",
            Opcode::False => "False",
            Opcode::Negate => "Negate",
            Opcode::Add => "Add",
            Opcode::Subtract => "Subtract",
            Opcode::Multiply => "Multiply",
            Opcode::Divide => "Divide",
            Opcode::Not => "Not",
            Opcode::Equal => "Equal",
            Opcode::Greater => "Greater",
            Opcode::Less => "Less",
            Opcode::Concat => "Concat",
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as _
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Return),
            1 => Ok(Opcode::Constant),
            2 => Ok(Opcode::Nil),
            3 => Ok(Opcode::True),
            4 => Ok(Opcode::False),
            5 => Ok(Opcode::Negate),
            6 => Ok(Opcode::Add),
            7 => Ok(Opcode::Subtract),
            8 => Ok(Opcode::Multiply),
            9 => Ok(Opcode::Divide),
            10 => Ok(Opcode::Not),
            11 => Ok(Opcode::Equal),
            12 => Ok(Opcode::Greater),
            13 => Ok(Opcode::Less),
            14 => Ok(Opcode::Concat),
            n => Err(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("Too many constants in one chunk.")]
    TooManyConstants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unknown opcode {byte} at offset {offset}.")]
    UnknownOpcode { offset: usize, byte: u8 },
    #[error("Missing operand for instruction at offset {offset}.")]
    MissingOperand { offset: usize },
    #[error("Constant {index} out of range at offset {offset} (pool holds {len}).")]
    ConstantOutOfRange { offset: usize, index: u8, len: usize },
}

/// A decoded instruction, operands checked against the chunk it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Constant(u8),
    Op(Opcode),
}

impl Instruction {
    pub fn opcode(self) -> Opcode {
        match self {
            Instruction::Constant(_) => Opcode::Constant,
            Instruction::Op(op) => op,
        }
    }
}

#[derive(Debug, Default)]
pub struct Chunk {
    pub code: Vec<u8>,
    pub lines: Vec<usize>,
    pub constants: Vec<Value>,
}

impl Chunk {
    pub fn new() -> Chunk {
        Chunk {
            code: Vec::new(),
            lines: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn write(&mut self, byte: impl Into<u8>, line: usize) {
        self.code.push(byte.into());
        self.lines.push(line);
    }

    /// Constants are not deduplicated; every call gets a fresh slot.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Adds `value` to the pool and emits the `Constant` instruction loading
    /// it.
    pub fn write_constant(
        &mut self,
        value: Value,
        line: usize,
    ) -> Result<(), ChunkError> {
        let index = u8::try_from(self.constants.len())
            .map_err(|_| ChunkError::TooManyConstants)?;
        self.add_constant(value);
        self.write(Opcode::Constant, line);
        self.write(index, line);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn line(&self, offset: usize) -> Option<usize> {
        self.lines.get(offset).copied()
    }

    /// Decodes the instruction at `offset` and returns it with the offset of
    /// the one after it. An `offset` at or past the end of the code is a
    /// `MissingOperand`.
    pub fn decode(
        &self,
        offset: usize,
    ) -> Result<(Instruction, usize), DecodeError> {
        let byte = *self
            .code
            .get(offset)
            .ok_or(DecodeError::MissingOperand { offset })?;
        let op = Opcode::try_from(byte)
            .map_err(|byte| DecodeError::UnknownOpcode { offset, byte })?;

        match op {
            Opcode::Constant => {
                let index = *self
                    .code
                    .get(offset + 1)
                    .ok_or(DecodeError::MissingOperand { offset })?;
                if index as usize >= self.constants.len() {
                    return Err(DecodeError::ConstantOutOfRange {
                        offset,
                        index,
                        len: self.constants.len(),
                    });
                }
                Ok((Instruction::Constant(index), offset + 2))
            }
            op => Ok((Instruction::Op(op), offset + 1)),
        }
    }
}
