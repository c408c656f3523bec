use crate::error::ExecutionError;
use crate::Address;

pub const STACK_DEPTH: usize = 16;

/// Return addresses of the subroutines currently being executed.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_copy_implementations)]
pub struct CallStack {
    frames: [Address; STACK_DEPTH],
    depth: usize,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StackError {
    Overflow,
    Underflow,
}

impl StackError {
    /// Attaches the program counter of the offending instruction.
    pub fn at(self, pc: u16) -> ExecutionError {
        match self {
            Self::Overflow => ExecutionError::StackOverflow { pc },
            Self::Underflow => ExecutionError::StackUnderflow { pc },
        }
    }
}

impl CallStack {
    pub fn new() -> Self {
        Self {
            frames: [Address::ZERO; STACK_DEPTH],
            depth: 0,
        }
    }

    pub fn push(&mut self, addr: Address) -> Result<(), StackError> {
        let slot = self.frames.get_mut(self.depth).ok_or(StackError::Overflow)?;
        *slot = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Address, StackError> {
        let depth = self.depth.checked_sub(1).ok_or(StackError::Underflow)?;
        self.depth = depth;
        Ok(self.frames[depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// Live frames, oldest first.
    pub fn frames(&self) -> &[Address] {
        &self.frames[..self.depth]
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
