use getset::CopyGetters;
use miette::Diagnostic;
use thiserror::Error;

/// An instruction word that no instruction decodes from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error, Diagnostic, CopyGetters)]
#[error("Invalid opcode {opcode:04X} at {pc:03X}")]
#[diagnostic(
    code(c8core::invalid_opcode),
    help("the program counter may have run into data, or the program targets an extended instruction set")
)]
#[getset(get_copy = "pub")]
pub struct OpcodeFault {
    opcode: u16,
    pc: u16,
}

impl OpcodeFault {
    pub fn new(opcode: u16, pc: u16) -> Self {
        Self { opcode, pc }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error, Diagnostic)]
pub enum ExecutionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidOpcode(#[from] OpcodeFault),
    #[error("Call stack overflow at {pc:03X}")]
    #[diagnostic(code(c8core::stack_overflow), help("subroutines nest at most 16 deep"))]
    StackOverflow { pc: u16 },
    #[error("Return with an empty call stack at {pc:03X}")]
    #[diagnostic(code(c8core::stack_underflow))]
    StackUnderflow { pc: u16 },
    #[error("Program counter {pc:04X} is outside memory")]
    #[diagnostic(code(c8core::out_of_bounds))]
    OutOfBounds { pc: u16 },
}

impl ExecutionError {
    /// Where execution stopped.
    pub fn pc(&self) -> u16 {
        match *self {
            Self::InvalidOpcode(fault) => fault.pc(),
            Self::StackOverflow { pc } | Self::StackUnderflow { pc } | Self::OutOfBounds { pc } => pc,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error, Diagnostic)]
pub enum LoadError {
    #[error("Program of {requested} bytes does not fit in the {capacity} bytes available")]
    #[diagnostic(code(c8core::program_too_large))]
    ProgramTooLarge { requested: usize, capacity: usize },
}
