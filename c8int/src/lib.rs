mod interpreter;

pub use interpreter::{Chip8Interpreter, RomError, RunSummary, TerminalBell};

pub(crate) mod prelude {
    pub(crate) use c8core::control::TickReport;
    pub(crate) use c8core::error::{ExecutionError, LoadError};
    pub(crate) use c8core::sound::Buzzer;
    pub(crate) use c8core::{Chip8, Display};
}
