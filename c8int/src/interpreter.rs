use crate::prelude::*;
use log::{debug, error, info, warn};
use miette::Diagnostic;
use std::io::{self, Stdout, Write};
use std::path::Path;
use tap::prelude::*;
use thiserror::Error;

/// Drives a [`Chip8`] without a window: keys come from a fixed set held down
/// from the start, frames are left for the caller to print, and the buzzer is
/// the terminal bell.
#[derive(Debug)]
pub struct Chip8Interpreter {
    core: Chip8,
    held_keys: Vec<u8>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum RomError {
    #[error("Could not read the ROM file")]
    #[diagnostic(code(c8int::rom_unreadable))]
    Io(#[from] io::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
    pub beeps: u64,
    /// The program waited for a key while none were held.
    pub stalled: bool,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.screen_modified() {
            self.frames += 1;
        }
        if report.buzzer_played() {
            self.beeps += 1;
        }
    }
}

impl Chip8Interpreter {
    pub fn new(core: Chip8) -> Self {
        Self {
            core,
            held_keys: vec![],
        }
    }

    pub fn new_from_bytes(bytes: &[u8], seed: Option<u64>) -> Result<Self, LoadError> {
        let mut core = match seed {
            Some(seed) => Chip8::with_seed(seed),
            None => Chip8::new(),
        };
        core.load_program(bytes)?;
        Ok(Self::new(core))
    }

    pub fn new_from_file(path: impl AsRef<Path>, seed: Option<u64>) -> Result<Self, RomError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .tap_err(|e| error!("Failed to read {}: {}", path.display(), e))?;
        info!("Read {} bytes from {}.", bytes.len(), path.display());
        Ok(Self::new_from_bytes(&bytes, seed)?)
    }

    /// Holds `keys` down for the whole run.
    pub fn holding(mut self, keys: impl IntoIterator<Item = u8>) -> Self {
        for key in keys {
            self.core.key_press(key);
            self.held_keys.push(key);
        }
        self
    }

    pub fn with_buzzer(mut self, buzzer: impl Buzzer + 'static) -> Self {
        self.core.on_sound(buzzer);
        self
    }

    pub fn core(&self) -> &Chip8 {
        &self.core
    }

    pub fn display(&self) -> &Display {
        self.core.display()
    }

    /// Ticks up to `ticks` times, stopping early on a fault or on a key wait that nothing can satisfy.
    ///
    /// A wait is satisfied by lifting and pressing again the first held key.
    pub fn run(&mut self, ticks: u64) -> Result<RunSummary, ExecutionError> {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            let report = self
                .core
                .tick()
                .tap_err(|e| error!("Stopped after {} ticks: {}", summary.ticks, e))?;
            summary.record(&report);

            if let Some(register) = report.waiting_for_key() {
                match self.held_keys.first().copied() {
                    Some(key) => {
                        debug!("Repeating key {:X} for {:?}.", key, register);
                        self.core.key_release(key);
                        self.core.key_press(key);
                    }
                    None => {
                        info!("{:?} is waiting for a key but none are held, stopping.", register);
                        summary.stalled = true;
                        break;
                    }
                }
            }
        }
        Ok(summary)
    }
}

/// Beeps by writing the ASCII bell character.
#[derive(Debug)]
pub struct TerminalBell<W = Stdout> {
    out: W,
}

impl TerminalBell {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn to_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Buzzer for TerminalBell<W> {
    fn play(&mut self) {
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            warn!("Could not ring the terminal bell: {}", e);
        }
    }
}
