use crate::GeneralRegister;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum InterpreterState {
    #[default]
    Normal,
    /// Suspended by `Fx0A`; the next key press lands in this register.
    WaitForKey(GeneralRegister),
}

/// What a host should act on after a tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct TickReport {
    executed: bool,
    screen_modified: bool,
    buzzer_played: bool,
    wait_for_key: Option<GeneralRegister>,
}

impl TickReport {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn waiting(register: GeneralRegister) -> Self {
        Self {
            wait_for_key: Some(register),
            ..Self::empty()
        }
    }

    pub(crate) fn execute(&mut self) {
        self.executed = true;
    }

    pub(crate) fn modify_screen(&mut self) {
        self.screen_modified = true;
    }

    pub(crate) fn buzz(&mut self) {
        self.buzzer_played = true;
    }

    pub(crate) fn wait_for_key_on(&mut self, register: GeneralRegister) {
        self.wait_for_key = Some(register);
    }

    /// Whether an instruction ran, as opposed to the tick being skipped while waiting for a key.
    pub fn executed(&self) -> bool {
        self.executed
    }

    pub fn screen_modified(&self) -> bool {
        self.screen_modified
    }

    pub fn buzzer_played(&self) -> bool {
        self.buzzer_played
    }

    pub fn waiting_for_key(&self) -> Option<GeneralRegister> {
        self.wait_for_key
    }
}
