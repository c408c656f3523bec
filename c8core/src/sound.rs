use log::trace;

/// Whatever makes the beep when the sound timer runs out.
pub trait Buzzer: Send {
    fn play(&mut self);
}

impl<F: FnMut() + Send> Buzzer for F {
    fn play(&mut self) {
        self()
    }
}

/// Used until a host registers its own buzzer.
#[derive(Debug, Copy, Clone, Default)]
pub struct Silent;

impl Buzzer for Silent {
    fn play(&mut self) {
        trace!("Buzzer would sound, but none is attached.");
    }
}
