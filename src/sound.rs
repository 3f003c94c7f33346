use beep::beep;
use std::error::Error;

use crate::signal::Signal;

pub trait Sound: Send {
    fn beep(&mut self, pitch: u16) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
}

impl Sound for Box<dyn Sound> {
    fn beep(&mut self, pitch: u16) -> Result<(), Box<dyn Error>> {
        (**self).beep(pitch)
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        (**self).stop()
    }
}

/// piano C5, D5, E5, F5; one note per pad
pub fn pitch_for(signal: Signal) -> u16 {
    match signal {
        Signal::Green => 523,
        Signal::Red => 587,
        Signal::Yellow => 659,
        Signal::Blue => 698,
    }
}

/// PC speaker, via the beep crate. needs access to the console on linux
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }

    pub fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self, pitch: u16) -> Result<(), Box<dyn Error>> {
        beep(pitch)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }
}

pub struct Mute {}
impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}
impl Default for Mute {
    fn default() -> Self {
        Self::new()
    }
}
impl Sound for Mute {
    fn beep(&mut self, _pitch: u16) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}
