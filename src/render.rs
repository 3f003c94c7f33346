use crate::error::RenderError;
use crate::signal::Signal;
use crate::sound::{pitch_for, Sound};

/// proof that a signal is currently being shown; hand it back to release it
#[derive(Debug, PartialEq, Eq)]
pub struct RenderHandle {
    signal: Signal,
}

impl RenderHandle {
    pub fn new(signal: Signal) -> Self {
        RenderHandle { signal }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }
}

/// makes a signal perceivable. the engine owns the timing: it calls activate,
/// waits out the hold, then calls release. the demo and the player's own
/// presses both come through here
pub trait SignalRenderer: Send {
    fn activate(&mut self, signal: Signal) -> Result<RenderHandle, RenderError>;

    fn release(&mut self, handle: RenderHandle) -> Result<(), RenderError>;
}

/// sounds each signal's tone. the visual pulse comes from the engine's
/// published snapshot, so this only has to deal with audio
pub struct ToneRenderer<S: Sound> {
    sound: S,
}

impl<S: Sound> ToneRenderer<S> {
    pub fn new(sound: S) -> Self {
        ToneRenderer { sound }
    }
}

impl<S: Sound> SignalRenderer for ToneRenderer<S> {
    fn activate(&mut self, signal: Signal) -> Result<RenderHandle, RenderError> {
        self.sound
            .beep(pitch_for(signal))
            .map_err(|e| RenderError::Audio {
                signal,
                reason: e.to_string(),
            })?;
        Ok(RenderHandle::new(signal))
    }

    fn release(&mut self, handle: RenderHandle) -> Result<(), RenderError> {
        self.sound.stop().map_err(|e| RenderError::Release {
            signal: handle.signal,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[derive(Default)]
    struct LoggingSound {
        log: Vec<u16>,
        broken: bool,
    }

    impl Sound for LoggingSound {
        fn beep(&mut self, pitch: u16) -> Result<(), Box<dyn Error>> {
            if self.broken {
                return Err(Box::new(io::Error::new(io::ErrorKind::Other, "no speaker")));
            }
            self.log.push(pitch);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Box<dyn Error>> {
            self.log.push(0);
            Ok(())
        }
    }

    #[test]
    fn test_tone_per_signal() -> Result<(), RenderError> {
        let mut r = ToneRenderer::new(LoggingSound::default());
        let h = r.activate(Signal::Yellow)?;
        assert_eq!(h.signal(), Signal::Yellow);
        r.release(h)?;
        let h = r.activate(Signal::Green)?;
        r.release(h)?;
        assert_eq!(r.sound.log, vec![659, 0, 523, 0]);
        Ok(())
    }

    #[test]
    fn test_audio_failure_names_signal() {
        let mut r = ToneRenderer::new(LoggingSound {
            broken: true,
            ..Default::default()
        });
        match r.activate(Signal::Blue) {
            Err(RenderError::Audio { signal, reason }) => {
                assert_eq!(signal, Signal::Blue);
                assert_eq!(reason, "no speaker");
            }
            other => panic!("expected audio error, got {:?}", other),
        }
    }
}
