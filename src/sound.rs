use beep::beep;
use std::error::Error;
use std::time::Duration;

/// Emits the sound-timer beep. The interpreter signals one beep per 1 -> 0
/// transition of the sound timer; how it sounds is up to the implementation.
pub trait Audio {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C
const SIMPLEBEEP_DURATION: Duration = Duration::from_millis(60);

/// PC-speaker style tone via the beep crate. Tones are level-triggered, so
/// a one-shot beep is tone-on, short sleep, tone-off.
pub struct SimpleBeep;

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep
    }
}

impl Audio for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        spin_sleep::sleep(SIMPLEBEEP_DURATION);
        beep(0)?;
        Ok(())
    }
}

/// Silence.
pub struct Mute;

impl Mute {
    pub fn new() -> Self {
        Mute
    }
}

impl Audio for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}

/// Test double that counts beeps instead of making any noise.
pub struct CountingBeep {
    pub beeps: usize,
}

impl CountingBeep {
    pub fn new() -> Self {
        CountingBeep { beeps: 0 }
    }
}

impl Audio for CountingBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.beeps += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_is_silent_and_ok() {
        assert!(Mute::new().beep().is_ok());
    }

    #[test]
    fn test_counting_beep_counts() {
        let mut audio = CountingBeep::new();
        audio.beep().unwrap();
        audio.beep().unwrap();
        assert_eq!(audio.beeps, 2);
    }
}
