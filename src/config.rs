use std::path::PathBuf;
use std::time::Duration;

/// instructions per 60Hz frame; ~600 per second is about right for most ROMs
pub const DEFAULT_CYCLES_PER_FRAME: u32 = 10;
pub const DEFAULT_FRAME_RATE: u32 = 60;
/// how long a terminal key press counts as held
pub const DEFAULT_KEY_HOLD_FRAMES: u8 = 6;

/// run-time options for the front end; the machine itself has none
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub rom_path: Option<PathBuf>,
    pub cycles_per_frame: u32,
    pub frame_rate: u32,
    pub beep: bool,
    pub seed: Option<u64>,
    pub key_hold_frames: u8,
}

impl Settings {
    /// wall-clock length of one frame; a zero rate is treated as 1Hz
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            rom_path: None,
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            frame_rate: DEFAULT_FRAME_RATE,
            beep: false,
            seed: None,
            key_hold_frames: DEFAULT_KEY_HOLD_FRAMES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_duration() {
        let s = Settings::default();
        assert_eq!(s.frame_duration(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_zero_frame_rate() {
        let s = Settings {
            frame_rate: 0,
            ..Settings::default()
        };
        assert_eq!(s.frame_duration(), Duration::from_secs(1));
    }
}
