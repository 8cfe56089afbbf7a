/// # interpreter
///
/// Ties a `Chip8Machine` to a display, an input device and a sound device,
/// and runs it in 60Hz frames:
///
///  1. sample input, hand the key states to the machine
///  2. run `cycles_per_frame` instructions
///  3. tick the timers
///  4. redraw if the framebuffer is dirty
///  5. start or stop the beep
///  6. sleep until the next frame is due
///
/// Timing is per frame rather than per machine cycle, so instructions run in
/// short bursts; wall-clock speed looks right even if it isn't authentic.
use crate::config::Settings;
use crate::error::Chip8Error;
use crate::input::InputEvent;
use crate::machine::Chip8Machine;
use crate::{display, input, sound};
use spin_sleep::SpinSleeper;
use std::error::Error;
use std::io;
use std::time::Instant;

pub struct Chip8Interpreter<'a> {
    machine: Chip8Machine,
    display: &'a mut dyn display::Display,
    input: &'a mut dyn input::Input,
    sound: &'a mut dyn sound::Sound,
    settings: Settings,
    frames: u64,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut impl display::Display,
        input: &'a mut impl input::Input,
        sound: &'a mut impl sound::Sound,
        settings: Settings,
    ) -> Chip8Interpreter<'a> {
        let machine = match settings.seed {
            Some(seed) => Chip8Machine::with_seed(seed),
            None => Chip8Machine::new(),
        };
        Chip8Interpreter {
            machine,
            display,
            input,
            sound,
            settings,
            frames: 0,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        self.machine.load_reader(reader)
    }

    pub fn machine(&self) -> &Chip8Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Chip8Machine {
        &mut self.machine
    }

    /// frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// one frame, without any sleeping
    pub fn run_frame(&mut self) -> Result<InputEvent, Box<dyn Error>> {
        if self.input.poll()? == InputEvent::Quit {
            return Ok(InputEvent::Quit);
        }
        self.machine.set_keys(&self.input.keys());

        for _ in 0..self.settings.cycles_per_frame {
            self.machine.cycle();
        }
        self.machine.tick_timers();

        if self.machine.take_dirty() {
            self.display.draw(self.machine.framebuffer())?;
        }
        self.sound.update(self.machine.sound_timer())?;
        self.frames += 1;
        Ok(InputEvent::Continue)
    }

    /// run frames at the configured rate until the input asks to quit or
    /// `max_frames` have run
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<(), Box<dyn Error>> {
        let sleeper = SpinSleeper::default();
        let frame = self.settings.frame_duration();
        let mut next_frame = Instant::now() + frame;

        while max_frames.map_or(true, |max| self.frames < max) {
            if self.run_frame()? == InputEvent::Quit {
                log::debug!("quit requested after {} frames", self.frames);
                break;
            }

            let now = Instant::now();
            if next_frame > now {
                sleeper.sleep(next_frame - now);
                next_frame += frame;
            } else {
                // running behind; don't try to catch up with a burst of frames
                next_frame = now + frame;
            }
        }
        self.sound.update(0)?;
        Ok(())
    }
}
