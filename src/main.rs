use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;

use chip8vm::config::{
    Settings, DEFAULT_CYCLES_PER_FRAME, DEFAULT_FRAME_RATE, DEFAULT_KEY_HOLD_FRAMES,
};
use chip8vm::display::MonoTermDisplay;
use chip8vm::input::TermInput;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

/// CHIP-8 in the terminal. Keys 1-4/q-r/a-f/z-v are the keypad; Esc quits.
///
/// Logs go to stderr under RUST_LOG, which shares the screen with the
/// display; redirect it (`2>chip8vm.log`) when logging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// ROM to run; without one the machine idles on empty memory
    rom: Option<PathBuf>,

    #[arg(short, long, default_value_t = DEFAULT_CYCLES_PER_FRAME, help = "Instructions per frame")]
    cycles: u32,

    #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE, help = "Frames (and timer ticks) per second")]
    frame_rate: u32,

    #[arg(long, help = "Beep on the PC speaker while the sound timer runs")]
    beep: bool,

    #[arg(long, help = "Seed for the random number instruction")]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_KEY_HOLD_FRAMES, help = "Frames a key press stays held")]
    hold: u8,

    #[arg(long, help = "Stop after this many frames")]
    frames: Option<u64>,
}

impl From<&Args> for Settings {
    fn from(args: &Args) -> Self {
        Settings {
            rom_path: args.rom.clone(),
            cycles_per_frame: args.cycles,
            frame_rate: args.frame_rate,
            beep: args.beep,
            seed: args.seed,
            key_hold_frames: args.hold,
        }
    }
}

fn run(
    settings: Settings,
    sound: &mut impl Sound,
    max_frames: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    // initialise
    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new(settings.key_hold_frames)?;
    let rom_path = settings.rom_path.clone();
    let mut interpreter = Chip8Interpreter::new(&mut display, &mut input, sound, settings);

    // load a program; a bad ROM leaves the machine running on empty memory
    if let Some(path) = rom_path {
        match File::open(&path) {
            Ok(mut f) => {
                if let Err(e) = interpreter.load_program(&mut f) {
                    log::error!("failed to load ROM {}: {}", path.display(), e);
                }
            }
            Err(e) => log::error!("failed to open ROM {}: {}", path.display(), e),
        }
    }

    interpreter.main_loop(max_frames)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let settings = Settings::from(&args);

    let result = if settings.beep {
        run(settings, &mut SimpleBeep::new(), args.frames)
    } else {
        run(settings, &mut Mute::new(), args.frames)
    };

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..4 {
        println!();
    }
    result
}
