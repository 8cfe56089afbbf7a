///
/// ## Design
///
/// * the machine is a plain owned value: no globals, any number of them can
///   exist side by side, and tests build one per case
/// * one `cycle()` is exactly one instruction and never blocks; Fx0A "waits"
///   by rewinding PC so the same instruction runs again next cycle
/// * instructions decode to an enum first, then a single match executes them;
///   unknown words decode to `Unknown` and do nothing
/// * abstract display, input and sound behind traits so the machine doesn't
///   need to know how they work; TUI in-console to start with
/// * timers tick at 60Hz from outside, alongside a fixed number of
///   instructions per frame; authentic enough for most ROMs
///
/// Model
///
/// Environment (main)
///  |-- settings, display, input, sound
///  |-- interpreter(display, input, sound, settings)
///  |    `-- machine
///  |         |-- memory map (font at 0x000, program at 0x200)
///  |         |-- framebuffer (64x32, dirty flag)
///  |         `-- instruction set
///  `-- main loop, per frame
///       |-- keys = input.poll()
///       |-- machine.cycle() x N
///       |-- machine.tick_timers()
///       |-- if machine.take_dirty() { display.draw() }
///       |-- sound.update(machine.sound_timer())
///       `-- sleep until the next frame
pub mod config;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;

pub use error::Chip8Error;
pub use framebuffer::Framebuffer;
pub use instruction::Instruction;
pub use machine::Chip8Machine;
