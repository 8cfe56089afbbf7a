/// # machine
///
/// The CHIP-8 virtual machine proper. It owns all emulated state:
///  V0-VF  sixteen 8-bit registers; VF doubles as the carry/borrow/collision flag
///  I      16-bit index register
///  PC     16-bit program counter                -- 0x200 after reset
///  SP     stack pointer, next free slot          -- 16 return addresses
///  DT/ST  delay and sound timers, ticked from outside at 60Hz
///  RAM    4K, font at 0x000, program at 0x200
///  screen 64x32 mono framebuffer with a dirty flag
///  keys   16 pressed/released flags, written by whoever samples the keyboard
///
/// Nothing in here knows about terminals, files or wall-clock time; the
/// front end drives it one `cycle()` at a time.
use crate::error::Chip8Error;
use crate::framebuffer::Framebuffer;
use crate::instruction::{AluOp, Instruction};
use crate::memory::{self, Chip8MemoryMap, MemoryMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

/// VF
const FLAG: usize = 0xf;

/// every instruction is two bytes
const INSTRUCTION_SIZE: u16 = 2;

/// largest address reachable with 12 bits; Fx1E flags anything past it
const ADDRESS_MAX: u16 = 0x0fff;

/// tallest sprite a Dxyn can draw
const MAX_SPRITE_ROWS: usize = 15;

pub struct Chip8Machine {
    memory: Chip8MemoryMap,
    registers: [u8; REGISTER_COUNT],
    index: u16,
    program_counter: u16,
    stack_pointer: u8,
    stack: [u16; STACK_DEPTH],
    delay_timer: u8,
    sound_timer: u8,
    framebuffer: Framebuffer,
    keys: [bool; KEY_COUNT],
    rng: StdRng,
}

impl Chip8Machine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// a machine whose Cxkk sequence is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let memory = Chip8MemoryMap::new();
        let program_counter = memory.program_addr;
        Chip8Machine {
            memory,
            registers: [0; REGISTER_COUNT],
            index: 0,
            program_counter,
            stack_pointer: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: Framebuffer::new(),
            keys: [false; KEY_COUNT],
            rng,
        }
    }

    /// load a chip8 program, resetting everything but the font and the keys
    ///
    /// An oversized program is rejected before anything is touched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(program)?;
        self.registers = [0; REGISTER_COUNT];
        self.index = 0;
        self.stack_pointer = 0;
        self.stack = [0; STACK_DEPTH];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.framebuffer.clear();
        self.program_counter = self.memory.program_addr;
        log::debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// read a whole program from `reader`, then load it
    pub fn load_reader(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    /// fetch, decode and execute exactly one instruction
    pub fn cycle(&mut self) {
        let pc = self.program_counter;
        let opcode = self.memory.get_word(pc);
        // advance first; jumps, calls and skips adjust from here
        self.program_counter = pc.wrapping_add(INSTRUCTION_SIZE);
        let instruction = Instruction::decode(opcode);
        log::trace!("{:#05x}: {:04x}  {}", pc, opcode, instruction);
        self.execute(instruction);
    }

    /// decrement both timers towards zero; call at 60Hz
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn execute(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::Cls => self.framebuffer.clear(),
            Instruction::Ret => self.ret(),
            Instruction::Jump(nnn) => self.program_counter = nnn,
            Instruction::Call(nnn) => self.call(nnn),
            Instruction::SkipEqImm { x, kk } => self.skip_if(self.v(x) == kk),
            Instruction::SkipNeImm { x, kk } => self.skip_if(self.v(x) != kk),
            Instruction::SkipEqReg { x, y } => self.skip_if(self.v(x) == self.v(y)),
            Instruction::SkipNeReg { x, y } => self.skip_if(self.v(x) != self.v(y)),
            Instruction::LoadImm { x, kk } => self.set_v(x, kk),
            Instruction::AddImm { x, kk } => self.set_v(x, self.v(x).wrapping_add(kk)),
            Instruction::Alu { op, x, y } => self.alu(op, x, y),
            Instruction::SetIndex(nnn) => self.index = nnn,
            Instruction::JumpOffset(nnn) => {
                self.program_counter = nnn.wrapping_add(self.registers[0] as u16)
            }
            Instruction::Random { x, kk } => {
                let byte: u8 = self.rng.gen();
                self.set_v(x, byte & kk)
            }
            Instruction::Draw { x, y, n } => self.draw(x, y, n),
            Instruction::SkipKey { x } => self.skip_if(self.key_for(x)),
            Instruction::SkipNotKey { x } => self.skip_if(!self.key_for(x)),
            Instruction::ReadDelay { x } => self.set_v(x, self.delay_timer),
            Instruction::WaitKey { x } => self.wait_key(x),
            Instruction::SetDelay { x } => self.delay_timer = self.v(x),
            Instruction::SetSound { x } => self.sound_timer = self.v(x),
            Instruction::AddIndex { x } => {
                let sum = self.index.wrapping_add(self.v(x) as u16);
                self.index = sum;
                self.registers[FLAG] = (sum > ADDRESS_MAX) as u8;
            }
            Instruction::FontSprite { x } => {
                self.index = memory::CHIP8_FONT_ADDR
                    + self.v(x) as u16 * memory::CHIP8_FONT_GLYPH_BYTES
            }
            Instruction::StoreBcd { x } => {
                let value = self.v(x);
                self.memory
                    .write(&[value / 100, (value / 10) % 10, value % 10], self.index);
            }
            Instruction::StoreRegs { x } => {
                let count = x as usize + 1;
                self.memory.write(&self.registers[..count], self.index);
            }
            Instruction::LoadRegs { x } => {
                let count = x as usize + 1;
                self.memory
                    .read_into(self.index, &mut self.registers[..count]);
            }
            Instruction::Unknown(opcode) => {
                log::trace!("ignoring unknown opcode {:04x}", opcode);
            }
        }
    }

    fn v(&self, x: u8) -> u8 {
        self.registers[x as usize]
    }

    fn set_v(&mut self, x: u8, value: u8) {
        self.registers[x as usize] = value;
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(INSTRUCTION_SIZE);
        }
    }

    fn key_for(&self, x: u8) -> bool {
        // there is no key 16 or above, so it is never pressed
        self.keys.get(self.v(x) as usize).copied().unwrap_or(false)
    }

    fn call(&mut self, nnn: u16) {
        if self.stack_pointer as usize == STACK_DEPTH - 1 {
            log::warn!(
                "call stack full at {:#05x}; stack pointer wraps to 0",
                self.program_counter
            );
        }
        self.stack[self.stack_pointer as usize] = self.program_counter;
        self.stack_pointer = (self.stack_pointer + 1) % STACK_DEPTH as u8;
        self.program_counter = nnn;
    }

    fn ret(&mut self) {
        if self.stack_pointer == 0 {
            log::warn!(
                "return with empty call stack at {:#05x}; stack pointer wraps to 15",
                self.program_counter
            );
        }
        self.stack_pointer = (self.stack_pointer + STACK_DEPTH as u8 - 1) % STACK_DEPTH as u8;
        self.program_counter = self.stack[self.stack_pointer as usize];
    }

    /// 8xyN; the result lands in Vx first and the flag in VF last, so the
    /// flag wins when x is F
    fn alu(&mut self, op: AluOp, x: u8, y: u8) {
        let vx = self.v(x);
        let vy = self.v(y);
        let flag = match op {
            AluOp::Copy => {
                self.set_v(x, vy);
                None
            }
            AluOp::Or => {
                self.set_v(x, vx | vy);
                None
            }
            AluOp::And => {
                self.set_v(x, vx & vy);
                None
            }
            AluOp::Xor => {
                self.set_v(x, vx ^ vy);
                None
            }
            AluOp::Add => {
                let (sum, carry) = vx.overflowing_add(vy);
                self.set_v(x, sum);
                Some(carry as u8)
            }
            AluOp::Sub => {
                self.set_v(x, vx.wrapping_sub(vy));
                Some((vx > vy) as u8)
            }
            AluOp::ShiftRight => {
                self.set_v(x, vx >> 1);
                Some(vx & 0x01)
            }
            AluOp::SubReverse => {
                self.set_v(x, vy.wrapping_sub(vx));
                Some((vy > vx) as u8)
            }
            AluOp::ShiftLeft => {
                self.set_v(x, vx << 1);
                Some(vx >> 7)
            }
        };
        if let Some(flag) = flag {
            self.registers[FLAG] = flag;
        }
    }

    fn draw(&mut self, x: u8, y: u8, n: u8) {
        let mut sprite = [0u8; MAX_SPRITE_ROWS];
        let rows = &mut sprite[..n as usize];
        self.memory.read_into(self.index, rows);
        let (vx, vy) = (self.v(x), self.v(y));
        let collision = self.framebuffer.draw_sprite(vx, vy, rows);
        self.registers[FLAG] = collision as u8;
    }

    /// Fx0A blocks by rewinding PC until a key is down, so a single cycle
    /// never blocks the caller
    fn wait_key(&mut self, x: u8) {
        match self.keys.iter().position(|pressed| *pressed) {
            Some(key) => self.set_v(x, key as u8),
            None => {
                self.program_counter = self.program_counter.wrapping_sub(INSTRUCTION_SIZE)
            }
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// the dirty flag, reset as it is read
    pub fn take_dirty(&mut self) -> bool {
        let dirty = self.framebuffer.is_dirty();
        self.framebuffer.clear_dirty();
        dirty
    }

    pub fn clear_dirty(&mut self) {
        self.framebuffer.clear_dirty();
    }

    pub fn set_key(&mut self, key: usize, pressed: bool) {
        match self.keys.get_mut(key) {
            Some(k) => *k = pressed,
            None => log::debug!("ignoring out of range key {}", key),
        }
    }

    pub fn set_keys(&mut self, keys: &[bool; KEY_COUNT]) {
        self.keys = *keys;
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    /// whether the front end should be beeping
    pub fn is_sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// whether the next cycle will poll for a key (Fx0A)
    pub fn is_waiting_for_key(&self) -> bool {
        matches!(
            Instruction::decode(self.memory.get_word(self.program_counter)),
            Instruction::WaitKey { .. }
        )
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }
}

impl Default for Chip8Machine {
    fn default() -> Self {
        Self::new()
    }
}
