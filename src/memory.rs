use crate::error::Chip8Error;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the machine's flat address space.
///
/// Every address is reduced to 12 bits before it touches the backing store,
/// so nothing a program does with I or PC can index past the end of RAM.
pub trait MemoryMap {
    /// read one byte
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte
    fn write_byte(&mut self, addr: u16, value: u8);

    /// write a chunk of bytes, wrapping at the top of memory
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }

    /// fill `buf` from consecutive addresses, wrapping at the top of memory
    fn read_into(&self, addr: u16, buf: &mut [u8]) {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(addr.wrapping_add(offset as u16));
        }
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> u16 {
        let hi = self.read_byte(addr) as u16;
        let lo = self.read_byte(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// mask applied to every address; 4K of RAM needs 12 bits
pub const CHIP8_ADDR_MASK: u16 = 0x0fff;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program that fits between the program address and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex digit glyphs live, and how tall each one is
pub const CHIP8_FONT_ADDR: u16 = 0x000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;
const CHIP8_FONT_END: usize = CHIP8_FONT_ADDR as usize + CHIP8_FONT.len();

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  font (16 glyphs x 5 bytes)
///   0x0050-0x01ff  unused, zero
///   0x0200-0x0fff  program
///
/// Unlike the COSMAC VIP the stack and display are not kept in RAM, so the
/// whole upper region belongs to the program.
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize] = value;
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
        mm
    }

    /// load a CHIP-8 program at 0x200
    ///
    /// The size check happens first; on failure nothing is touched. On
    /// success everything past the font is zeroed before the copy, so no
    /// trace of a previous program survives.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::RomTooLarge {
                size: program.len(),
                max_size: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.bytes[CHIP8_FONT_END..].fill(0);
        let start = self.program_addr as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// the whole of RAM, read-only
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. only the font is baked in below the program
        assert_eq!(m.bytes[0x50..], [0; 0xfb0]);
    }

    #[test]
    fn test_font_at_bottom_of_ram() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..80], CHIP8_FONT);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 0x308);
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_write_wraps_at_top_of_ram() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0xaa, 0xbb, 0xcc], 0x0ffe);
        assert_eq!(m.bytes[0xffe..], [0xaa, 0xbb]);
        // wrapped onto the first byte of the '0' glyph
        assert_eq!(m.bytes[0], 0xcc);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200);
        assert_eq!(m.get_word(0x204), 0x0405);
    }

    #[test]
    fn test_read_word_at_top_of_ram_does_not_panic() {
        let m = Chip8MemoryMap::new();
        // low byte comes from address 0, the top of the '0' glyph
        assert_eq!(m.get_word(0x0fff), 0x00f0);
    }

    #[test]
    fn test_read_into_masks_high_addresses() {
        let m = Chip8MemoryMap::new();
        let mut buf = [0u8; 5];
        m.read_into(0x1005, &mut buf);
        assert_eq!(buf, CHIP8_FONT[5..10]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.as_slice()[0x200..0x202], [0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_load_clears_previous_program() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new();
        m.load_program(&[0x12; 64])?;
        m.write_byte(0x100, 0x99);
        m.load_program(&[0x00, 0xe0])?;
        assert_eq!(m.as_slice()[0x202..0x240], [0; 0x3e]);
        assert_eq!(m.read_byte(0x100), 0);
        assert_eq!(m.as_slice()[..80], CHIP8_FONT);
        Ok(())
    }

    #[test]
    fn test_program_fills_all_of_ram() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new();
        m.load_program(&[0x5a; CHIP8_MAX_PROGRAM_BYTES])?;
        assert_eq!(m.read_byte(0x0fff), 0x5a);
        Ok(())
    }

    #[test]
    fn test_program_too_big_is_rejected_untouched() {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0x300, 0x42);
        let result = m.load_program(&[0u8; CHIP8_MAX_PROGRAM_BYTES + 1]);
        assert!(matches!(
            result,
            Err(Chip8Error::RomTooLarge {
                size: 3585,
                max_size: 3584
            })
        ));
        assert_eq!(m.read_byte(0x300), 0x42);
        assert_eq!(m.as_slice()[..80], CHIP8_FONT);
    }
}
