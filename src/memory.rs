use crate::error::Error;

// NB. addresses are u16 as per the chip-8; every access is resolved modulo
// the RAM size, so a 16-bit address can never fault

/// How much RAM we have.
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// Where programs are loaded and where the program counter starts.
pub const CHIP8_PROGRAM_ADDR: u16 = 0x200;

/// Where the built-in font lives; FX29 computes glyph addresses from here.
const CHIP8_FONT_ADDR: u16 = 0x000;

/// Height in bytes of one font glyph.
pub const CHIP8_GLYPH_HEIGHT: u16 = 5;

/// The CHIP-8 memory map: a flat 4K of RAM.
///
/// 0x000-0x1ff is reserved for the interpreter (in practice only the font
/// table occupies it); programs are loaded from 0x200 up.
pub struct Chip8MemoryMap {
    bytes: Box<[u8; CHIP8_RAM_SIZE_BYTES]>,
}

impl Chip8MemoryMap {
    /// A fresh map: zeroed RAM with the font table baked in.
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: Box::new([0u8; CHIP8_RAM_SIZE_BYTES]),
        };
        for (i, &b) in CHIP8_FONT.iter().enumerate() {
            mm.bytes[CHIP8_FONT_ADDR as usize + i] = b;
        }
        mm
    }

    /// Read one byte; the address wraps modulo the RAM size.
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % CHIP8_RAM_SIZE_BYTES]
    }

    /// Write one byte; the address wraps modulo the RAM size.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize % CHIP8_RAM_SIZE_BYTES] = value;
    }

    /// Read a big-endian two-byte word (instruction fetch).
    pub fn read_word(&self, addr: u16) -> u16 {
        (self.read(addr) as u16) << 8 | self.read(addr.wrapping_add(1)) as u16
    }

    /// Copy a raw instruction stream to the program origin.
    pub fn load_program(&mut self, data: &[u8]) -> Result<(), Error> {
        let capacity = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;
        if data.len() > capacity {
            return Err(Error::ProgramTooLarge {
                len: data.len(),
                capacity,
            });
        }
        let start = CHIP8_PROGRAM_ADDR as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Address of the built-in glyph for a digit value.
    pub fn glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + digit as u16 * CHIP8_GLYPH_HEIGHT
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Hexadecimal digit glyphs, 8x5 pixels each.
const CHIP8_FONT: [u8; 80] = [
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
    fn test_memory_zeroed_above_font() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[80..], [0; CHIP8_RAM_SIZE_BYTES - 80]);
    }

    #[test]
    fn test_font_baked_in() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[0..5], [0xF0, 0x90, 0x90, 0x90, 0xF0]); // "0"
        assert_eq!(m.bytes[75..80], [0xF0, 0x80, 0xF0, 0x80, 0x80]); // "F"
    }

    #[test]
    fn test_read_write_wrap() {
        let mut m = Chip8MemoryMap::new();
        m.write(0x1001, 0xab);
        assert_eq!(m.read(0x0001), 0xab);
        assert_eq!(m.read(0x1001), 0xab);
    }

    #[test]
    fn test_read_word_big_endian() {
        let mut m = Chip8MemoryMap::new();
        m.write(0x204, 0x12);
        m.write(0x205, 0x34);
        assert_eq!(m.read_word(0x204), 0x1234);
    }

    #[test]
    fn test_read_word_wraps_at_top_of_ram() {
        let mut m = Chip8MemoryMap::new();
        m.write(0xfff, 0xaa);
        assert_eq!(m.read_word(0xfff), 0xaaf0); // wraps onto the font table
    }

    #[test]
    fn test_program_load_ok() {
        let mut m = Chip8MemoryMap::new();
        m.load_program(&[0x00, 0xe0]).unwrap(); // clear screen
        assert_eq!(m.read(0x200), 0x00);
        assert_eq!(m.read(0x201), 0xe0);
        assert_eq!(m.read_word(CHIP8_PROGRAM_ADDR), 0x00e0);
    }

    #[test]
    fn test_program_fills_ram_exactly() {
        let mut m = Chip8MemoryMap::new();
        let prog = vec![0xee; CHIP8_RAM_SIZE_BYTES - 0x200];
        m.load_program(&prog).unwrap();
        assert_eq!(m.read(0xfff), 0xee);
    }

    #[test]
    fn test_program_too_large_rejected() {
        let mut m = Chip8MemoryMap::new();
        let prog = vec![0; CHIP8_RAM_SIZE_BYTES - 0x200 + 1];
        assert!(matches!(
            m.load_program(&prog),
            Err(Error::ProgramTooLarge {
                len: 0xe01,
                capacity: 0xe00
            })
        ));
        // and nothing was written
        assert_eq!(m.read(0x200), 0);
    }

    #[test]
    fn test_glyph_addr() {
        assert_eq!(Chip8MemoryMap::glyph_addr(0x0), 0);
        assert_eq!(Chip8MemoryMap::glyph_addr(0xf), 75);
    }
}
