use crate::error::{LoadError, StepError};

pub const MEM_SIZE: usize = 4096;
pub const FONT_ADDR: usize = 0x50;
pub const FONT_HEIGHT: usize = 5;
pub const PC_START_ADDR: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PC_START_ADDR as usize;
pub const NUM_REGISTERS: usize = 16;
pub const NUM_KEYS: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// The 4096-byte address space. The font table lives at [FONT_ADDR] and the
/// program image at [PC_START_ADDR].
///
/// Every access masks the address to 12 bits, so reads and writes cannot go
/// out of bounds regardless of what the running program puts in the index
/// register.
pub struct Memory {
    data: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let font_data = [
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
        let data = {
            let mut data = [0; MEM_SIZE];
            data[FONT_ADDR..FONT_ADDR + font_data.len()].copy_from_slice(&font_data);
            data
        };

        Memory { data }
    }

    pub fn read(&self, addr: usize) -> u8 {
        self.data[addr & (MEM_SIZE - 1)]
    }

    pub fn write(&mut self, addr: usize, value: u8) {
        self.data[addr & (MEM_SIZE - 1)] = value;
    }

    /// Copies `rom` into memory starting at [PC_START_ADDR]. Memory is left
    /// untouched when the image does not fit.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::TooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PC_START_ADDR as usize;
        self.data[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }
}

/// Return-address stack, bounded at [STACK_DEPTH] entries. The bound is part
/// of the machine model: a deeper call chain is a malformed program, not
/// something to recover from by wrapping the pointer.
pub struct CallStack {
    frames: Vec<u16>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            frames: Vec::with_capacity(STACK_DEPTH),
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), StepError> {
        if self.frames.len() == STACK_DEPTH {
            return Err(StepError::StackOverflow);
        }
        self.frames.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, StepError> {
        self.frames.pop().ok_or(StepError::StackUnderflow)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
