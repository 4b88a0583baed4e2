use crate::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FrameBuffer};
use crate::error::{LoadError, StepError};
use crate::instruction::{Instruction, decode};
use crate::state::{
    CallStack, FONT_ADDR, FONT_HEIGHT, Memory, NUM_KEYS, NUM_REGISTERS, PC_START_ADDR,
};

/// How the program counter moves after an instruction executes.
enum Flow {
    /// Advance past the current instruction.
    Next,
    /// Advance past the current and the following instruction.
    Skip,
    /// Transfer control to an absolute address.
    Jump(u16),
    /// Leave pc alone so the same instruction runs again (key-wait).
    Stall,
}

/// A complete CHIP-8 machine: memory, registers, call stack, timers, input
/// latch, and framebuffer.
///
/// The host drives it through two independent entry points: [Chip8::step]
/// executes exactly one instruction, [Chip8::tick_timers] decrements both
/// timers by one. Timers are deliberately not clocked from `step` — the host
/// ticks them at a fixed cadence (nominally 60 Hz) no matter how fast it
/// runs instructions.
///
/// Neither call blocks. The key-wait instruction is the only suspension
/// point, and it suspends by leaving pc in place and returning, relying on
/// the host to call `step` again.
pub struct Chip8 {
    memory: Memory,
    v: [u8; NUM_REGISTERS],
    i: u16,
    pc: u16,
    stack: CallStack,
    delay_timer: u8,
    sound_timer: u8,
    keys: [bool; NUM_KEYS],
    frame: FrameBuffer,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8 {
            memory: Memory::new(),
            v: [0; NUM_REGISTERS],
            i: 0,
            pc: PC_START_ADDR,
            stack: CallStack::new(),
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; NUM_KEYS],
            frame: FrameBuffer::new(),
        }
    }

    /// Loads a program image at the conventional start address. Fails with
    /// [LoadError::TooLarge] for images over 3584 bytes, leaving the VM
    /// untouched.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.memory.load_rom(rom)
    }

    /// Fetches, decodes, and executes one instruction.
    ///
    /// On [StepError::Decode] the program counter still points at the
    /// offending word; the caller decides between aborting and calling
    /// [Chip8::skip] to step over it. Stalling forever on an unknown opcode
    /// is not an option the core offers.
    pub fn step(&mut self) -> Result<(), StepError> {
        let word = self.fetch();
        let instruction = decode(word)?;

        match self.execute(instruction)? {
            Flow::Next => self.pc = self.pc.wrapping_add(2),
            Flow::Skip => self.pc = self.pc.wrapping_add(4),
            Flow::Jump(addr) => self.pc = addr,
            Flow::Stall => {}
        }
        Ok(())
    }

    /// Advances pc past the current instruction without executing it. The
    /// skip-and-continue half of the unknown-opcode policy.
    pub fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Decrements the delay and sound timers by one, floored at zero. Meant
    /// to be called at a fixed real-time cadence, independent of [Chip8::step].
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Records a key press or release in the input latch. Indices outside
    /// 0..=15 are ignored.
    pub fn set_key(&mut self, key: usize, pressed: bool) {
        if key < NUM_KEYS {
            self.keys[key] = pressed;
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Clears the framebuffer dirty flag; the host calls this after
    /// consuming a frame.
    pub fn clear_frame_flag(&mut self) {
        self.frame.clear_dirty();
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// Reads the big-endian instruction word at pc.
    fn fetch(&self) -> u16 {
        let high_byte = self.memory.read(self.pc as usize);
        let low_byte = self.memory.read(self.pc as usize + 1);
        (u16::from(high_byte) << 8) | u16::from(low_byte)
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Flow, StepError> {
        let flow = match instruction {
            Instruction::ClearScreen => {
                self.frame.clear();
                Flow::Next
            }
            Instruction::Return => {
                let addr = self.stack.pop()?;
                Flow::Jump(addr.wrapping_add(2))
            }
            Instruction::Jump(nnn) => Flow::Jump(nnn),
            Instruction::Call(nnn) => {
                self.stack.push(self.pc)?;
                Flow::Jump(nnn)
            }
            Instruction::SkipEqImm { x, nn } => {
                if self.v[x] == nn {
                    Flow::Skip
                } else {
                    Flow::Next
                }
            }
            Instruction::SkipNeImm { x, nn } => {
                if self.v[x] != nn {
                    Flow::Skip
                } else {
                    Flow::Next
                }
            }
            Instruction::SkipEqReg { x, y } => {
                if self.v[x] == self.v[y] {
                    Flow::Skip
                } else {
                    Flow::Next
                }
            }
            Instruction::LoadImm { x, nn } => {
                self.v[x] = nn;
                Flow::Next
            }
            Instruction::AddImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
                Flow::Next
            }
            Instruction::Assign { x, y } => {
                self.v[x] = self.v[y];
                Flow::Next
            }
            Instruction::Or { x, y } => {
                self.v[x] |= self.v[y];
                Flow::Next
            }
            Instruction::And { x, y } => {
                self.v[x] &= self.v[y];
                Flow::Next
            }
            Instruction::Xor { x, y } => {
                self.v[x] ^= self.v[y];
                Flow::Next
            }
            Instruction::AddCarry { x, y } => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = sum;
                self.v[0xF] = carry as u8;
                Flow::Next
            }
            Instruction::SubBorrow { x, y } => {
                let (diff, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = diff;
                self.v[0xF] = !borrow as u8;
                Flow::Next
            }
            Instruction::ShiftRight { x } => {
                let value = self.v[x];
                self.v[x] = value >> 1;
                self.v[0xF] = value & 0x01;
                Flow::Next
            }
            Instruction::SubReverse { x, y } => {
                let (diff, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = diff;
                self.v[0xF] = !borrow as u8;
                Flow::Next
            }
            Instruction::ShiftLeft { x } => {
                let value = self.v[x];
                self.v[x] = value << 1;
                self.v[0xF] = value >> 7;
                Flow::Next
            }
            Instruction::SkipNeReg { x, y } => {
                if self.v[x] != self.v[y] {
                    Flow::Skip
                } else {
                    Flow::Next
                }
            }
            Instruction::SetIndex(nnn) => {
                self.i = nnn;
                Flow::Next
            }
            Instruction::JumpOffset(nnn) => Flow::Jump(nnn.wrapping_add(u16::from(self.v[0]))),
            Instruction::Random { x, nn } => {
                self.v[x] = rand::random::<u8>() & nn;
                Flow::Next
            }
            Instruction::Draw { x, y, n } => {
                let origin_x = self.v[x] as usize % DISPLAY_WIDTH;
                let origin_y = self.v[y] as usize % DISPLAY_HEIGHT;
                let mut rows = [0u8; 15];
                for (row, slot) in rows.iter_mut().enumerate().take(n as usize) {
                    *slot = self.memory.read(self.i as usize + row);
                }
                let collision = self.frame.draw_sprite(origin_x, origin_y, &rows[..n as usize]);
                self.v[0xF] = collision as u8;
                Flow::Next
            }
            Instruction::SkipKeyPressed { x } => {
                if self.keys[(self.v[x] & 0x0F) as usize] {
                    Flow::Skip
                } else {
                    Flow::Next
                }
            }
            Instruction::SkipKeyNotPressed { x } => {
                if !self.keys[(self.v[x] & 0x0F) as usize] {
                    Flow::Skip
                } else {
                    Flow::Next
                }
            }
            Instruction::GetDelay { x } => {
                self.v[x] = self.delay_timer;
                Flow::Next
            }
            Instruction::WaitKey { x } => {
                // Scan the whole latch; when several keys are down the
                // highest-indexed one wins.
                match (0..NUM_KEYS).rev().find(|&key| self.keys[key]) {
                    Some(key) => {
                        self.v[x] = key as u8;
                        Flow::Next
                    }
                    None => Flow::Stall,
                }
            }
            Instruction::SetDelay { x } => {
                self.delay_timer = self.v[x];
                Flow::Next
            }
            Instruction::SetSound { x } => {
                self.sound_timer = self.v[x];
                Flow::Next
            }
            Instruction::AddIndex { x } => {
                let sum = u32::from(self.i) + u32::from(self.v[x]);
                self.v[0xF] = (sum > 0xFFF) as u8;
                self.i = sum as u16;
                Flow::Next
            }
            Instruction::FontChar { x } => {
                self.i = (FONT_ADDR + (self.v[x] & 0x0F) as usize * FONT_HEIGHT) as u16;
                Flow::Next
            }
            Instruction::StoreBcd { x } => {
                let value = self.v[x];
                self.memory.write(self.i as usize, value / 100);
                self.memory.write(self.i as usize + 1, (value / 10) % 10);
                self.memory.write(self.i as usize + 2, value % 10);
                Flow::Next
            }
            Instruction::StoreRegs { x } => {
                for offset in 0..=x {
                    self.memory.write(self.i as usize + offset, self.v[offset]);
                }
                // I ends up as X + 1, not I + X + 1. Programs written for
                // the original interpreter depend on this.
                self.i = x as u16 + 1;
                Flow::Next
            }
            Instruction::LoadRegs { x } => {
                for offset in 0..=x {
                    self.v[offset] = self.memory.read(self.i as usize + offset);
                }
                self.i = x as u16 + 1;
                Flow::Next
            }
        };

        Ok(flow)
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
