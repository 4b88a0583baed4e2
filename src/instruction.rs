use crate::error::DecodeError;

/// One fully decoded instruction. Operand fields are extracted up front so
/// execution is a single exhaustive match with no further bit twiddling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0: zero the display buffer.
    ClearScreen,
    /// 00EE: pop the call stack into pc.
    Return,
    /// 1NNN: pc = NNN.
    Jump(u16),
    /// 2NNN: push pc, then pc = NNN.
    Call(u16),
    /// 3XNN: skip next instruction if VX == NN.
    SkipEqImm { x: usize, nn: u8 },
    /// 4XNN: skip next instruction if VX != NN.
    SkipNeImm { x: usize, nn: u8 },
    /// 5XY0: skip next instruction if VX == VY.
    SkipEqReg { x: usize, y: usize },
    /// 6XNN: VX = NN.
    LoadImm { x: usize, nn: u8 },
    /// 7XNN: VX += NN, no flag.
    AddImm { x: usize, nn: u8 },
    /// 8XY0: VX = VY.
    Assign { x: usize, y: usize },
    /// 8XY1: VX |= VY.
    Or { x: usize, y: usize },
    /// 8XY2: VX &= VY.
    And { x: usize, y: usize },
    /// 8XY3: VX ^= VY.
    Xor { x: usize, y: usize },
    /// 8XY4: VX += VY, VF = carry.
    AddCarry { x: usize, y: usize },
    /// 8XY5: VX -= VY, VF = no-borrow.
    SubBorrow { x: usize, y: usize },
    /// 8XY6: VF = VX & 1, VX >>= 1.
    ShiftRight { x: usize },
    /// 8XY7: VX = VY - VX, VF = no-borrow.
    SubReverse { x: usize, y: usize },
    /// 8XYE: VF = VX >> 7, VX <<= 1.
    ShiftLeft { x: usize },
    /// 9XY0: skip next instruction if VX != VY.
    SkipNeReg { x: usize, y: usize },
    /// ANNN: I = NNN.
    SetIndex(u16),
    /// BNNN: pc = NNN + V0.
    JumpOffset(u16),
    /// CXNN: VX = random byte & NN.
    Random { x: usize, nn: u8 },
    /// DXYN: draw N sprite rows from I at (VX, VY), VF = collision.
    Draw { x: usize, y: usize, n: u8 },
    /// EX9E: skip next instruction if key VX is pressed.
    SkipKeyPressed { x: usize },
    /// EXA1: skip next instruction if key VX is not pressed.
    SkipKeyNotPressed { x: usize },
    /// FX07: VX = delay timer.
    GetDelay { x: usize },
    /// FX0A: wait for a key press, store it in VX.
    WaitKey { x: usize },
    /// FX15: delay timer = VX.
    SetDelay { x: usize },
    /// FX18: sound timer = VX.
    SetSound { x: usize },
    /// FX1E: I += VX, VF = 1 if the sum exceeds 0xFFF.
    AddIndex { x: usize },
    /// FX29: I = font glyph address for VX.
    FontChar { x: usize },
    /// FX33: write the decimal digits of VX to I, I+1, I+2.
    StoreBcd { x: usize },
    /// FX55: write V0..=VX to memory at I, then I = X + 1.
    StoreRegs { x: usize },
    /// FX65: read V0..=VX from memory at I, then I = X + 1.
    LoadRegs { x: usize },
}

struct Fields {
    /// First nibble. Selects the instruction family.
    op: u8,
    /// Second nibble. Register index X.
    x: usize,
    /// Third nibble. Register index Y.
    y: usize,
    /// Fourth nibble. A 4-bit immediate.
    n: u8,
    /// Low byte. An 8-bit immediate.
    nn: u8,
    /// Low 12 bits. An address.
    nnn: u16,
}

impl Fields {
    fn new(word: u16) -> Self {
        Fields {
            op: (word >> 12) as u8,
            x: ((word >> 8) & 0x0F) as usize,
            y: ((word >> 4) & 0x0F) as usize,
            n: (word & 0x0F) as u8,
            nn: (word & 0x00FF) as u8,
            nnn: word & 0x0FFF,
        }
    }
}

/// Decodes a raw 16-bit word into an [Instruction]. Words that match no
/// pattern (including 0NNN machine-language routines) are reported as
/// [DecodeError::UnknownOpcode].
pub fn decode(word: u16) -> Result<Instruction, DecodeError> {
    let f = Fields::new(word);
    let unknown = Err(DecodeError::UnknownOpcode(word));

    let instruction = match f.op {
        0x0 => match f.nnn {
            0x0E0 => Instruction::ClearScreen,
            0x0EE => Instruction::Return,
            _ => return unknown,
        },
        0x1 => Instruction::Jump(f.nnn),
        0x2 => Instruction::Call(f.nnn),
        0x3 => Instruction::SkipEqImm { x: f.x, nn: f.nn },
        0x4 => Instruction::SkipNeImm { x: f.x, nn: f.nn },
        0x5 => match f.n {
            0x0 => Instruction::SkipEqReg { x: f.x, y: f.y },
            _ => return unknown,
        },
        0x6 => Instruction::LoadImm { x: f.x, nn: f.nn },
        0x7 => Instruction::AddImm { x: f.x, nn: f.nn },
        0x8 => match f.n {
            0x0 => Instruction::Assign { x: f.x, y: f.y },
            0x1 => Instruction::Or { x: f.x, y: f.y },
            0x2 => Instruction::And { x: f.x, y: f.y },
            0x3 => Instruction::Xor { x: f.x, y: f.y },
            0x4 => Instruction::AddCarry { x: f.x, y: f.y },
            0x5 => Instruction::SubBorrow { x: f.x, y: f.y },
            0x6 => Instruction::ShiftRight { x: f.x },
            0x7 => Instruction::SubReverse { x: f.x, y: f.y },
            0xE => Instruction::ShiftLeft { x: f.x },
            _ => return unknown,
        },
        0x9 => match f.n {
            0x0 => Instruction::SkipNeReg { x: f.x, y: f.y },
            _ => return unknown,
        },
        0xA => Instruction::SetIndex(f.nnn),
        0xB => Instruction::JumpOffset(f.nnn),
        0xC => Instruction::Random { x: f.x, nn: f.nn },
        0xD => Instruction::Draw {
            x: f.x,
            y: f.y,
            n: f.n,
        },
        0xE => match f.nn {
            0x9E => Instruction::SkipKeyPressed { x: f.x },
            0xA1 => Instruction::SkipKeyNotPressed { x: f.x },
            _ => return unknown,
        },
        0xF => match f.nn {
            0x07 => Instruction::GetDelay { x: f.x },
            0x0A => Instruction::WaitKey { x: f.x },
            0x15 => Instruction::SetDelay { x: f.x },
            0x18 => Instruction::SetSound { x: f.x },
            0x1E => Instruction::AddIndex { x: f.x },
            0x29 => Instruction::FontChar { x: f.x },
            0x33 => Instruction::StoreBcd { x: f.x },
            0x55 => Instruction::StoreRegs { x: f.x },
            0x65 => Instruction::LoadRegs { x: f.x },
            _ => return unknown,
        },
        _ => unreachable!("top nibble is four bits"),
    };

    Ok(instruction)
}
