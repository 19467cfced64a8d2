/// The standard CHIP-8 instruction set.
///
/// Each variant is one instruction family, identified by a 4-hex-digit
/// template in which literal digits must match exactly and the placeholder
/// letters stand for variable fields: `X` and `Y` are single-nibble register
/// numbers, `N` is an immediate spanning one to three contiguous nibbles.
///
/// Templates follow http://devernay.free.fr/hacks/chip8/C8TECH10.HTM#3.0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 0NNN - system call (ignored)
    Sys,
    /// 00E0 - clear the screen
    ClearScreen,
    /// 00EE - return from subroutine
    Return,
    /// 1NNN - jump to address nnn
    Jump,
    /// 2NNN - call subroutine at address nnn
    Call,
    /// 3XNN - skip next instruction if Vx == nn
    SkipEqImm,
    /// 4XNN - skip next instruction if Vx != nn
    SkipNeImm,
    /// 5XY0 - skip next instruction if Vx == Vy
    SkipEqReg,
    /// 6XNN - load nn into Vx
    LoadImm,
    /// 7XNN - add nn to Vx, no carry flag
    AddImm,
    /// 8XY0 - copy Vy into Vx
    Move,
    /// 8XY1 - Vx |= Vy
    Or,
    /// 8XY2 - Vx &= Vy
    And,
    /// 8XY3 - Vx ^= Vy
    Xor,
    /// 8XY4 - Vx += Vy, VF set on carry
    AddReg,
    /// 8XY5 - Vx -= Vy, VF set on not-borrow
    Sub,
    /// 8XY6 - shift right by one, bit 0 into VF
    ShiftRight,
    /// 8XY7 - Vx = Vy - Vx, VF set on not-borrow
    SubFrom,
    /// 8XYE - shift left by one, bit 7 into VF
    ShiftLeft,
    /// 9XY0 - skip next instruction if Vx != Vy
    SkipNeReg,
    /// ANNN - load nnn into the index register
    SetIndex,
    /// BNNN - jump to nnn + V0
    JumpOffset,
    /// CXNN - Vx = random byte AND nn
    Random,
    /// DXYN - draw an n-byte sprite from [index] at (Vx, Vy), VF on collision
    Draw,
    /// EX9E - skip next instruction if the key in Vx is pressed
    SkipKeyPressed,
    /// EXA1 - skip next instruction if the key in Vx is not pressed
    SkipKeyNotPressed,
    /// FX07 - load the delta timer into Vx
    ReadDeltaTimer,
    /// FX0A - wait for a keypress, store it in Vx
    WaitKey,
    /// FX15 - set the delta timer from Vx
    SetDeltaTimer,
    /// FX18 - set the sound timer from Vx
    SetSoundTimer,
    /// FX1E - add Vx to the index register
    AddIndex,
    /// FX29 - point the index register at the glyph for digit Vx
    GlyphAddress,
    /// FX33 - store BCD of Vx at [index], [index+1], [index+2]
    StoreBcd,
    /// FX55 - store V0..=Vx at [index], then index += x + 1
    StoreRegisters,
    /// FX65 - load V0..=Vx from [index], then index += x + 1
    LoadRegisters,
}

impl Opcode {
    /// Every instruction family, in catalog order.
    pub const ALL: [Opcode; 35] = [
        Opcode::Sys,
        Opcode::ClearScreen,
        Opcode::Return,
        Opcode::Jump,
        Opcode::Call,
        Opcode::SkipEqImm,
        Opcode::SkipNeImm,
        Opcode::SkipEqReg,
        Opcode::LoadImm,
        Opcode::AddImm,
        Opcode::Move,
        Opcode::Or,
        Opcode::And,
        Opcode::Xor,
        Opcode::AddReg,
        Opcode::Sub,
        Opcode::ShiftRight,
        Opcode::SubFrom,
        Opcode::ShiftLeft,
        Opcode::SkipNeReg,
        Opcode::SetIndex,
        Opcode::JumpOffset,
        Opcode::Random,
        Opcode::Draw,
        Opcode::SkipKeyPressed,
        Opcode::SkipKeyNotPressed,
        Opcode::ReadDeltaTimer,
        Opcode::WaitKey,
        Opcode::SetDeltaTimer,
        Opcode::SetSoundTimer,
        Opcode::AddIndex,
        Opcode::GlyphAddress,
        Opcode::StoreBcd,
        Opcode::StoreRegisters,
        Opcode::LoadRegisters,
    ];

    /// The 4-hex-digit template this family is decoded from.
    pub fn pattern(self) -> &'static str {
        match self {
            Opcode::Sys => "0NNN",
            Opcode::ClearScreen => "00E0",
            Opcode::Return => "00EE",
            Opcode::Jump => "1NNN",
            Opcode::Call => "2NNN",
            Opcode::SkipEqImm => "3XNN",
            Opcode::SkipNeImm => "4XNN",
            Opcode::SkipEqReg => "5XY0",
            Opcode::LoadImm => "6XNN",
            Opcode::AddImm => "7XNN",
            Opcode::Move => "8XY0",
            Opcode::Or => "8XY1",
            Opcode::And => "8XY2",
            Opcode::Xor => "8XY3",
            Opcode::AddReg => "8XY4",
            Opcode::Sub => "8XY5",
            Opcode::ShiftRight => "8XY6",
            Opcode::SubFrom => "8XY7",
            Opcode::ShiftLeft => "8XYE",
            Opcode::SkipNeReg => "9XY0",
            Opcode::SetIndex => "ANNN",
            Opcode::JumpOffset => "BNNN",
            Opcode::Random => "CXNN",
            Opcode::Draw => "DXYN",
            Opcode::SkipKeyPressed => "EX9E",
            Opcode::SkipKeyNotPressed => "EXA1",
            Opcode::ReadDeltaTimer => "FX07",
            Opcode::WaitKey => "FX0A",
            Opcode::SetDeltaTimer => "FX15",
            Opcode::SetSoundTimer => "FX18",
            Opcode::AddIndex => "FX1E",
            Opcode::GlyphAddress => "FX29",
            Opcode::StoreBcd => "FX33",
            Opcode::LoadRegisters => "FX65",
            Opcode::StoreRegisters => "FX55",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_four_nibbles() {
        for op in Opcode::ALL {
            assert_eq!(op.pattern().len(), 4, "{:?}", op);
        }
    }

    #[test]
    fn test_patterns_are_unique() {
        for (i, a) in Opcode::ALL.iter().enumerate() {
            for b in &Opcode::ALL[i + 1..] {
                assert_ne!(a.pattern(), b.pattern());
            }
        }
    }

    #[test]
    fn test_pattern_characters() {
        for op in Opcode::ALL {
            for c in op.pattern().chars() {
                assert!(
                    c.is_ascii_hexdigit() || c == 'X' || c == 'Y' || c == 'N',
                    "unexpected character {:?} in {:?}",
                    c,
                    op
                );
            }
        }
    }
}
