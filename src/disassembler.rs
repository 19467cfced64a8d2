use crate::error::Error;
use crate::opcode::Opcode;

/// Extraction rule for one variable field of a pattern: the bits it covers
/// and how far to shift them down.
#[derive(Debug, Clone, Copy)]
struct Field {
    mask: u16,
    shift: u32,
}

impl Field {
    fn extract(self, opcode: u16) -> u16 {
        (opcode & self.mask) >> self.shift
    }
}

/// One catalog entry: an instruction family compiled to a bitmask test.
///
/// `(opcode & mask) == value` decides a match; `x`/`y`/`n` are present for
/// whichever placeholders the template contains.
#[derive(Debug, Clone, Copy)]
struct Entry {
    pattern: Opcode,
    mask: u16,
    value: u16,
    x: Option<Field>,
    y: Option<Field>,
    n: Option<Field>,
}

impl Entry {
    /// Compile a 4-hex-digit template into its mask/value pair and field
    /// extraction rules. X and Y each occupy exactly one nibble; N may span
    /// several contiguous nibbles, recorded as a union mask with the shift
    /// of the lowest one.
    fn compile(pattern: Opcode) -> Entry {
        let mut entry = Entry {
            pattern,
            mask: 0,
            value: 0,
            x: None,
            y: None,
            n: None,
        };
        for (i, c) in pattern.pattern().chars().enumerate() {
            let shift = ((3 - i) * 4) as u32;
            let nibble_mask = 0xF << shift;
            match c {
                'X' => entry.x = Some(Field { mask: nibble_mask, shift }),
                'Y' => entry.y = Some(Field { mask: nibble_mask, shift }),
                'N' => {
                    let field = entry.n.get_or_insert(Field { mask: 0, shift });
                    field.mask |= nibble_mask;
                    field.shift = shift;
                }
                _ => {
                    if let Some(digit) = c.to_digit(16) {
                        entry.mask |= nibble_mask;
                        entry.value |= (digit as u16) << shift;
                    }
                }
            }
        }
        entry
    }
}

/// Variable field values extracted from a decoded instruction. Fields the
/// matched pattern does not contain are left at zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Operands {
    pub x: u8,
    pub y: u8,
    pub n: u16,
}

/// The result of decoding one 16-bit instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub pattern: Opcode,
    pub args: Operands,
}

/// Matches raw 16-bit instructions against the opcode catalog.
///
/// The catalog is built once at construction and read-only afterwards.
pub struct Disassembler {
    entries: Vec<Entry>,
}

impl Disassembler {
    pub fn new() -> Self {
        Disassembler {
            entries: Opcode::ALL.iter().map(|&op| Entry::compile(op)).collect(),
        }
    }

    /// Decode a single instruction.
    ///
    /// Several entries can match the same opcode because some patterns are
    /// strict prefixes of others (00E0 is also a valid 0NNN). Of all the
    /// matches, the entry with the most fixed bits wins: the most specific
    /// pattern, i.e. the narrowest wildcard.
    pub fn disassemble(&self, opcode: u16) -> Result<Decoded, Error> {
        let mut best: Option<&Entry> = None;
        for entry in &self.entries {
            if opcode & entry.mask != entry.value {
                continue;
            }
            match best {
                Some(b) if b.mask.count_ones() >= entry.mask.count_ones() => {}
                _ => best = Some(entry),
            }
        }
        let entry = best.ok_or(Error::Decode { opcode })?;
        Ok(Decoded {
            pattern: entry.pattern,
            args: Operands {
                x: entry.x.map(|f| f.extract(opcode) as u8).unwrap_or(0),
                y: entry.y.map(|f| f.extract(opcode) as u8).unwrap_or(0),
                n: entry.n.map(|f| f.extract(opcode)).unwrap_or(0),
            },
        })
    }
}

impl Default for Disassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(opcode: u16) -> Decoded {
        Disassembler::new().disassemble(opcode).unwrap()
    }

    #[test]
    fn test_pattern_selection() {
        let cases: &[(u16, Opcode)] = &[
            (0x00e0, Opcode::ClearScreen),
            (0x00ee, Opcode::Return),
            (0x0eee, Opcode::Sys),
            (0x0123, Opcode::Sys),
            (0x1333, Opcode::Jump),
            (0x2001, Opcode::Call),
            (0x4444, Opcode::SkipNeImm),
            (0x5120, Opcode::SkipEqReg),
            (0x6555, Opcode::LoadImm),
            (0x8000, Opcode::Move),
            (0x8125, Opcode::Sub),
            (0x800e, Opcode::ShiftLeft),
            (0x9340, Opcode::SkipNeReg),
            (0xa000, Opcode::SetIndex),
            (0xaaaa, Opcode::SetIndex),
            (0xafff, Opcode::SetIndex),
            (0xa123, Opcode::SetIndex),
            (0xbfff, Opcode::JumpOffset),
            (0xc0ff, Opcode::Random),
            (0xd125, Opcode::Draw),
            (0xe09e, Opcode::SkipKeyPressed),
            (0xef9e, Opcode::SkipKeyPressed),
            (0xe2a1, Opcode::SkipKeyNotPressed),
            (0xf018, Opcode::SetSoundTimer),
            (0xf118, Opcode::SetSoundTimer),
            (0xf00a, Opcode::WaitKey),
            (0xff0a, Opcode::WaitKey),
            (0xf055, Opcode::StoreRegisters),
            (0xf555, Opcode::StoreRegisters),
            (0xff55, Opcode::StoreRegisters),
            (0xf865, Opcode::LoadRegisters),
        ];
        for &(opcode, pattern) in cases {
            assert_eq!(decode(opcode).pattern, pattern, "opcode {:#06x}", opcode);
        }
    }

    #[test]
    fn test_specific_pattern_beats_generic_prefix() {
        // 0x00e0 satisfies both 0NNN and 00E0; the narrower wildcard wins
        assert_eq!(decode(0x00e0).pattern, Opcode::ClearScreen);
        assert_eq!(decode(0x00ee).pattern, Opcode::Return);
        // anything else in the 0 nibble falls back to the system call
        assert_eq!(decode(0x0abc).pattern, Opcode::Sys);
    }

    #[test]
    fn test_field_extraction() {
        assert_eq!(decode(0x00e0).args, Operands { x: 0, y: 0, n: 0 });
        assert_eq!(decode(0x0eee).args, Operands { x: 0, y: 0, n: 0xeee });
        assert_eq!(decode(0x1333).args, Operands { x: 0, y: 0, n: 0x333 });
        assert_eq!(decode(0x6555).args, Operands { x: 0x5, y: 0, n: 0x55 });
        assert_eq!(decode(0x8f10).args, Operands { x: 0xf, y: 0x1, n: 0 });
        assert_eq!(decode(0xa123).args, Operands { x: 0, y: 0, n: 0x123 });
        assert_eq!(decode(0xd49f).args, Operands { x: 0x4, y: 0x9, n: 0xf });
        assert_eq!(decode(0xfe33).args, Operands { x: 0xe, y: 0, n: 0 });
    }

    #[test]
    fn test_unmatched_opcode_is_an_error() {
        // 5XY1..5XYF and 8XY8..8XYD have no pattern
        let d = Disassembler::new();
        assert!(matches!(
            d.disassemble(0x5121),
            Err(Error::Decode { opcode: 0x5121 })
        ));
        assert!(matches!(d.disassemble(0x800f), Err(Error::Decode { .. })));
        assert!(matches!(d.disassemble(0xe000), Err(Error::Decode { .. })));
        assert!(matches!(d.disassemble(0xf0ff), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_every_entry_decodes_to_itself() {
        // substituting zero for every placeholder must round-trip, except
        // for the generic system call which is shadowed by 00E0/00EE's
        // longer fixed prefixes only on their exact values
        let d = Disassembler::new();
        for op in Opcode::ALL {
            let mut probe = 0u16;
            for (i, c) in op.pattern().chars().enumerate() {
                if let Some(digit) = c.to_digit(16) {
                    probe |= (digit as u16) << ((3 - i) * 4);
                }
            }
            assert_eq!(d.disassemble(probe).unwrap().pattern, op, "{:?}", op);
        }
    }
}
