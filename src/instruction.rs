/// # instruction set
///
/// Every 16-bit word decodes to exactly one `Instruction`; words that are
/// not part of the classic set come out as `Unknown` and the machine
/// treats them as no-ops.
///
/// Operand fields, by nibble (most significant first):
///  `_x__`  register index x
///  `__y_`  register index y
///  `___n`  4-bit immediate
///  `__kk`  8-bit immediate
///  `_nnn`  12-bit address
use std::fmt;

/// The register-register ALU group, selected by the low nibble of `8xyN`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Copy,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<Self> {
        match n {
            0x0 => Some(AluOp::Copy),
            0x1 => Some(AluOp::Or),
            0x2 => Some(AluOp::And),
            0x3 => Some(AluOp::Xor),
            0x4 => Some(AluOp::Add),
            0x5 => Some(AluOp::Sub),
            0x6 => Some(AluOp::ShiftRight),
            0x7 => Some(AluOp::SubReverse),
            0xe => Some(AluOp::ShiftLeft),
            _ => None,
        }
    }

    fn mnemonic(&self) -> &'static str {
        match self {
            AluOp::Copy => "LD",
            AluOp::Or => "OR",
            AluOp::And => "AND",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::ShiftRight => "SHR",
            AluOp::SubReverse => "SUBN",
            AluOp::ShiftLeft => "SHL",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 0nE0
    Cls,
    /// 0nEE
    Ret,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipEqImm { x: u8, kk: u8 },
    /// 4xkk
    SkipNeImm { x: u8, kk: u8 },
    /// 5xyN, N ignored
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadImm { x: u8, kk: u8 },
    /// 7xkk
    AddImm { x: u8, kk: u8 },
    /// 8xyN
    Alu { op: AluOp, x: u8, y: u8 },
    /// 9xyN, N ignored
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    SetIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKey { x: u8 },
    /// ExA1
    SkipNotKey { x: u8 },
    /// Fx07
    ReadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    FontSprite { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegs { x: u8 },
    /// Fx65
    LoadRegs { x: u8 },
    /// anything else, including other 0nnn machine-code calls
    Unknown(u16),
}

impl Instruction {
    pub fn decode(opcode: u16) -> Instruction {
        let x = ((opcode & 0x0f00) >> 8) as u8;
        let y = ((opcode & 0x00f0) >> 4) as u8;
        let n = (opcode & 0x000f) as u8;
        let kk = (opcode & 0x00ff) as u8;
        let nnn = opcode & 0x0fff;

        match opcode >> 12 {
            // the 0 group dispatches on the low byte alone
            0x0 => match kk {
                0xe0 => Instruction::Cls,
                0xee => Instruction::Ret,
                _ => Instruction::Unknown(opcode),
            },
            0x1 => Instruction::Jump(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SkipEqImm { x, kk },
            0x4 => Instruction::SkipNeImm { x, kk },
            0x5 => Instruction::SkipEqReg { x, y },
            0x6 => Instruction::LoadImm { x, kk },
            0x7 => Instruction::AddImm { x, kk },
            0x8 => match AluOp::from_nibble(n) {
                Some(op) => Instruction::Alu { op, x, y },
                None => Instruction::Unknown(opcode),
            },
            0x9 => Instruction::SkipNeReg { x, y },
            0xa => Instruction::SetIndex(nnn),
            0xb => Instruction::JumpOffset(nnn),
            0xc => Instruction::Random { x, kk },
            0xd => Instruction::Draw { x, y, n },
            0xe => match kk {
                0x9e => Instruction::SkipKey { x },
                0xa1 => Instruction::SkipNotKey { x },
                _ => Instruction::Unknown(opcode),
            },
            0xf => match kk {
                0x07 => Instruction::ReadDelay { x },
                0x0a => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1e => Instruction::AddIndex { x },
                0x29 => Instruction::FontSprite { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegs { x },
                0x65 => Instruction::LoadRegs { x },
                _ => Instruction::Unknown(opcode),
            },
            _ => Instruction::Unknown(opcode),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Cls => write!(f, "CLS"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Jump(nnn) => write!(f, "JP {:#05x}", nnn),
            Instruction::Call(nnn) => write!(f, "CALL {:#05x}", nnn),
            Instruction::SkipEqImm { x, kk } => write!(f, "SE V{:X}, {:#04x}", x, kk),
            Instruction::SkipNeImm { x, kk } => write!(f, "SNE V{:X}, {:#04x}", x, kk),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::LoadImm { x, kk } => write!(f, "LD V{:X}, {:#04x}", x, kk),
            Instruction::AddImm { x, kk } => write!(f, "ADD V{:X}, {:#04x}", x, kk),
            Instruction::Alu { op, x, y } => write!(f, "{} V{:X}, V{:X}", op.mnemonic(), x, y),
            Instruction::SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::SetIndex(nnn) => write!(f, "LD I, {:#05x}", nnn),
            Instruction::JumpOffset(nnn) => write!(f, "JP V0, {:#05x}", nnn),
            Instruction::Random { x, kk } => write!(f, "RND V{:X}, {:#04x}", x, kk),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipKey { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipNotKey { x } => write!(f, "SKNP V{:X}", x),
            Instruction::ReadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::FontSprite { x } => write!(f, "LD F, V{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::StoreRegs { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LoadRegs { x } => write!(f, "LD V{:X}, [I]", x),
            Instruction::Unknown(opcode) => write!(f, "??? {:#06x}", opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_system_group() {
        assert_eq!(Instruction::decode(0x00e0), Instruction::Cls);
        assert_eq!(Instruction::decode(0x00ee), Instruction::Ret);
        // machine-code calls aren't supported
        assert_eq!(Instruction::decode(0x0123), Instruction::Unknown(0x0123));
        assert_eq!(Instruction::decode(0x0000), Instruction::Unknown(0x0000));
        // only the low byte selects CLS and RET
        assert_eq!(Instruction::decode(0x01e0), Instruction::Cls);
        assert_eq!(Instruction::decode(0x0fee), Instruction::Ret);
    }

    #[test]
    fn test_decode_addresses() {
        assert_eq!(Instruction::decode(0x1abc), Instruction::Jump(0xabc));
        assert_eq!(Instruction::decode(0x2abc), Instruction::Call(0xabc));
        assert_eq!(Instruction::decode(0xa123), Instruction::SetIndex(0x123));
        assert_eq!(Instruction::decode(0xbfff), Instruction::JumpOffset(0xfff));
    }

    #[test]
    fn test_decode_immediates() {
        assert_eq!(
            Instruction::decode(0x3a42),
            Instruction::SkipEqImm { x: 0xa, kk: 0x42 }
        );
        assert_eq!(
            Instruction::decode(0x4b00),
            Instruction::SkipNeImm { x: 0xb, kk: 0x00 }
        );
        assert_eq!(
            Instruction::decode(0x6fff),
            Instruction::LoadImm { x: 0xf, kk: 0xff }
        );
        assert_eq!(
            Instruction::decode(0x7101),
            Instruction::AddImm { x: 0x1, kk: 0x01 }
        );
        assert_eq!(
            Instruction::decode(0xc30f),
            Instruction::Random { x: 0x3, kk: 0x0f }
        );
    }

    #[test]
    fn test_decode_register_pairs() {
        assert_eq!(
            Instruction::decode(0x5120),
            Instruction::SkipEqReg { x: 1, y: 2 }
        );
        assert_eq!(
            Instruction::decode(0x9340),
            Instruction::SkipNeReg { x: 3, y: 4 }
        );
        // the low nibble is ignored
        assert_eq!(
            Instruction::decode(0x5121),
            Instruction::SkipEqReg { x: 1, y: 2 }
        );
        assert_eq!(
            Instruction::decode(0x934f),
            Instruction::SkipNeReg { x: 3, y: 4 }
        );
    }

    #[test]
    fn test_decode_alu_group() {
        let expected = [
            (0x0, AluOp::Copy),
            (0x1, AluOp::Or),
            (0x2, AluOp::And),
            (0x3, AluOp::Xor),
            (0x4, AluOp::Add),
            (0x5, AluOp::Sub),
            (0x6, AluOp::ShiftRight),
            (0x7, AluOp::SubReverse),
            (0xe, AluOp::ShiftLeft),
        ];
        for (nibble, op) in expected {
            assert_eq!(
                Instruction::decode(0x8ab0 | nibble),
                Instruction::Alu { op, x: 0xa, y: 0xb }
            );
        }
        for nibble in [0x8, 0x9, 0xa, 0xb, 0xc, 0xd, 0xf] {
            let opcode = 0x8ab0 | nibble;
            assert_eq!(Instruction::decode(opcode), Instruction::Unknown(opcode));
        }
    }

    #[test]
    fn test_decode_draw() {
        assert_eq!(
            Instruction::decode(0xd125),
            Instruction::Draw { x: 1, y: 2, n: 5 }
        );
    }

    #[test]
    fn test_decode_keys() {
        assert_eq!(Instruction::decode(0xe59e), Instruction::SkipKey { x: 5 });
        assert_eq!(Instruction::decode(0xe5a1), Instruction::SkipNotKey { x: 5 });
        assert_eq!(Instruction::decode(0xe5a2), Instruction::Unknown(0xe5a2));
    }

    #[test]
    fn test_decode_misc_group() {
        assert_eq!(Instruction::decode(0xf207), Instruction::ReadDelay { x: 2 });
        assert_eq!(Instruction::decode(0xf20a), Instruction::WaitKey { x: 2 });
        assert_eq!(Instruction::decode(0xf215), Instruction::SetDelay { x: 2 });
        assert_eq!(Instruction::decode(0xf218), Instruction::SetSound { x: 2 });
        assert_eq!(Instruction::decode(0xf21e), Instruction::AddIndex { x: 2 });
        assert_eq!(Instruction::decode(0xf229), Instruction::FontSprite { x: 2 });
        assert_eq!(Instruction::decode(0xf233), Instruction::StoreBcd { x: 2 });
        assert_eq!(Instruction::decode(0xf255), Instruction::StoreRegs { x: 2 });
        assert_eq!(Instruction::decode(0xf265), Instruction::LoadRegs { x: 2 });
        assert_eq!(Instruction::decode(0xf275), Instruction::Unknown(0xf275));
    }

    #[test]
    fn test_decode_is_total() {
        // every word decodes to something, and unknowns carry the raw word
        for opcode in 0..=u16::MAX {
            if let Instruction::Unknown(raw) = Instruction::decode(opcode) {
                assert_eq!(raw, opcode);
            }
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Instruction::decode(0x00e0).to_string(), "CLS");
        assert_eq!(Instruction::decode(0x1200).to_string(), "JP 0x200");
        assert_eq!(Instruction::decode(0x612a).to_string(), "LD V1, 0x2a");
        assert_eq!(Instruction::decode(0x8ab4).to_string(), "ADD VA, VB");
        assert_eq!(Instruction::decode(0xd015).to_string(), "DRW V0, V1, 5");
        assert_eq!(Instruction::decode(0xfe0a).to_string(), "LD VE, K");
        assert_eq!(Instruction::decode(0x0123).to_string(), "??? 0x0123");
    }
}
