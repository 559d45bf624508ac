//! Machine opcodes.

use std::fmt;

/// Machine-level opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Fixed register parameter: defines a live-in value at block entry.
    Param,
    Nop,
    Mov,
    Const,
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Cmp,
    Load,
    Store,
    Call,
    Fence,
    Jump,
    Branch,
    Ret,
}

impl Opcode {
    /// Number of opcodes.
    pub const COUNT: usize = 21;

    /// All opcodes in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Param,
        Self::Nop,
        Self::Mov,
        Self::Const,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Shl,
        Self::Shr,
        Self::Cmp,
        Self::Load,
        Self::Store,
        Self::Call,
        Self::Fence,
        Self::Jump,
        Self::Branch,
        Self::Ret,
    ];

    /// Dense index, usable as a table slot.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Param => "param",
            Self::Nop => "nop",
            Self::Mov => "mov",
            Self::Const => "const",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::Cmp => "cmp",
            Self::Load => "load",
            Self::Store => "store",
            Self::Call => "call",
            Self::Fence => "fence",
            Self::Jump => "jump",
            Self::Branch => "branch",
            Self::Ret => "ret",
        }
    }

    /// Look up an opcode by mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == mnemonic)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_table_order() {
        for (i, op) in Opcode::ALL.into_iter().enumerate() {
            assert_eq!(op.index(), i);
        }
    }

    #[test]
    fn test_mnemonic_lookup() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
        assert_eq!(Opcode::from_mnemonic("fma"), None);
    }
}
