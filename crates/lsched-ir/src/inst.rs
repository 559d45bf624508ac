//! Single machine instruction.

use std::fmt;

use crate::opcode::Opcode;
use crate::reg::VReg;

/// Machine instruction produced by instruction selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachInst {
    /// Opcode.
    pub opcode: Opcode,
    /// Registers written.
    pub defs: Vec<VReg>,
    /// Registers read.
    pub uses: Vec<VReg>,
    /// Optional immediate operand.
    pub imm: Option<i64>,
}

impl MachInst {
    /// Create an instruction with no operands.
    pub const fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            defs: Vec::new(),
            uses: Vec::new(),
            imm: None,
        }
    }

    /// Create an instruction with register operands.
    pub const fn with_operands(opcode: Opcode, defs: Vec<VReg>, uses: Vec<VReg>) -> Self {
        Self {
            opcode,
            defs,
            uses,
            imm: None,
        }
    }

    /// Live-in marker defining `dst`.
    pub fn param(dst: VReg) -> Self {
        Self::with_operands(Opcode::Param, vec![dst], Vec::new())
    }

    /// Load from the address held in `addr`.
    pub fn load(dst: VReg, addr: VReg) -> Self {
        Self::with_operands(Opcode::Load, vec![dst], vec![addr])
    }

    /// Store `value` to the address held in `addr`.
    pub fn store(value: VReg, addr: VReg) -> Self {
        Self::with_operands(Opcode::Store, Vec::new(), vec![value, addr])
    }

    /// Two-operand arithmetic.
    pub fn binary(opcode: Opcode, dst: VReg, lhs: VReg, rhs: VReg) -> Self {
        Self::with_operands(opcode, vec![dst], vec![lhs, rhs])
    }

    /// Return, optionally with a value.
    pub fn ret(value: Option<VReg>) -> Self {
        Self::with_operands(Opcode::Ret, Vec::new(), value.into_iter().collect())
    }

    /// Check if this is a fixed register parameter (live-in marker).
    pub fn is_fixed_reg_param(&self) -> bool {
        self.opcode == Opcode::Param
    }

    /// Check if this instruction writes `reg`.
    pub fn defines(&self, reg: VReg) -> bool {
        self.defs.contains(&reg)
    }

    /// Check if this instruction reads `reg`.
    pub fn reads(&self, reg: VReg) -> bool {
        self.uses.contains(&reg)
    }
}

impl fmt::Display for MachInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, def) in self.defs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{def}")?;
        }
        if !self.defs.is_empty() {
            f.write_str(" = ")?;
        }
        write!(f, "{}", self.opcode)?;

        let mut sep = " ";
        for reg in &self.uses {
            write!(f, "{sep}{reg}")?;
            sep = ", ";
        }
        if let Some(imm) = self.imm {
            write!(f, "{sep}{imm}")?;
        }
        Ok(())
    }
}
