//! Basic blocks and functions.

use std::fmt;

use crate::inst::MachInst;

/// Basic block: straight-line instructions ending in at most one terminator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MachBlock {
    /// Block label.
    pub label: String,
    /// Instructions in program order.
    pub insts: Vec<MachInst>,
}

impl MachBlock {
    /// Create an empty block.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            insts: Vec::new(),
        }
    }

    /// Create a block from instructions.
    pub fn with_insts(label: impl Into<String>, insts: Vec<MachInst>) -> Self {
        Self {
            label: label.into(),
            insts,
        }
    }

    /// Add an instruction to the block.
    pub fn push(&mut self, inst: MachInst) {
        self.insts.push(inst);
    }

    /// Get the last instruction.
    pub fn last(&self) -> Option<&MachInst> {
        self.insts.last()
    }

    /// Get number of instructions.
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// Check if block is empty.
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

impl fmt::Display for MachBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "block {}:", self.label)?;
        for inst in &self.insts {
            writeln!(f, "  {inst}")?;
        }
        Ok(())
    }
}

/// Function: an ordered list of basic blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MachFunction {
    /// Function name.
    pub name: String,
    /// Blocks in layout order.
    pub blocks: Vec<MachBlock>,
}

impl MachFunction {
    /// Create an empty function.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    /// Find a block by label.
    pub fn block(&self, label: &str) -> Option<&MachBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// Total instructions across all blocks.
    pub fn inst_count(&self) -> usize {
        self.blocks.iter().map(MachBlock::len).sum()
    }
}

impl fmt::Display for MachFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "func {}", self.name)?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}
