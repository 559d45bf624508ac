//! Per-opcode scheduling properties.
//!
//! The scheduler never inspects opcodes directly. Everything it needs to know
//! about an instruction (latency, memory behavior, whether it ends the block)
//! goes through [`OpcodeInfo`], so targets can plug in their own tables.

use std::fmt;
use std::str::FromStr;

use crate::inst::MachInst;
use crate::opcode::Opcode;

/// Opcode info oracle queried by the scheduler.
///
/// Implementations must be consistent: a block terminator is neither a load nor
/// side-effecting in a way the scheduler should order, and latencies are at
/// least one cycle. Contradictory answers are a bug in the implementation.
pub trait OpcodeInfo {
    /// Whether this target has a latency model good enough to reorder with.
    ///
    /// When false the scheduling pass is skipped and blocks pass through
    /// unchanged.
    fn scheduler_supported(&self) -> bool;

    /// Check if `inst` transfers control and ends its block.
    fn is_block_terminator(&self, inst: &MachInst) -> bool;

    /// Check if `inst` has a side effect (store, call, fence).
    fn has_side_effect(&self, inst: &MachInst) -> bool;

    /// Check if `inst` reads memory.
    fn is_load(&self, inst: &MachInst) -> bool;

    /// Nominal latency of `inst` in cycles (at least 1).
    fn latency(&self, inst: &MachInst) -> u32;

    /// Check if `consumer` must stay after `producer` because of their operands.
    ///
    /// The default reports read-after-write, write-after-read and
    /// write-after-write on virtual registers.
    fn has_operand_dependency(&self, producer: &MachInst, consumer: &MachInst) -> bool {
        producer
            .defs
            .iter()
            .any(|&reg| consumer.reads(reg) || consumer.defines(reg))
            || producer.uses.iter().any(|&reg| consumer.defines(reg))
    }
}

impl<T: OpcodeInfo + ?Sized> OpcodeInfo for &T {
    fn scheduler_supported(&self) -> bool {
        (**self).scheduler_supported()
    }

    fn is_block_terminator(&self, inst: &MachInst) -> bool {
        (**self).is_block_terminator(inst)
    }

    fn has_side_effect(&self, inst: &MachInst) -> bool {
        (**self).has_side_effect(inst)
    }

    fn is_load(&self, inst: &MachInst) -> bool {
        (**self).is_load(inst)
    }

    fn latency(&self, inst: &MachInst) -> u32 {
        (**self).latency(inst)
    }

    fn has_operand_dependency(&self, producer: &MachInst, consumer: &MachInst) -> bool {
        (**self).has_operand_dependency(producer, consumer)
    }
}

/// Target architecture with a built-in opcode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    Arm64,
    /// No latency model; scheduling is skipped.
    Generic,
}

impl Arch {
    /// Architecture name as used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Ok(Self::X64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "generic" => Ok(Self::Generic),
            _ => Err(format!("unknown architecture: {s}")),
        }
    }
}

/// Scheduling properties of one opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeProps {
    /// Latency in cycles.
    pub latency: u32,
    /// Store, call or fence.
    pub side_effect: bool,
    /// Memory read.
    pub load: bool,
    /// Ends the block.
    pub terminator: bool,
}

/// Table-driven [`OpcodeInfo`] for a built-in architecture.
#[derive(Clone, Debug)]
pub struct OpcodeTable {
    arch: Arch,
    props: [OpcodeProps; Opcode::COUNT],
}

impl OpcodeTable {
    /// Table for `arch`.
    pub fn new(arch: Arch) -> Self {
        let latency: fn(Opcode) -> u32 = match arch {
            Arch::X64 => x64_latency,
            Arch::Arm64 => arm64_latency,
            Arch::Generic => |_| 1,
        };
        Self {
            arch,
            props: Opcode::ALL.map(|op| OpcodeProps {
                latency: latency(op),
                side_effect: matches!(op, Opcode::Store | Opcode::Call | Opcode::Fence),
                load: op == Opcode::Load,
                terminator: matches!(op, Opcode::Jump | Opcode::Branch | Opcode::Ret),
            }),
        }
    }

    /// x86-64 table.
    pub fn x64() -> Self {
        Self::new(Arch::X64)
    }

    /// AArch64 table.
    pub fn arm64() -> Self {
        Self::new(Arch::Arm64)
    }

    /// Table without a latency model.
    pub fn generic() -> Self {
        Self::new(Arch::Generic)
    }

    /// Override the latency of one opcode. Latencies are clamped to 1 cycle.
    #[must_use]
    pub fn with_latency(mut self, opcode: Opcode, cycles: u32) -> Self {
        self.props[opcode.index()].latency = cycles.max(1);
        self
    }

    /// Architecture this table describes.
    pub const fn arch(&self) -> Arch {
        self.arch
    }

    /// Properties of `opcode`.
    pub const fn props(&self, opcode: Opcode) -> OpcodeProps {
        self.props[opcode.index()]
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::x64()
    }
}

impl OpcodeInfo for OpcodeTable {
    fn scheduler_supported(&self) -> bool {
        self.arch != Arch::Generic
    }

    fn is_block_terminator(&self, inst: &MachInst) -> bool {
        self.props(inst.opcode).terminator
    }

    fn has_side_effect(&self, inst: &MachInst) -> bool {
        self.props(inst.opcode).side_effect
    }

    fn is_load(&self, inst: &MachInst) -> bool {
        self.props(inst.opcode).load
    }

    fn latency(&self, inst: &MachInst) -> u32 {
        self.props(inst.opcode).latency
    }
}

const fn x64_latency(op: Opcode) -> u32 {
    match op {
        Opcode::Mul => 3,
        Opcode::Div => 26,
        Opcode::Load => 4,
        Opcode::Call => 5,
        Opcode::Fence => 3,
        _ => 1,
    }
}

const fn arm64_latency(op: Opcode) -> u32 {
    match op {
        Opcode::Mul => 3,
        Opcode::Div => 12,
        Opcode::Load => 4,
        Opcode::Call => 4,
        Opcode::Fence => 2,
        _ => 1,
    }
}
