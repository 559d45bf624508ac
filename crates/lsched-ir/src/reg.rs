//! Virtual registers.

use std::fmt;

/// Virtual register naming one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VReg(pub u32);

impl VReg {
    /// Create a virtual register from its index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Register index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
