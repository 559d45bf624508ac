//! Textual listing parser.
//!
//! Listings use the same syntax the `Display` impls print:
//!
//! ```text
//! ; comment
//! func example
//! block entry:
//!   v0 = param
//!   v1 = load v0
//!   v2 = add v0, 8
//!   store v1, v0
//!   ret v2
//! ```
//!
//! A `block` line before any `func` line opens an implicit function named
//! `main`.

use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::block::{MachBlock, MachFunction};
use crate::inst::MachInst;
use crate::opcode::Opcode;
use crate::reg::VReg;

/// Name of the function opened by a `block` line with no preceding `func`.
pub const IMPLICIT_FUNCTION: &str = "main";

/// Listing parse error with its 1-based line number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// What went wrong on a listing line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("invalid register `{0}`")]
    InvalidRegister(String),
    #[error("invalid operand `{0}`")]
    InvalidOperand(String),
    #[error("more than one immediate operand")]
    MultipleImmediates,
    #[error("instruction outside of a block")]
    OutsideBlock,
    #[error("duplicate block label `{0}`")]
    DuplicateBlock(String),
    #[error("malformed line `{0}`")]
    Malformed(String),
}

static FUNC_PATTERN: OnceLock<Regex> = OnceLock::new();
static BLOCK_PATTERN: OnceLock<Regex> = OnceLock::new();
static INST_PATTERN: OnceLock<Regex> = OnceLock::new();
static REG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn func_pattern() -> &'static Regex {
    FUNC_PATTERN.get_or_init(|| Regex::new(r"^func\s+([A-Za-z_][\w.$]*)$").unwrap())
}

fn block_pattern() -> &'static Regex {
    BLOCK_PATTERN.get_or_init(|| Regex::new(r"^block\s+([A-Za-z_][\w.$]*)\s*:$").unwrap())
}

fn inst_pattern() -> &'static Regex {
    INST_PATTERN.get_or_init(|| {
        Regex::new(r"^(?:(?P<defs>[^=]+?)\s*=\s*)?(?P<mnemonic>[a-z]+)(?:\s+(?P<operands>.+))?$")
            .unwrap()
    })
}

fn reg_pattern() -> &'static Regex {
    REG_PATTERN.get_or_init(|| Regex::new(r"^v(\d+)$").unwrap())
}

/// Parse a listing of one or more functions.
pub fn parse_listing(src: &str) -> Result<Vec<MachFunction>, ParseError> {
    let mut functions: Vec<MachFunction> = Vec::new();
    let mut labels: FxHashSet<String> = FxHashSet::default();

    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        let text = strip_comment(raw);
        if text.is_empty() {
            continue;
        }
        let err = |kind| ParseError { line, kind };

        if let Some(caps) = func_pattern().captures(text) {
            functions.push(MachFunction::new(&caps[1]));
            labels.clear();
            continue;
        }

        if let Some(caps) = block_pattern().captures(text) {
            let label = &caps[1];
            if functions.is_empty() {
                functions.push(MachFunction::new(IMPLICIT_FUNCTION));
            }
            if !labels.insert(label.to_string()) {
                return Err(err(ParseErrorKind::DuplicateBlock(label.to_string())));
            }
            if let Some(func) = functions.last_mut() {
                func.blocks.push(MachBlock::new(label));
            }
            continue;
        }

        let inst = parse_inst(text).map_err(err)?;
        let block = functions
            .last_mut()
            .and_then(|f| f.blocks.last_mut())
            .ok_or(err(ParseErrorKind::OutsideBlock))?;
        block.push(inst);
    }

    Ok(functions)
}

/// Parse bare instruction lines into a single block labeled `entry`.
pub fn parse_block(src: &str) -> Result<MachBlock, ParseError> {
    let mut block = MachBlock::new("entry");
    for (idx, raw) in src.lines().enumerate() {
        let text = strip_comment(raw);
        if text.is_empty() {
            continue;
        }
        let inst = parse_inst(text).map_err(|kind| ParseError {
            line: idx + 1,
            kind,
        })?;
        block.push(inst);
    }
    Ok(block)
}

/// Parse one instruction (no comment, already trimmed).
pub fn parse_inst(text: &str) -> Result<MachInst, ParseErrorKind> {
    let caps = inst_pattern()
        .captures(text)
        .ok_or_else(|| ParseErrorKind::Malformed(text.to_string()))?;

    let mnemonic = &caps["mnemonic"];
    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| ParseErrorKind::UnknownMnemonic(mnemonic.to_string()))?;
    let mut inst = MachInst::new(opcode);

    if let Some(defs) = caps.name("defs") {
        for def in defs.as_str().split(',') {
            inst.defs.push(parse_reg(def.trim())?);
        }
    }

    if let Some(operands) = caps.name("operands") {
        for operand in operands.as_str().split(',').map(str::trim) {
            if let Ok(reg) = parse_reg(operand) {
                inst.uses.push(reg);
            } else if let Some(value) = parse_imm(operand) {
                if inst.imm.replace(value).is_some() {
                    return Err(ParseErrorKind::MultipleImmediates);
                }
            } else {
                return Err(ParseErrorKind::InvalidOperand(operand.to_string()));
            }
        }
    }

    Ok(inst)
}

fn parse_reg(text: &str) -> Result<VReg, ParseErrorKind> {
    reg_pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(VReg)
        .ok_or_else(|| ParseErrorKind::InvalidRegister(text.to_string()))
}

fn parse_imm(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn strip_comment(line: &str) -> &str {
    line.split_once(';').map_or(line, |(code, _)| code).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
; two functions
func first
block entry:
  v0 = param
  v1 = load v0      ; trailing comment
  v2 = add v0, 8
  store v1, v0
  branch v2
block exit:
  ret v2

func second
block entry:
  v0, v1 = call v2, v3
  ret
";

    #[test]
    fn test_parse_listing() {
        let funcs = parse_listing(LISTING).unwrap();
        assert_eq!(funcs.len(), 2);
        assert_eq!(funcs[0].name, "first");
        assert_eq!(funcs[0].blocks.len(), 2);
        assert_eq!(funcs[0].inst_count(), 6);

        let entry = funcs[0].block("entry").unwrap();
        assert_eq!(entry.insts[0], MachInst::param(VReg(0)));
        assert_eq!(entry.insts[1], MachInst::load(VReg(1), VReg(0)));
        assert_eq!(entry.insts[2].uses, vec![VReg(0)]);
        assert_eq!(entry.insts[2].imm, Some(8));
        assert_eq!(entry.insts[3], MachInst::store(VReg(1), VReg(0)));

        let call = &funcs[1].blocks[0].insts[0];
        assert_eq!(call.opcode, Opcode::Call);
        assert_eq!(call.defs, vec![VReg(0), VReg(1)]);
        assert_eq!(call.uses, vec![VReg(2), VReg(3)]);
    }

    #[test]
    fn test_display_round_trip() {
        let funcs = parse_listing(LISTING).unwrap();
        let printed: String = funcs.iter().map(ToString::to_string).collect();
        assert_eq!(parse_listing(&printed).unwrap(), funcs);
    }

    #[test]
    fn test_implicit_function() {
        let funcs = parse_listing("block b0:\n  nop\n").unwrap();
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name, IMPLICIT_FUNCTION);
    }

    #[test]
    fn test_parse_block() {
        let block = parse_block("v1 = const 0x10\nv2 = sub v1, -3\n\nret v2\n").unwrap();
        assert_eq!(block.label, "entry");
        assert_eq!(block.len(), 3);
        assert_eq!(block.insts[0].imm, Some(16));
        assert_eq!(block.insts[1].imm, Some(-3));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_listing("func f\nblock b:\n  v1 = fma v0\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, ParseErrorKind::UnknownMnemonic("fma".to_string()));

        let err = parse_listing("func f\n  nop\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::OutsideBlock);

        let err = parse_listing("func f\nblock b:\nblock b:\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, ParseErrorKind::DuplicateBlock("b".to_string()));
    }

    #[test]
    fn test_operand_errors() {
        assert_eq!(
            parse_inst("r1 = add v0, v1"),
            Err(ParseErrorKind::InvalidRegister("r1".to_string()))
        );
        assert_eq!(
            parse_inst("v1 = add v0, [v2]"),
            Err(ParseErrorKind::InvalidOperand("[v2]".to_string()))
        );
        assert_eq!(
            parse_inst("v1 = add 1, 2"),
            Err(ParseErrorKind::MultipleImmediates)
        );
    }

    #[test]
    fn test_same_label_in_different_functions() {
        let funcs = parse_listing("func a\nblock entry:\nfunc b\nblock entry:\n").unwrap();
        assert_eq!(funcs.len(), 2);
    }
}
