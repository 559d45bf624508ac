//! Schedule invariant checks.
//!
//! Each check takes the block's original instructions and a schedule given as
//! original instruction indices in emission order. They are independent of the
//! graph the scheduler built, so a wrong edge in the builder shows up as a
//! violation here.

use lsched_dag::{DepGraph, GraphError, assert_no_cycles};
use lsched_ir::{MachInst, OpcodeInfo};
use thiserror::Error;

/// A violated scheduling invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("schedule has {actual} entries for {expected} instructions")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("instruction {0} is out of range")]
    OutOfRange(usize),
    #[error("instruction {0} emitted more than once")]
    Duplicate(usize),
    #[error("terminator {inst} emitted at position {position}")]
    TerminatorNotLast { inst: usize, position: usize },
    #[error("terminator {0} is not the last instruction of its block")]
    MisplacedTerminator(usize),
    #[error("instruction {consumer} scheduled before its dependency {producer}")]
    DependencyViolated { producer: usize, consumer: usize },
    #[error("side effects {first} and {second} reordered")]
    SideEffectsReordered { first: usize, second: usize },
    #[error("load {load} and side effect {side_effect} reordered")]
    LoadReordered { load: usize, side_effect: usize },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

type Checked = Result<(), InvariantViolation>;

/// Check that at most the last instruction is a terminator.
pub fn check_block_shape<I: OpcodeInfo + ?Sized>(info: &I, insts: &[MachInst]) -> Checked {
    let body = insts.len().saturating_sub(1);
    match insts[..body]
        .iter()
        .position(|inst| info.is_block_terminator(inst))
    {
        Some(i) => Err(InvariantViolation::MisplacedTerminator(i)),
        None => Ok(()),
    }
}

/// Check that `order` is a permutation of `0..len`.
pub fn assert_permutation(len: usize, order: &[usize]) -> Checked {
    if order.len() != len {
        return Err(InvariantViolation::LengthMismatch {
            expected: len,
            actual: order.len(),
        });
    }
    let mut seen = vec![false; len];
    for &inst in order {
        let slot = seen
            .get_mut(inst)
            .ok_or(InvariantViolation::OutOfRange(inst))?;
        if *slot {
            return Err(InvariantViolation::Duplicate(inst));
        }
        *slot = true;
    }
    Ok(())
}

/// Check that a block terminator, if present, is emitted last.
pub fn assert_terminator_last<I: OpcodeInfo + ?Sized>(
    info: &I,
    insts: &[MachInst],
    order: &[usize],
) -> Checked {
    for (position, &inst) in order.iter().enumerate() {
        if info.is_block_terminator(&insts[inst]) && position + 1 != order.len() {
            return Err(InvariantViolation::TerminatorNotLast { inst, position });
        }
    }
    Ok(())
}

/// Check that every operand dependency in the block is respected.
pub fn assert_dependencies_respected<I: OpcodeInfo + ?Sized>(
    info: &I,
    insts: &[MachInst],
    order: &[usize],
) -> Checked {
    let pos = positions(order);
    for consumer in 0..insts.len() {
        for producer in 0..consumer {
            if info.has_operand_dependency(&insts[producer], &insts[consumer])
                && pos[producer] > pos[consumer]
            {
                return Err(InvariantViolation::DependencyViolated { producer, consumer });
            }
        }
    }
    Ok(())
}

/// Check that every graph edge is respected.
pub fn assert_edges_respected(graph: &DepGraph, order: &[usize]) -> Checked {
    let pos = positions(order);
    for (from, to) in graph.edges() {
        let producer = graph.node(from).inst();
        let consumer = graph.node(to).inst();
        if pos[producer] > pos[consumer] {
            return Err(InvariantViolation::DependencyViolated { producer, consumer });
        }
    }
    Ok(())
}

/// Check that side-effecting instructions keep their relative order.
pub fn assert_side_effects_ordered<I: OpcodeInfo + ?Sized>(
    info: &I,
    insts: &[MachInst],
    order: &[usize],
) -> Checked {
    let mut prev: Option<usize> = None;
    for &inst in order {
        if !info.has_side_effect(&insts[inst]) || info.is_block_terminator(&insts[inst]) {
            continue;
        }
        if let Some(first) = prev.filter(|&first| first > inst) {
            return Err(InvariantViolation::SideEffectsReordered {
                first,
                second: inst,
            });
        }
        prev = Some(inst);
    }
    Ok(())
}

/// Check load ordering against side effects.
///
/// Loads pending before a side effect must be emitted before it, and a load
/// must be emitted after the side effect preceding it.
pub fn assert_loads_before_side_effects<I: OpcodeInfo + ?Sized>(
    info: &I,
    insts: &[MachInst],
    order: &[usize],
) -> Checked {
    let pos = positions(order);
    let mut last_side_effect: Option<usize> = None;
    let mut pending: Vec<usize> = Vec::new();

    for (i, inst) in insts.iter().enumerate() {
        if info.is_block_terminator(inst) {
            continue;
        }
        if info.has_side_effect(inst) {
            if let Some(&load) = pending.iter().find(|&&load| pos[load] > pos[i]) {
                return Err(InvariantViolation::LoadReordered {
                    load,
                    side_effect: i,
                });
            }
            pending.clear();
            last_side_effect = Some(i);
        } else if info.is_load(inst) {
            if let Some(side_effect) = last_side_effect.filter(|&se| pos[se] > pos[i]) {
                return Err(InvariantViolation::LoadReordered { load: i, side_effect });
            }
            pending.push(i);
        }
    }
    Ok(())
}

/// Run every schedule check, plus the cycle check on `graph` when given.
pub fn verify_schedule<I: OpcodeInfo + ?Sized>(
    info: &I,
    insts: &[MachInst],
    graph: Option<&DepGraph>,
    order: &[usize],
) -> Checked {
    check_block_shape(info, insts)?;
    assert_permutation(insts.len(), order)?;
    assert_terminator_last(info, insts, order)?;
    assert_dependencies_respected(info, insts, order)?;
    assert_side_effects_ordered(info, insts, order)?;
    assert_loads_before_side_effects(info, insts, order)?;
    if let Some(graph) = graph {
        assert_no_cycles(graph)?;
        assert_edges_respected(graph, order)?;
    }
    Ok(())
}

/// Position of each instruction in `order`. Requires a permutation.
fn positions(order: &[usize]) -> Vec<usize> {
    let mut pos = vec![0; order.len()];
    for (position, &inst) in order.iter().enumerate() {
        pos[inst] = position;
    }
    pos
}

#[cfg(test)]
mod tests {
    use lsched_ir::{MachBlock, OpcodeTable, parse_block};

    use super::*;

    fn block() -> MachBlock {
        parse_block(
            "v1 = load v0
             v2 = add v1, v1
             store v2, v0
             v3 = load v0
             call v3
             ret",
        )
        .unwrap()
    }

    #[test]
    fn test_original_order_is_valid() {
        let table = OpcodeTable::x64();
        let block = block();
        let order: Vec<usize> = (0..block.len()).collect();
        assert_eq!(verify_schedule(&table, &block.insts, None, &order), Ok(()));
    }

    #[test]
    fn test_permutation() {
        assert_eq!(assert_permutation(3, &[2, 0, 1]), Ok(()));
        assert_eq!(
            assert_permutation(3, &[0, 1]),
            Err(InvariantViolation::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            assert_permutation(3, &[0, 1, 1]),
            Err(InvariantViolation::Duplicate(1))
        );
        assert_eq!(
            assert_permutation(2, &[0, 5]),
            Err(InvariantViolation::OutOfRange(5))
        );
    }

    #[test]
    fn test_terminator_last() {
        let table = OpcodeTable::x64();
        let block = block();
        assert_eq!(
            assert_terminator_last(&table, &block.insts, &[5, 0, 1, 2, 3, 4]),
            Err(InvariantViolation::TerminatorNotLast {
                inst: 5,
                position: 0
            })
        );
    }

    #[test]
    fn test_dependency_violation() {
        let table = OpcodeTable::x64();
        let block = block();
        assert_eq!(
            assert_dependencies_respected(&table, &block.insts, &[1, 0, 2, 3, 4, 5]),
            Err(InvariantViolation::DependencyViolated {
                producer: 0,
                consumer: 1
            })
        );
    }

    #[test]
    fn test_side_effect_violation() {
        let table = OpcodeTable::x64();
        let block = block();
        assert_eq!(
            assert_side_effects_ordered(&table, &block.insts, &[0, 1, 3, 4, 2, 5]),
            Err(InvariantViolation::SideEffectsReordered {
                first: 4,
                second: 2
            })
        );
    }

    #[test]
    fn test_load_violations() {
        let table = OpcodeTable::x64();
        let block = block();
        // Load 3 hoisted above store 2.
        assert_eq!(
            assert_loads_before_side_effects(&table, &block.insts, &[0, 1, 3, 2, 4, 5]),
            Err(InvariantViolation::LoadReordered {
                load: 3,
                side_effect: 2
            })
        );

        let block = parse_block("v1 = load v0\nv2 = const 1\nfence\nret").unwrap();
        // Pending load 0 sunk below the fence.
        assert_eq!(
            assert_loads_before_side_effects(&table, &block.insts, &[1, 2, 0, 3]),
            Err(InvariantViolation::LoadReordered {
                load: 0,
                side_effect: 2
            })
        );
    }

    #[test]
    fn test_block_shape() {
        let table = OpcodeTable::x64();
        let block = parse_block("jump\nnop\nret").unwrap();
        assert_eq!(
            check_block_shape(&table, &block.insts),
            Err(InvariantViolation::MisplacedTerminator(0))
        );
        assert_eq!(check_block_shape(&table, &[]), Ok(()));
    }
}
