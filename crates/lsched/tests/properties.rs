//! Property tests: every schedule of a random block keeps the ordering
//! invariants, under both queue strategies.

use lsched::{
    BlockScheduler, MachBlock, MachInst, Opcode, OpcodeInfo, OpcodeTable, SchedConfig, VReg,
    check_graph, verify_schedule,
};
use proptest::prelude::*;

const REGS: u32 = 8;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_reg() -> impl Strategy<Value = VReg> {
    (0..REGS).prop_map(VReg)
}

fn arb_body_opcode() -> impl Strategy<Value = Opcode> {
    prop_oneof![
        Just(Opcode::Param),
        Just(Opcode::Nop),
        Just(Opcode::Mov),
        Just(Opcode::Const),
        Just(Opcode::Add),
        Just(Opcode::Mul),
        Just(Opcode::Div),
        Just(Opcode::Cmp),
        Just(Opcode::Load),
        Just(Opcode::Load),
        Just(Opcode::Store),
        Just(Opcode::Call),
        Just(Opcode::Fence),
    ]
}

fn arb_inst() -> impl Strategy<Value = MachInst> {
    (arb_body_opcode(), arb_reg(), arb_reg(), arb_reg()).prop_map(|(opcode, d, a, b)| {
        let (defs, uses) = match opcode {
            Opcode::Param | Opcode::Const => (vec![d], vec![]),
            Opcode::Nop | Opcode::Fence => (vec![], vec![]),
            Opcode::Mov | Opcode::Load => (vec![d], vec![a]),
            Opcode::Store => (vec![], vec![a, b]),
            _ => (vec![d], vec![a, b]),
        };
        MachInst::with_operands(opcode, defs, uses)
    })
}

fn arb_terminator() -> impl Strategy<Value = Option<MachInst>> {
    prop_oneof![
        Just(None),
        Just(Some(MachInst::new(Opcode::Jump))),
        arb_reg().prop_map(|r| Some(MachInst::with_operands(Opcode::Branch, vec![], vec![r]))),
        arb_reg().prop_map(|r| Some(MachInst::ret(Some(r)))),
    ]
}

fn arb_block() -> impl Strategy<Value = MachBlock> {
    (prop::collection::vec(arb_inst(), 0..24), arb_terminator()).prop_map(|(mut insts, term)| {
        insts.extend(term);
        MachBlock::with_insts("entry", insts)
    })
}

fn arb_table() -> impl Strategy<Value = OpcodeTable> {
    prop_oneof![Just(OpcodeTable::x64()), Just(OpcodeTable::arm64())]
}

fn schedule(table: &OpcodeTable, config: &SchedConfig, block: &MachBlock) -> Vec<usize> {
    let mut sched = BlockScheduler::new(table, config);
    let schedule = sched.schedule(&block.insts);
    assert_eq!(check_graph(sched.graph()), Ok(()));
    assert_eq!(
        verify_schedule(table, &block.insts, Some(sched.graph()), &schedule.order),
        Ok(())
    );
    schedule.order
}

// ============================================================================
// Ordering invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The default strategy produces a valid schedule.
    #[test]
    fn critical_path_schedule_is_valid(table in arb_table(), block in arb_block()) {
        let order = schedule(&table, &SchedConfig::default().with_verify(false), &block);
        prop_assert_eq!(order.len(), block.len());
    }

    /// Every stress seed produces a valid schedule.
    #[test]
    fn stress_schedule_is_valid(
        table in arb_table(),
        block in arb_block(),
        seeds in prop::collection::vec(any::<u64>(), 1..8),
    ) {
        for seed in seeds {
            let order = schedule(&table, &SchedConfig::stress(seed).with_verify(false), &block);
            prop_assert_eq!(order.len(), block.len());
        }
    }

    /// The terminator stays in the last slot.
    #[test]
    fn terminator_is_last(table in arb_table(), block in arb_block(), seed in any::<u64>()) {
        let order = schedule(&table, &SchedConfig::stress(seed), &block);
        if block.last().is_some_and(|inst| table.is_block_terminator(inst)) {
            prop_assert_eq!(order.last(), Some(&(block.len() - 1)));
        }
    }

    /// Same block, same seed: same schedule.
    #[test]
    fn schedules_are_deterministic(
        table in arb_table(),
        block in arb_block(),
        seed in any::<u64>(),
    ) {
        for config in [SchedConfig::default(), SchedConfig::stress(seed)] {
            let first = schedule(&table, &config, &block);
            let second = schedule(&table, &config, &block);
            prop_assert_eq!(first, second);
        }
    }

    /// The first node out is a root with the longest remaining chain.
    #[test]
    fn critical_path_starts_with_longest_chain(table in arb_table(), block in arb_block()) {
        let mut sched = BlockScheduler::new(&table, &SchedConfig::default());
        let order = sched.schedule(&block.insts).order;
        let graph = sched.graph();
        if !graph.is_empty() {
            let in_degrees = graph.in_degrees();
            let best = graph
                .nodes()
                .iter()
                .zip(&in_degrees)
                .filter(|&(_, &preds)| preds == 0)
                .map(|(node, _)| node.total_latency())
                .max()
                .unwrap_or(0);
            let first = graph.nodes()[order[0]].total_latency();
            prop_assert_eq!(first, best);
        }
    }
}
