use std::cell::Cell;
use std::rc::Rc;

use bt_core::Blackboard;
use bt_vm::{
    DecoratorFn, LeafFn, Op, Program, ProgramBuilder, ProgramError, Status, ThreadId,
    ThreadSegment, Vm, VmBlackboard,
};

fn constant(status: Status) -> LeafFn {
    Box::new(move |_, _| status)
}

fn counting(status: Status, hits: &Rc<Cell<u32>>) -> LeafFn {
    let hits = Rc::clone(hits);
    Box::new(move |_, _| {
        hits.set(hits.get() + 1);
        status
    })
}

fn main_thread(len: usize) -> Vec<ThreadSegment> {
    vec![ThreadSegment {
        name: "main".to_owned(),
        start: 0,
        end: len,
    }]
}

fn machine(code: Vec<i16>, leaves: Vec<LeafFn>, strings: &[&str]) -> Vm {
    let len = code.len();
    let strings = strings.iter().map(|s| s.to_string()).collect();
    Vm::new(Program::from_parts(code, leaves, Vec::new(), strings, main_thread(len)))
}

const MAIN: ThreadId = ThreadId(0);

#[test]
fn run_advances_pc_by_two_and_stores_the_leaf_status() {
    let mut vm = machine(vec![Op::Run.code(), 0], vec![constant(Status::Success)], &[]);

    assert_eq!(vm.step(MAIN), Status::Running);
    let thread = vm.thread(MAIN).unwrap();
    assert_eq!(thread.pc(), 2);
    assert_eq!(thread.current(), Status::Success);
    assert!(thread.is_finished());

    assert_eq!(vm.tick(), Status::Success);
    assert_eq!(vm.thread(MAIN).unwrap().pc(), 0, "pc rewinds after a complete pass");
}

#[test]
fn running_leaf_continues_the_pass() {
    let after = Rc::new(Cell::new(0));
    let mut vm = machine(
        vec![Op::Run.code(), 0, Op::Run.code(), 1],
        vec![constant(Status::Running), counting(Status::Failure, &after)],
        &[],
    );
    assert_eq!(vm.tick(), Status::Failure);
    assert_eq!(after.get(), 1);
}

#[test]
fn invalid_leaf_halts_and_rewinds() {
    let after = Rc::new(Cell::new(0));
    let mut vm = machine(
        vec![Op::Run.code(), 0, Op::Run.code(), 1],
        vec![constant(Status::Invalid), counting(Status::Success, &after)],
        &[],
    );
    assert_eq!(vm.tick(), Status::Invalid);
    assert_eq!(after.get(), 0);
    assert_eq!(vm.thread(MAIN).unwrap().pc(), 0);
}

#[test]
fn suspended_leaf_resumes_on_the_same_instruction() {
    let first = Rc::new(Cell::new(0));
    let yielded = Rc::new(Cell::new(false));
    let suspend_once: LeafFn = {
        let yielded = Rc::clone(&yielded);
        Box::new(move |_, _| {
            if yielded.replace(true) {
                Status::Success
            } else {
                Status::Suspended
            }
        })
    };
    let mut vm = machine(
        vec![Op::Run.code(), 0, Op::Run.code(), 1],
        vec![counting(Status::Success, &first), suspend_once],
        &[],
    );

    assert_eq!(vm.tick(), Status::Suspended);
    assert_eq!(vm.thread(MAIN).unwrap().pc(), 2);

    assert_eq!(vm.tick(), Status::Success);
    assert_eq!(first.get(), 1, "earlier instructions are not replayed");
}

#[test]
fn status_opcodes_rewrite_the_current_status() {
    let mut vm = machine(
        vec![Op::SetFailure.code(), Op::Negate.code()],
        Vec::new(),
        &[],
    );
    assert_eq!(vm.tick(), Status::Success);

    let mut vm = machine(
        vec![Op::SetSuccess.code(), Op::Negate.code(), Op::Negate.code(), Op::SetFailure.code()],
        Vec::new(),
        &[],
    );
    assert_eq!(vm.tick(), Status::Failure);
}

#[test]
fn check_fact_reads_presence_and_remove_fact_deletes() {
    let code = vec![
        Op::CheckFact.code(),
        0,
        Op::RemoveFact.code(),
        0,
        Op::CheckFact.code(),
        0,
    ];
    let len = code.len();
    let program = Program::from_parts(code, Vec::new(), Vec::new(), vec!["door".into()], main_thread(len));
    let mut vm = Vm::with_blackboard(program, [("door", "open")].into_iter().collect());

    assert_eq!(vm.step(MAIN), Status::Running);
    assert_eq!(vm.thread(MAIN).unwrap().current(), Status::Success);
    assert_eq!(vm.step(MAIN), Status::Running);
    assert!(!vm.blackboard().has_fact("door"));
    assert_eq!(vm.thread(MAIN).unwrap().current(), Status::Success);
    assert_eq!(vm.step(MAIN), Status::Running);
    assert_eq!(vm.thread(MAIN).unwrap().current(), Status::Failure);
}

#[test]
fn branches_are_relative_to_the_branch_instruction() {
    let code = vec![
        Op::CheckFact.code(),
        0,
        Op::BranchIfFailure.code(),
        5,
        Op::SetSuccess.code(),
        Op::Negate.code(),
        Op::Negate.code(),
        Op::Negate.code(),
    ];
    let len = code.len();
    let build = |facts: VmBlackboard| {
        let program =
            Program::from_parts(code.clone(), Vec::new(), Vec::new(), vec!["a".into()], main_thread(len));
        Vm::with_blackboard(program, facts)
    };

    // taken: lands on the last negate, Failure → Success
    let mut missing = build(VmBlackboard::new());
    assert_eq!(missing.tick(), Status::Success);

    // not taken: set_success then three negates
    let mut present = build([("a", "1")].into_iter().collect());
    assert_eq!(present.tick(), Status::Failure);
}

#[test]
fn branch_if_success_only_fires_on_success() {
    let code = vec![
        Op::SetSuccess.code(),
        Op::BranchIfSuccess.code(),
        3,
        Op::SetFailure.code(),
    ];
    let mut vm = machine(code, Vec::new(), &[]);
    assert_eq!(vm.tick(), Status::Success);
}

#[test]
fn decorator_sees_the_current_status() {
    let negate: DecoratorFn = Box::new(|thread, _| thread.current().negate());
    let code = vec![Op::SetSuccess.code(), Op::RunDecorator.code(), 0];
    let program = Program::from_parts(
        code,
        Vec::new(),
        vec![negate],
        Vec::new(),
        main_thread(3),
    );
    let mut vm = Vm::new(program);
    assert_eq!(vm.tick(), Status::Failure);
}

#[test]
fn leaves_can_write_the_blackboard() {
    let mark: LeafFn = Box::new(|_, bb| {
        bb.set_fact("seen", "yes");
        Status::Failure
    });
    let mut vm = machine(
        vec![Op::Run.code(), 0, Op::CheckFact.code(), 0],
        vec![mark],
        &["seen"],
    );
    assert_eq!(vm.tick(), Status::Success);
    assert_eq!(vm.blackboard().get("seen"), "yes");
}

#[test]
fn tooling_opcodes_advance_without_touching_status() {
    let mut vm = machine(
        vec![Op::SetFailure.code(), Op::DebugBreak.code(), Op::Log.code(), 0],
        Vec::new(),
        &["checkpoint"],
    );
    vm.step(MAIN);
    assert_eq!(vm.step(MAIN), Status::Running);
    assert_eq!(vm.thread(MAIN).unwrap().pc(), 2);
    assert_eq!(vm.step(MAIN), Status::Running);
    assert_eq!(vm.thread(MAIN).unwrap().pc(), 4);
    assert_eq!(vm.thread(MAIN).unwrap().current(), Status::Failure);
}

#[test]
fn unknown_opcode_is_invalid() {
    let mut vm = machine(vec![42], Vec::new(), &[]);
    assert_eq!(vm.tick(), Status::Invalid);
    assert_eq!(vm.thread(MAIN).unwrap().pc(), 0);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn missing_operand_panics() {
    let mut vm = machine(vec![Op::Run.code()], vec![constant(Status::Success)], &[]);
    vm.tick();
}

#[test]
#[should_panic(expected = "leaf index 3")]
fn leaf_index_out_of_range_panics() {
    let mut vm = machine(vec![Op::Run.code(), 3], vec![constant(Status::Success)], &[]);
    vm.tick();
}

#[test]
fn validate_reports_structural_problems() {
    let check = |code: Vec<i16>, leaves: usize| {
        let len = code.len();
        let leaves = (0..leaves).map(|_| constant(Status::Success)).collect();
        Program::from_parts(code, leaves, Vec::new(), vec!["s".into()], main_thread(len)).validate()
    };

    assert_eq!(check(vec![Op::Run.code(), 0], 1), Ok(()));
    assert_eq!(check(vec![77], 0), Err(ProgramError::BadOpcode { at: 0, raw: 77 }));
    assert_eq!(
        check(vec![Op::SetSuccess.code(), Op::Run.code()], 1),
        Err(ProgramError::Truncated { at: 1 })
    );
    assert_eq!(
        check(vec![Op::Run.code(), 1], 1),
        Err(ProgramError::BadIndex { at: 0, table: "leaf", index: 1 })
    );
    assert_eq!(
        check(vec![Op::CheckFact.code(), -1], 0),
        Err(ProgramError::BadIndex { at: 0, table: "string", index: -1 })
    );
    assert_eq!(
        check(vec![Op::BranchIfFailure.code(), 3], 0),
        Err(ProgramError::BadBranch { at: 0, target: 3 })
    );
    assert_eq!(check(vec![Op::BranchIfFailure.code(), 2], 0), Ok(()));
    assert_eq!(
        check(
            vec![Op::SetFailure.code(), Op::BranchIfFailure.code(), 1, Op::SetSuccess.code()],
            0
        ),
        Err(ProgramError::MisalignedBranch { at: 1, target: 2 }),
        "a branch into an operand slot would decode the operand as an opcode"
    );
    assert_eq!(
        check(
            vec![Op::SetFailure.code(), Op::BranchIfFailure.code(), 2, Op::SetSuccess.code()],
            0
        ),
        Ok(())
    );

    let program = Program::from_parts(
        vec![Op::SetSuccess.code()],
        Vec::new(),
        Vec::new(),
        Vec::new(),
        vec![ThreadSegment {
            name: "long".into(),
            start: 0,
            end: 4,
        }],
    );
    assert!(matches!(program.validate(), Err(ProgramError::BadSegment { .. })));
}

#[test]
fn builder_patches_labels_and_interns_strings() {
    let mut b = ProgramBuilder::new();
    let end = b.new_label();
    b.check_fact("a").unwrap().branch_if_failure(end);
    b.check_fact("b").unwrap().branch_if_failure(end);
    b.remove_fact("a").unwrap();
    b.bind(end);
    let program = b.build().unwrap();

    assert_eq!(program.strings(), ["a", "b"]);
    assert_eq!(program.code(), [8, 0, 3, 8, 8, 1, 3, 4, 9, 0]);
    assert_eq!(program.threads()[0].name, "main", "code before any thread lands in main");
    assert_eq!(program.threads()[0].end, 10);

    let listing = program.to_string();
    assert!(listing.contains("branch_if_failure 8"), "{listing}");
    assert!(listing.contains("remove_fact 0 ; \"a\""), "{listing}");
}

#[test]
fn builder_rejects_unbound_labels() {
    let mut b = ProgramBuilder::new();
    let nowhere = b.new_label();
    b.set_success().branch_if_success(nowhere);
    assert_eq!(b.build().unwrap_err(), ProgramError::UnboundLabel);
}

#[test]
fn tick_without_threads_is_invalid() {
    let mut vm = Vm::new(ProgramBuilder::new().build().unwrap());
    assert_eq!(vm.tick(), Status::Invalid);
}
