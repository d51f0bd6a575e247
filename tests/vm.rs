use pretty_assertions::assert_eq;
use rclox::*;

/// Appends `ops` to `chunk`, all on `line`.
fn write_ops(chunk: &mut Chunk, ops: &[Opcode], line: usize) {
    for op in ops {
        chunk.write(*op, line);
    }
}

/// Runs `chunk` in a fresh VM.
fn run(chunk: &Chunk) -> Result<Value, InterpretError> {
    Vm::new().interpret(chunk)
}

#[test]
fn arithmetic_scenario() {
    let mut chunk = Chunk::new();
    chunk.write_constant(Value::from(1.0), 123).unwrap();
    chunk.write_constant(Value::from(3.0), 123).unwrap();
    chunk.write(Opcode::Add, 123);
    chunk.write_constant(Value::from(4.0), 123).unwrap();
    write_ops(&mut chunk, &[Opcode::Divide, Opcode::Negate, Opcode::Return], 123);

    assert_eq!(run(&chunk), Ok(Value::Number(-1.0)));
    assert_eq!(chunk.code.len(), chunk.lines.len());
}

#[test]
fn subtract_and_multiply_pop_right_first() {
    let mut chunk = Chunk::new();
    chunk.write_constant(Value::from(10.0), 1).unwrap();
    chunk.write_constant(Value::from(4.0), 1).unwrap();
    chunk.write(Opcode::Subtract, 1);
    chunk.write_constant(Value::from(3.0), 1).unwrap();
    write_ops(&mut chunk, &[Opcode::Multiply, Opcode::Return], 1);

    assert_eq!(run(&chunk), Ok(Value::Number(18.0)));
}

#[test]
fn divide_by_zero_is_infinite() {
    let mut chunk = Chunk::new();
    chunk.write_constant(Value::from(1.0), 1).unwrap();
    chunk.write_constant(Value::from(0.0), 1).unwrap();
    write_ops(&mut chunk, &[Opcode::Divide, Opcode::Return], 1);

    assert_eq!(run(&chunk), Ok(Value::Number(f64::INFINITY)));
}

#[test]
fn add_with_one_operand_underflows() {
    let mut chunk = Chunk::new();
    chunk.write_constant(Value::from(1.0), 4).unwrap();
    write_ops(&mut chunk, &[Opcode::Add, Opcode::Return], 5);

    let err = run(&chunk).unwrap_err();
    assert_eq!(err.runtime_error(), &RuntimeError::StackUnderflow);
    assert_eq!(err.line(), 5);
}

#[test]
fn add_with_a_non_number_is_a_type_error() {
    let mut vm = Vm::new();
    let s = vm.intern("one");

    let mut chunk = Chunk::new();
    chunk.write_constant(Value::from(1.0), 1).unwrap();
    chunk.write_constant(s, 1).unwrap();
    write_ops(&mut chunk, &[Opcode::Add, Opcode::Return], 2);

    let err = vm.interpret(&chunk).unwrap_err();
    assert_eq!(err.runtime_error(), &RuntimeError::Type(TypeError::Numbers));
    assert_eq!(err.line(), 2);
    assert!(vm.stack().is_empty());
}

#[test]
fn pushing_past_capacity_overflows() {
    let mut vm = Vm::with_config(VmConfig::default().with_stack_max(3));

    let mut chunk = Chunk::new();
    for line in 1..=4 {
        chunk.write(Opcode::Nil, line);
    }

    let err = vm.interpret(&chunk).unwrap_err();
    assert_eq!(
        err.runtime_error(),
        &RuntimeError::StackOverflow { capacity: 3 }
    );
    assert_eq!(err.line(), 4);

    // Filling the stack exactly is fine.
    let mut chunk = Chunk::new();
    write_ops(&mut chunk, &[Opcode::Nil, Opcode::Nil, Opcode::True, Opcode::Return], 1);
    assert_eq!(vm.interpret(&chunk), Ok(Value::Boolean(true)));
}

#[test]
fn constant_index_out_of_range() {
    let mut chunk = Chunk::new();
    chunk.write_constant(Value::from(1.0), 1).unwrap();
    chunk.write(Opcode::Constant, 9);
    chunk.write(1u8, 9);

    let err = run(&chunk).unwrap_err();
    assert_eq!(
        err.runtime_error(),
        &RuntimeError::Decode(DecodeError::ConstantOutOfRange {
            offset: 2,
            index: 1,
            len: 1,
        })
    );
    assert_eq!(err.line(), 9);
}

#[test]
fn truncated_constant_is_reported() {
    let mut chunk = Chunk::new();
    chunk.write(Opcode::Constant, 1);

    let err = run(&chunk).unwrap_err();
    assert_eq!(
        err.runtime_error(),
        &RuntimeError::Decode(DecodeError::MissingOperand { offset: 0 })
    );
}

#[test]
fn unknown_opcode_is_reported() {
    let mut chunk = Chunk::new();
    chunk.write(Opcode::Nil, 1);
    chunk.write(0xffu8, 2);

    let err = run(&chunk).unwrap_err();
    assert_eq!(
        err.runtime_error(),
        &RuntimeError::Decode(DecodeError::UnknownOpcode {
            offset: 1,
            byte: 0xff
        })
    );
    assert_eq!(err.line(), 2);
}

#[test]
fn strings_are_interned_per_vm() {
    let mut vm = Vm::new();
    let a = vm.intern("lox");
    let b = vm.intern("lox");
    assert_eq!(a, b);
    assert_eq!(vm.heap().interned_count(), 1);

    let mut other = Vm::new();
    let c = other.intern("lox");
    assert_ne!(a, c);
}

#[test]
fn handles_from_another_vm_are_rejected() {
    let mut first = Vm::new();
    let mut second = Vm::new();
    let foreign = first.intern("from-first");
    second.intern("from-second");

    let mut chunk = Chunk::new();
    chunk.write_constant(foreign, 4).unwrap();
    chunk.write(Opcode::Return, 4);

    let err = second.interpret(&chunk).unwrap_err();
    assert_eq!(
        err.runtime_error(),
        &RuntimeError::Heap(HeapError::Dangling(foreign.as_obj().unwrap()))
    );
    assert_eq!(err.line(), 4);

    assert_eq!(first.interpret(&chunk), Ok(foreign));
}

#[test]
fn equal_strings_compare_equal_at_runtime() {
    let mut vm = Vm::new();
    let a = vm.intern("same");
    let b = ObjString::take(b"same".to_vec(), vm.heap_mut());

    let mut chunk = Chunk::new();
    chunk.write_constant(a, 1).unwrap();
    chunk.write_constant(Value::Obj(b), 1).unwrap();
    write_ops(&mut chunk, &[Opcode::Equal, Opcode::Return], 1);

    assert_eq!(vm.interpret(&chunk), Ok(Value::Boolean(true)));
    assert_eq!(vm.heap().len(), 1);
}

#[test]
fn vm_is_reusable_after_an_error() {
    let mut vm = Vm::new();

    let mut bad = Chunk::new();
    write_ops(&mut bad, &[Opcode::True, Opcode::Nil, Opcode::Multiply], 1);
    assert!(vm.interpret(&bad).is_err());

    let mut good = Chunk::new();
    chunk_negate_two(&mut good);
    assert_eq!(vm.interpret(&good), Ok(Value::Number(-2.0)));
}

fn chunk_negate_two(chunk: &mut Chunk) {
    chunk.write_constant(Value::from(2.0), 1).unwrap();
    write_ops(chunk, &[Opcode::Negate, Opcode::Return], 1);
}
