use log::{debug, error, log_enabled, trace, Level};
use thiserror::Error;

use crate::{
    chunk::{Chunk, DecodeError, Instruction, Opcode},
    config::VmConfig,
    heap::{Heap, HeapError},
    object::ObjRef,
    string::ObjString,
    value::{TypeError, Value},
};

macro_rules! binop {
    ($vm:expr, $op:expr) => {{
        let r = $vm.pop()?;
        let l = $vm.pop()?;
        let new = $op(&l, &r).into();
        $vm.push(new)?;
    }};
}

macro_rules! binop_err {
    ($vm:expr, $op:expr) => {{
        let r = $vm.pop()?;
        let l = $vm.pop()?;
        let new = $op(l, r)?;
        $vm.push(new)?;
    }};
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Heap(#[from] HeapError),
    #[error("Stack overflow, capacity is {capacity}.")]
    StackOverflow { capacity: usize },
    #[error("Stack underflow.")]
    StackUnderflow,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    #[error("{error}\n[line {line}] in script")]
    Runtime {
        line: usize,
        #[source]
        error: RuntimeError,
    },
}

impl InterpretError {
    pub fn line(&self) -> usize {
        match self {
            InterpretError::Runtime { line, .. } => *line,
        }
    }

    pub fn runtime_error(&self) -> &RuntimeError {
        match self {
            InterpretError::Runtime { error, .. } => error,
        }
    }
}

/// Executes chunks against a bounded value stack.
///
/// The VM owns its [`Heap`], so strings interned by one VM are never shared
/// with another.
#[derive(Debug)]
pub struct Vm {
    config: VmConfig,
    /// Offset of the instruction being executed.
    ip: usize,
    stack: Vec<Value>,
    heap: Heap,
}

impl Default for Vm {
    fn default() -> Vm {
        Vm::new()
    }
}

impl Vm {
    pub fn new() -> Vm {
        Vm::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Vm {
        Vm {
            config,
            ip: 0,
            stack: Vec::with_capacity(config.stack_max.min(VmConfig::STACK_MAX)),
            heap: Heap::new(),
        }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Interns `s` in this VM's heap.
    pub fn intern(&mut self, s: &str) -> Value {
        ObjString::copy(s.as_bytes(), &mut self.heap).into()
    }

    /// Runs `chunk` from its first byte and returns the value it returned.
    ///
    /// Running off the end of the code without a `Return` yields `nil`.
    pub fn interpret(&mut self, chunk: &Chunk) -> Result<Value, InterpretError> {
        debug!(
            "interpret {} bytes, {} constants",
            chunk.len(),
            chunk.constants.len()
        );

        self.reset_stack();
        self.ip = 0;

        match self.run(chunk) {
            Ok(result) => {
                debug!("finished with {}", result.display(&self.heap));
                Ok(result)
            }
            Err(e) => Err(self.runtime_error(chunk, e)),
        }
    }

    fn reset_stack(&mut self) {
        self.stack.clear();
    }

    fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.stack_max {
            return Err(RuntimeError::StackOverflow {
                capacity: self.config.stack_max,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    fn peek(&self, distance: usize) -> Result<Value, RuntimeError> {
        self.stack
            .len()
            .checked_sub(1 + distance)
            .map(|i| self.stack[i])
            .ok_or(RuntimeError::StackUnderflow)
    }

    fn run(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        while self.ip < chunk.len() {
            let (instruction, next) = chunk.decode(self.ip)?;

            if self.config.trace_execution {
                self.trace_instruction(instruction);
            }

            match instruction {
                Instruction::Constant(index) => {
                    let constant = chunk.constants[index as usize];
                    // Object constants must belong to this VM's heap.
                    if let Value::Obj(obj) = constant {
                        self.heap.get(obj)?;
                    }
                    self.push(constant)?;
                }

                Instruction::Op(Opcode::Return) => {
                    return self.pop();
                }

                Instruction::Op(Opcode::Negate) => {
                    let value = self.peek(0)?;
                    let negated = (-value)?;
                    self.pop()?;
                    self.push(negated)?;
                }

                Instruction::Op(Opcode::Not) => {
                    let value = self.pop()?;
                    self.push(value.is_falsey().into())?;
                }

                Instruction::Op(Opcode::Concat) => {
                    let r = self.pop()?;
                    let l = self.pop()?;
                    let (l, r) = match (l, r) {
                        (Value::Obj(l), Value::Obj(r))
                            if self.is_string(l) && self.is_string(r) =>
                        {
                            (l, r)
                        }
                        _ => return Err(TypeError::Strings.into()),
                    };
                    let joined = ObjString::concatenate(l, r, &mut self.heap)?;
                    self.push(joined.into())?;
                }

                Instruction::Op(Opcode::Nil) => self.push(Value::Nil)?,
                Instruction::Op(Opcode::True) => self.push(Value::from(true))?,
                Instruction::Op(Opcode::False) => self.push(Value::from(false))?,
                Instruction::Op(Opcode::Add) => binop_err!(self, Value::add),
                Instruction::Op(Opcode::Subtract) => {
                    binop_err!(self, std::ops::Sub::sub)
                }
                Instruction::Op(Opcode::Multiply) => {
                    binop_err!(self, std::ops::Mul::mul)
                }
                Instruction::Op(Opcode::Divide) => {
                    binop_err!(self, std::ops::Div::div)
                }
                Instruction::Op(Opcode::Equal) => {
                    binop!(self, std::cmp::PartialEq::eq)
                }
                Instruction::Op(Opcode::Greater) => {
                    binop_err!(self, Value::greater_than)
                }
                Instruction::Op(Opcode::Less) => {
                    binop_err!(self, Value::less_than)
                }

                // `decode` never yields a bare `Constant` opcode.
                Instruction::Op(op) => {
                    return Err(DecodeError::UnknownOpcode {
                        offset: self.ip,
                        byte: op.into(),
                    }
                    .into())
                }
            }

            self.ip = next;
        }

        Ok(Value::Nil)
    }

    fn is_string(&self, obj: ObjRef) -> bool {
        self.heap.get_as::<ObjString>(obj).is_ok()
    }

    fn trace_instruction(&self, instruction: Instruction) {
        if !log_enabled!(Level::Trace) {
            return;
        }

        let stack: Vec<String> = self
            .stack
            .iter()
            .map(|v| v.display(&self.heap).to_string())
            .collect();

        trace!(
            "ip {:4} {:<16} stack: [{}]",
            self.ip,
            instruction.opcode().to_str(),
            stack.join(", ")
        );
    }

    fn runtime_error(&mut self, chunk: &Chunk, e: RuntimeError) -> InterpretError {
        let line = chunk.line(self.ip).unwrap_or_default();
        error!("{}\n[line {}] in script", e, line);

        self.reset_stack();

        InterpretError::Runtime { line, error: e }
    }
}
