//! A stack-based bytecode virtual machine for Lox.
//!
//! Chunks are assembled by hand (there is no compiler here) and executed by a
//! [`Vm`], which owns every heap object it allocates. Strings are interned:
//! equal contents always share one object, so string equality is handle
//! equality.

mod chunk;
mod config;
mod heap;
mod object;
mod string;
mod table;
mod value;
mod vm;

pub use chunk::{Chunk, ChunkError, DecodeError, Instruction, Opcode};
pub use config::VmConfig;
pub use heap::{Heap, HeapError, Objects};
pub use object::{Obj, ObjBody, ObjRef, ObjType, Object};
pub use string::{hash_string, ObjString};
pub use table::Table;
pub use value::{TypeError, Value, ValueDisplay};
pub use vm::{InterpretError, RuntimeError, Vm};
