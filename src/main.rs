use std::process::exit;

use rclox::{Chunk, ChunkError, InterpretError, Opcode, Value, Vm};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let chunk = match demo_chunk() {
        Ok(chunk) => chunk,
        Err(e) => {
            eprintln!("{}", e);
            exit(65);
        }
    };

    let mut vm = Vm::new();
    match vm.interpret(&chunk) {
        Ok(result) => println!("{}", result.display(vm.heap())),
        Err(e @ InterpretError::Runtime { .. }) => {
            eprintln!("{}", e);
            exit(70);
        }
    }
}

/// -((1 + 3) / 4)
fn demo_chunk() -> Result<Chunk, ChunkError> {
    let mut chunk = Chunk::new();

    chunk.write_constant(Value::from(1.0), 123)?;
    chunk.write_constant(Value::from(3.0), 123)?;
    chunk.write(Opcode::Add, 123);
    chunk.write_constant(Value::from(4.0), 123)?;

    chunk.write(Opcode::Divide, 123);
    chunk.write(Opcode::Negate, 123);
    chunk.write(Opcode::Return, 123);

    Ok(chunk)
}
