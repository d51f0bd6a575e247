/// Settings fixed when a [`Vm`][crate::vm::Vm] is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Most values the stack may hold before a push fails.
    pub stack_max: usize,
    /// Log every instruction and the stack at `trace` level.
    pub trace_execution: bool,
}

impl VmConfig {
    pub const STACK_MAX: usize = 256;

    pub fn with_stack_max(mut self, stack_max: usize) -> Self {
        self.stack_max = stack_max;
        self
    }

    pub fn with_trace_execution(mut self, trace_execution: bool) -> Self {
        self.trace_execution = trace_execution;
        self
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_max: VmConfig::STACK_MAX,
            trace_execution: cfg!(feature = "debug_trace"),
        }
    }
}
