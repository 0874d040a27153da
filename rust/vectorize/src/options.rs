//! Options shared by the adapters produced by a single factory call.

use vectorize_array::OutputOptions;

/// Configuration of a vectorized method.
#[derive(Debug, Clone, Default)]
pub struct VectorizeOptions {
    output: OutputOptions,
}

impl VectorizeOptions {
    pub fn new() -> VectorizeOptions {
        Default::default()
    }

    /// Replaces the allocation settings of output arrays.
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Shorthand for setting the output alignment.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.output = self.output.with_alignment(alignment);
        self
    }

    /// Shorthand for limiting the size of a single output buffer.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.output = self.output.with_max_bytes(max_bytes);
        self
    }

    /// Shorthand for observing output buffer releases.
    pub fn with_release_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.output = self.output.with_release_hook(hook);
        self
    }

    pub fn output(&self) -> &OutputOptions {
        &self.output
    }
}
