/// Tunables for a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Treat a missing registry entry on the update path as an error instead
    /// of remounting the component.
    pub strict_instances: bool,
    /// Reject child lists holding more than one unkeyed occurrence of the
    /// same function component.
    pub require_component_keys: bool,
    /// Passes a single flush may take before giving up.
    pub max_flush_passes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            strict_instances: false,
            require_component_keys: false,
            max_flush_passes: 100,
        }
    }
}

impl RuntimeConfig {
    pub fn with_strict_instances(mut self, strict: bool) -> Self {
        self.strict_instances = strict;
        self
    }

    pub fn with_required_keys(mut self, required: bool) -> Self {
        self.require_component_keys = required;
        self
    }

    pub fn with_max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }
}
