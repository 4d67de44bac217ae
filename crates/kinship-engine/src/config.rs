//! Configuration types for the genealogy engine.

/// Generation bound shared by every traversal.
///
/// Reaching it stops a walk instead of looping on malformed cyclic data.
pub const MAX_GENERATIONS: usize = 100;

/// Configuration for the genealogy engine.
///
/// # Example
///
/// ```rust
/// use kinship_engine::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .with_max_depth(40)
///     .with_siblings(false)
///     .build();
///
/// assert_eq!(config.max_depth, 40);
/// assert!(config.attach_spouses);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum generations any traversal may walk.
    pub max_depth: usize,
    /// Attach spousal partners to every rendered tree node.
    pub attach_spouses: bool,
    /// Attach siblings to every rendered tree node.
    pub attach_siblings: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_GENERATIONS,
            attach_spouses: true,
            attach_siblings: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    max_depth: usize,
    attach_spouses: bool,
    attach_siblings: bool,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            max_depth: defaults.max_depth,
            attach_spouses: defaults.attach_spouses,
            attach_siblings: defaults.attach_siblings,
        }
    }
}

impl EngineConfigBuilder {
    /// Sets the generation bound. Zero is clamped to one.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Enables or disables spouse attachment on tree nodes.
    pub fn with_spouses(mut self, attach: bool) -> Self {
        self.attach_spouses = attach;
        self
    }

    /// Enables or disables sibling attachment on tree nodes.
    pub fn with_siblings(mut self, attach: bool) -> Self {
        self.attach_siblings = attach;
        self
    }

    /// Builds the EngineConfig.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            max_depth: self.max_depth,
            attach_spouses: self.attach_spouses,
            attach_siblings: self.attach_siblings,
        }
    }
}
