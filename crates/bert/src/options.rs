/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Deepest tuple/list/dict nesting accepted before failing with
    /// [`BertError::DepthLimitExceeded`](crate::BertError::DepthLimitExceeded).
    /// The default stays within a 2 MiB thread stack in unoptimized builds.
    pub max_depth: usize,
    /// Share one allocation between equal atoms within a decoder.
    pub intern_atoms: bool,
    /// Distinct atom names the decoder's table may hold. Interning a new name
    /// into a full table empties it first.
    pub max_atoms: usize,
}

impl DecodeOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 128;
    pub const DEFAULT_MAX_ATOMS: usize = 4096;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_intern_atoms(mut self, intern_atoms: bool) -> Self {
        self.intern_atoms = intern_atoms;
        self
    }

    pub fn with_max_atoms(mut self, max_atoms: usize) -> Self {
        self.max_atoms = max_atoms;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            intern_atoms: true,
            max_atoms: Self::DEFAULT_MAX_ATOMS,
        }
    }
}
