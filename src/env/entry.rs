use std::collections::BTreeMap;

/// A single `KEY=value` assignment from a `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub value: String,
    /// 1-based line the assignment came from, for error messages.
    pub line: usize,
}

/// Index by key for lookup while layering configuration.
pub type EnvIndex = BTreeMap<String, EnvEntry>;
