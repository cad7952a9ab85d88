use crate::variant::VariantMode;

pub const DEFAULT_TAG_NAME: &str = "ps-counter";
pub const DEFAULT_VARIANT: &str = "solid";

/// Settings for one counter definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CounterConfig {
    /// Custom element name the counter is registered under.
    pub tag_name: String,
    /// Value of the `type` property until the host sets one.
    pub default_variant: String,
    pub initial_count: u64,
    pub variant_mode: VariantMode,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            tag_name: DEFAULT_TAG_NAME.to_string(),
            default_variant: DEFAULT_VARIANT.to_string(),
            initial_count: 0,
            variant_mode: VariantMode::Permissive,
        }
    }
}

impl CounterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag_name(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = tag.into();
        self
    }

    pub fn default_variant(mut self, variant: impl Into<String>) -> Self {
        self.default_variant = variant.into();
        self
    }

    pub fn initial_count(mut self, n: u64) -> Self {
        self.initial_count = n;
        self
    }

    pub fn variant_mode(mut self, mode: VariantMode) -> Self {
        self.variant_mode = mode;
        self
    }
}
