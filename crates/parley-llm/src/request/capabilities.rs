use std::collections::HashMap;
use std::sync::OnceLock;

use indexmap::IndexMap;
use parley_config::CapabilityOverride;

/// Known chat model identifiers
pub mod models {
    pub const GPT_4O: &str = "gpt-4o";
    pub const GPT_4O_MINI: &str = "gpt-4o-mini";
    pub const GPT_4_1: &str = "gpt-4.1";
    pub const GPT_4_1_MINI: &str = "gpt-4.1-mini";
    pub const GPT_4_1_NANO: &str = "gpt-4.1-nano";
    pub const O1: &str = "o1";
    pub const O1_MINI: &str = "o1-mini";
    pub const O1_PRO: &str = "o1-pro";
    pub const O3: &str = "o3";
    pub const O3_MINI: &str = "o3-mini";
    pub const O3_PRO: &str = "o3-pro";
    pub const O4_MINI: &str = "o4-mini";
    pub const GPT_5: &str = "gpt-5";
    pub const GPT_5_MINI: &str = "gpt-5-mini";
    pub const GPT_5_NANO: &str = "gpt-5-nano";
    pub const GPT_5_1: &str = "gpt-5.1";

    /// Model used when neither the caller nor the configuration names one
    pub const DEFAULT: &str = GPT_4_1;

    /// Models that reject `temperature`
    pub const REASONING_ONLY: &[&str] = &[
        O1, O1_MINI, O1_PRO, O3, O3_MINI, O3_PRO, O4_MINI, GPT_5, GPT_5_MINI, GPT_5_NANO, GPT_5_1,
    ];

    /// Models that accept `temperature` but not reasoning controls
    pub const STANDARD: &[&str] = &[GPT_4O, GPT_4O_MINI, GPT_4_1, GPT_4_1_MINI, GPT_4_1_NANO];
}

/// Request features a model accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub temperature: bool,
    pub reasoning: bool,
}

impl Capabilities {
    /// Assumed for models missing from the table
    pub const ALL: Self = Self {
        temperature: true,
        reasoning: true,
    };
    pub const REASONING_ONLY: Self = Self {
        temperature: false,
        reasoning: true,
    };
    pub const STANDARD: Self = Self {
        temperature: true,
        reasoning: false,
    };

    #[must_use]
    fn apply(mut self, overrides: &CapabilityOverride) -> Self {
        if let Some(temperature) = overrides.temperature {
            self.temperature = temperature;
        }
        if let Some(reasoning) = overrides.reasoning {
            self.reasoning = reasoning;
        }
        self
    }
}

/// Explicit model to capability mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    models: HashMap<String, Capabilities>,
}

impl CapabilityTable {
    /// Table of the models this crate knows about
    pub fn builtin() -> &'static Self {
        static TABLE: OnceLock<CapabilityTable> = OnceLock::new();

        TABLE.get_or_init(|| {
            let reasoning_only = models::REASONING_ONLY
                .iter()
                .map(|model| ((*model).to_owned(), Capabilities::REASONING_ONLY));
            let standard = models::STANDARD
                .iter()
                .map(|model| ((*model).to_owned(), Capabilities::STANDARD));

            Self {
                models: reasoning_only.chain(standard).collect(),
            }
        })
    }

    /// Built-in table extended with configured overrides
    ///
    /// An override for an unknown model starts from [`Capabilities::ALL`].
    pub fn with_overrides(overrides: &IndexMap<String, CapabilityOverride>) -> Self {
        let mut table = Self::builtin().clone();
        for (model, capability) in overrides {
            let base = table.lookup(model);
            table.insert(model.clone(), base.apply(capability));
        }
        table
    }

    pub fn insert(&mut self, model: impl Into<String>, capabilities: Capabilities) {
        self.models.insert(model.into(), capabilities);
    }

    /// Capabilities of a model, everything accepted when unknown
    pub fn lookup(&self, model: &str) -> Capabilities {
        self.models.get(model).copied().unwrap_or(Capabilities::ALL)
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
