mod loader;

pub use loader::{
    wildcard_match, AnalysisStrategy, Config, PathPatterns, ProviderChoice, SearchConfig,
    DEFAULT_CONFIG_NAMES,
};
