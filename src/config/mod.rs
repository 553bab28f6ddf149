//! Configuration for a compilation run.
//!
//! Settings come from a TOML file: target dialect, naming, label policy,
//! period-over-period strategy and explore definitions.

mod settings;

pub use settings::{
    expand_env_vars, CompileSettings, ExploreSettings, JoinOverrideSettings, LabelSettings,
    PopSettings, Settings, SettingsError,
};
