//! Configuration handling for sdkpack
//!
//! A configuration document has a `global` section shared by every target and
//! an `sdks` map with one section per SDK target. Documents are validated
//! against a declarative schema (collecting every violation), completed with
//! defaults, and merged per target on demand.

pub mod formats;
pub mod loader;
pub mod merge;
pub mod schema;
pub mod scope;
pub mod types;

pub use loader::{ConfigFormat, ConfigStore};
pub use merge::deep_merge;
pub use schema::{Field, Format, Rule, TargetSchema};
pub use scope::DeletionScope;
pub use types::{
    ApiConfig, Bugs, Configuration, GlobalConfig, Person, Protocol, Repository, RouteOverride,
    TargetConfig, TargetOverride,
};
