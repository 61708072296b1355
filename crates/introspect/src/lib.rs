//! Backend application introspection for sdkpack
//!
//! Starts a backend application, reads its routing table, API prefix, and ORM
//! models, and normalizes them into the descriptors every SDK target renders.

pub mod app;
pub mod introspector;
pub mod models;
pub mod routes;
pub mod snapshot;
pub mod type_mapper;

pub use app::{
    AppModel, AppRoute, BackendApp, DataLayer, ModelConfig, RouteMethod, SchemaField,
    SchemaOptions,
};
pub use introspector::AppIntrospector;
pub use snapshot::{SnapshotApp, SNAPSHOT_FILE};
pub use type_mapper::TypeMapper;
