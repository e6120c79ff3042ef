//! Entity structs for every inventory resource.
//!
//! Each entity maps to one primary table in the libSQL database. All structs
//! derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and
//! schema validation, and implement [`Resource`](crate::resource::Resource).
//!
//! Timestamps are assigned by the store; values supplied on create/update are
//! ignored.

mod application;
mod catalog;
mod cluster;
mod hostgroup;
mod user;

pub use application::Application;
pub use catalog::{Datacenter, Environment, Feature, Product, Tag, Team};
pub use cluster::Cluster;
pub use hostgroup::Hostgroup;
pub use user::User;
