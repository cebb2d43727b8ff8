//! Extension traits over third-party types used while mapping tracker exports.

pub mod serde_json;
