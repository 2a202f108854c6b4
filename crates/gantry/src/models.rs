//! These models represent the objects passed around by the agent
//!
//! The agent keeps its own conversation format and never hands provider JSON
//! around internally. Backends translate between these structs and whatever
//! wire format they speak (see `providers::utils` for the OpenAI flavour).
pub mod history;
pub mod message;
pub mod objectid;
pub mod schema;
pub mod tool;
