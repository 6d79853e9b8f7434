//! Cafe command and query handlers.

mod create_cafe;
mod get_cafe;
mod update_cafe;

pub use create_cafe::{CreateCafeCommand, CreateCafeHandler};
pub use get_cafe::{GetCafeHandler, GetCafeQuery, ListCafesHandler, ListCafesQuery};
pub use update_cafe::{UpdateCafeCommand, UpdateCafeHandler};
