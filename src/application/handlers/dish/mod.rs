//! Dish command and query handlers.

mod create_dish;
mod get_dish;
mod update_dish;

pub use create_dish::{CreateDishCommand, CreateDishHandler};
pub use get_dish::{GetDishHandler, GetDishQuery, ListDishesHandler, ListDishesQuery};
pub use update_dish::{UpdateDishCommand, UpdateDishHandler};
