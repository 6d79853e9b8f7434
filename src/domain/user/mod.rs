//! User module - registered accounts and the actor derived from them.

mod account;

pub use account::User;
