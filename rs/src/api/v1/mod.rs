/*
 * Responsibility
 * - v1 surface: routes() plus the route policy that guards it
 */
pub mod dto;
pub mod handlers;
mod routes;

pub use routes::{PREFIX, policy, routes};
