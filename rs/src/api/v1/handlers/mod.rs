pub mod health;
pub mod lands;
