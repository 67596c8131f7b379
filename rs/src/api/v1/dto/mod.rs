pub mod lands;
pub mod page;
