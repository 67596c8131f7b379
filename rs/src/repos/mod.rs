pub mod error;
pub mod land_repo;
#[cfg(test)]
pub mod memory;
pub mod page;
