pub mod lands;
