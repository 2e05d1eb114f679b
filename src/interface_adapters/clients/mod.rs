pub mod geo;
pub mod mail;
