pub mod image;
pub mod reservation;
pub mod support;
pub mod user;
pub mod venue;

#[cfg(test)]
pub(crate) mod test_support;
