pub mod clients;
pub mod handlers;
pub mod protocol;
pub mod repos;
pub mod routes;
pub mod state;
