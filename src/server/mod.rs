mod authn;
mod authz;
mod db;
mod handlers;
mod pdp;
mod response;

pub mod config;
pub mod factory;
pub mod restful;

pub use authn::token::factory::TokenFactory;
pub use authn::token::TokenGenerator;
