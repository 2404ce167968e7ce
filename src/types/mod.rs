pub mod healthz;
pub mod response;
pub mod task;
pub mod user;
