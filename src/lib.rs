// Library for tests to access modules

pub mod alert;
pub mod config;
pub mod docker_repo;
pub mod engine;
pub mod logging;
pub mod models;
pub mod sampler;
pub mod usage;
