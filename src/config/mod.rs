pub mod service_config;

pub use service_config::ServiceConfig;
