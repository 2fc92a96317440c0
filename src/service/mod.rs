pub mod citations;
pub mod pacer;
pub mod relay_service;
