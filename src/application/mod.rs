pub mod dto;
pub mod enrich;
pub mod notify;
pub mod ports;
pub mod services;
