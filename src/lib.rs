pub mod model;
pub mod repository;
pub mod config;
pub mod util;
pub mod query;
pub mod service;
pub mod handler;
pub mod router;
pub mod app;
pub mod dto;
pub mod middlewares;
