pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod database;
pub mod demo;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod middleware;
pub mod service;
pub mod util;
pub mod validator;
