pub mod app;
pub mod backend;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod pages;
pub mod presenter;
pub mod source;
