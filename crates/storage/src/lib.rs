#![forbid(unsafe_code)]

pub mod cache;
pub mod document;
pub mod repository;
pub mod sqlite;
