pub mod blocks;
pub mod service;
