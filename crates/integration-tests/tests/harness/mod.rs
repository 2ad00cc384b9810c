#![allow(dead_code)]

pub mod config;
pub mod mock_worker;
pub mod server;
