#![allow(dead_code)]

pub mod fake_api;
pub mod harness;
pub mod http_client;
