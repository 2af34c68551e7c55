#![allow(dead_code)]

pub mod artifact;
pub mod server;
