#![allow(dead_code)]

pub mod websocket;
pub mod websocket_client;
