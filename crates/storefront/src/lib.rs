//! Shopcart storefront library.
//!
//! Users, a product catalog and per-session shopping carts served over a
//! JSON HTTP API. The binary in `main.rs` only wires configuration, logging
//! and the listener around [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
