//! Delivery hub pricing server.
//!
//! Resolves which hubs a delivery can go to from a chosen origin and what
//! the route costs, and serves a price calculator and admin API on top.

pub mod admin;
pub mod api;
pub mod cache;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod requests;
pub mod resolver;
pub mod selection;
pub mod web;
