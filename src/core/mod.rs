//! Core vault logic
//!
//! Data model, the filter/sort engine, the persistence gateway and the view
//! controller, plus the traits that connect them to remote services.

pub mod assist;
pub mod controller;
pub mod data;
pub mod filter;
pub mod gateway;
pub mod traits;
