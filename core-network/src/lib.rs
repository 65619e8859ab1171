//! # Network Module
//!
//! Authenticated access to the QuoteDesk resource service.
//!
//! ## Overview
//!
//! - [`RetryingRequestExecutor`] attaches the session credential to a request,
//!   and after an authentication rejection drops the credential, signs in
//!   again and retries once.
//! - [`ResourceClient`] exposes the service operations (products, quote
//!   requests, home info) on top of it.
//! - [`models`] holds the resource types.
//!
//! ## Usage
//!
//! ```ignore
//! use core_network::{ProductType, ResourceClient};
//!
//! let products = client.get_products(ProductType::Residential).await?;
//! let quote = client.send_quote_request(&products[0]).await?;
//! let quotes = client.get_quotes().await?;
//! ```

pub mod client;
pub mod error;
pub mod executor;
pub mod models;

pub use client::ResourceClient;
pub use error::{NetworkError, Result};
pub use executor::{
    classify_status, default_classify, Outcome, RetryingRequestExecutor, MAX_AUTH_RETRIES,
};
pub use models::{HomeInfo, Product, ProductType, QuoteRequest, RoomSize};
