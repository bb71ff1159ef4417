//! MediBook HTTP client
//!
//! Typed access to the booking API. Every authenticated call attaches the
//! stored access token; a 401 goes through a single shared refresh exchange
//! and the failed request is replayed once with the new token.

#[macro_use]
extern crate tracing;

pub mod client;

pub use client::{
    DEFAULT_BASE_URL, MedibookClient, MedibookClientBuilder,
    error::ClientError,
    refresh::{RefreshError, SessionListener},
    token_store::{
        ACCESS_TOKEN_KEY, MemoryStorage, REFRESH_TOKEN_KEY, StorageError, TokenStorage, TokenStore,
    },
};
