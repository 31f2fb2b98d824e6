//! Identity provider backed by the hosted auth REST API (GoTrue, as run by
//! Supabase).
//!
//! ```rust,ignore
//! use tempo_accounts::gotrue::{GoTrueClient, GoTrueProvider, ProviderConfig};
//!
//! let client = GoTrueClient::new(ProviderConfig::from_env()?);
//! let provider = GoTrueProvider::new(client.clone());
//! ```

mod client;
mod config;
#[cfg(test)]
pub(crate) mod mock;
mod provider;

pub use client::GoTrueClient;
pub use config::{ANON_KEY_VAR, ProviderConfig, URL_VAR};
pub use provider::GoTrueProvider;
