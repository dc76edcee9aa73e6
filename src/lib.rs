//! Async client for the Recom deductible-balance service: report NFS-e invoices, register
//! construction sites and builders, manage per-login access, and query deductible balances,
//! with OAuth 2.0 bearer credentials discovered, exchanged, and attached transparently.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod discovery;
pub mod entity;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod oauth;
pub mod obs;

pub use client::RecomClient;
pub use config::ClientConfig;
pub use error::{Error, Result};

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use oauth2::{HttpRequest, HttpResponse, http};
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
