//! Client-level error types shared across discovery, token exchange, and domain calls.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Construction-time configuration problem; raised before any network call.
	#[error(transparent)]
	InvalidConfiguration(#[from] ConfigError),
	/// Authority metadata could not be fetched or was rejected.
	#[error(transparent)]
	Discovery(#[from] DiscoveryError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Client-credentials exchange failed at the token endpoint.
	#[error("Token endpoint rejected the client credentials: {reason}.")]
	Authentication {
		/// Authority- or client-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Password-grant exchange was explicitly rejected by the authority.
	#[error("Authority rejected the password grant: {reason}.")]
	Unauthorized {
		/// Authority-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The caller's cancellation signal fired before the operation completed.
	#[error("Operation was cancelled.")]
	Cancelled,
	/// The domain API answered with a status the operation does not accept.
	#[error("Recom API returned HTTP {status} for {method} {url}.")]
	RemoteService {
		/// HTTP method of the failed request.
		method: String,
		/// Request URL.
		url: String,
		/// HTTP status code returned by the API.
		status: u16,
		/// Response body, lossily decoded.
		body: String,
	},
	/// The domain API returned a body that could not be decoded.
	#[error("Recom API returned a malformed response body.")]
	InvalidResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A request record could not be encoded as JSON.
	#[error("Request payload could not be serialized.")]
	Payload(#[from] serde_json::Error),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting was empty.
	#[error("Required setting `{field}` is empty.")]
	MissingField {
		/// Name of the empty setting.
		field: &'static str,
	},
	/// A URL setting failed to parse.
	#[error("Setting `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Name of the offending setting.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The API base URL cannot carry path segments (e.g. `mailto:`).
	#[error("API base URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// URL that failed validation.
		url: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Failures raised while resolving the authority's discovery document.
#[derive(Debug, ThisError)]
pub enum DiscoveryError {
	/// The authority or an advertised endpoint does not use HTTPS.
	#[error("Endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// URL that failed the transport-security policy.
		url: String,
	},
	/// The authority could not be reached (network failure or timeout).
	#[error("Authority discovery endpoint could not be reached.")]
	Unreachable {
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// The discovery document request returned a non-success status.
	#[error("Discovery document request failed with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// The discovery document is not valid JSON for the expected shape.
	#[error("Discovery document is malformed.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The document's issuer does not match the configured authority.
	#[error("Discovery issuer `{actual}` does not match authority `{expected}`.")]
	IssuerMismatch {
		/// Configured authority.
		expected: String,
		/// Issuer advertised by the document.
		actual: String,
	},
	/// The advertised token endpoint is missing or not a URL.
	#[error("Discovery document advertises an invalid token endpoint: {value}.")]
	InvalidTokenEndpoint {
		/// Raw value from the document.
		value: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Request URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded the configured timeout.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// Request URL.
		url: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
