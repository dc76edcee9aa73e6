//! Construction-time configuration consumed by the client.
//!
//! Everything is supplied programmatically by the embedding caller; there is no
//! environment or file loading. [`ClientConfig::builder`] validates required fields
//! and parses URLs without touching the network.

/// Builder API for assembling validated client configuration.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::GrantType};

/// Fixed scope identifier requested in every token exchange.
pub const DEFAULT_SCOPE: &str = "recom";
/// Fixed password submitted by the password grant; the authority authenticates the
/// caller through the client credentials and the forwarded claims instead.
pub const PASSWORD_PLACEHOLDER: &str = "recom-claims";
/// Default request timeout applied by the reqwest transport.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Client credentials registered at the authority.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Authority (token issuer) URL used for discovery.
	pub authority: Url,
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("authority", &self.authority.as_str())
			.finish()
	}
}

/// Username + claims pair that selects the password grant.
#[derive(Clone, Debug, PartialEq)]
pub struct GrantContext {
	/// Login forwarded as the resource-owner username.
	pub username: String,
	/// Opaque claims payload forwarded verbatim to the token endpoint.
	pub claims: serde_json::Value,
}

/// Immutable configuration for one [`RecomClient`](crate::RecomClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Client credentials and authority.
	pub credentials: Credentials,
	/// Recom API root; always ends with `/`.
	pub api_base: Url,
	/// Optional username for the password grant.
	pub username: Option<String>,
	/// Optional claims for the password grant.
	pub claims: Option<serde_json::Value>,
	/// How the client authenticates at the token endpoint.
	pub client_auth_method: ClientAuthMethod,
	/// Permits plain-HTTP authority and token endpoints.
	pub allow_insecure_transport: bool,
	/// Request timeout for the default transport.
	pub timeout: StdDuration,
}
impl ClientConfig {
	/// Creates a new builder from the four required settings.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		api_url: impl Into<String>,
		authority_url: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(client_id, client_secret, api_url, authority_url)
	}

	/// Returns the grant context when both username and claims are present and non-empty.
	pub fn grant_context(&self) -> Option<GrantContext> {
		let username = self.username.as_deref().filter(|value| !value.is_empty())?;
		let claims = self.claims.as_ref().filter(|value| !claims_are_empty(value))?;

		Some(GrantContext { username: username.to_owned(), claims: claims.clone() })
	}

	/// Grant the token acquirer will perform for this configuration.
	pub fn grant_type(&self) -> GrantType {
		if self.grant_context().is_some() { GrantType::Password } else { GrantType::ClientCredentials }
	}
}

fn claims_are_empty(claims: &serde_json::Value) -> bool {
	match claims {
		serde_json::Value::Null => true,
		serde_json::Value::String(value) => value.is_empty(),
		serde_json::Value::Array(values) => values.is_empty(),
		serde_json::Value::Object(map) => map.is_empty(),
		_ => false,
	}
}
