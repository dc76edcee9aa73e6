// self
use crate::{
	_prelude::*,
	config::{ClientAuthMethod, ClientConfig, Credentials, DEFAULT_TIMEOUT, GrantContext},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Raw Recom API root URL.
	pub api_url: String,
	/// Raw authority URL.
	pub authority_url: String,
	/// Optional password-grant username.
	pub username: Option<String>,
	/// Optional password-grant claims.
	pub claims: Option<serde_json::Value>,
	/// Client authentication mode at the token endpoint.
	pub client_auth_method: ClientAuthMethod,
	/// Permits plain-HTTP authority and token endpoints.
	pub allow_insecure_transport: bool,
	/// Request timeout for the default transport.
	pub timeout: StdDuration,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the required settings.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		api_url: impl Into<String>,
		authority_url: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			api_url: api_url.into(),
			authority_url: authority_url.into(),
			username: None,
			claims: None,
			client_auth_method: ClientAuthMethod::default(),
			allow_insecure_transport: false,
			timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Sets the password-grant username.
	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());

		self
	}

	/// Sets the password-grant claims payload.
	pub fn claims(mut self, claims: serde_json::Value) -> Self {
		self.claims = Some(claims);

		self
	}

	/// Sets both halves of the grant context at once.
	pub fn grant_context(self, context: GrantContext) -> Self {
		self.username(context.username).claims(context.claims)
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Allows plain-HTTP authority and token endpoints (local development, test servers).
	pub fn allow_insecure_transport(mut self, allow: bool) -> Self {
		self.allow_insecure_transport = allow;

		self
	}

	/// Overrides the request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		require("client_id", &self.client_id)?;
		require("client_secret", &self.client_secret)?;
		require("api_url", &self.api_url)?;
		require("authority_url", &self.authority_url)?;

		let api_base = parse_base(&self.api_url)?;
		let authority = Url::parse(self.authority_url.trim())
			.map_err(|source| ConfigError::InvalidUrl { field: "authority_url", source })?;

		Ok(ClientConfig {
			credentials: Credentials {
				client_id: self.client_id,
				client_secret: self.client_secret,
				authority,
			},
			api_base,
			username: self.username,
			claims: self.claims,
			client_auth_method: self.client_auth_method,
			allow_insecure_transport: self.allow_insecure_transport,
			timeout: self.timeout,
		})
	}
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::MissingField { field }) } else { Ok(()) }
}

fn parse_base(raw: &str) -> Result<Url, ConfigError> {
	let mut url = Url::parse(raw.trim())
		.map_err(|source| ConfigError::InvalidUrl { field: "api_url", source })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}
