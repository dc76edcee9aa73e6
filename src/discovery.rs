//! Authority metadata discovery (`/.well-known/openid-configuration`).
//!
//! The resolver performs one round-trip per call and applies the transport-security
//! policy explicitly: unless the client was configured with
//! [`allow_insecure_transport`](crate::config::ClientConfigBuilder::allow_insecure_transport),
//! both the authority and the advertised token endpoint must use HTTPS.

// self
use crate::{
	_prelude::{
		http::{Method, header},
		*,
	},
	error::{ConfigError, DiscoveryError},
	http::HttpSender,
	obs::{self, OperationKind},
};

/// Well-known path appended to the authority URL.
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// Subset of the discovery document consumed by the client.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DiscoveryDocument {
	/// Issuer identifier advertised by the authority.
	pub issuer: String,
	/// Token endpoint, when advertised.
	#[serde(default)]
	pub token_endpoint: Option<String>,
}

/// Validated authority metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorityMetadata {
	/// Issuer identifier.
	pub issuer: String,
	/// Token endpoint used for exchanges.
	pub token_endpoint: Url,
}

/// Resolves an authority URL into its token endpoint.
pub struct DiscoveryResolver<S>
where
	S: ?Sized + HttpSender,
{
	sender: Arc<S>,
	allow_insecure_transport: bool,
}
impl<S> DiscoveryResolver<S>
where
	S: ?Sized + HttpSender,
{
	/// Creates a resolver that fetches documents through `sender`.
	pub fn new(sender: Arc<S>, allow_insecure_transport: bool) -> Self {
		Self { sender, allow_insecure_transport }
	}

	/// Fetches and validates the discovery document for `authority`.
	pub async fn resolve(
		&self,
		authority: &Url,
		cancel: &CancellationToken,
	) -> Result<AuthorityMetadata> {
		obs::observe(OperationKind::Discovery, "resolve", async move {
			self.require_secure(authority)?;

			let request = http::Request::builder()
				.method(Method::GET)
				.uri(discovery_url(authority))
				.header(header::ACCEPT, "application/json")
				.body(Vec::new())
				.map_err(ConfigError::from)?;
			let response = self.sender.send(request, cancel).await.map_err(|e| match e {
				Error::Transport(source) => Error::from(DiscoveryError::Unreachable { source }),
				e => e,
			})?;

			if !response.status().is_success() {
				return Err(DiscoveryError::Status { status: response.status().as_u16() }.into());
			}

			let mut de = serde_json::Deserializer::from_slice(response.body());
			let document: DiscoveryDocument = serde_path_to_error::deserialize(&mut de)
				.map_err(|source| DiscoveryError::Parse { source })?;

			self.validate(authority, document)
		})
		.await
	}

	fn validate(&self, authority: &Url, document: DiscoveryDocument) -> Result<AuthorityMetadata> {
		let expected = trim_slash(authority.as_str());

		if trim_slash(&document.issuer) != expected {
			return Err(DiscoveryError::IssuerMismatch {
				expected: expected.to_owned(),
				actual: document.issuer,
			}
			.into());
		}

		let raw = document.token_endpoint.unwrap_or_default();
		let token_endpoint = Url::parse(&raw)
			.map_err(|_| DiscoveryError::InvalidTokenEndpoint { value: raw.clone() })?;

		self.require_secure(&token_endpoint)?;

		Ok(AuthorityMetadata { issuer: document.issuer, token_endpoint })
	}

	fn require_secure(&self, url: &Url) -> Result<(), DiscoveryError> {
		if self.allow_insecure_transport || url.scheme() == "https" {
			Ok(())
		} else {
			Err(DiscoveryError::InsecureEndpoint { url: url.to_string() })
		}
	}
}
impl<S> Debug for DiscoveryResolver<S>
where
	S: ?Sized + HttpSender,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DiscoveryResolver")
			.field("allow_insecure_transport", &self.allow_insecure_transport)
			.finish()
	}
}

fn discovery_url(authority: &Url) -> String {
	format!("{}{DISCOVERY_PATH}", trim_slash(authority.as_str()))
}

fn trim_slash(value: &str) -> &str {
	value.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		error::{DiscoveryError, TransportError},
		http::testing::{AUTHORITY, Reply, ScriptedSender, TOKEN_ENDPOINT, authority_reply},
	};

	fn authority() -> Url {
		Url::parse(AUTHORITY).expect("Failed to parse test authority.")
	}

	#[tokio::test]
	async fn resolves_token_endpoint_from_document() {
		let sender = Arc::new(ScriptedSender::new(|request| {
			authority_reply(request, "unused").unwrap_or(Reply::Json(404, String::new()))
		}));
		let resolver = DiscoveryResolver::new(sender.clone(), false);
		let metadata = resolver
			.resolve(&authority(), &CancellationToken::new())
			.await
			.expect("Discovery should succeed.");

		assert_eq!(metadata.token_endpoint.as_str(), TOKEN_ENDPOINT);
		assert_eq!(
			sender.requests()[0].uri,
			"https://auth.example/.well-known/openid-configuration"
		);
	}

	#[tokio::test]
	async fn rejects_plain_http_authority_without_network() {
		let sender = Arc::new(ScriptedSender::new(|_| Reply::Json(500, String::new())));
		let resolver = DiscoveryResolver::new(sender.clone(), false);
		let insecure = Url::parse("http://auth.example/").expect("Failed to parse URL.");
		let err = resolver
			.resolve(&insecure, &CancellationToken::new())
			.await
			.expect_err("Plain HTTP authorities must be rejected.");

		assert!(matches!(err, Error::Discovery(DiscoveryError::InsecureEndpoint { .. })));
		assert!(sender.requests().is_empty());
	}

	#[tokio::test]
	async fn rejects_insecure_token_endpoint_unless_allowed() {
		let document = "{\"issuer\":\"https://auth.example\",\"token_endpoint\":\"http://auth.example/token\"}";
		let sender = Arc::new(ScriptedSender::new(move |_| Reply::Json(200, document.into())));
		let strict = DiscoveryResolver::new(sender.clone(), false);
		let err = strict
			.resolve(&authority(), &CancellationToken::new())
			.await
			.expect_err("Plain HTTP token endpoints must be rejected.");

		assert!(matches!(err, Error::Discovery(DiscoveryError::InsecureEndpoint { .. })));

		let relaxed = DiscoveryResolver::new(sender, true);
		let metadata = relaxed
			.resolve(&authority(), &CancellationToken::new())
			.await
			.expect("Insecure transport flag should permit HTTP endpoints.");

		assert_eq!(metadata.token_endpoint.as_str(), "http://auth.example/token");
	}

	#[tokio::test]
	async fn maps_error_statuses_and_bad_documents() {
		let sender = Arc::new(ScriptedSender::new(|_| Reply::Json(503, String::new())));
		let err = DiscoveryResolver::new(sender, false)
			.resolve(&authority(), &CancellationToken::new())
			.await
			.expect_err("Error statuses must fail discovery.");

		assert!(matches!(err, Error::Discovery(DiscoveryError::Status { status: 503 })));

		let sender = Arc::new(ScriptedSender::new(|_| Reply::Json(200, "{\"token_endpoint\":1}".into())));
		let err = DiscoveryResolver::new(sender, false)
			.resolve(&authority(), &CancellationToken::new())
			.await
			.expect_err("Malformed documents must fail discovery.");

		assert!(matches!(err, Error::Discovery(DiscoveryError::Parse { .. })));

		let document = "{\"issuer\":\"https://other.example/\",\"token_endpoint\":\"https://other.example/token\"}";
		let sender = Arc::new(ScriptedSender::new(move |_| Reply::Json(200, document.into())));
		let err = DiscoveryResolver::new(sender, false)
			.resolve(&authority(), &CancellationToken::new())
			.await
			.expect_err("Foreign issuers must fail discovery.");

		assert!(matches!(err, Error::Discovery(DiscoveryError::IssuerMismatch { .. })));
	}

	#[tokio::test]
	async fn unreachable_authority_is_a_discovery_failure() {
		let sender = Arc::new(ScriptedSender::new(|_| Reply::Refused));
		let err = DiscoveryResolver::new(sender, false)
			.resolve(&authority(), &CancellationToken::new())
			.await
			.expect_err("Connection failures must fail discovery.");

		assert!(
			matches!(
				err,
				Error::Discovery(DiscoveryError::Unreachable { source: TransportError::Network { .. } })
			),
			"{err:?}"
		);
	}

	#[tokio::test]
	async fn cancellation_is_not_reported_as_unreachable() {
		let sender = Arc::new(ScriptedSender::new(|_| Reply::Hang));
		let cancel = CancellationToken::new();

		cancel.cancel();

		let err = DiscoveryResolver::new(sender, false)
			.resolve(&authority(), &cancel)
			.await
			.expect_err("Cancelled discovery must fail.");

		assert!(matches!(err, Error::Cancelled), "{err:?}");
	}
}
