//! Token acquisition built on the `oauth2` crate.
//!
//! [`TokenAcquirer`] resolves the authority's token endpoint, then performs either a
//! `client_credentials` exchange or, when the configuration carries a complete
//! [`GrantContext`], a `password` exchange that forwards the caller's claims. Exchanges run
//! through the same [`HttpSender`] pipeline as every other request via an adapter that
//! implements [`AsyncHttpClient`].

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	RequestTokenError, ResourceOwnerPassword, ResourceOwnerUsername, Scope, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, GrantType},
	config::{ClientAuthMethod, ClientConfig, Credentials, DEFAULT_SCOPE, GrantContext, PASSWORD_PLACEHOLDER},
	discovery::DiscoveryResolver,
	http::{HttpSender, ResponseMetadata, ResponseMetadataSlot},
	obs::{self, OperationKind},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type TokenRequestError = RequestTokenError<Error, BasicErrorResponse>;

/// Exchanges client credentials (or username + claims) for an access token.
pub struct TokenAcquirer<S>
where
	S: ?Sized + HttpSender,
{
	sender: Arc<S>,
	resolver: DiscoveryResolver<S>,
	credentials: Credentials,
	grant_context: Option<GrantContext>,
	client_auth_method: ClientAuthMethod,
}
impl<S> TokenAcquirer<S>
where
	S: ?Sized + HttpSender,
{
	/// Creates an acquirer for `config`, sending through `sender`.
	pub fn new(sender: Arc<S>, config: &ClientConfig) -> Self {
		Self {
			resolver: DiscoveryResolver::new(sender.clone(), config.allow_insecure_transport),
			sender,
			credentials: config.credentials.clone(),
			grant_context: config.grant_context(),
			client_auth_method: config.client_auth_method,
		}
	}

	/// Grant this acquirer performs.
	pub fn grant_type(&self) -> GrantType {
		if self.grant_context.is_some() { GrantType::Password } else { GrantType::ClientCredentials }
	}

	/// Discovers the token endpoint and exchanges credentials for a fresh access token.
	pub async fn acquire(&self, cancel: &CancellationToken) -> Result<AccessToken> {
		let metadata = self.resolver.resolve(&self.credentials.authority, cancel).await?;

		self.exchange(&metadata.token_endpoint, cancel).await
	}

	/// Exchanges credentials at an already known `token_endpoint`.
	pub async fn exchange(
		&self,
		token_endpoint: &Url,
		cancel: &CancellationToken,
	) -> Result<AccessToken> {
		let grant = self.grant_type();
		let kind = match grant {
			GrantType::ClientCredentials => OperationKind::ClientCredentials,
			GrantType::Password => OperationKind::Password,
		};

		obs::observe(kind, "exchange", async move {
			let oauth_client = self.oauth_client(token_endpoint);
			let meta = ResponseMetadataSlot::default();
			let handle = SenderHandle {
				sender: self.sender.clone(),
				cancel: cancel.clone(),
				slot: meta.clone(),
			};
			let scope = Scope::new(DEFAULT_SCOPE.to_owned());
			let response = match &self.grant_context {
				Some(context) => {
					let username = ResourceOwnerUsername::new(context.username.clone());
					let password = ResourceOwnerPassword::new(PASSWORD_PLACEHOLDER.to_owned());
					let claims = serde_json::to_string(&context.claims)?;

					oauth_client
						.exchange_password(&username, &password)
						.add_scope(scope)
						.add_extra_param("claims", claims)
						.request_async(&handle)
						.await
						.map_err(|err| map_request_error(grant, meta.take(), err))?
				},
				None => oauth_client
					.exchange_client_credentials()
					.add_scope(scope)
					.request_async(&handle)
					.await
					.map_err(|err| map_request_error(grant, meta.take(), err))?,
			};

			map_token_response(grant, meta.take(), response)
		})
		.await
	}

	fn oauth_client(&self, token_endpoint: &Url) -> ConfiguredBasicClient {
		let token_url = TokenUrl::from_url(token_endpoint.clone());
		let mut oauth_client = BasicClient::new(ClientId::new(self.credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(self.credentials.client_secret.clone()))
			.set_token_uri(token_url);

		if matches!(self.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		oauth_client
	}
}
impl<S> Debug for TokenAcquirer<S>
where
	S: ?Sized + HttpSender,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAcquirer")
			.field("credentials", &self.credentials)
			.field("grant", &self.grant_type())
			.field("client_auth_method", &self.client_auth_method)
			.finish()
	}
}

/// Adapter exposing an [`HttpSender`] as an `oauth2` [`AsyncHttpClient`].
struct SenderHandle<S>
where
	S: ?Sized + HttpSender,
{
	sender: Arc<S>,
	cancel: CancellationToken,
	slot: ResponseMetadataSlot,
}
impl<'c, S> AsyncHttpClient<'c> for SenderHandle<S>
where
	S: ?Sized + HttpSender,
{
	type Error = Error;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let response = self.sender.send(request, &self.cancel).await?;

			self.slot.store(ResponseMetadata { status: Some(response.status().as_u16()) });

			Ok(response)
		})
	}
}

fn map_token_response(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	response: BasicTokenResponse,
) -> Result<AccessToken> {
	let secret = response.access_token().secret();

	if secret.is_empty() {
		return Err(rejected(grant, "token endpoint returned an empty access token".into(), meta));
	}

	Ok(AccessToken::new(secret.to_owned()))
}

fn map_request_error(grant: GrantType, meta: Option<ResponseMetadata>, err: TokenRequestError) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => {
			let reason = match response.error_description() {
				Some(description) => format!("{} ({description})", response.error().as_ref()),
				None => response.error().as_ref().to_owned(),
			};

			rejected(grant, reason, meta)
		},
		RequestTokenError::Request(Error::Transport(source)) => {
			let cause = source.to_string();

			Error::Authentication {
				reason: format!("token endpoint could not be reached ({})", cause.trim_end_matches('.')),
				status: None,
			}
		},
		RequestTokenError::Request(inner) => inner,
		RequestTokenError::Parse(source, _body) => Error::Authentication {
			reason: format!("token endpoint returned malformed JSON at `{}`", source.path()),
			status: meta.and_then(|value| value.status),
		},
		RequestTokenError::Other(message) => rejected(grant, message, meta),
	}
}

fn rejected(grant: GrantType, reason: String, meta: Option<ResponseMetadata>) -> Error {
	let status = meta.and_then(|value| value.status);

	match grant {
		GrantType::ClientCredentials => Error::Authentication { reason, status },
		GrantType::Password => Error::Unauthorized { reason, status },
	}
}
