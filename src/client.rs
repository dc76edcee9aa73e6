//! Domain operations facade for the Recom API.
//!
//! Every operation maps to exactly one HTTP request routed through the
//! [`AuthenticatingSender`], so the bearer token is acquired lazily on the first call and
//! reused afterwards. Any status outside `2xx` surfaces as [`Error::RemoteService`], with one
//! exception: [`RecomClient::site_exists`] translates `404` into `false`.

// self
use crate::{
	_prelude::{
		http::{Method, StatusCode, header},
		*,
	},
	auth::AccessToken,
	config::ClientConfig,
	entity::{Construtora, NfsePrestador, NfseTomador, Obra, Usuario},
	error::ConfigError,
	http::HttpSender,
	interceptor::AuthenticatingSender,
	oauth::TokenAcquirer,
	obs::{self, OperationKind},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Async client for the Recom deductible-balance service.
pub struct RecomClient<S>
where
	S: ?Sized + HttpSender,
{
	api_base: Url,
	sender: AuthenticatingSender<S>,
}
#[cfg(feature = "reqwest")]
impl RecomClient<ReqwestHttpClient> {
	/// Creates a client-credentials client from the four required settings.
	///
	/// Fails with [`Error::InvalidConfiguration`] when any setting is empty or not a URL; no
	/// network call is made.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		api_url: impl Into<String>,
		authority_url: impl Into<String>,
	) -> Result<Self> {
		Self::from_config(ClientConfig::builder(client_id, client_secret, api_url, authority_url).build()?)
	}

	/// Creates a client over a reqwest transport honoring the configured timeout.
	pub fn from_config(config: ClientConfig) -> Result<Self> {
		let transport = ReqwestHttpClient::with_timeout(config.timeout)?;

		Ok(Self::with_sender(config, Arc::new(transport)))
	}
}
impl<S> RecomClient<S>
where
	S: ?Sized + HttpSender,
{
	/// Creates a client that sends every request, token exchanges included, through `sender`.
	pub fn with_sender(config: ClientConfig, sender: Arc<S>) -> Self {
		let acquirer = TokenAcquirer::new(sender.clone(), &config);

		Self { api_base: config.api_base, sender: AuthenticatingSender::new(sender, acquirer) }
	}

	/// API root every operation path is resolved against.
	pub fn api_base(&self) -> &Url {
		&self.api_base
	}

	/// Authenticating layer, for requests outside the built-in operations.
	pub fn sender(&self) -> &AuthenticatingSender<S> {
		&self.sender
	}

	/// Returns the bearer token, acquiring it first when none is cached.
	pub async fn access_token(&self, cancel: &CancellationToken) -> Result<AccessToken> {
		self.sender.ensure_token(cancel).await
	}

	/// Submits an invoice where the site took the service, incrementing its deductible balance.
	pub async fn increment_balance(
		&self,
		nfse: &NfseTomador,
		cancel: &CancellationToken,
	) -> Result<()> {
		obs::observe(OperationKind::IncrementBalance, "client", async move {
			self.post(&["nfses", "incrementar"], nfse, cancel).await
		})
		.await
	}

	/// Submits an invoice where the site provided the service, amortizing its deductible balance.
	pub async fn amortize_balance(
		&self,
		nfse: &NfsePrestador,
		cancel: &CancellationToken,
	) -> Result<()> {
		obs::observe(OperationKind::AmortizeBalance, "client", async move {
			self.post(&["nfses", "amortizar"], nfse, cancel).await
		})
		.await
	}

	/// Reverses an increment after the originating invoice was cancelled.
	pub async fn reverse_increment(
		&self,
		issuer_tax_id: &str,
		invoice_number: &str,
		cancel: &CancellationToken,
	) -> Result<()> {
		obs::observe(OperationKind::ReverseIncrement, "client", async move {
			self.delete(&["nfses", "estornarIncremento", issuer_tax_id, invoice_number], cancel).await
		})
		.await
	}

	/// Reverses an amortization after the originating invoice was cancelled.
	pub async fn reverse_amortization(
		&self,
		issuer_tax_id: &str,
		invoice_number: &str,
		cancel: &CancellationToken,
	) -> Result<()> {
		obs::observe(OperationKind::ReverseAmortization, "client", async move {
			self.delete(&["nfses", "estornarAmortizacao", issuer_tax_id, invoice_number], cancel)
				.await
		})
		.await
	}

	/// Reports whether a site with `site_code` is registered.
	///
	/// `404` yields `false`, any `2xx` yields `true`, and every other status fails with
	/// [`Error::RemoteService`].
	pub async fn site_exists(&self, site_code: &str, cancel: &CancellationToken) -> Result<bool> {
		obs::observe(OperationKind::SiteExists, "client", async move {
			let url = self.endpoint(&["obras", site_code])?;
			let response = self.execute(Method::GET, url.clone(), None, cancel).await?;

			if response.status() == StatusCode::NOT_FOUND {
				return Ok(false);
			}

			ensure_success(&Method::GET, &url, response)?;

			Ok(true)
		})
		.await
	}

	/// Returns the largest amount deductible from an invoice of `invoice_value` for the site.
	pub async fn max_deductible_amount(
		&self,
		site_code: &str,
		invoice_value: f64,
		cancel: &CancellationToken,
	) -> Result<f64> {
		obs::observe(OperationKind::MaxDeductibleAmount, "client", async move {
			let value = invoice_value.to_string();
			let url = self.endpoint(&["contacorrente", "saldo", "saque", site_code, &value])?;
			let response = self.execute(Method::GET, url.clone(), None, cancel).await?;
			let response = ensure_success(&Method::GET, &url, response)?;
			let mut de = serde_json::Deserializer::from_slice(response.body());

			serde_path_to_error::deserialize(&mut de).map_err(|source| Error::InvalidResponse { source })
		})
		.await
	}

	/// Registers a builder.
	pub async fn register_builder(
		&self,
		construtora: &Construtora,
		cancel: &CancellationToken,
	) -> Result<()> {
		obs::observe(OperationKind::RegisterBuilder, "client", async move {
			self.post(&["construtoras"], construtora, cancel).await
		})
		.await
	}

	/// Registers a construction site.
	pub async fn register_site(&self, obra: &Obra, cancel: &CancellationToken) -> Result<()> {
		obs::observe(OperationKind::RegisterSite, "client", async move {
			self.post(&["obras"], obra, cancel).await
		})
		.await
	}

	/// Grants `login` access to the builder identified by `builder_tax_id`.
	pub async fn grant_user_access(
		&self,
		login: &str,
		builder_tax_id: &str,
		cancel: &CancellationToken,
	) -> Result<()> {
		obs::observe(OperationKind::GrantUserAccess, "client", async move {
			self.post(&["usuarios"], &Usuario::new(login, builder_tax_id), cancel).await
		})
		.await
	}

	/// Revokes the access of `login` to the builder identified by `builder_tax_id`.
	pub async fn revoke_user_access(
		&self,
		login: &str,
		builder_tax_id: &str,
		cancel: &CancellationToken,
	) -> Result<()> {
		obs::observe(OperationKind::RevokeUserAccess, "client", async move {
			self.delete(&["usuarios", login, builder_tax_id], cancel).await
		})
		.await
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.api_base.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeABase { url: self.api_base.to_string() })?
			.pop_if_empty()
			.push("api")
			.extend(segments);

		Ok(url)
	}

	async fn post<T>(&self, segments: &[&str], payload: &T, cancel: &CancellationToken) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		let url = self.endpoint(segments)?;
		let body = serde_json::to_vec(payload)?;
		let response = self.execute(Method::POST, url.clone(), Some(body), cancel).await?;

		ensure_success(&Method::POST, &url, response).map(drop)
	}

	async fn delete(&self, segments: &[&str], cancel: &CancellationToken) -> Result<()> {
		let url = self.endpoint(segments)?;
		let response = self.execute(Method::DELETE, url.clone(), None, cancel).await?;

		ensure_success(&Method::DELETE, &url, response).map(drop)
	}

	async fn execute(
		&self,
		method: Method,
		url: Url,
		body: Option<Vec<u8>>,
		cancel: &CancellationToken,
	) -> Result<HttpResponse> {
		let mut builder = http::Request::builder()
			.method(method)
			.uri(url.as_str())
			.header(header::ACCEPT, "application/json");

		if body.is_some() {
			builder = builder.header(header::CONTENT_TYPE, "application/json");
		}

		let request = builder.body(body.unwrap_or_default()).map_err(ConfigError::from)?;

		self.sender.send(request, cancel).await
	}
}
impl<S> Debug for RecomClient<S>
where
	S: ?Sized + HttpSender,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RecomClient")
			.field("api_base", &self.api_base.as_str())
			.field("sender", &self.sender)
			.finish()
	}
}

fn ensure_success(method: &Method, url: &Url, response: HttpResponse) -> Result<HttpResponse> {
	if response.status().is_success() {
		return Ok(response);
	}

	Err(Error::RemoteService {
		method: method.to_string(),
		url: url.to_string(),
		status: response.status().as_u16(),
		body: String::from_utf8_lossy(response.body()).into_owned(),
	})
}
