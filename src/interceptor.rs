//! Authenticating request layer with a lazily acquired, lifetime-cached bearer token.
//!
//! [`AuthenticatingSender`] wraps an inner [`HttpSender`] and guarantees every outbound
//! request carries `Authorization: Bearer <token>`. Requests that already carry an
//! `Authorization` header pass through untouched. The token is acquired at most once per
//! instance: concurrent first callers wait on a singleflight guard for the same exchange,
//! and a failed or cancelled exchange leaves the cache empty so the next call retries.
//!
//! The cached token is never refreshed or invalidated. Once the authority's token expires,
//! the remote service rejects requests and the caller must build a new client.

// self
use crate::{
	_prelude::{
		http::{HeaderValue, header},
		*,
	},
	auth::AccessToken,
	http::{HttpSender, SendFuture, cancellable},
	oauth::TokenAcquirer,
};

/// Request layer that attaches the cached bearer token before delegating to `inner`.
pub struct AuthenticatingSender<S>
where
	S: ?Sized + HttpSender,
{
	inner: Arc<S>,
	acquirer: TokenAcquirer<S>,
	cached: AsyncMutex<Option<AccessToken>>,
}
impl<S> AuthenticatingSender<S>
where
	S: ?Sized + HttpSender,
{
	/// Wraps `inner`, acquiring tokens through `acquirer`.
	pub fn new(inner: Arc<S>, acquirer: TokenAcquirer<S>) -> Self {
		Self { inner, acquirer, cached: AsyncMutex::new(None) }
	}

	/// Returns the cached token, acquiring it first when the cache is empty.
	pub async fn ensure_token(&self, cancel: &CancellationToken) -> Result<AccessToken> {
		cancellable(cancel, async move {
			let mut cached = self.cached.lock().await;

			if let Some(token) = cached.as_ref() {
				return Ok(token.clone());
			}

			let token = self.acquirer.acquire(cancel).await?;

			*cached = Some(token.clone());

			Ok(token)
		})
		.await
	}

	/// Returns `true` once a token has been cached.
	pub fn has_token(&self) -> bool {
		self.cached.try_lock().is_some_and(|cached| cached.is_some())
	}

	/// Token acquirer backing this layer.
	pub fn acquirer(&self) -> &TokenAcquirer<S> {
		&self.acquirer
	}
}
impl<S> HttpSender for AuthenticatingSender<S>
where
	S: ?Sized + HttpSender,
{
	fn send<'a>(&'a self, mut request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a> {
		Box::pin(async move {
			if !request.headers().contains_key(header::AUTHORIZATION) {
				let token = self.ensure_token(cancel).await?;
				let mut value = HeaderValue::from_str(&token.bearer()).map_err(|_| {
					Error::Authentication {
						reason: "access token is not a valid header value".into(),
						status: None,
					}
				})?;

				value.set_sensitive(true);
				request.headers_mut().insert(header::AUTHORIZATION, value);
			}

			self.inner.send(request, cancel).await
		})
	}
}
impl<S> Debug for AuthenticatingSender<S>
where
	S: ?Sized + HttpSender,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatingSender")
			.field("acquirer", &self.acquirer)
			.field("has_token", &self.has_token())
			.finish()
	}
}
