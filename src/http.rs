//! Request-pipeline primitives shared by discovery, token exchange, and domain calls.
//!
//! [`HttpSender`] is the single seam between the client and an HTTP stack. Layers wrap an
//! inner sender and implement the trait themselves, so pipelines compose the way
//! [`AuthenticatingSender`](crate::interceptor::AuthenticatingSender) wraps the reqwest-backed
//! [`ReqwestHttpClient`]. Every call receives the caller's [`CancellationToken`]; a fired
//! token aborts the in-flight exchange with [`Error::Cancelled`].

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

/// Boxed future returned by [`HttpSender::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// Abstraction over anything that can execute an HTTP exchange.
///
/// Implementations must be `Send + Sync + 'static` so they can sit behind an `Arc` shared by
/// the discovery resolver, the token acquirer, and the authenticating layer of one client.
pub trait HttpSender
where
	Self: 'static + Send + Sync,
{
	/// Executes `request`, aborting with [`Error::Cancelled`] once `cancel` fires.
	fn send<'a>(&'a self, request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a>;
}
impl<T> HttpSender for Arc<T>
where
	T: ?Sized + HttpSender,
{
	fn send<'a>(&'a self, request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a> {
		T::send(self.as_ref(), request, cancel)
	}
}

/// Runs `fut` until it completes or `cancel` fires, whichever comes first.
pub async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	cancel.run_until_cancelled(fut).await.unwrap_or(Err(Error::Cancelled))
}

/// Captures metadata from the most recent token-endpoint response for error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] acting as the leaf of every pipeline.
///
/// Token endpoints return results directly, so the client built by
/// [`ReqwestHttpClient::with_timeout`] does not follow redirects.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests fail after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl HttpSender for ReqwestHttpClient {
	fn send<'a>(&'a self, request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a> {
		Box::pin(cancellable(cancel, async move {
			let url = request.uri().to_string();
			let request = reqwest::Request::try_from(request).map_err(ConfigError::from)?;
			let response =
				self.0.execute(request).await.map_err(|e| map_reqwest_error(&url, e))?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(|e| map_reqwest_error(&url, e))?;
			let mut response_new = HttpResponse::new(body.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		}))
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(url: &str, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { url: url.to_owned() }.into();
	}

	TransportError::network(url, err).into()
}


#[cfg(test)]
mod tests {
	// self
	use super::{testing::*, *};

	fn request(uri: &str) -> HttpRequest {
		http::Request::builder()
			.uri(uri)
			.body(Vec::new())
			.expect("Failed to build test request.")
	}

	#[tokio::test]
	async fn cancellable_reports_cancelled_when_token_fired() {
		let sender = ScriptedSender::new(|_| Reply::Hang);
		let cancel = CancellationToken::new();

		cancel.cancel();

		let err = sender
			.send(request("https://api.example/api/obras/1"), &cancel)
			.await
			.expect_err("Cancelled sends must fail.");

		assert!(matches!(err, Error::Cancelled));
	}

	#[tokio::test]
	async fn arc_sender_delegates_to_inner() {
		let sender = Arc::new(ScriptedSender::new(|_| Reply::Json(204, String::new())));
		let response = sender
			.send(request("https://api.example/api/obras/1"), &CancellationToken::new())
			.await
			.expect("Delegated send should succeed.");

		assert_eq!(response.status().as_u16(), 204);
		assert_eq!(sender.requests().len(), 1);
	}

	#[test]
	fn metadata_slot_take_clears_value() {
		let slot = ResponseMetadataSlot::default();

		slot.store(ResponseMetadata { status: Some(401) });

		assert_eq!(slot.take().and_then(|meta| meta.status), Some(401));
		assert!(slot.take().is_none());
	}
}
