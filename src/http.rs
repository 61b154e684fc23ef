//! Transport primitives for token exchanges and profile retrieval.
//!
//! The module exposes [`StrategyHttpClient`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so downstream crates can integrate custom HTTP clients.
//! Token-exchange handles call [`ResponseMetadataSlot::take`] before dispatching a
//! request and [`ResponseMetadataSlot::store`] once an HTTP status is known, so
//! exchange failures carry consistent metadata. Profile requests go through
//! [`StrategyHttpClient::get_profile`], which applies the strategy's fixed
//! [`TokenPresentation`].

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::header::AUTHORIZATION;
// self
use crate::_prelude::*;

/// How the access token is presented on token-protected GET requests.
///
/// The strategy picks a mode once at construction; it is never toggled per
/// call. TD Ameritrade requires the Authorization header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenPresentation {
	/// `Authorization: Bearer <token>` request header.
	#[default]
	AuthorizationHeader,
	/// `access_token=<token>` query parameter.
	QueryParameter,
}

/// Raw response produced by a profile GET.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Boxed future returned by [`StrategyHttpClient::get_profile`].
pub type ProfileGetFuture<'a, E> = Pin<Box<dyn Future<Output = Result<RawResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports used by the strategy.
///
/// The trait is the strategy's only dependency on an HTTP stack. It covers two
/// concerns: short-lived [`AsyncHttpClient`] handles for token exchanges (each
/// carrying a clone of a [`ResponseMetadataSlot`]) and authenticated GETs
/// against the profile endpoint. Implementations must be `Send + Sync + 'static`
/// so one strategy instance can serve concurrent authentication attempts, and
/// the futures they return must be `Send` for the lifetime of the in-flight
/// request.
pub trait StrategyHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type TokenHandle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// Implementations must call [`ResponseMetadataSlot::take`] before
	/// submitting the HTTP request so stale information never leaks across
	/// attempts, and [`ResponseMetadataSlot::store`] once a status is known.
	fn token_handle(&self, slot: ResponseMetadataSlot) -> Self::TokenHandle;

	/// Executes one authenticated GET against the profile endpoint.
	///
	/// The access token is presented according to `presentation`. No retries and
	/// no caching; every call is one network round trip.
	fn get_profile<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
		presentation: TokenPresentation,
	) -> ProfileGetFuture<'a, Self::TransportError>;
}

/// Captures metadata from the most recent HTTP response for error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The strategy creates a fresh slot for each token exchange and reads the
/// captured metadata immediately after the engine resolves. Transport
/// implementations borrow the slot just long enough to call
/// [`store`](ResponseMetadataSlot::store).
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

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI. Configure
/// any custom [`ReqwestClient`] to disable redirect following, because the strategy
/// passes this client into the `oauth2` crate when it builds its exchange facade.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
/// Instrumented adapter that implements [`AsyncHttpClient`] for reqwest.
struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

#[cfg(feature = "reqwest")]
/// Public handle returned by [`ReqwestHttpClient`] that satisfies [`StrategyHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl StrategyHttpClient for ReqwestHttpClient {
	type TokenHandle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn token_handle(&self, slot: ResponseMetadataSlot) -> Self::TokenHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}

	fn get_profile<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
		presentation: TokenPresentation,
	) -> ProfileGetFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let request = match presentation {
				TokenPresentation::AuthorizationHeader =>
					self.0.get(url.clone()).header(AUTHORIZATION, format!("Bearer {access_token}")),
				TokenPresentation::QueryParameter => {
					let mut url = url.clone();

					url.query_pairs_mut().append_pair("access_token", access_token);

					self.0.get(url)
				},
			};
			let response = request.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn metadata_slot_is_consumed_on_take() {
		let slot = ResponseMetadataSlot::default();

		slot.store(ResponseMetadata { status: Some(200) });

		assert_eq!(slot.take().and_then(|meta| meta.status), Some(200));
		assert!(slot.take().is_none(), "Metadata must not leak into the next request.");
	}

	#[test]
	fn raw_response_success_covers_2xx_only() {
		assert!(RawResponse { status: 200, body: Vec::new() }.is_success());
		assert!(RawResponse { status: 299, body: Vec::new() }.is_success());
		assert!(!RawResponse { status: 301, body: Vec::new() }.is_success());
		assert!(!RawResponse { status: 500, body: Vec::new() }.is_success());
	}
}
