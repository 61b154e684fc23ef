//! Internal facade over the generic OAuth 2.0 engine.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	config::ResolvedConfig,
	error::{ConfigError, ExchangeError},
	http::{ResponseMetadata, ResponseMetadataSlot, StrategyHttpClient},
	token::TokenBundle,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Engine client configured for the authorization-code grant.
///
/// Credentials travel in the token request body (`AuthType::RequestBody`), which
/// is what the provider's token endpoint expects.
pub(crate) struct ExchangeFacade<C>
where
	C: ?Sized + StrategyHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
}
impl<C> ExchangeFacade<C>
where
	C: ?Sized + StrategyHttpClient,
{
	pub(crate) fn from_config(config: &ResolvedConfig, http_client: Arc<C>) -> Result<Self> {
		let auth_url = AuthUrl::new(config.authorization_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token_url = TokenUrl::new(config.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let redirect_url = RedirectUrl::new(config.callback_url.to_string())
			.map_err(|source| ConfigError::InvalidCallback { source })?;
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client })
	}

	/// Exchanges an authorization code for a token bundle.
	pub(crate) async fn exchange_code(
		&self,
		code: &str,
		extra_params: &BTreeMap<String, String>,
	) -> Result<TokenBundle> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.token_handle(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		for (key, value) in extra_params {
			request = request.add_extra_param(key, value);
		}

		let response = request
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;
		let mut bundle = TokenBundle::new(
			response.access_token().secret().to_owned(),
			response.refresh_token().map(|token| token.secret().to_owned()),
		);

		if let Some(expires_in) = response.expires_in()
			&& let Ok(expires_in) = Duration::try_from(expires_in)
		{
			bundle = bundle.with_expires_in(expires_in);
		}

		Ok(bundle)
	}
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.and_then(|meta| meta.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response(response, status),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(error, _body) =>
			ExchangeError::ResponseParse { source: error, status }.into(),
		RequestTokenError::Other(message) => ExchangeError::Unexpected { message, status }.into(),
	}
}

fn map_server_response(response: BasicErrorResponse, status: Option<u16>) -> Error {
	ExchangeError::Provider {
		error: response.error().as_ref().to_owned(),
		description: response.error_description().cloned(),
		status,
	}
	.into()
}

fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => ExchangeError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::HttpRequest(inner).into(),
		HttpClientError::Io(inner) => ExchangeError::Io(inner).into(),
		HttpClientError::Other(message) =>
			ExchangeError::Unexpected { message: message.to_string(), status: None }.into(),
		_ => ExchangeError::Unexpected {
			message: "Unrecognized HTTP client failure.".into(),
			status: None,
		}
		.into(),
	}
}
