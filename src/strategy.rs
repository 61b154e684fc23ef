//! TD Ameritrade specialization of the generic authorization-code engine.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	config::{ResolvedConfig, StrategyConfig},
	error::ProfileFetchError,
	http::{StrategyHttpClient, TokenPresentation},
	oauth::ExchangeFacade,
	obs::{self, Stage, StageOutcome, StageSpan},
	params::{AuthorizationOptions, TokenOptions},
	profile::{PROVIDER, Profile},
	token::TokenBundle,
	verify::{Verification, VerifyCredentials},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const STATE_LEN: usize = 32;

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport stack.
pub type ReqwestStrategy<V> = Strategy<V, ReqwestHttpClient>;

/// Authentication strategy delegating to TD Ameritrade via OAuth 2.0.
///
/// The strategy customizes three points of the engine's standard
/// authorization-code flow: endpoint/identifier defaulting (resolved once at
/// construction), header-based token presentation for profile GETs (fixed at
/// construction, never toggled per call), and profile retrieval + normalization.
/// It holds no per-request mutable state, so one instance can serve concurrent
/// authentication attempts.
pub struct Strategy<V, C>
where
	V: VerifyCredentials,
	C: ?Sized + StrategyHttpClient,
{
	config: ResolvedConfig,
	facade: ExchangeFacade<C>,
	http_client: Arc<C>,
	presentation: TokenPresentation,
	verify: V,
}
impl<V, C> Strategy<V, C>
where
	V: VerifyCredentials,
	C: ?Sized + StrategyHttpClient,
{
	/// Creates a strategy that reuses a caller-provided transport.
	///
	/// Configuration is resolved eagerly: endpoint defaults and the client
	/// identifier suffix are applied here, and misconfiguration fails now
	/// rather than on first use.
	pub fn with_http_client(
		config: StrategyConfig,
		verify: V,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let config = config.resolve()?;
		let http_client = http_client.into();
		let facade = ExchangeFacade::from_config(&config, http_client.clone())?;

		Ok(Self {
			config,
			facade,
			http_client,
			presentation: TokenPresentation::AuthorizationHeader,
			verify,
		})
	}

	/// Fixed identity tag under which this strategy registers.
	pub fn name(&self) -> &'static str {
		PROVIDER
	}

	/// Fully-populated configuration the strategy operates on.
	pub fn config(&self) -> &ResolvedConfig {
		&self.config
	}

	/// Token presentation mode established at construction.
	pub fn token_presentation(&self) -> TokenPresentation {
		self.presentation
	}

	/// Extra parameters to include in the authorization redirect.
	///
	/// The provider currently recognizes none, so this always returns an empty
	/// mapping; it exists as the extension point consulted by
	/// [`authorize_url`](Self::authorize_url).
	pub fn authorization_params(&self, options: &AuthorizationOptions) -> BTreeMap<String, String> {
		// Options reserved for future use.
		let _ = options;

		BTreeMap::new()
	}

	/// Extra form parameters to include in the token exchange.
	///
	/// Pure and infallible: produces an `access_type` field when the option is
	/// set, and nothing otherwise.
	pub fn token_params(&self, options: &TokenOptions) -> BTreeMap<String, String> {
		let mut params = BTreeMap::new();

		if let Some(access_type) = &options.access_type {
			params.insert("access_type".to_owned(), access_type.clone());
		}

		params
	}

	/// Builds the authorization redirect URL users are sent to.
	pub fn authorize_url(&self, options: &AuthorizationOptions, state: Option<&str>) -> Url {
		let mut url = self.config.authorization_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.config.client_id);
		pairs.append_pair("redirect_uri", self.config.callback_url.as_str());

		if let Some(scope_value) = self.config.scope_parameter() {
			pairs.append_pair("scope", &scope_value);
		}
		if let Some(state) = state {
			pairs.append_pair("state", state);
		}

		for (key, value) in self.authorization_params(options) {
			pairs.append_pair(&key, &value);
		}

		drop(pairs);

		url
	}

	/// Exchanges an authorization code for a token bundle.
	pub async fn exchange_code(&self, code: &str, options: &TokenOptions) -> Result<TokenBundle> {
		const STAGE: Stage = Stage::Exchange;

		let span = StageSpan::new(STAGE);

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let extra_params = self.token_params(options);

				self.facade.exchange_code(code, &extra_params).await
			})
			.await;

		record_result(STAGE, &result);

		result
	}

	/// Retrieves the user profile for an access token.
	///
	/// Issues one authenticated GET to the profile endpoint using the
	/// presentation mode established at construction. Transport failures and
	/// non-success statuses surface as [`ProfileFetchError`]; bodies that are
	/// not JSON objects surface as
	/// [`ProfileParseError`](crate::error::ProfileParseError). No retries, no
	/// caching: every call performs a network round trip.
	pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
		const STAGE: Stage = Stage::Profile;

		let span = StageSpan::new(STAGE);

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self
					.http_client
					.get_profile(&self.config.profile_endpoint, access_token, self.presentation)
					.await
					.map_err(ProfileFetchError::network)?;

				if !response.is_success() {
					return Err(ProfileFetchError::Status { status: response.status }.into());
				}

				Profile::from_response(&response.body, access_token).map_err(Error::from)
			})
			.await;

		record_result(STAGE, &result);

		result
	}

	/// Runs the full pipeline: code exchange, profile fetch, verification.
	///
	/// The verification hook receives the token bundle and the normalized
	/// profile and decides the resulting identity; the caller persists whatever
	/// user value it grants.
	pub async fn authenticate(
		&self,
		code: &str,
		options: &TokenOptions,
	) -> Result<Verification<V::User>> {
		const STAGE: Stage = Stage::Authenticate;

		let span = StageSpan::new(STAGE);

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let tokens = self.exchange_code(code, options).await?;
				let profile = self.fetch_profile(tokens.access_token.expose()).await?;

				self.verify.verify(&tokens, profile).await.map_err(Error::verify)
			})
			.await;

		record_result(STAGE, &result);

		result
	}
}
#[cfg(feature = "reqwest")]
impl<V> Strategy<V, ReqwestHttpClient>
where
	V: VerifyCredentials,
{
	/// Creates a strategy backed by the crate's default reqwest transport.
	pub fn new(config: StrategyConfig, verify: V) -> Result<Self> {
		Self::with_http_client(config, verify, ReqwestHttpClient::default())
	}
}
impl<V, C> Debug for Strategy<V, C>
where
	V: VerifyCredentials,
	C: ?Sized + StrategyHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Strategy")
			.field("name", &self.name())
			.field("config", &self.config)
			.field("presentation", &self.presentation)
			.finish()
	}
}

/// Generates a random `state` value callers can round-trip through the
/// authorization redirect.
pub fn generate_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

fn record_result<T>(stage: Stage, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_stage_outcome(stage, StageOutcome::Success),
		Err(_) => obs::record_stage_outcome(stage, StageOutcome::Failure),
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;
	use crate::verify::GrantProfile;

	fn strategy() -> ReqwestStrategy<GrantProfile> {
		let config = StrategyConfig::new(
			"my-client",
			"my-secret",
			Url::parse("https://app.example.com/callback")
				.expect("Callback URL fixture should parse successfully."),
		)
		.with_scopes(["PlaceTrades", "AccountAccess"]);

		Strategy::new(config, GrantProfile).expect("Strategy fixture should construct.")
	}

	#[test]
	fn strategy_identity_and_presentation_are_fixed() {
		let strategy = strategy();

		assert_eq!(strategy.name(), "tdameritrade");
		assert_eq!(strategy.token_presentation(), TokenPresentation::AuthorizationHeader);
		assert_eq!(strategy.config().client_id, "my-client@AMER.OAUTHAP");
	}

	#[test]
	fn authorization_params_are_always_empty() {
		let strategy = strategy();

		assert!(strategy.authorization_params(&AuthorizationOptions::new()).is_empty());
	}

	#[test]
	fn token_params_recognize_access_type_only() {
		let strategy = strategy();
		let params = strategy.token_params(&TokenOptions::new().with_access_type("offline"));

		assert_eq!(params.get("access_type").map(String::as_str), Some("offline"));
		assert_eq!(params.len(), 1);
		assert!(strategy.token_params(&TokenOptions::new()).is_empty());
	}

	#[test]
	fn authorize_url_carries_the_handshake_parameters() {
		let strategy = strategy();
		let url = strategy.authorize_url(&AuthorizationOptions::new(), Some("state-123"));

		assert!(url.as_str().starts_with("https://auth.tdameritrade.com/auth?"));

		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("my-client@AMER.OAUTHAP"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("https://app.example.com/callback")
		);
		assert_eq!(pairs.get("scope").map(String::as_str), Some("PlaceTrades AccountAccess"));
		assert_eq!(pairs.get("state").map(String::as_str), Some("state-123"));
	}

	#[test]
	fn authorize_url_omits_state_and_scope_when_absent() {
		let config = StrategyConfig::new(
			"my-client",
			"my-secret",
			Url::parse("https://app.example.com/callback")
				.expect("Callback URL fixture should parse successfully."),
		);
		let strategy =
			Strategy::new(config, GrantProfile).expect("Strategy fixture should construct.");
		let url = strategy.authorize_url(&AuthorizationOptions::new(), None);
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert!(!pairs.contains_key("scope"));
		assert!(!pairs.contains_key("state"));
	}

	#[test]
	fn generated_state_is_alphanumeric() {
		let state = generate_state();

		assert_eq!(state.len(), STATE_LEN);
		assert!(state.chars().all(|ch| ch.is_ascii_alphanumeric()));
		assert_ne!(state, generate_state(), "Consecutive states should not collide.");
	}
}
