//! Strategy configuration, provider defaults, and the client-identifier suffix rule.

// self
use crate::{_prelude::*, error::ConfigError};

/// Default authorization endpoint used when none is supplied.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://auth.tdameritrade.com/auth";
/// Default token endpoint used when none is supplied.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.tdameritrade.com/v1/oauth2/token";
/// Default profile endpoint used when none is supplied.
pub const DEFAULT_PROFILE_ENDPOINT: &str = "https://api.tdameritrade.com/v1/userprincipals";
/// Account-type suffix every client identifier must carry.
pub const CLIENT_ID_SUFFIX: &str = "@AMER.OAUTHAP";
/// Default separator used when joining scopes into the `scope` parameter.
pub const DEFAULT_SCOPE_SEPARATOR: &str = " ";

/// Caller-supplied strategy configuration.
///
/// Endpoints and the scope separator are optional; [`resolve`](Self::resolve)
/// fills in the documented provider defaults. Scopes are forwarded in order,
/// never validated or deduplicated; the provider defines which values exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
	/// OAuth client identifier; the `@AMER.OAUTHAP` suffix is appended when missing.
	pub client_id: String,
	/// OAuth client secret presented during the code exchange.
	pub client_secret: String,
	/// URL the provider redirects to after the user authorizes.
	pub callback_url: Url,
	/// Ordered permission scopes to request.
	pub scopes: Vec<String>,
	/// Authorization endpoint override.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint override.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint override.
	pub profile_endpoint: Option<Url>,
	/// Separator override for joining scopes.
	pub scope_separator: Option<String>,
}
impl StrategyConfig {
	/// Creates a configuration with the required fields and no overrides.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		callback_url: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			callback_url,
			scopes: Vec::new(),
			authorization_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			scope_separator: None,
		}
	}

	/// Sets the ordered scopes to request.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the authorization endpoint.
	pub fn with_authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the profile endpoint.
	pub fn with_profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Overrides the scope separator.
	pub fn with_scope_separator(mut self, separator: impl Into<String>) -> Self {
		self.scope_separator = Some(separator.into());

		self
	}

	/// Validates the configuration and produces a fully-populated value.
	///
	/// Defaulting is an explicit step returning a new [`ResolvedConfig`] rather
	/// than mutating the caller's input. Fails fast on an empty client
	/// identifier or secret; the suffix check never runs against a missing
	/// value.
	pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientIdentifier);
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::MissingClientSecret);
		}

		let client_id = apply_client_id_suffix(self.client_id);
		let authorization_endpoint = match self.authorization_endpoint {
			Some(url) => url,
			None => default_endpoint("authorization", DEFAULT_AUTHORIZATION_ENDPOINT)?,
		};
		let token_endpoint = match self.token_endpoint {
			Some(url) => url,
			None => default_endpoint("token", DEFAULT_TOKEN_ENDPOINT)?,
		};
		let profile_endpoint = match self.profile_endpoint {
			Some(url) => url,
			None => default_endpoint("profile", DEFAULT_PROFILE_ENDPOINT)?,
		};
		let scope_separator =
			self.scope_separator.unwrap_or_else(|| DEFAULT_SCOPE_SEPARATOR.to_owned());

		Ok(ResolvedConfig {
			client_id,
			client_secret: self.client_secret,
			callback_url: self.callback_url,
			scopes: self.scopes,
			authorization_endpoint,
			token_endpoint,
			profile_endpoint,
			scope_separator,
		})
	}
}

/// Fully-populated configuration consumed by the strategy.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
	/// Client identifier guaranteed to end with [`CLIENT_ID_SUFFIX`].
	pub client_id: String,
	/// OAuth client secret presented during the code exchange.
	pub client_secret: String,
	/// URL the provider redirects to after the user authorizes.
	pub callback_url: Url,
	/// Ordered permission scopes to request.
	pub scopes: Vec<String>,
	/// Authorization endpoint.
	pub authorization_endpoint: Url,
	/// Token endpoint.
	pub token_endpoint: Url,
	/// Profile endpoint.
	pub profile_endpoint: Url,
	/// Separator used when joining scopes.
	pub scope_separator: String,
}
impl ResolvedConfig {
	/// Joins the configured scopes into a `scope` parameter value.
	///
	/// Returns `None` when no scopes are configured so callers can omit the
	/// parameter entirely.
	pub fn scope_parameter(&self) -> Option<String> {
		if self.scopes.is_empty() {
			return None;
		}

		Some(self.scopes.join(&self.scope_separator))
	}
}
impl Debug for ResolvedConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResolvedConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("callback_url", &self.callback_url)
			.field("scopes", &self.scopes)
			.field("authorization_endpoint", &self.authorization_endpoint)
			.field("token_endpoint", &self.token_endpoint)
			.field("profile_endpoint", &self.profile_endpoint)
			.field("scope_separator", &self.scope_separator)
			.finish()
	}
}

fn apply_client_id_suffix(client_id: String) -> String {
	if client_id.ends_with(CLIENT_ID_SUFFIX) {
		client_id
	} else {
		format!("{client_id}{CLIENT_ID_SUFFIX}")
	}
}

fn default_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: name, source })
}
