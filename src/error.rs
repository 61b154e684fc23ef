//! Adapter-level error types shared across configuration, exchanges, and profile retrieval.

// self
use crate::_prelude::*;

/// Adapter-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical adapter error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint exchange failure.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// Transport-level failure while fetching the user profile.
	#[error(transparent)]
	ProfileFetch(#[from] ProfileFetchError),
	/// Profile response body could not be interpreted.
	#[error(transparent)]
	ProfileParse(#[from] ProfileParseError),

	/// Verification hook raised its own failure while deciding the identity.
	#[error("Verification hook failed.")]
	Verify {
		/// Failure surfaced by the caller-supplied hook.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a verification hook failure.
	pub fn verify(src: impl Into<BoxError>) -> Self {
		Self::Verify { source: src.into() }
	}
}

/// Configuration and validation failures raised eagerly at construction.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client identifier was empty; the suffix rule cannot apply to a missing value.
	#[error("Client identifier is required.")]
	MissingClientIdentifier,
	/// Client secret was empty.
	#[error("Client secret is required.")]
	MissingClientSecret,
	/// A provider endpoint URL failed validation.
	#[error("The {endpoint} endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Callback URL cannot be used as an OAuth redirect URI.
	#[error("Callback URL is invalid.")]
	InvalidCallback {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}

/// Failures raised while exchanging an authorization code for tokens.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Provider rejected the exchange with a structured OAuth error.
	#[error("Token endpoint rejected the exchange: {error}.")]
	Provider {
		/// OAuth `error` field returned by the provider.
		error: String,
		/// OAuth `error_description` field, when supplied.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during the exchange.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Token endpoint produced a response the engine could not categorize.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Engine-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl ExchangeError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Transport-level failures while retrieving the user profile.
#[derive(Debug, ThisError)]
pub enum ProfileFetchError {
	/// Underlying HTTP client reported a network failure (DNS, TCP, TLS).
	#[error("Network error occurred while fetching the user profile.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Profile endpoint answered with a non-success status.
	#[error("Profile endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code returned by the provider.
		status: u16,
	},
}
impl ProfileFetchError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Failures interpreting the profile response body.
///
/// The parse cause is carried as the error source so the failing JSON path
/// survives into logs.
#[derive(Debug, ThisError)]
pub enum ProfileParseError {
	/// Body is not valid JSON.
	#[error("Profile endpoint returned malformed JSON.")]
	Json {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// Body is valid JSON but not an object, so it cannot carry the injected fields.
	#[error("Profile endpoint returned a non-object JSON value.")]
	NotAnObject,
}
