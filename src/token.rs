//! Token bundle produced by the code exchange, with redacted secret wrappers.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Tokens returned by one authorization-code exchange.
///
/// The bundle is owned transiently: the strategy borrows the access token for a
/// single profile fetch and hands the whole bundle to the verification hook.
/// `expires_in` is surfaced as reported by the provider when present.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
	/// Access token used for authenticated provider calls.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Relative lifetime reported by the token endpoint.
	pub expires_in: Option<Duration>,
}
impl TokenBundle {
	/// Creates a bundle from raw token values.
	pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token.map(TokenSecret::new),
			expires_in: None,
		}
	}

	/// Attaches the provider-reported lifetime.
	pub fn with_expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}
}
impl Debug for TokenBundle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBundle")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn bundle_debug_redacts_both_tokens() {
		let bundle = TokenBundle::new("at-12345", Some("rt-67890".into()))
			.with_expires_in(Duration::seconds(1800));
		let rendered = format!("{bundle:?}");

		assert!(!rendered.contains("at-12345"));
		assert!(!rendered.contains("rt-67890"));
		assert!(rendered.contains("expires_in"));
	}

	#[test]
	fn bundle_without_refresh_token() {
		let bundle = TokenBundle::new("access", None);

		assert_eq!(bundle.access_token.expose(), "access");
		assert!(bundle.refresh_token.is_none());
		assert!(bundle.expires_in.is_none());
	}
}
