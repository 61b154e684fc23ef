//! Per-call option mappings consulted when building authorization and token requests.

/// Recognized options for the authorization redirect.
///
/// The provider currently recognizes none; the type exists so the parameter
/// surface stays stable when options appear. See
/// [`Strategy::authorization_params`](crate::strategy::Strategy::authorization_params).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct AuthorizationOptions {}
impl AuthorizationOptions {
	/// Creates an empty option set.
	pub fn new() -> Self {
		Self::default()
	}
}

/// Recognized options for the token exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct TokenOptions {
	/// Requested access type; produces an `access_type` form field when set.
	pub access_type: Option<String>,
}
impl TokenOptions {
	/// Creates an empty option set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the requested access type.
	pub fn with_access_type(mut self, access_type: impl Into<String>) -> Self {
		self.access_type = Some(access_type.into());

		self
	}

	/// Convenience constructor for `access_type=offline`, which asks the
	/// provider to issue a refresh token.
	pub fn offline() -> Self {
		Self::new().with_access_type("offline")
	}
}
