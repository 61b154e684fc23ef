//! Verification hook contract deciding the identity for an authentication attempt.

// self
use crate::{_prelude::*, profile::Profile, token::TokenBundle};

/// Failure type surfaced by verification hooks.
pub type VerifyError = Box<dyn StdError + Send + Sync>;

/// Boxed future returned by [`VerifyCredentials::verify`].
pub type VerifyFuture<'a, U> =
	Pin<Box<dyn Future<Output = Result<Verification<U>, VerifyError>> + 'a + Send>>;

/// Hook invoked after a successful exchange + profile fetch.
///
/// Implementations receive the token bundle and the freshly-built profile and
/// decide who, if anyone, just authenticated. Whatever user value they grant is
/// owned by the caller afterwards, typically persisted into a session store.
pub trait VerifyCredentials: Send + Sync {
	/// User value produced on a granted attempt.
	type User: Send;

	/// Decides the identity for one authentication attempt.
	fn verify(&self, tokens: &TokenBundle, profile: Profile) -> VerifyFuture<'_, Self::User>;
}

/// Outcome of a verification hook.
pub enum Verification<U> {
	/// Credentials were accepted; the user value is handed to the caller.
	Granted(U),
	/// Credentials were valid at the provider but rejected by the hook.
	Denied {
		/// Optional human-readable reason for observability.
		reason: Option<String>,
	},
}
impl<U> Verification<U> {
	/// Shorthand for a denial without a reason.
	pub fn denied() -> Self {
		Self::Denied { reason: None }
	}

	/// Shorthand for a denial carrying a reason.
	pub fn denied_because(reason: impl Into<String>) -> Self {
		Self::Denied { reason: Some(reason.into()) }
	}

	/// Returns `true` when the attempt was granted.
	pub fn is_granted(&self) -> bool {
		matches!(self, Self::Granted(_))
	}

	/// Returns the granted user value, if any.
	pub fn user(self) -> Option<U> {
		match self {
			Self::Granted(user) => Some(user),
			Self::Denied { .. } => None,
		}
	}
}
impl<U> Debug for Verification<U> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Granted(_) => f.debug_struct("Verification::Granted").finish(),
			Self::Denied { reason } =>
				f.debug_struct("Verification::Denied").field("reason", reason).finish(),
		}
	}
}

/// Adapter that lets a plain async closure satisfy [`VerifyCredentials`].
///
/// The closure receives an owned clone of the token bundle so its future does
/// not borrow from the strategy.
pub struct VerifyFn<F>(F);
impl<F> VerifyFn<F> {
	/// Wraps a closure as a verification hook.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, Fut, U> VerifyCredentials for VerifyFn<F>
where
	F: Send + Sync + Fn(TokenBundle, Profile) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Verification<U>, VerifyError>>,
	U: Send,
{
	type User = U;

	fn verify(&self, tokens: &TokenBundle, profile: Profile) -> VerifyFuture<'_, U> {
		Box::pin((self.0)(tokens.clone(), profile))
	}
}

/// Verifier that grants every attempt and returns the profile as the user.
///
/// Mirrors the common session-login wiring where the provider profile is
/// persisted as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrantProfile;
impl VerifyCredentials for GrantProfile {
	type User = Profile;

	fn verify(&self, _tokens: &TokenBundle, profile: Profile) -> VerifyFuture<'_, Self::User> {
		Box::pin(async move { Ok(Verification::Granted(profile)) })
	}
}
