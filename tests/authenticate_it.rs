#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use tdameritrade_oauth2::{
	_preludet::*,
	config::StrategyConfig,
	error::ProfileFetchError,
	params::TokenOptions,
	profile::Profile,
	strategy::Strategy,
	token::TokenBundle,
	verify::{Verification, VerifyCredentials, VerifyFuture},
};

const AUTHORIZATION_CODE: &str = "code-it";

fn build_config(server: &MockServer) -> StrategyConfig {
	StrategyConfig::new(
		"client-it",
		"secret-it",
		Url::parse("https://app.example.com/callback")
			.expect("Callback URL should parse successfully."),
	)
	.with_token_endpoint(
		Url::parse(&server.url("/v1/oauth2/token"))
			.expect("Mock token endpoint should parse successfully."),
	)
	.with_profile_endpoint(
		Url::parse(&server.url("/v1/userprincipals"))
			.expect("Mock profile endpoint should parse successfully."),
	)
}

async fn mount_token_mock(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-it\",\"refresh_token\":\"refresh-it\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await
}

struct DenyEveryone;
impl VerifyCredentials for DenyEveryone {
	type User = Profile;

	fn verify(&self, _tokens: &TokenBundle, _profile: Profile) -> VerifyFuture<'_, Self::User> {
		Box::pin(async { Ok(Verification::denied_because("Account is closed.")) })
	}
}

struct FailingVerifier;
impl VerifyCredentials for FailingVerifier {
	type User = Profile;

	fn verify(&self, _tokens: &TokenBundle, _profile: Profile) -> VerifyFuture<'_, Self::User> {
		Box::pin(async { Err("Directory lookup timed out.".into()) })
	}
}

#[tokio::test]
async fn authenticate_runs_the_full_pipeline() {
	let server = MockServer::start_async().await;
	let strategy = build_reqwest_test_strategy(build_config(&server));
	let token_mock = mount_token_mock(&server).await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/userprincipals")
				.header("authorization", "Bearer access-it");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"userId\":\"123\"}");
		})
		.await;
	let verification = strategy
		.authenticate(AUTHORIZATION_CODE, &TokenOptions::offline())
		.await
		.expect("Authentication should succeed end to end.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	let profile = verification.user().expect("The grant-all verifier should grant access.");

	assert_eq!(profile.provider(), "tdameritrade");
	assert_eq!(profile.access_token(), Some("access-it"));
	assert_eq!(profile.get("userId").and_then(|value| value.as_str()), Some("123"));
}

#[tokio::test]
async fn authenticate_surfaces_denials() {
	let server = MockServer::start_async().await;
	let strategy =
		Strategy::with_http_client(build_config(&server), DenyEveryone, test_reqwest_http_client())
			.expect("Strategy should build with the denying verifier.");
	let _token_mock = mount_token_mock(&server).await;
	let _profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/userprincipals");
			then.status(200).body("{\"userId\":\"123\"}");
		})
		.await;
	let verification = strategy
		.authenticate(AUTHORIZATION_CODE, &TokenOptions::new())
		.await
		.expect("A denial is a clean outcome, not an error.");

	match verification {
		Verification::Denied { reason } => assert_eq!(reason.as_deref(), Some("Account is closed.")),
		Verification::Granted(_) => panic!("The denying verifier must not grant access."),
	}
}

#[tokio::test]
async fn authenticate_wraps_verifier_failures() {
	let server = MockServer::start_async().await;
	let strategy =
		Strategy::with_http_client(build_config(&server), FailingVerifier, test_reqwest_http_client())
			.expect("Strategy should build with the failing verifier.");
	let _token_mock = mount_token_mock(&server).await;
	let _profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/userprincipals");
			then.status(200).body("{\"userId\":\"123\"}");
		})
		.await;
	let err = strategy
		.authenticate(AUTHORIZATION_CODE, &TokenOptions::new())
		.await
		.expect_err("Verifier failures must surface as errors.");

	assert!(matches!(err, Error::Verify { .. }));
}

#[tokio::test]
async fn authenticate_stops_when_the_profile_fetch_fails() {
	let server = MockServer::start_async().await;
	let strategy = build_reqwest_test_strategy(build_config(&server));
	let token_mock = mount_token_mock(&server).await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/userprincipals");
			then.status(500).body("{\"error\":\"ServerError\"}");
		})
		.await;
	let err = strategy
		.authenticate(AUTHORIZATION_CODE, &TokenOptions::new())
		.await
		.expect_err("A failing profile fetch must abort authentication.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert!(matches!(err, Error::ProfileFetch(ProfileFetchError::Status { status: 500 })));
}
