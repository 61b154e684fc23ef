//! Normalized user profile returned by the provider.

// crates.io
use serde_json::{Map as JsonMap, Value};
// self
use crate::{_prelude::*, error::ProfileParseError};

/// Fixed provider identifier injected into every profile.
pub const PROVIDER: &str = "tdameritrade";

const PROVIDER_FIELD: &str = "provider";
const ACCESS_TOKEN_FIELD: &str = "accessToken";

/// Provider-returned JSON object augmented with the `provider` and
/// `accessToken` fields.
///
/// No schema is enforced on the remaining fields; whatever the provider
/// returns is carried verbatim. A profile is created fresh per authentication
/// attempt and owned by whoever the verification hook hands it to.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(JsonMap<String, Value>);
impl Profile {
	/// Parses a profile response body and injects the adapter-owned fields.
	pub(crate) fn from_response(
		body: &[u8],
		access_token: &str,
	) -> Result<Self, ProfileParseError> {
		let mut deserializer = serde_json::Deserializer::from_slice(body);
		let value: Value = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ProfileParseError::Json { source })?;
		let Value::Object(mut fields) = value else {
			return Err(ProfileParseError::NotAnObject);
		};

		fields.insert(PROVIDER_FIELD.to_owned(), Value::String(PROVIDER.to_owned()));
		fields.insert(ACCESS_TOKEN_FIELD.to_owned(), Value::String(access_token.to_owned()));

		Ok(Self(fields))
	}

	/// Returns the injected provider identifier.
	pub fn provider(&self) -> &str {
		self.0.get(PROVIDER_FIELD).and_then(Value::as_str).unwrap_or(PROVIDER)
	}

	/// Returns the access token used to fetch this profile.
	pub fn access_token(&self) -> Option<&str> {
		self.0.get(ACCESS_TOKEN_FIELD).and_then(Value::as_str)
	}

	/// Looks up an arbitrary provider-returned field.
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	/// Returns the underlying field map.
	pub fn fields(&self) -> &JsonMap<String, Value> {
		&self.0
	}

	/// Consumes the profile and returns the underlying field map.
	pub fn into_fields(self) -> JsonMap<String, Value> {
		self.0
	}
}
impl Debug for Profile {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (field, value) in &self.0 {
			if field == ACCESS_TOKEN_FIELD {
				map.entry(field, &"<redacted>");
			} else {
				map.entry(field, value);
			}
		}

		map.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parsed_profile_carries_injected_fields() {
		let profile = Profile::from_response(br#"{"userId":"123"}"#, "tok-abc")
			.expect("Valid JSON object should parse into a profile.");

		assert_eq!(profile.provider(), "tdameritrade");
		assert_eq!(profile.access_token(), Some("tok-abc"));
		assert_eq!(profile.get("userId").and_then(Value::as_str), Some("123"));
		assert_eq!(profile.fields().len(), 3);
	}

	#[test]
	fn injected_fields_overwrite_provider_supplied_ones() {
		let profile =
			Profile::from_response(br#"{"provider":"other","accessToken":"stale"}"#, "tok-abc")
				.expect("Valid JSON object should parse into a profile.");

		assert_eq!(profile.provider(), "tdameritrade");
		assert_eq!(profile.access_token(), Some("tok-abc"));
	}

	#[test]
	fn non_json_body_is_a_parse_error() {
		let err = Profile::from_response(b"not json", "tok-abc")
			.expect_err("Non-JSON bodies must be rejected.");

		assert!(matches!(err, ProfileParseError::Json { .. }));
	}

	#[test]
	fn non_object_json_is_a_parse_error() {
		let err = Profile::from_response(b"[1,2,3]", "tok-abc")
			.expect_err("JSON arrays cannot carry the injected fields.");

		assert!(matches!(err, ProfileParseError::NotAnObject));
	}

	#[test]
	fn debug_redacts_the_access_token() {
		let profile = Profile::from_response(br#"{"userId":"123"}"#, "tok-abc")
			.expect("Valid JSON object should parse into a profile.");
		let rendered = format!("{profile:?}");

		assert!(!rendered.contains("tok-abc"));
		assert!(rendered.contains("userId"));
	}

	#[test]
	fn serde_round_trip_is_transparent() {
		let profile = Profile::from_response(br#"{"userId":"123"}"#, "tok-abc")
			.expect("Valid JSON object should parse into a profile.");
		let serialized =
			serde_json::to_value(&profile).expect("Profile should serialize successfully.");

		assert_eq!(serialized.get("userId").and_then(Value::as_str), Some("123"));
		assert_eq!(serialized.get("provider").and_then(Value::as_str), Some("tdameritrade"));
		assert_eq!(serialized.get("accessToken").and_then(Value::as_str), Some("tok-abc"));
	}
}
