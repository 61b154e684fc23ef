//! Walks through a TD Ameritrade sign-in: printing the redirect URL, exchanging the pasted
//! authorization code, and showing the augmented user profile.

// std
use std::{
	env,
	io::{self, BufRead, Write},
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use tdameritrade_oauth2::{
	config::StrategyConfig,
	params::{AuthorizationOptions, TokenOptions},
	strategy::{self, Strategy},
	verify::{GrantProfile, Verification},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = env::var("TDAMERITRADE_CLIENT_ID")?;
	let client_secret = env::var("TDAMERITRADE_CLIENT_SECRET")?;
	let config =
		StrategyConfig::new(client_id, client_secret, Url::parse("https://localhost:5000/callback")?)
			.with_scopes(["PlaceTrades", "AccountAccess"]);
	let strategy = Strategy::new(config, GrantProfile)?;
	let state = strategy::generate_state();

	println!(
		"Send your user to {}.",
		strategy.authorize_url(&AuthorizationOptions::new(), Some(&state))
	);
	print!("Paste the `code` query parameter from the callback: ");
	io::stdout().flush()?;

	let mut code = String::new();

	io::stdin().lock().read_line(&mut code)?;

	match strategy.authenticate(code.trim(), &TokenOptions::offline()).await? {
		Verification::Granted(profile) => {
			println!("Signed in via {}.", profile.provider());
			println!("{}", serde_json::to_string_pretty(profile.fields())?);
		},
		Verification::Denied { reason } => {
			eprintln!("Access denied: {}.", reason.as_deref().unwrap_or("no reason given"));
		},
	}

	Ok(())
}
