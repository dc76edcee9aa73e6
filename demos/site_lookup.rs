//! Runs the client against in-process mock servers: discovers the authority, exchanges client
//! credentials once, then checks a site and queries its deductible balance with the cached token.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use recom_client::{CancellationToken, ClientConfig, RecomClient};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let authority = MockServer::start_async().await;
	let api = MockServer::start_async().await;
	let issuer = authority.base_url();
	let token_endpoint = authority.url("/connect/token");

	authority
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"issuer\":\"{issuer}\",\"token_endpoint\":\"{token_endpoint}\"}}"
			));
		})
		.await;

	let token_mock = authority
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;

	api.mock_async(|when, then| {
		when.method(GET).path("/api/obras/OBR-42").header("authorization", "Bearer demo-access");
		then.status(200).header("content-type", "application/json").body("{}");
	})
	.await;
	api.mock_async(|when, then| {
		when.method(GET).path("/api/contacorrente/saldo/saque/OBR-42/1500");
		then.status(200).header("content-type", "application/json").body("812.5");
	})
	.await;

	let config = ClientConfig::builder("demo-client", "super-secret", api.url("/"), authority.url("/"))
		.allow_insecure_transport(true)
		.build()?;
	let client = RecomClient::from_config(config)?;
	let cancel = CancellationToken::new();
	let exists = client.site_exists("OBR-42", &cancel).await?;
	let deductible = client.max_deductible_amount("OBR-42", 1500.0, &cancel).await?;

	println!("Site OBR-42 registered: {exists}.");
	println!("Maximum deductible for a 1500.00 invoice: {deductible:.2}.");

	token_mock.assert_calls_async(1).await;

	Ok(())
}
