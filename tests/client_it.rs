#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use recom_client::{
	CancellationToken, ClientConfig, Error, RecomClient,
	entity::Usuario,
	http::{HttpSender, ReqwestHttpClient},
	oauth2::http,
};

const CLIENT_ID: &str = "c1";
const CLIENT_SECRET: &str = "s1";

async fn mock_authority<'a>(
	server: &'a MockServer,
	token: &str,
) -> (httpmock::Mock<'a>, httpmock::Mock<'a>) {
	let issuer = server.base_url();
	let token_endpoint = server.url("/connect/token");
	let discovery = server
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"issuer\":\"{issuer}\",\"token_endpoint\":\"{token_endpoint}\"}}"
			));
		})
		.await;
	let exchange = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/connect/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"access_token\":\"{token}\",\"token_type\":\"bearer\",\"expires_in\":3600}}"
			));
		})
		.await;

	(discovery, exchange)
}

fn build_client(authority: &MockServer, api: &MockServer) -> RecomClient<ReqwestHttpClient> {
	let config = ClientConfig::builder(CLIENT_ID, CLIENT_SECRET, api.url("/"), authority.url("/"))
		.allow_insecure_transport(true)
		.build()
		.expect("Configuration should build for the mock servers.");

	RecomClient::from_config(config).expect("Client should build over reqwest.")
}

#[tokio::test]
async fn missing_site_reports_false_after_one_token_exchange() {
	let authority = MockServer::start_async().await;
	let api = MockServer::start_async().await;
	let (discovery, exchange) = mock_authority(&authority, "tok-A").await;
	let site = api
		.mock_async(|when, then| {
			when.method(GET).path("/api/obras/OBR-42").header("authorization", "Bearer tok-A");
			then.status(404);
		})
		.await;
	let client = build_client(&authority, &api);
	let exists = client
		.site_exists("OBR-42", &CancellationToken::new())
		.await
		.expect("Existence check should succeed.");

	assert!(!exists);

	discovery.assert_calls_async(1).await;
	exchange.assert_calls_async(1).await;
	site.assert_calls_async(1).await;
}

#[tokio::test]
async fn repeated_calls_reuse_cached_token() {
	let authority = MockServer::start_async().await;
	let api = MockServer::start_async().await;
	let (_, exchange) = mock_authority(&authority, "tok-A").await;
	let grant = api
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/usuarios")
				.header("authorization", "Bearer tok-A")
				.header("content-type", "application/json");
			then.status(200);
		})
		.await;
	let revoke = api
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/api/usuarios/fiscal.01/11222333")
				.header("authorization", "Bearer tok-A");
			then.status(204);
		})
		.await;
	let client = build_client(&authority, &api);
	let cancel = CancellationToken::new();

	client.grant_user_access("fiscal.01", "11222333", &cancel).await.expect("Grant should succeed.");
	client.grant_user_access("fiscal.01", "11222333", &cancel).await.expect("Grant should succeed.");
	client.revoke_user_access("fiscal.01", "11222333", &cancel).await.expect("Revoke should succeed.");

	assert_eq!(
		client.access_token(&cancel).await.expect("Cached token should be returned.").expose(),
		"tok-A"
	);

	exchange.assert_calls_async(1).await;
	grant.assert_calls_async(2).await;
	revoke.assert_calls_async(1).await;
}

#[tokio::test]
async fn balance_query_decodes_amount_and_errors_surface() {
	let authority = MockServer::start_async().await;
	let api = MockServer::start_async().await;
	let _authority = mock_authority(&authority, "tok-A").await;
	let balance = api
		.mock_async(|when, then| {
			when.method(GET).path("/api/contacorrente/saldo/saque/OBR-42/1500.5");
			then.status(200).header("content-type", "application/json").body("812.5");
		})
		.await;
	let conflict = api
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/nfses/estornarIncremento/11222333000181/2024-0001");
			then.status(409).body("already reversed");
		})
		.await;
	let client = build_client(&authority, &api);
	let cancel = CancellationToken::new();
	let amount = client
		.max_deductible_amount("OBR-42", 1500.5, &cancel)
		.await
		.expect("Balance query should succeed.");

	assert_eq!(amount, 812.5);

	let err = client
		.reverse_increment("11222333000181", "2024-0001", &cancel)
		.await
		.expect_err("Conflicting reversal should fail.");

	assert!(matches!(err, Error::RemoteService { status: 409, ref body, .. } if body == "already reversed"));

	balance.assert_calls_async(1).await;
	conflict.assert_calls_async(1).await;
}

#[tokio::test]
async fn caller_authorization_skips_token_exchange() {
	let authority = MockServer::start_async().await;
	let api = MockServer::start_async().await;
	let (discovery, exchange) = mock_authority(&authority, "tok-A").await;
	let grant = api
		.mock_async(|when, then| {
			when.method(POST).path("/api/usuarios").header("authorization", "Bearer caller-token");
			then.status(201);
		})
		.await;
	let client = build_client(&authority, &api);
	let body = serde_json::to_vec(&Usuario::new("fiscal.01", "11222333"))
		.expect("Usuario should serialize.");
	let request = http::Request::builder()
		.method(http::Method::POST)
		.uri(api.url("/api/usuarios"))
		.header(http::header::AUTHORIZATION, "Bearer caller-token")
		.header(http::header::CONTENT_TYPE, "application/json")
		.body(body)
		.expect("Raw request should build.");
	let response = client
		.sender()
		.send(request, &CancellationToken::new())
		.await
		.expect("Raw request should succeed.");

	assert_eq!(response.status().as_u16(), 201);
	assert!(!client.sender().has_token());

	discovery.assert_calls_async(0).await;
	exchange.assert_calls_async(0).await;
	grant.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_client_credentials_never_reach_api() {
	let authority = MockServer::start_async().await;
	let api = MockServer::start_async().await;
	let issuer = authority.base_url();
	let token_endpoint = authority.url("/connect/token");
	let _discovery = authority
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"issuer\":\"{issuer}\",\"token_endpoint\":\"{token_endpoint}\"}}"
			));
		})
		.await;
	let exchange = authority
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let site = api
		.mock_async(|when, then| {
			when.method(GET).path("/api/obras/OBR-42");
			then.status(200);
		})
		.await;
	let client = build_client(&authority, &api);
	let err = client
		.site_exists("OBR-42", &CancellationToken::new())
		.await
		.expect_err("Rejected credentials must fail the operation.");

	assert!(matches!(err, Error::Authentication { status: Some(401), .. }));
	assert!(!client.sender().has_token());

	exchange.assert_calls_async(1).await;
	site.assert_calls_async(0).await;
}
