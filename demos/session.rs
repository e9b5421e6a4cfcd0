//! Demonstrates a full helpdesk session against a mock backend: login, a request that
//! triggers a transparent token refresh, and the sign-out event raised once the refresh
//! token is rejected.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use helpdesk_gateway::{
	descriptor::ApiDescriptor,
	error::Error,
	gateway::Gateway,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let descriptor =
		ApiDescriptor::builder(Url::parse(&server.url("/api/"))?).allow_insecure(true).build()?;
	let gateway = Gateway::new(store, descriptor)?;
	let mut sign_out = gateway.subscribe_sign_out();
	let mut login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"access-1\",\"refresh\":\"refresh-1\"}");
		})
		.await;

	gateway.login("amira", "correct-horse").await?;
	login.delete_async().await;

	println!("Signed in: {}.", gateway.is_authenticated().await?);

	// The first access token is already expired server-side.
	let mut expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/tickets/").header("authorization", "Bearer access-1");
			then.status(401);
		})
		.await;
	let mut renewed = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/tickets/").header("authorization", "Bearer access-2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"count\":1,\"results\":[{\"id\":1,\"title\":\"VPN down\"}]}");
		})
		.await;
	let mut refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"access-2\"}");
		})
		.await;
	let tickets: serde_json::Value = gateway.get("tickets/").await?;

	println!("Tickets after a transparent refresh: {}.", tickets["count"]);
	println!("Successful refreshes: {}.", gateway.metrics().refresh_successes());

	expired.delete_async().await;
	renewed.delete_async().await;
	refresh.delete_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/tickets/");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/");
			then.status(401).body("{\"detail\":\"Token is blacklisted\"}");
		})
		.await;

	match gateway.get::<serde_json::Value>("tickets/").await {
		Err(Error::AuthExpired { response }) =>
			println!("Session expired; original status was {}.", response.status),
		other => println!("Unexpected outcome: {other:?}."),
	}

	let event = sign_out.recv().await?;

	println!("Sign-out ({}) redirects to {}.", event.reason.as_str(), event.redirect_to);

	Ok(())
}
