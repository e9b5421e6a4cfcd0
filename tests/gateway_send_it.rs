mod common;

// std
use std::sync::{Arc, atomic::Ordering};
// self
use common::{FakeBackend, fake_gateway};
use helpdesk_gateway::{
	auth::CredentialPair,
	error::{Error, TransportError},
	gateway::{RefreshPhase, SignOutReason},
	http::ApiRequest,
	store::{ACCESS_KEY, CredentialStore, CredentialStoreExt, REFRESH_KEY},
};

#[tokio::test]
async fn stored_token_is_attached_verbatim() {
	let backend = Arc::new(FakeBackend::new("access-1", "unused"));
	let (gateway, store) = fake_gateway(backend.clone());

	store
		.save_pair(CredentialPair::new("access-1", "refresh-1"))
		.await
		.expect("Seeding should succeed.");

	let response =
		gateway
			.send(ApiRequest::get("/tickets/"))
			.await
			.expect("Authorized request should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(backend.authorizations_for("/api/tickets/"), vec![Some("Bearer access-1".into())]);
	assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn missing_token_omits_authorization_header() {
	let backend = Arc::new(FakeBackend::new("access-1", "unused"));
	let (gateway, _store) = fake_gateway(backend.clone());
	let response = gateway
		.send(ApiRequest::get("public/"))
		.await
		.expect("Unauthenticated request to a public path should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(backend.authorizations_for("/api/public/"), vec![None]);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_retried_once() {
	let backend = Arc::new(FakeBackend::new("access-new", "access-new"));
	let (gateway, store) = fake_gateway(backend.clone());

	store
		.save_pair(CredentialPair::new("access-old", "refresh-1"))
		.await
		.expect("Seeding should succeed.");

	let response = gateway
		.send(ApiRequest::get("tickets/").query("ordering", "-created_at"))
		.await
		.expect("Request should succeed after a transparent refresh.");

	assert_eq!(response.status, 200);
	assert_eq!(
		backend.authorizations_for("/api/tickets/"),
		vec![Some("Bearer access-old".into()), Some("Bearer access-new".into())]
	);
	assert_eq!(backend.authorizations_for("/api/token/refresh/"), vec![None]);
	assert_eq!(backend.refresh_calls(), 1);

	let refresh_body = backend
		.seen
		.lock()
		.iter()
		.find(|(path, _)| path == "/api/token/refresh/")
		.and_then(|(_, request)| request.body.clone())
		.expect("Refresh call should carry a JSON body.");

	assert_eq!(refresh_body, serde_json::json!({ "refresh": "refresh-1" }));
	assert_eq!(
		store.get(ACCESS_KEY).await.expect("Read should succeed."),
		Some("access-new".into())
	);
	assert_eq!(
		store.get(REFRESH_KEY).await.expect("Read should succeed."),
		Some("refresh-1".into())
	);
	assert_eq!(gateway.metrics().retries(), 1);
	assert_eq!(gateway.refresh_phase(), RefreshPhase::Idle);
}

#[tokio::test]
async fn rejection_after_retry_is_final() {
	let backend = Arc::new(FakeBackend::new("access-new", "access-new"));
	let (gateway, store) = fake_gateway(backend.clone());

	backend.always_reject.store(true, Ordering::SeqCst);
	store
		.save_pair(CredentialPair::new("access-old", "refresh-1"))
		.await
		.expect("Seeding should succeed.");

	let err = gateway
		.send(ApiRequest::get("tickets/"))
		.await
		.expect_err("A second 401 should surface to the caller.");

	assert!(matches!(err, Error::AuthExpiredRetried { ref response } if response.status == 401));
	assert_eq!(backend.refresh_calls(), 1);
	assert_eq!(backend.rejections(), 2);
	// Only the refresh failure path clears credentials.
	assert!(gateway.is_authenticated().await.expect("Read should succeed."));
}

#[tokio::test]
async fn non_auth_errors_pass_through_unchanged() {
	let backend = Arc::new(FakeBackend::new("access-1", "unused"));
	let (gateway, store) = fake_gateway(backend.clone());

	store
		.save_pair(CredentialPair::new("access-1", "refresh-1"))
		.await
		.expect("Seeding should succeed.");

	let err = gateway
		.send(ApiRequest::post("org-admin/forbidden/").json(serde_json::json!({ "name": "x" })))
		.await
		.expect_err("403 should surface to the caller.");

	assert_eq!(err.status(), Some(403));
	assert!(matches!(err, Error::Status { .. }));
	assert_eq!(
		err.response().map(|response| response.text().expect("Body should be UTF-8.")),
		Some("{\"detail\":\"Not allowed.\"}".into())
	);
	assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn transport_errors_are_not_retried() {
	let backend = Arc::new(FakeBackend::new("access-1", "unused"));
	let (gateway, _store) = fake_gateway(backend.clone());
	let err = gateway
		.send(ApiRequest::get("boom/"))
		.await
		.expect_err("Transport failures should surface to the caller.");

	assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	assert_eq!(backend.authorizations_for("/api/boom/").len(), 1);
	assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn refresh_rejection_clears_tokens_and_signs_out() {
	let backend = Arc::new(FakeBackend::new("access-valid", "unused"));
	let (gateway, store) = fake_gateway(backend.clone());
	let mut sign_out = gateway.subscribe_sign_out();

	backend.refresh_status.store(401, Ordering::SeqCst);
	store
		.save_pair(CredentialPair::new("access-old", "refresh-dead"))
		.await
		.expect("Seeding should succeed.");

	let err = gateway
		.send(ApiRequest::get("me/"))
		.await
		.expect_err("Refresh failure should end the session.");

	// The caller sees its own 401, not the refresh endpoint's answer.
	let response = match err {
		Error::AuthExpired { response } => response,
		other => panic!("Expected AuthExpired, got {other:?}."),
	};

	assert_eq!(response.status, 401);
	assert_eq!(
		response.text().expect("Body should be UTF-8."),
		"{\"detail\":\"Given token not valid\"}"
	);
	assert!(store.is_empty());
	assert_eq!(backend.refresh_calls(), 1);

	let event = sign_out.try_recv().expect("A sign-out event should be broadcast.");

	assert_eq!(event.redirect_to, "/login");
	assert!(matches!(event.reason, SignOutReason::RefreshFailed(_)));
	assert_eq!(gateway.metrics().refresh_failures(), 1);
	assert_eq!(gateway.refresh_phase(), RefreshPhase::Idle);
}

#[tokio::test]
async fn missing_refresh_token_signs_out_without_network_call() {
	let backend = Arc::new(FakeBackend::new("access-valid", "unused"));
	let (gateway, store) = fake_gateway(backend.clone());
	let mut sign_out = gateway.subscribe_sign_out();

	store.set(ACCESS_KEY, "access-old".into()).await.expect("Seeding should succeed.");

	let err = gateway.send(ApiRequest::get("tickets/")).await.expect_err("Session should end.");

	assert!(matches!(err, Error::AuthExpired { .. }));
	assert_eq!(backend.refresh_calls(), 0);
	assert!(store.is_empty());
	assert!(sign_out.try_recv().is_ok());
}

#[tokio::test]
async fn resending_a_request_value_gets_a_fresh_retry_budget() {
	let backend = Arc::new(FakeBackend::new("access-2", "access-2"));
	let (gateway, store) = fake_gateway(backend.clone());
	let request = ApiRequest::get("tickets/");

	store
		.save_pair(CredentialPair::new("access-1", "refresh-1"))
		.await
		.expect("Seeding should succeed.");
	gateway.send(request.clone()).await.expect("First send should refresh and succeed.");

	// Server-side expiry of the renewed token.
	*backend.valid_access.lock() = "rotated-elsewhere".into();
	*backend.next_access.lock() = "access-3".into();

	gateway.send(request).await.expect("Second send should refresh and succeed again.");

	assert_eq!(backend.refresh_calls(), 2);
	assert_eq!(gateway.metrics().requests(), 2);
	assert_eq!(gateway.metrics().retries(), 2);
}

#[tokio::test]
async fn bearer_stays_on_the_api_origin() {
	let backend = Arc::new(FakeBackend::new("access-1", "unused"));
	let (gateway, store) = fake_gateway(backend.clone());

	store
		.save_pair(CredentialPair::new("access-1", "refresh-1"))
		.await
		.expect("Seeding should succeed.");
	gateway
		.send(ApiRequest::get("http://desk.test/api/tickets/"))
		.await
		.expect("Absolute URL on the API origin should be authorized.");
	gateway
		.send(ApiRequest::get("http://files.test/public/"))
		.await
		.expect("Foreign public URL should succeed without a bearer.");

	let err = gateway
		.send(ApiRequest::get("http://other.test/private/"))
		.await
		.expect_err("Foreign 401 should surface unchanged.");

	assert!(matches!(err, Error::Status { ref response } if response.status == 401));
	assert_eq!(backend.authorizations_for("/api/tickets/"), vec![Some("Bearer access-1".into())]);
	assert_eq!(backend.authorizations_for("/public/"), vec![None]);
	assert_eq!(backend.authorizations_for("/private/"), vec![None]);
	assert_eq!(backend.refresh_calls(), 0);
	assert_eq!(
		store.get(ACCESS_KEY).await.expect("Read should succeed."),
		Some("access-1".into())
	);
}
