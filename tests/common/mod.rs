//! Shared fixtures: a scripted in-process backend and reqwest gateway builders.

#![allow(dead_code)]

// std
use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
use tokio::sync::Semaphore;
// self
use helpdesk_gateway::{
	descriptor::ApiDescriptor,
	error::TransportError,
	gateway::Gateway,
	http::{AUTHORIZATION, ApiRequest, ApiResponse, ApiTransport, ReqwestTransport, TransportFuture},
	store::{ACCESS_KEY, CredentialStore, MemoryStore, StoreFuture},
	url::Url,
};

pub const BASE_URL: &str = "http://desk.test/api/";

/// Builds a descriptor that accepts plain-HTTP mock servers.
pub fn descriptor(base_url: &str) -> ApiDescriptor {
	let base = Url::parse(base_url).expect("Test base URL should parse.");

	ApiDescriptor::builder(base)
		.allow_insecure(true)
		.build()
		.expect("Test descriptor should build successfully.")
}

/// In-process backend that accepts exactly one access token at a time.
///
/// Protected paths answer 200 for `Bearer <valid_access>` and 401 otherwise. The refresh
/// endpoint rotates `valid_access` to `next_access` and can be held closed with a gate.
pub struct FakeBackend {
	pub valid_access: Mutex<String>,
	pub next_access: Mutex<String>,
	pub refresh_status: AtomicU16,
	pub always_reject: AtomicBool,
	pub refresh_calls: AtomicUsize,
	pub rejections: AtomicUsize,
	pub seen: Mutex<Vec<(String, ApiRequest)>>,
	/// When set, the first rejection writes this token to the store before answering.
	pub rotate_on_reject: Mutex<Option<(Arc<MemoryStore>, String)>>,
	refresh_gate: Semaphore,
}
impl FakeBackend {
	pub fn new(valid_access: &str, next_access: &str) -> Self {
		Self::with_gate(valid_access, next_access, Semaphore::MAX_PERMITS)
	}

	/// Same as [`FakeBackend::new`] but refresh responses wait for [`FakeBackend::open_refresh`].
	pub fn gated(valid_access: &str, next_access: &str) -> Self {
		Self::with_gate(valid_access, next_access, 0)
	}

	fn with_gate(valid_access: &str, next_access: &str, permits: usize) -> Self {
		Self {
			valid_access: Mutex::new(valid_access.into()),
			next_access: Mutex::new(next_access.into()),
			refresh_status: AtomicU16::new(200),
			always_reject: AtomicBool::new(false),
			refresh_calls: AtomicUsize::new(0),
			rejections: AtomicUsize::new(0),
			seen: Mutex::new(Vec::new()),
			rotate_on_reject: Mutex::new(None),
			refresh_gate: Semaphore::new(permits),
		}
	}

	pub fn open_refresh(&self) {
		self.refresh_gate.add_permits(1_000);
	}

	pub fn refresh_calls(&self) -> usize {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	pub fn rejections(&self) -> usize {
		self.rejections.load(Ordering::SeqCst)
	}

	/// Authorization headers observed for `path`, in arrival order.
	pub fn authorizations_for(&self, path: &str) -> Vec<Option<String>> {
		self.seen
			.lock()
			.iter()
			.filter(|(seen_path, _)| seen_path == path)
			.map(|(_, request)| request.header_value(AUTHORIZATION).map(str::to_owned))
			.collect()
	}

	async fn answer(
		&self,
		path: &str,
		request: &ApiRequest,
	) -> Result<ApiResponse, TransportError> {
		if path.ends_with("/token/refresh/") {
			self.refresh_calls.fetch_add(1, Ordering::SeqCst);
			self.refresh_gate.acquire().await.expect("Refresh gate should stay open.").forget();

			let status = self.refresh_status.load(Ordering::SeqCst);

			if status != 200 {
				return Ok(ApiResponse::new(
					status,
					b"{\"detail\":\"Token is invalid or expired\"}".to_vec(),
				));
			}

			let access = self.next_access.lock().clone();

			*self.valid_access.lock() = access.clone();

			return Ok(ApiResponse::new(200, format!("{{\"access\":\"{access}\"}}")));
		}
		if path.ends_with("/boom/") {
			return Err(TransportError::Io(io::Error::other("connection reset")));
		}
		if path.ends_with("/forbidden/") {
			return Ok(ApiResponse::new(403, b"{\"detail\":\"Not allowed.\"}".to_vec()));
		}
		if path.ends_with("/public/") {
			return Ok(ApiResponse::new(200, b"{\"public\":true}".to_vec()));
		}

		let expected = format!("Bearer {}", self.valid_access.lock());

		if !self.always_reject.load(Ordering::SeqCst)
			&& request.header_value(AUTHORIZATION) == Some(expected.as_str())
		{
			return Ok(ApiResponse::new(200, format!("{{\"path\":\"{path}\"}}")));
		}

		self.rejections.fetch_add(1, Ordering::SeqCst);

		let rotation = self.rotate_on_reject.lock().take();

		if let Some((store, token)) = rotation {
			store.set(ACCESS_KEY, token).await.expect("Rotating the stored token should succeed.");
		}

		Ok(ApiResponse::new(401, b"{\"detail\":\"Given token not valid\"}".to_vec()))
	}
}
impl ApiTransport for FakeBackend {
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let path = url.path().to_owned();

			self.seen.lock().push((path.clone(), request.clone()));
			self.answer(&path, &request).await
		})
	}
}

/// Gateway wired to a [`FakeBackend`] and a fresh in-memory store.
pub fn fake_gateway(backend: Arc<FakeBackend>) -> (Gateway<FakeBackend>, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());

	(fake_gateway_with_store(backend, store.clone()), store)
}

/// Gateway wired to a [`FakeBackend`] and the provided store.
pub fn fake_gateway_with_store(
	backend: Arc<FakeBackend>,
	store: Arc<dyn CredentialStore>,
) -> Gateway<FakeBackend> {
	Gateway::with_transport(store, descriptor(BASE_URL), backend)
}

/// Store whose reads return the value present when the read started, after a delay.
///
/// Mimics a remote store: a write that lands during a read is not observed by that read.
pub struct SlowStore {
	pub inner: Arc<MemoryStore>,
	latency: Duration,
}
impl SlowStore {
	pub fn new(inner: Arc<MemoryStore>, latency: Duration) -> Self {
		Self { inner, latency }
	}
}
impl CredentialStore for SlowStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move {
			let snapshot = self.inner.get(key).await;

			tokio::time::sleep(self.latency).await;

			snapshot
		})
	}

	fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
		self.inner.set(key, value)
	}

	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		self.inner.remove(key)
	}
}

/// Gateway wired to the reqwest transport and a fresh in-memory store.
pub fn reqwest_gateway(base_url: &str) -> (Gateway<ReqwestTransport>, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let gateway = Gateway::new(store, descriptor(base_url))
		.expect("Failed to build reqwest gateway for tests.");

	(gateway, store_backend)
}

/// Polls `condition` until it holds, failing the test after a few seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
	tokio::time::timeout(Duration::from_secs(5), async {
		while !condition() {
			tokio::time::sleep(Duration::from_millis(2)).await;
		}
	})
	.await
	.expect("Condition should hold before the timeout.");
}
