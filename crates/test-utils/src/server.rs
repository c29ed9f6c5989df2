//! Local HTTP server for exercising provider clients against canned responses.

use std::net::SocketAddr;

use axum::Router;

/// A running test server bound to an ephemeral localhost port.
pub struct TestServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Base URL with no trailing slash, e.g. `http://127.0.0.1:40123`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL for a path beginning with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `router` on `127.0.0.1:0` for the rest of the test.
///
/// Must be called from within a tokio runtime (e.g. `#[tokio::test]`).
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("test server address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    TestServer { addr, handle }
}
