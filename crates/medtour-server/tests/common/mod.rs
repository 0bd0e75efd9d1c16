#![allow(dead_code)]

use medtour_server::{AppConfig, AppState, create_storage, router};
use tokio::task::JoinHandle;

pub struct TestServer {
    pub base: String,
    pub shutdown: tokio::sync::oneshot::Sender<()>,
    pub handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

/// Serves the app with the in-memory backend on an ephemeral port.
pub async fn start_server(cfg: AppConfig) -> TestServer {
    let storage = create_storage(&cfg).expect("storage");
    let app = router(AppState::new(cfg, storage));

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        base: format!("http://{addr}"),
        shutdown: tx,
        handle,
    }
}
