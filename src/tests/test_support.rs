use std::sync::{Arc, Mutex};

use tracing::subscriber::{DefaultGuard, set_default};
use tracing_subscriber::{Registry, fmt, layer::SubscriberExt};

use crate::{Config, StorefrontClient};

pub fn base_config(server_uri: &str) -> Config {
    Config::from_values(server_uri, None, Some(5))
}

pub async fn client_with_tokens(
    server_uri: &str,
    access: &str,
    refresh: &str,
) -> StorefrontClient {
    let client = StorefrontClient::new(base_config(server_uri)).expect("client");
    client
        .credentials()
        .set_tokens(access.to_string(), refresh.to_string())
        .await
        .expect("seed tokens");
    client
}

struct VecWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl std::io::Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.lines.lock().unwrap();
        guard.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn make_subscriber(lines: Arc<Mutex<Vec<String>>>) -> impl tracing::Subscriber + Send + Sync {
    let writer_lines = lines.clone();
    Registry::default().with(
        fmt::Layer::default()
            .with_writer(move || VecWriter {
                lines: writer_lines.clone(),
            })
            .with_target(false)
            .with_level(true)
            .with_ansi(false),
    )
}

pub fn capture_logs() -> (Arc<Mutex<Vec<String>>>, DefaultGuard) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let guard = set_default(make_subscriber(lines.clone()));
    (lines, guard)
}

pub fn drain_logs(lines: Arc<Mutex<Vec<String>>>) -> Vec<String> {
    Arc::try_unwrap(lines).unwrap().into_inner().unwrap()
}
