//! Minimal HTTP/1.1 fixture server for integration tests
//!
//! Serves canned responses by path (including query string), records every
//! request's path and headers, and closes the connection after each response.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use kbpp_scraper_lib::AppConfig;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    /// Header names lowercased
    pub headers: HashMap<String, String>,
}

#[derive(Default)]
pub struct FixtureServerBuilder {
    routes: HashMap<String, (u16, String)>,
}

impl FixtureServerBuilder {
    pub fn page(mut self, path: &str, html: impl Into<String>) -> Self {
        self.routes.insert(path.to_string(), (200, html.into()));
        self
    }

    pub fn status(mut self, path: &str, status: u16) -> Self {
        self.routes.insert(path.to_string(), (status, String::new()));
        self
    }

    pub async fn start(self) -> FixtureServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let routes = Arc::new(self.routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &log).await;
                });
            }
        });

        FixtureServer { base_url, requests }
    }
}

pub struct FixtureServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FixtureServer {
    pub fn builder() -> FixtureServerBuilder {
        FixtureServerBuilder::default()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    /// Default configuration pointed at this server, with delays off and
    /// output under `output_dir`
    pub fn config(&self, output_dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.site.base_url = self.base_url.clone();
        config.scrape.output = Some(output_dir.join("divinikey.json"));
        config.scrape.delay_min_ms = 0;
        config.scrape.delay_max_ms = 0;
        config.http.use_system_proxy = false;
        config.retry.base_delay_ms = 1;
        config.retry.jitter_range_ms = 0;
        config
    }
}

async fn serve(
    stream: TcpStream,
    routes: &HashMap<String, (u16, String)>,
    log: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }

    log.lock().unwrap().push(RecordedRequest { path: path.clone(), headers });

    let (status, body) = routes.get(&path).cloned().unwrap_or((404, "not found".to_string()));
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );

    let stream = reader.get_mut();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// Collection page in the store's theme markup; cards are (name, href, price)
pub fn listing_page(cards: &[(&str, &str, &str)], next_href: Option<&str>) -> String {
    let cards: String = cards
        .iter()
        .map(|(name, href, price)| {
            format!(
                r#"<product-card><a class="card-link" href="{href}">{name}</a><span class="price__current">{price}</span></product-card>"#
            )
        })
        .collect();
    let next = next_href
        .map(|href| format!(r#"<a class="pagination__arrow--next" href="{href}">Next</a>"#))
        .unwrap_or_default();

    format!("<html><body><main>{cards}</main><nav>{next}</nav></body></html>")
}

pub fn detail_page(features: &[&str]) -> String {
    let bullets: String = features.iter().map(|f| format!("<li>{f}</li>")).collect();
    format!(r#"<html><body><div class="product-description"><ul>{bullets}</ul></div></body></html>"#)
}
