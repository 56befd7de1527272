#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;

use race_map::config::HostingKind;
use race_map::scrape::HttpFetcher;
use race_map::{Config, ConnectorRegistry, JobManager, Pipeline};

/// A calendar site with three events, two of which carry a marker
#[derive(Clone)]
pub struct FakeCalendar {
    pub addr: SocketAddr,
    markers: Arc<AtomicBool>,
}

#[derive(Deserialize)]
struct ListingQuery {
    limitstart: Option<usize>,
}

impl FakeCalendar {
    pub async fn start() -> Self {
        let markers = Arc::new(AtomicBool::new(true));
        let app = Router::new()
            .route("/calendrier.html", get(listing))
            .route("/calendrier/:page", get(event_page))
            .with_state(markers.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake calendar");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake calendar");
        });

        FakeCalendar { addr, markers }
    }

    /// Stop embedding markers in event pages
    pub fn remove_markers(&self) {
        self.markers.store(false, Ordering::SeqCst);
    }

    pub fn start_url(&self) -> String {
        format!("http://{}/calendrier.html", self.addr)
    }
}

fn item(href: &str, date: &str) -> String {
    format!(
        r#"<li><h4 class="stories__headline"><a href="{}">event</a></h4><time datetime="{}">{}</time></li>"#,
        href, date, date
    )
}

async fn listing(Query(query): Query<ListingQuery>) -> Html<String> {
    let items = match query.limitstart.unwrap_or(0) {
        0 => vec![
            item("/calendrier/triathlon-de-nice.html", "2025-06-08"),
            item("/calendrier/duathlon-de-lyon.html", "2025-05-01"),
        ],
        10 => vec![
            item("/calendrier/triathlon-de-nice.html", "2025-06-08"),
            item("/calendrier/aquathlon-sans-carte.html", "2025-07-01"),
        ],
        _ => vec![],
    };
    Html(format!(
        r#"<html><body><ul id="adv-filter-gallery">{}</ul></body></html>"#,
        items.concat()
    ))
}

async fn event_page(
    State(markers): State<Arc<AtomicBool>>,
    UrlPath(page): UrlPath<String>,
) -> Result<Html<String>, StatusCode> {
    let position = match page.as_str() {
        "triathlon-de-nice.html" => Some((43.7101728, 7.2619532)),
        "duathlon-de-lyon.html" => Some((45.764043, 4.835659)),
        "aquathlon-sans-carte.html" => None,
        _ => return Err(StatusCode::NOT_FOUND),
    };
    let script = match position {
        Some((lat, lon)) if markers.load(Ordering::SeqCst) => {
            format!("var marker = L.marker([{}, {}]).addTo(map);", lat, lon)
        }
        _ => String::new(),
    };
    Ok(Html(format!("<html><body><script>{}</script></body></html>", script)))
}

/// Configuration crawling the fake calendar into `root/build`
pub fn config(calendar: &FakeCalendar, root: &Path) -> Config {
    Config {
        start_url: calendar.start_url(),
        page_limit: 30,
        page_step: 10,
        build_dir: root.join("build"),
        hosting: HostingKind::Fs,
        hosting_path: root.join("public"),
        http_timeout_secs: 5,
        ..Config::default()
    }
}

/// Pipeline over HTTP with the connectors selected by `config`
pub async fn pipeline(config: Config) -> Pipeline {
    let registry = ConnectorRegistry::from_config(&config)
        .await
        .expect("registry");
    let fetcher = HttpFetcher::new(Duration::from_secs(config.http_timeout_secs)).expect("fetcher");
    Pipeline::new(
        Arc::new(config),
        Arc::new(fetcher),
        Arc::new(registry),
        JobManager::new(),
    )
}

/// Sorted relative paths of the files under `dir`
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];
    while let Some(relative) = pending.pop() {
        for entry in std::fs::read_dir(dir.join(&relative)).expect("read dir") {
            let entry = entry.expect("dir entry");
            let path = relative.join(entry.file_name());
            if entry.file_type().expect("file type").is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Whether a `git` executable is available
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
