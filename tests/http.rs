use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::time::sleep;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    status: String,
    error: Option<String>,
    total: usize,
    articles: Vec<Value>,
    authors: Vec<String>,
    sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PayoutRow {
    author: String,
    count: usize,
    rate: f64,
    total: f64,
}

#[derive(Debug, Deserialize)]
struct PayoutResponse {
    rows: Vec<PayoutRow>,
    total_payout: f64,
}

struct TestServer {
    base_url: String,
    child: Child,
    data_path: PathBuf,
    _dir: TempDir,
    _upstream: MockServer,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(unix)]
mod cleanup {
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Lazy<Mutex<Vec<i32>>> = Lazy::new(|| Mutex::new(Vec::new()));

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for &pid in pids.iter() {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn sample_articles() -> Value {
    json!({
        "status": "ok",
        "totalResults": 4,
        "articles": [
            {
                "source": { "id": null, "name": "X" },
                "author": "Ann",
                "title": "Markets rally",
                "description": "Stocks climb",
                "url": "https://example.com/1",
                "publishedAt": "2024-01-01T08:00:00Z",
                "content": "Full text"
            },
            {
                "source": { "id": null, "name": "Y" },
                "author": "Ann",
                "title": "Storm warning",
                "description": null,
                "url": "https://example.com/2",
                "publishedAt": "2024-01-02T09:00:00Z",
                "content": null
            },
            {
                "source": { "id": null, "name": "X" },
                "author": "Bob",
                "title": "Local election",
                "description": "Results are in",
                "url": null,
                "publishedAt": "2024-01-01T12:00:00Z",
                "content": null
            },
            {
                "source": null,
                "author": null,
                "title": "Wire brief",
                "publishedAt": null
            }
        ]
    })
}

async fn mount_upstream(status: u16, body: Value) -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&upstream)
        .await;
    upstream
}

async fn wait_until_loaded(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/articles")).send().await {
            if let Ok(body) = resp.json::<ArticlesResponse>().await {
                if body.status != "loading" {
                    return;
                }
            }
        }
        if Instant::now() > deadline {
            panic!("server did not finish loading articles");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(upstream: MockServer) -> TestServer {
    let port = pick_free_port();
    let dir = tempfile::tempdir().expect("temp dir");
    let data_path = dir.path().join("rates.json");
    let font_dir = dir.path().join("fonts");

    let child = Command::new(env!("CARGO_BIN_EXE_news_dashboard"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("APP_FONT_DIR", &font_dir)
        .env("NEWS_API_URL", format!("{}/v2/top-headlines?country=us", upstream.uri()))
        .env("NEWS_API_KEY", "test-key")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_loaded(&base_url).await;

    TestServer {
        base_url,
        child,
        data_path,
        _dir: dir,
        _upstream: upstream,
    }
}

/// Drops the DejaVu Serif faces into the server's font dir under the default
/// family name. False when the system fonts are missing.
fn install_fonts(server: &TestServer) -> bool {
    let system = PathBuf::from("/usr/share/fonts/truetype/dejavu");
    let font_dir = server.data_path.with_file_name("fonts");
    if std::fs::create_dir_all(&font_dir).is_err() {
        return false;
    }
    [
        ("DejaVuSerif.ttf", "Regular"),
        ("DejaVuSerif-Bold.ttf", "Bold"),
        ("DejaVuSerif-Italic.ttf", "Italic"),
        ("DejaVuSerif-BoldItalic.ttf", "BoldItalic"),
    ]
    .iter()
    .all(|(source, style)| {
        std::fs::copy(system.join(source), font_dir.join(format!("LiberationSans-{style}.ttf")))
            .is_ok()
    })
}

async fn articles(client: &Client, server: &TestServer, query: &str) -> ArticlesResponse {
    client
        .get(format!("{}/api/articles{query}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_articles_are_normalized_and_filtered() {
    let server = spawn_server(mount_upstream(200, sample_articles()).await).await;
    let client = Client::new();

    let all = articles(&client, &server, "").await;
    assert_eq!(all.status, "ready");
    assert_eq!(all.total, 4);
    assert_eq!(all.authors, ["Ann", "Bob", "Unknown"]);
    assert_eq!(all.sources, ["Unknown", "X", "Y"]);
    assert_eq!(all.articles[3]["author"], "Unknown");
    assert_eq!(all.articles[1]["description"], "");

    let ann = articles(&client, &server, "?author=ANN").await;
    assert_eq!(ann.total, 2);
    // dropdown values come from the unfiltered list
    assert_eq!(ann.authors.len(), 3);

    let dated = articles(&client, &server, "?dateFrom=2024-01-02&dateTo=2024-01-02").await;
    assert_eq!(dated.total, 1);
    assert_eq!(dated.articles[0]["title"], "Storm warning");

    let keyword = articles(&client, &server, "?type=x&keyword=RESULTS").await;
    assert_eq!(keyword.total, 1);
    assert_eq!(keyword.articles[0]["title"], "Local election");
}

#[tokio::test]
async fn http_upstream_failure_shows_error_state() {
    let server = spawn_server(mount_upstream(500, json!({ "status": "error", "message": "boom" })).await).await;
    let client = Client::new();

    let body = articles(&client, &server, "").await;
    assert_eq!(body.status, "error");
    assert_eq!(body.error.as_deref(), Some("Failed to fetch news. Please try again later."));
    assert_eq!(body.total, 0);
    assert!(body.articles.is_empty());

    let relay = client
        .get(format!("{}/api/news", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(relay.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let relay: Value = relay.json().await.unwrap();
    assert_eq!(relay, json!({ "error": "Failed to fetch news." }));
}

#[tokio::test]
async fn http_news_relay_passes_body_through() {
    let server = spawn_server(mount_upstream(200, sample_articles()).await).await;
    let client = Client::new();

    let relay = client
        .get(format!("{}/api/news", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(relay.status().is_success());
    let body: Value = relay.json().await.unwrap();
    assert_eq!(body["totalResults"], 4);
    assert_eq!(body["articles"][3]["author"], Value::Null);
}

#[tokio::test]
async fn http_charts_follow_filters() {
    let server = spawn_server(mount_upstream(200, sample_articles()).await).await;
    let client = Client::new();

    let bar: Value = client
        .get(format!("{}/api/charts?chart=bar&type=x", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bar["kind"], "bar");
    assert_eq!(bar["items"][0]["full_label"], "Ann");
    assert_eq!(bar["items"][0]["value"], 1);
    assert_eq!(bar["items"][1]["full_label"], "Bob");

    let main: Value = client
        .get(format!("{}/api/charts", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(main["kind"], "main");
    assert_eq!(main["timeline"]["dates"], json!(["2024-01-01", "2024-01-02", "Unknown"]));
    assert_eq!(main["timeline"]["series"][0]["values"], json!([2, 0, 0]));

    let unknown = client
        .get(format!("{}/api/charts?chart=radar", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_payout_rates_validate_and_persist() {
    let server = spawn_server(mount_upstream(200, sample_articles()).await).await;
    let client = Client::new();

    let accepted = client
        .put(format!("{}/api/payouts/rates", server.base_url))
        .json(&json!({ "author": "Ann", "rate": "10" }))
        .send()
        .await
        .unwrap();
    assert!(accepted.status().is_success());

    let stored = std::fs::read_to_string(&server.data_path).unwrap();
    let stored_rates: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored_rates, json!({ "Ann": 10.0 }));

    let rejected = client
        .put(format!("{}/api/payouts/rates", server.base_url))
        .json(&json!({ "author": "Bob", "rate": "abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    let error: Value = rejected.json().await.unwrap();
    assert!(error["error"].as_str().unwrap().contains("Bob"));
    assert_eq!(std::fs::read_to_string(&server.data_path).unwrap(), stored);

    let payouts: PayoutResponse = client
        .get(format!("{}/api/payouts?type=x", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(payouts.rows.len(), 2);
    assert_eq!(payouts.rows[0].author, "Ann");
    assert_eq!((payouts.rows[0].count, payouts.rows[0].rate, payouts.rows[0].total), (1, 10.0, 10.0));
    assert_eq!((payouts.rows[1].count, payouts.rows[1].rate, payouts.rows[1].total), (1, 0.0, 0.0));
    assert_eq!(payouts.total_payout, 10.0);

    let csv = client
        .get(format!("{}/export/payouts/csv", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(csv.status().is_success());
    assert_eq!(
        csv.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"payouts.csv\""
    );
    let text = csv.text().await.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "Author,Articles,Payout Rate,Total Payout",
            "Ann,2,10,20",
            "Bob,1,0,0",
            "Unknown,1,0,0",
            ",,Total,20",
        ]
    );
}

#[tokio::test]
async fn http_exports_report_missing_fonts_and_bad_formats() {
    let server = spawn_server(mount_upstream(200, sample_articles()).await).await;
    let client = Client::new();

    let csv = client
        .get(format!("{}/export/articles/csv?author=bob", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(csv.status().is_success());
    assert!(csv.headers()["content-type"].to_str().unwrap().starts_with("text/csv"));
    let text = csv.text().await.unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("Local election"));

    let pdf = client
        .get(format!("{}/export/articles/pdf", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(pdf.status(), StatusCode::SERVICE_UNAVAILABLE);

    let xlsx = client
        .get(format!("{}/export/articles/xlsx", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(xlsx.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_pdf_exports_download_with_fonts() {
    let server = spawn_server(mount_upstream(200, sample_articles()).await).await;
    if !install_fonts(&server) {
        eprintln!("skipping: DejaVu fonts not installed");
        return;
    }
    let client = Client::new();

    for (route, file) in [("articles", "report.pdf"), ("payouts", "payouts.pdf")] {
        let pdf = client
            .get(format!("{}/export/{route}/pdf", server.base_url))
            .send()
            .await
            .unwrap();
        assert!(pdf.status().is_success(), "{route}: {}", pdf.status());
        assert_eq!(pdf.headers()["content-type"].to_str().unwrap(), "application/pdf");
        assert_eq!(
            pdf.headers()["content-disposition"].to_str().unwrap(),
            format!("attachment; filename=\"{file}\"")
        );
        let bytes = pdf.bytes().await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    let empty = client
        .get(format!("{}/export/articles/pdf?author=nobody", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(empty.status().is_success());
    assert!(empty.bytes().await.unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn http_theme_system_resolves_from_request() {
    let server = spawn_server(mount_upstream(200, sample_articles()).await).await;
    let client = Client::new();

    let page = client.get(&server.base_url).send().await.unwrap().text().await.unwrap();
    assert!(page.contains(r#"class="light""#));

    let theme: Value = client
        .put(format!("{}/api/theme", server.base_url))
        .json(&json!({ "mode": "system", "prefers_dark": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(theme, json!({ "mode": "system", "applied": "dark" }));

    let page = client.get(&server.base_url).send().await.unwrap().text().await.unwrap();
    assert!(page.contains(r#"class="dark""#));

    let hinted: Value = client
        .put(format!("{}/api/theme", server.base_url))
        .header("Sec-CH-Prefers-Color-Scheme", "light")
        .json(&json!({ "mode": "system" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hinted["applied"], "light");
}
