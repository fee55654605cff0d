use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct EntryResponse {
    date: String,
    logged: bool,
    count: u32,
    notes: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    entry: EntryResponse,
    celebrate: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Badge {
    milestone: u32,
}

#[derive(Debug, Deserialize)]
struct WeeklyStats {
    average: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    goal: u32,
    weekly: WeeklyStats,
    badges: Vec<Badge>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    pull: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    date: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct CalendarMonth {
    label: String,
    leading_blanks: u32,
    days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    text: String,
    author: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
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

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("consumption_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/state")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_consumption_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env_remove("REMOTE_URL")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_save_and_read_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let saved: SaveResponse = client
        .put(format!("{}/api/entries/2020-03-02", server.base_url))
        .json(&serde_json::json!({ "count": 0, "notes": "  quiet night " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved.entry.date, "2020-03-02");
    assert_eq!(saved.entry.notes, "quiet night");
    assert_eq!(saved.celebrate, Some(1));

    let entry: EntryResponse = client
        .get(format!("{}/api/entries/2020-03-02", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(entry.logged);
    assert_eq!(entry.count, 0);
    assert_eq!(entry.status, "under");

    let missing: EntryResponse = client
        .get(format!("{}/api/entries/2020-03-03", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!missing.logged);
    assert_eq!(missing.status, "empty");
}

#[tokio::test]
async fn http_rejects_invalid_input_without_mutation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let negative = client
        .put(format!("{}/api/entries/2020-04-01", server.base_url))
        .json(&serde_json::json!({ "count": -2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    let bad_date = client
        .put(format!("{}/api/entries/2020-4-1", server.base_url))
        .json(&serde_json::json!({ "count": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_date.status(), StatusCode::BAD_REQUEST);

    let entry: EntryResponse = client
        .get(format!("{}/api/entries/2020-04-01", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!entry.logged);

    let before: SummaryResponse = client
        .get(format!("{}/api/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bad_goal = client
        .put(format!("{}/api/goal", server.base_url))
        .json(&serde_json::json!({ "goal": 1.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_goal.status(), StatusCode::BAD_REQUEST);

    let after: SummaryResponse = client
        .get(format!("{}/api/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before.goal, after.goal);
    assert_eq!(after.badges.len(), 5);
    assert_eq!(after.badges[2].milestone, 7);
    assert!(after.weekly.average.contains('.'));
}

#[tokio::test]
async fn http_delete_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .put(format!("{}/api/entries/2020-05-10", server.base_url))
        .json(&serde_json::json!({ "count": 3 }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    let first = client
        .delete(format!("{}/api/entries/2020-05-10", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    let second = client
        .delete(format!("{}/api/entries/2020-05-10", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_calendar_and_export() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .put(format!("{}/api/goal", server.base_url))
        .json(&serde_json::json!({ "goal": 2 }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();
    client
        .put(format!("{}/api/entries/2020-06-15", server.base_url))
        .json(&serde_json::json!({ "count": 4, "notes": "party, late" }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    let month: CalendarMonth = client
        .get(format!("{}/api/calendar/2020/6", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(month.label, "June 2020");
    assert_eq!(month.leading_blanks, 1);
    assert_eq!(month.days.len(), 30);
    assert_eq!(month.days[14].date, "2020-06-15");
    assert_eq!(month.days[14].status, "over");

    let bad_month = client
        .get(format!("{}/api/calendar/2020/13", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_month.status(), StatusCode::BAD_REQUEST);

    let far_year = client
        .get(format!("{}/api/calendar/300000000/1", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(far_year.status(), StatusCode::BAD_REQUEST);

    let still_up = client
        .get(format!("{}/api/calendar/2020/7", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(still_up.status().is_success());

    let export = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(export.status().is_success());
    let disposition = export
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("consumption_history_"));
    let body = export.text().await.unwrap();
    assert!(body.starts_with("Date,Drinks,Notes,Goal (At Time of Export)"));
    assert!(body.contains("2020-06-15,4,party; late,2"));
}

#[tokio::test]
async fn http_sign_in_pulls_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let first: AuthResponse = client
        .post(format!("{}/api/auth", server.base_url))
        .json(&serde_json::json!({ "user": { "uid": "http-user", "email": "a@example.com" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.pull.as_deref(), Some("seeded"));

    let repeat: AuthResponse = client
        .post(format!("{}/api/auth", server.base_url))
        .json(&serde_json::json!({ "user": { "uid": "http-user" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(repeat.pull, None);

    let signed_out: AuthResponse = client
        .post(format!("{}/api/auth", server.base_url))
        .json(&serde_json::json!({ "user": null }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(signed_out.pull, None);

    let empty_uid = client
        .post(format!("{}/api/auth", server.base_url))
        .json(&serde_json::json!({ "user": { "uid": " " } }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_uid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_quote() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let quote: Quote = Client::new()
        .get(format!("{}/api/quote", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!quote.text.is_empty());
    assert!(!quote.author.is_empty());
}
