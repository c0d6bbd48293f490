use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const TEST_PASSPHRASE: &str = "open-sesame";

#[derive(Debug, Deserialize)]
struct Student {
    id: i64,
    name: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct Summary {
    present: u64,
    absent: u64,
    late: u64,
}

#[derive(Debug, Deserialize)]
struct RosterResponse {
    date: String,
    group: String,
    students: Vec<Student>,
    summary: Summary,
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
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

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
    path.push(format!(
        "attendance_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_attendance_app"))
        .env("PORT", port.to_string())
        .env("ATTENDANCE_DATA_PATH", data_path)
        .env("ATTENDANCE_PASSPHRASE", TEST_PASSPHRASE)
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

async fn log_in(client: &Client, base_url: &str) {
    let response = client
        .post(format!("{base_url}/api/login"))
        .json(&serde_json::json!({ "password": TEST_PASSPHRASE }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    log_in(&Client::new(), &server.base_url).await;
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_roster(client: &Client, base_url: &str, date: &str, group: &str) -> RosterResponse {
    client
        .get(format!("{base_url}/api/roster?date={date}&group={group}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn add_student(
    client: &Client,
    base_url: &str,
    name: &str,
    date: &str,
    group: &str,
) -> RosterResponse {
    client
        .post(format!("{base_url}/api/students"))
        .json(&serde_json::json!({ "name": name, "date": date, "group": group }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_login_gate_blocks_until_passphrase_matches() {
    let _guard = TEST_LOCK.lock().await;
    let server = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/roster", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("type=\"password\""));
    assert!(!page.contains("Export CSV"));

    let response = client
        .post(format!("{}/api/login", server.base_url))
        .json(&serde_json::json!({ "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let page = client
        .post(format!("{}/login", server.base_url))
        .form(&[("password", "still wrong")])
        .send()
        .await
        .unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("Wrong password"));

    let response = client
        .get(format!("{}/api/roster", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    log_in(&client, &server.base_url).await;

    let roster = fetch_roster(&client, &server.base_url, "2031-01-05", "7A").await;
    assert_eq!(roster.group, "7A");
    assert_eq!(roster.date, "2031-01-05");
    assert!(roster.students.is_empty());

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Export CSV"));
}

#[tokio::test]
async fn http_add_update_delete_flow() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let (date, group) = ("2031-02-03", "7A");

    let roster = add_student(&client, &server.base_url, "Anu", date, group).await;
    assert_eq!(roster.students.len(), 1);
    assert_eq!(roster.students[0].name, "Anu");
    assert_eq!(roster.students[0].status, "Present");
    assert_eq!(roster.summary.present, 1);

    let roster = add_student(&client, &server.base_url, "Bat", date, group).await;
    assert_eq!(roster.students.len(), 2);
    let anu = roster.students[0].id;
    let bat = roster.students[1].id;
    assert_ne!(anu, bat);

    let roster: RosterResponse = client
        .post(format!("{}/api/students/status", server.base_url))
        .json(&serde_json::json!({ "id": bat, "status": "Absent", "date": date, "group": group }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roster.summary.present, 1);
    assert_eq!(roster.summary.absent, 1);
    assert_eq!(roster.summary.late, 0);

    let roster: RosterResponse = client
        .post(format!("{}/api/students/delete", server.base_url))
        .json(&serde_json::json!({ "id": anu, "date": date, "group": group }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roster.students.len(), 1);
    assert_eq!(roster.students[0].name, "Bat");
    assert_eq!(roster.summary.present, 0);
    assert_eq!(roster.summary.absent, 1);
}

#[tokio::test]
async fn http_blank_names_are_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let (date, group) = ("2031-02-10", "6A");

    let roster = add_student(&client, &server.base_url, "   ", date, group).await;
    assert!(roster.students.is_empty());

    let roster = add_student(&client, &server.base_url, "  Bold  ", date, group).await;
    assert_eq!(roster.students.len(), 1);
    assert_eq!(roster.students[0].name, "Bold");
}

#[tokio::test]
async fn http_key_switch_preserves_rosters() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2031-03-01";

    add_student(&client, &server.base_url, "Anu", date, "7A").await;
    add_student(&client, &server.base_url, "Bat", date, "8A").await;

    let roster = fetch_roster(&client, &server.base_url, date, "7A").await;
    assert_eq!(roster.students.len(), 1);
    assert_eq!(roster.students[0].name, "Anu");

    let roster = fetch_roster(&client, &server.base_url, date, "8A").await;
    assert_eq!(roster.students.len(), 1);
    assert_eq!(roster.students[0].name, "Bat");

    let roster = fetch_roster(&client, &server.base_url, "2031-03-02", "7A").await;
    assert!(roster.students.is_empty());
}

#[tokio::test]
async fn http_export_csv_matches_roster() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let (date, group) = ("2031-04-01", "6B");

    add_student(&client, &server.base_url, "Anu", date, group).await;
    let roster = add_student(&client, &server.base_url, "Bat", date, group).await;
    let bat = roster.students[1].id;
    client
        .post(format!("{}/api/students/status", server.base_url))
        .json(&serde_json::json!({ "id": bat, "status": "Absent", "date": date, "group": group }))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!(
            "{}/export?date={date}&group={group}",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attendance-2031-04-01-6B.csv"));
    assert_eq!(
        response.text().await.unwrap(),
        "Name,Status\nAnu,Present\nBat,Absent"
    );

    let response = client
        .get(format!(
            "{}/export?date=2031-04-02&group={group}",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn http_clear_requires_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let (date, group) = ("2031-05-01", "8B");

    add_student(&client, &server.base_url, "Anu", date, group).await;
    add_student(&client, &server.base_url, "Bat", date, group).await;

    let response = client
        .post(format!("{}/api/roster/clear", server.base_url))
        .json(&serde_json::json!({ "confirm": false, "date": date, "group": group }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let roster = fetch_roster(&client, &server.base_url, date, group).await;
    assert_eq!(roster.students.len(), 2);

    let roster: RosterResponse = client
        .post(format!("{}/api/roster/clear", server.base_url))
        .json(&serde_json::json!({ "confirm": true, "date": date, "group": group }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(roster.students.is_empty());

    let roster = fetch_roster(&client, &server.base_url, date, group).await;
    assert!(roster.students.is_empty());
    assert_eq!(roster.summary.present + roster.summary.absent + roster.summary.late, 0);
}

#[tokio::test]
async fn http_rejects_invalid_inputs() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/api/roster?date=not-a-date&group=7A",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!(
            "{}/api/roster?date=2031-06-01&group=9Z",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/students/status", server.base_url))
        .json(&serde_json::json!({ "id": 1, "status": "Sleeping", "date": "2031-06-01", "group": "7A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
