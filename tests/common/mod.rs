#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const TEST_SECRET: &str = "integration-secret-at-least-32-bytes!!";
pub const PASSWORD: &str = "Passw0rd";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // In-memory store: no database needed, fresh state per test binary
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tijdkaart-api"));
        cmd.args(["--in-memory", "--bind", "127.0.0.1", "--port", &port.to_string()])
            .env("APP_ENV", "development")
            .env("JWT_SECRET", TEST_SECRET)
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// A registered, logged-in account.
pub struct Session {
    pub email: String,
    pub user_id: String,
    pub token: String,
}

pub fn unique_email() -> String {
    format!("user-{}@example.com", uuid::Uuid::new_v4().simple())
}

pub async fn register(server: &TestServer, client: &reqwest::Client, email: &str) -> Result<reqwest::Response> {
    let res = client
        .post(server.url("/api/auth/register"))
        .json(&json!({"email": email, "password": PASSWORD, "confirmPassword": PASSWORD}))
        .send()
        .await?;
    Ok(res)
}

pub async fn login(server: &TestServer, client: &reqwest::Client, email: &str, password: &str) -> Result<reqwest::Response> {
    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await?;
    Ok(res)
}

pub async fn new_session(server: &TestServer, client: &reqwest::Client) -> Result<Session> {
    let email = unique_email();
    let res = register(server, client, &email).await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "register failed: {}", res.status());

    let res = login(server, client, &email, PASSWORD).await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;

    Ok(Session {
        email,
        user_id: body["userId"].as_str().context("userId missing")?.to_string(),
        token: body["token"].as_str().context("token missing")?.to_string(),
    })
}
