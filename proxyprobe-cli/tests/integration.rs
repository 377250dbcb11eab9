use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use assert_cmd::Command;

const SUCCESS_REPLY: &str = r#"{"success":true,"statusCode":200,"responseTime":0.05}"#;

fn proxyprobe() -> Command {
    let mut cmd = Command::cargo_bin("proxyprobe").unwrap();
    cmd.env_remove("PROXYPROBE_ENDPOINT");
    cmd
}

/// Serves `body` with a 200 to every request on a background thread.
fn spawn_endpoint(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || answer(stream, body));
        }
    });
    format!("http://{addr}/test")
}

fn answer(mut stream: TcpStream, body: &str) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/test")
}

#[test]
fn run_reports_all_successes_as_json() {
    let endpoint = spawn_endpoint(SUCCESS_REPLY);

    let assert = proxyprobe()
        .args([
            "run",
            "--format",
            "json",
            "--target",
            "https://example.com",
            "--count",
            "6",
            "--concurrency",
            "2",
            "--endpoint",
            endpoint.as_str(),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let stats = &v["summary"]["stats"];
    assert_eq!(stats["total"], 6);
    assert_eq!(stats["success"], 6);
    assert_eq!(stats["code_histogram"]["200"], 6);
    assert_eq!(v["rows"].as_array().unwrap().len(), 6);
    assert_eq!(v["rows"][0]["id"], 1);
    assert_eq!(v["rows"][0]["response_time_display"], "0.05");
    assert!(v["summary"]["peak_in_flight"].as_u64().unwrap() <= 2);
}

#[test]
fn run_prints_rows_and_report_in_text_mode() {
    let endpoint = spawn_endpoint(SUCCESS_REPLY);

    let assert = proxyprobe()
        .env("PROXYPROBE_ENDPOINT", &endpoint)
        .args([
            "run",
            "--target",
            "https://example.com",
            "--count",
            "3",
            "--concurrency",
            "3",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert_eq!(stdout.lines().filter(|l| l.starts_with('#')).count(), 3);
    assert!(stdout.contains("Success:  3 (100.00%)"));
    assert!(stdout.contains("200: 3 (100.00%)"));
}

#[test]
fn run_with_unreachable_endpoint_exits_3() {
    let endpoint = refused_endpoint();

    let assert = proxyprobe()
        .args([
            "run",
            "--format",
            "json",
            "--retries",
            "0",
            "--target",
            "https://example.com",
            "--count",
            "3",
            "--concurrency",
            "2",
            "--endpoint",
            endpoint.as_str(),
        ])
        .assert()
        .code(3); // RUN_FAILED

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let stats = &v["summary"]["stats"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["failed"], 3);
    assert_eq!(stats["code_histogram"]["NETWORK_ERROR"], 3);
}

#[test]
fn run_rejects_bad_proxy_scheme() {
    proxyprobe()
        .args([
            "run",
            "--target",
            "https://example.com",
            "--proxy",
            "ftp://proxy.local",
            "--count",
            "1",
            "--concurrency",
            "1",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn run_requires_count() {
    proxyprobe()
        .args(["run", "--target", "https://example.com", "--concurrency", "1"])
        .assert()
        .code(2);
}
