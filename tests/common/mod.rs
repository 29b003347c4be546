//! Minimal single-thread HTTP stub for exercising the bridge without a
//! running Logseq. Each spawned server answers a fixed script of responses
//! and records the raw requests it saw.

// not every test crate uses every helper
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct StubServer {
    pub url: String,
    requests: mpsc::Receiver<String>,
}

impl StubServer {
    /// Serve `responses` in order: one `(status, body)` per connection.
    pub fn spawn(responses: Vec<(u16, &'static str)>) -> Self {
        Self::spawn_with_delay(responses, Duration::ZERO)
    }

    /// Like `spawn`, but sleeps before answering each request. With a delay
    /// longer than the caller's timeout this simulates a hung server.
    pub fn spawn_with_delay(responses: Vec<(u16, &'static str)>, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        // detached: the thread ends with its response script, or with the
        // test process if a test never connects
        thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let request = read_request(&mut stream);
                tx.send(request).ok();
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                let reason = match status {
                    200 => "OK",
                    400 => "Bad Request",
                    401 => "Unauthorized",
                    500 => "Internal Server Error",
                    _ => "Unknown",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).ok();
            }
        });

        StubServer { url, requests: rx }
    }

    /// Next recorded raw request (headers + body), waiting briefly
    pub fn next_request(&self) -> String {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("stub server saw no request")
    }

    /// JSON body of the next recorded request
    pub fn next_request_body(&self) -> serde_json::Value {
        let raw = self.next_request();
        let (_, body) = raw
            .split_once("\r\n\r\n")
            .expect("request had no header/body separator");
        serde_json::from_str(body).expect("request body was not JSON")
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => break,
        }
    }
    let head_text = String::from_utf8_lossy(&head).to_string();

    let content_length = head_text
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        stream.read_exact(&mut body).ok();
    }

    format!("{}{}", head_text, String::from_utf8_lossy(&body))
}

/// An address nothing is listening on (bound, then released)
pub fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}
