// SPDX-License-Identifier: Apache-2.0

//! Minimal canned-response HTTP fixture for exercising the blocking
//! download path against a real socket, without a mock-server dependency.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

pub struct CannedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Serves `routes` (request path -> response) for exactly `max_requests`
/// connections, then exits. Unknown paths get a 404 with a short body.
pub fn spawn_fixture_server(
    routes: BTreeMap<String, CannedResponse>,
    max_requests: usize,
) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture addr");
    let handle = std::thread::spawn(move || {
        for _ in 0..max_requests {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let mut buf = Vec::new();
            let mut chunk = [0_u8; 1024];
            loop {
                let n = stream.read(&mut chunk).expect("read request");
                buf.extend_from_slice(&chunk[..n]);
                if n == 0 || buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8_lossy(&buf);
            let path = request
                .split_whitespace()
                .nth(1)
                .unwrap_or("/")
                .to_string();
            let (status, reason, body) = match routes.get(&path) {
                Some(r) => (r.status, reason_for(r.status), r.body.clone()),
                None => (404, "Not Found", b"no such fixture route".to_vec()),
            };
            let header = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(header.as_bytes()).expect("write header");
            stream.write_all(&body).expect("write body");
        }
    });
    (format!("http://{addr}"), handle)
}

fn reason_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Fixture",
    }
}

pub fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    use flate2::{write::GzEncoder, Compression};
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip encode");
    encoder.finish().expect("gzip finish")
}

pub fn zip_single_entry(entry_name: &str, data: &[u8]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file(entry_name, options).expect("zip entry");
    writer.write_all(data).expect("zip write");
    writer.finish().expect("zip finish").into_inner()
}
