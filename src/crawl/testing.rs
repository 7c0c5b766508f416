//! Loopback HTTP stub used by the fetcher and crawler tests. Serves canned
//! responses from a route table; no network beyond 127.0.0.1 is touched.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use url::Url;

/// `(path, status line, content type, body)` per route. For 3xx routes the
/// body field is reused as the `Location` target.
type Route = (&'static str, &'static str, &'static str, &'static str);

pub struct StubServer {
    addr: SocketAddr,
}

impl StubServer {
    pub fn serve(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let table: HashMap<String, (String, String, String)> = routes
            .into_iter()
            .map(|(path, status, content_type, body)| {
                (
                    path.to_string(),
                    (status.to_string(), content_type.to_string(), body.to_string()),
                )
            })
            .collect();

        thread::spawn(move || {
            for stream in listener.incoming() {
                if let Ok(mut stream) = stream {
                    respond(&mut stream, &table);
                }
            }
        });

        StubServer { addr }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }
}

fn respond(stream: &mut TcpStream, table: &HashMap<String, (String, String, String)>) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    // GET requests have no body; read until the header terminator.
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let response = match table.get(path) {
        Some((status, _, target)) if status.starts_with('3') => format!(
            "HTTP/1.1 {status}\r\nLocation: {target}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        ),
        Some((status, content_type, body)) => format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ),
        None => {
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
        }
    };

    let _ = stream.write_all(response.as_bytes());
}
