#![allow(dead_code)]

pub mod mock_server {
    use std::io::Read;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread::JoinHandle;
    use std::time::Duration;
    use tiny_http::{Response, Server};

    /// What the mock saw for one request.
    #[derive(Debug, Clone)]
    pub struct Captured {
        pub method: String,
        pub path: String,
        pub content_type: Option<String>,
        pub body: serde_json::Value,
    }

    /// How the mock picks a status code.
    #[derive(Debug, Clone, Copy)]
    pub enum Reply {
        Fixed(u16),
        /// 200 for a UUID `userId` and positive `favNum`, 400 otherwise
        Validate,
    }

    impl Reply {
        fn status_for(self, body: &serde_json::Value) -> u16 {
            match self {
                Reply::Fixed(status) => status,
                Reply::Validate => {
                    let user_ok = body["userId"]
                        .as_str()
                        .is_some_and(|id| uuid::Uuid::parse_str(id).is_ok());
                    let fav_ok = body["favNum"].as_i64().is_some_and(|n| n > 0);
                    if user_ok && fav_ok {
                        200
                    } else {
                        400
                    }
                }
            }
        }
    }

    /// Favorite endpoint stand-in.
    pub struct MockFavoriteServer {
        server: Arc<Server>,
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
        captured: Arc<Mutex<Vec<Captured>>>,
        base_url: String,
    }

    impl MockFavoriteServer {
        pub fn start(status: u16) -> Self {
            Self::start_with_delay(status, Duration::ZERO)
        }

        pub fn start_with_delay(status: u16, delay: Duration) -> Self {
            Self::spawn(Reply::Fixed(status), delay)
        }

        /// Answer like the real handler: 400 for invalid payloads.
        pub fn start_validating() -> Self {
            Self::spawn(Reply::Validate, Duration::ZERO)
        }

        fn spawn(reply: Reply, delay: Duration) -> Self {
            let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
            let addr = server.server_addr().to_ip().unwrap();
            let stop = Arc::new(AtomicBool::new(false));
            let captured = Arc::new(Mutex::new(Vec::new()));

            let handle = {
                let server = Arc::clone(&server);
                let stop = Arc::clone(&stop);
                let captured = Arc::clone(&captured);
                std::thread::spawn(move || {
                    while !stop.load(Ordering::SeqCst) {
                        let mut request = match server.recv() {
                            Ok(request) => request,
                            Err(_) => break,
                        };
                        let mut body = String::new();
                        request.as_reader().read_to_string(&mut body).unwrap();
                        let content_type = request
                            .headers()
                            .iter()
                            .find(|h| h.field.equiv("Content-Type"))
                            .map(|h| h.value.as_str().to_string());
                        let body: serde_json::Value =
                            serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
                        let status = reply.status_for(&body);
                        captured.lock().unwrap().push(Captured {
                            method: request.method().as_str().to_string(),
                            path: request.url().to_string(),
                            content_type,
                            body,
                        });
                        if !delay.is_zero() {
                            std::thread::sleep(delay);
                        }
                        let response = Response::from_string(r#"{"message":"ok"}"#)
                            .with_status_code(status);
                        let _ = request.respond(response);
                    }
                })
            };

            Self {
                server,
                stop,
                handle: Some(handle),
                captured,
                base_url: format!("http://{addr}"),
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        pub fn captured(&self) -> Vec<Captured> {
            self.captured.lock().unwrap().clone()
        }
    }

    impl Drop for MockFavoriteServer {
        fn drop(&mut self) {
            self.stop.store(true, Ordering::SeqCst);
            self.server.unblock();
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }
}
