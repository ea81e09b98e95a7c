//! Serving boundary
//!
//! The registry never touches sockets. A request arrives as a [`Channel`]
//! and the registry answers through it: optional extra headers, then one
//! status line with headers, then the body.

use indexmap::IndexMap;

pub trait Channel {
    /// Request header value, looked up case-insensitively
    fn header(&self, name: &str) -> Option<&str>;

    /// Origin of the request, e.g. `http://localhost:9090`
    fn origin(&self) -> &str;

    /// Add a header to the response that has not been started yet
    fn push_header(&mut self, name: &str, value: &str);

    fn http_ok(&mut self, content_type: Option<&str>, headers: Vec<(String, String)>);

    fn http_error(&mut self, status: u16, reason: &str);

    fn send_data(&mut self, data: &[u8]);
}

/// In-memory [`Channel`] that records the response
#[derive(Debug, Clone, Default)]
pub struct ResponseBuffer {
    request_headers: IndexMap<String, String>,
    origin: String,
    pub status: Option<u16>,
    pub reason: String,
    pub headers: IndexMap<String, String>,
    pub body: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Default::default()
        }
    }

    /// Add a request header (builder style)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.request_headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Response header value, looked up case-insensitively
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_ok(&self) -> bool {
        self.status == Some(200)
    }
}

impl Channel for ResponseBuffer {
    fn header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn origin(&self) -> &str {
        &self.origin
    }

    fn push_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    fn http_ok(&mut self, content_type: Option<&str>, headers: Vec<(String, String)>) {
        self.status = Some(200);
        self.reason = "OK".to_string();
        if let Some(content_type) = content_type {
            self.headers
                .insert("Content-Type".to_string(), content_type.to_string());
        }
        self.headers.extend(headers);
    }

    fn http_error(&mut self, status: u16, reason: &str) {
        self.status = Some(status);
        self.reason = reason.to_string();
    }

    fn send_data(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }
}
