//! Sending the configured action when a button is pressed.
//!
//! The capture loop only ever sees two seams here: [`Dispatch`], which
//! performs one action, and [`TaskSpawner`], which decides where that work
//! runs. Outcomes are logged and never reported back to the loop.

use crate::logging::LogSink;
use crate::settings::ButtonSettings;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::collections::BTreeMap;
use std::process::Command;
use std::sync::Arc;
use std::thread;

/// What to do when a button is pressed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec {
    pub url: String,
    /// Digest-auth identity. Empty counts as absent.
    pub username: Option<String>,
    pub method: String,
    pub header: BTreeMap<String, String>,
    /// Serialized as the JSON request body.
    pub data: Option<BTreeMap<String, String>>,
}

impl ActionSpec {
    /// A plain `POST` to `url` with no headers or payload.
    pub fn direct(url: &str) -> Self {
        ActionSpec {
            url: url.to_string(),
            username: None,
            method: "POST".to_string(),
            header: BTreeMap::new(),
            data: None,
        }
    }

    /// Picks how this action is sent: digest auth through curl when a
    /// username is set, otherwise a direct HTTP request.
    pub fn send_action(&self) -> SendAction {
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => SendAction::Digest(DigestAction {
                url: self.url.clone(),
                username: username.to_string(),
            }),
            _ => SendAction::Direct(DirectAction {
                url: self.url.clone(),
                method: self.method.clone(),
                header: self.header.clone(),
                data: self.data.clone(),
            }),
        }
    }
}

impl From<&ButtonSettings> for ActionSpec {
    fn from(button: &ButtonSettings) -> Self {
        ActionSpec {
            url: button.url.clone(),
            username: button.username.clone(),
            method: button.method.clone(),
            header: button.header.clone(),
            data: button.data.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendAction {
    Digest(DigestAction),
    Direct(DirectAction),
}

impl SendAction {
    pub fn send(&self, client: &Client, sink: &dyn LogSink) {
        match self {
            SendAction::Digest(action) => action.send(sink),
            SendAction::Direct(action) => action.send(client, sink),
        }
    }
}

/// Request authenticated with HTTP digest auth, done by shelling out to curl.
/// curl prompts for the password or reads it from `~/.netrc`.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestAction {
    pub url: String,
    pub username: String,
}

impl DigestAction {
    pub fn command(&self) -> Command {
        let mut cmd = Command::new("curl");
        cmd.arg("-u").arg(&self.username).arg("--digest").arg(&self.url);
        cmd
    }

    pub fn send(&self, sink: &dyn LogSink) {
        match self.command().output() {
            Ok(output) if output.status.success() => {
                sink.info(&format!("Curl Output: {}", String::from_utf8_lossy(&output.stdout)));
            }
            Ok(output) => {
                sink.error(&format!(
                    "Error Curling URL {} -> {}: {}",
                    self.url,
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                ));
            }
            Err(e) => sink.error(&format!("Error Curling URL {} -> {}", self.url, e)),
        }
    }
}

/// Unauthenticated request with a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectAction {
    pub url: String,
    pub method: String,
    pub header: BTreeMap<String, String>,
    pub data: Option<BTreeMap<String, String>>,
}

impl DirectAction {
    /// JSON body; `null` when no data is configured.
    pub fn body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.data)
    }

    pub fn send(&self, client: &Client, sink: &dyn LogSink) {
        let method = match Method::from_bytes(self.method.to_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(e) => {
                sink.error(&format!("Invalid method '{}' for {} -> {}", self.method, self.url, e));
                return;
            }
        };

        let body = match self.body() {
            Ok(body) => body,
            Err(e) => {
                sink.error(&format!("Unable to serialize data for {} -> {}", self.url, e));
                return;
            }
        };
        sink.info(&format!("Sending data: {}", String::from_utf8_lossy(&body)));

        let mut request = client.request(method, &self.url);
        if !self.header.is_empty() {
            sink.info("Adding headers:");
            for (key, value) in &self.header {
                sink.info(&format!("    {} -> {}", key, value));
                request = request.header(key.as_str(), value.as_str());
            }
        }
        let request = request.header(CONTENT_TYPE, "application/json").body(body);

        match request.send().and_then(|response| response.text()) {
            Ok(text) => sink.info(&format!("Result: {}", text)),
            Err(e) => sink.error(&format!("Error requesting URL {} -> {}", self.url, e)),
        }
    }
}

/// Performs one button action. Fire and forget.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, action: &ActionSpec);
}

/// Production dispatcher: real HTTP and real curl.
pub struct ActionDispatcher {
    client: Client,
    sink: Arc<dyn LogSink>,
}

impl ActionDispatcher {
    pub fn new(sink: Arc<dyn LogSink>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(ActionDispatcher { client, sink })
    }
}

impl Dispatch for ActionDispatcher {
    fn dispatch(&self, action: &ActionSpec) {
        action.send_action().send(&self.client, self.sink.as_ref());
    }
}

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs dispatch work somewhere other than the capture thread.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: Task);
}

/// One OS thread per task, detached. Nothing bounds how many run at once.
pub struct ThreadSpawner {
    sink: Arc<dyn LogSink>,
}

impl ThreadSpawner {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        ThreadSpawner { sink }
    }
}

impl TaskSpawner for ThreadSpawner {
    fn spawn(&self, task: Task) {
        if let Err(e) = thread::Builder::new().name("dispatch".to_string()).spawn(task) {
            self.sink.error(&format!("Unable to start dispatch task: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::RecordingSink;

    fn populated(username: Option<&str>) -> ActionSpec {
        ActionSpec {
            url: "http://example.test/trigger".to_string(),
            username: username.map(str::to_string),
            method: "PUT".to_string(),
            header: BTreeMap::from([("X-Token".to_string(), "abc".to_string())]),
            data: Some(BTreeMap::from([("state".to_string(), "on".to_string())])),
        }
    }

    #[test]
    fn test_username_selects_digest() {
        // ARRANGE
        let action = populated(Some("admin"));

        // ACT
        let selected = action.send_action();

        // ASSERT
        assert_eq!(
            selected,
            SendAction::Digest(DigestAction {
                url: "http://example.test/trigger".to_string(),
                username: "admin".to_string(),
            })
        );
    }

    #[test]
    fn test_no_username_selects_direct() {
        // ARRANGE
        let action = populated(None);

        // ACT
        let selected = action.send_action();

        // ASSERT
        match selected {
            SendAction::Direct(direct) => {
                assert_eq!(direct.method, "PUT");
                assert_eq!(direct.header.get("X-Token").map(String::as_str), Some("abc"));
            }
            other => panic!("expected direct action, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_username_selects_direct() {
        // ARRANGE
        let action = populated(Some(""));

        // ACT
        let selected = action.send_action();

        // ASSERT
        assert!(matches!(selected, SendAction::Direct(_)));
    }

    #[test]
    fn test_digest_command_line() {
        // ARRANGE
        let action = DigestAction {
            url: "http://camera.local/snap".to_string(),
            username: "admin".to_string(),
        };

        // ACT
        let cmd = action.command();

        // ASSERT
        let args: Vec<&std::ffi::OsStr> = cmd.get_args().collect();
        assert_eq!(cmd.get_program(), "curl");
        assert_eq!(args, vec!["-u", "admin", "--digest", "http://camera.local/snap"]);
    }

    #[test]
    fn test_direct_body_is_json() {
        // ARRANGE
        let with_data = DirectAction {
            url: "http://example.test".to_string(),
            method: "POST".to_string(),
            header: BTreeMap::new(),
            data: Some(BTreeMap::from([("a".to_string(), "1".to_string())])),
        };
        let without_data = DirectAction { data: None, ..with_data.clone() };

        // ACT
        let body = with_data.body().unwrap();
        let empty = without_data.body().unwrap();

        // ASSERT
        assert_eq!(body, br#"{"a":"1"}"#);
        assert_eq!(empty, b"null");
    }

    #[test]
    fn test_invalid_method_is_logged_without_request() {
        // ARRANGE
        let action = DirectAction {
            url: "http://example.test".to_string(),
            method: "NOT A VERB".to_string(),
            header: BTreeMap::new(),
            data: None,
        };
        let sink = RecordingSink::default();
        let client = Client::new();

        // ACT
        action.send(&client, &sink);

        // ASSERT
        assert!(sink.contains("Invalid method 'NOT A VERB'"));
        assert!(!sink.contains("Sending data"));
    }

    #[test]
    fn test_thread_spawner_runs_task() {
        // ARRANGE
        let spawner = ThreadSpawner::new(Arc::new(RecordingSink::default()));
        let (tx, rx) = crossbeam_channel::bounded(1);

        // ACT
        spawner.spawn(Box::new(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
        }));

        // ASSERT
        let name = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("dispatch"));
    }
}
