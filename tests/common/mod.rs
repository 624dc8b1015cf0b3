//! Shared test double for the automation driver.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Map, Value};

use miniapp_mcp::driver::{AppSession, AutomationDriver, Element, LaunchConfig, Page};
use miniapp_mcp::error::{Error, Result};
use miniapp_mcp::router::{CommandRouter, ScreenshotFormat};
use miniapp_mcp::Command;

/// Stand-in PNG bytes written by the mock screenshot capture.
pub const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nstub";

/// Scripted state shared between the mock driver, session, page and
/// elements; tests inspect `calls` to assert which driver methods ran.
#[derive(Debug)]
pub struct MockState {
    pub calls: Mutex<Vec<String>>,
    pub page_data: Mutex<Map<String, Value>>,
    pub pages: Vec<String>,
    pub wxml: String,
    pub page_id: String,
}

impl Default for MockState {
    fn default() -> Self {
        let mut page_data = Map::new();
        page_data.insert("title".into(), json!("hello"));
        Self {
            calls: Mutex::new(Vec::new()),
            page_data: Mutex::new(page_data),
            pages: vec![
                "pages/home/home".into(),
                "pages/profile/profile".into(),
                "pages/settings/settings".into(),
            ],
            wxml: "<view><text>hi</text></view>.page { color: red; }".into(),
            page_id: "page-1".into(),
        }
    }
}

impl MockState {
    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

/// Driver double handing out sessions over the shared state.
#[derive(Default)]
pub struct MockDriver {
    pub state: Arc<MockState>,
    pub launched: Mutex<Vec<PathBuf>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: Arc<MockState>) -> Self {
        Self {
            state,
            launched: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl AutomationDriver for MockDriver {
    async fn launch(&self, config: LaunchConfig) -> Result<Box<dyn AppSession>> {
        self.launched.lock().unwrap().push(config.project_path.clone());
        Ok(Box::new(MockSession {
            state: self.state.clone(),
        }))
    }
}

struct MockSession {
    state: Arc<MockState>,
}

#[async_trait::async_trait]
impl AppSession for MockSession {
    async fn system_info(&self) -> Result<Value> {
        Ok(json!({"platform": "devtools", "SDKVersion": "3.0.0"}))
    }

    async fn shutdown(&self) -> Result<()> {
        self.state.record("shutdown");
        Ok(())
    }

    async fn go_home(&self) -> Result<()> {
        self.state.record("go_home");
        Ok(())
    }

    async fn navigate_to(&self, path: &str, query: &str) -> Result<()> {
        self.state.record(format!("navigate_to {path} [{query}]"));
        Ok(())
    }

    async fn navigate_back(&self) -> Result<()> {
        self.state.record("navigate_back");
        Ok(())
    }

    async fn switch_tab(&self, path: &str) -> Result<()> {
        self.state.record(format!("switch_tab {path}"));
        Ok(())
    }

    async fn redirect_to(&self, path: &str, query: &str) -> Result<()> {
        self.state.record(format!("redirect_to {path} [{query}]"));
        Ok(())
    }

    async fn relaunch(&self, path: &str, query: &str) -> Result<()> {
        self.state.record(format!("relaunch {path} [{query}]"));
        Ok(())
    }

    async fn all_pages_path(&self) -> Result<Vec<String>> {
        Ok(self.state.pages.clone())
    }

    async fn current_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(MockPage {
            state: self.state.clone(),
        }))
    }

    async fn screen_shot(&self, path: &Path) -> Result<()> {
        // A leftover capture at the target is a driver-side fault; the
        // router is expected to have removed it.
        if path.exists() {
            return Err(Error::Driver(format!(
                "screenshot target already exists: {}",
                path.display()
            )));
        }
        self.state.record(format!("screen_shot {}", path.display()));
        std::fs::write(path, PNG_STUB)?;
        Ok(())
    }

    async fn evaluate(&self, code: &str, params: &Value) -> Result<String> {
        self.state.record(format!("evaluate {code} {params}"));
        Ok("msg-1".into())
    }

    async fn async_response(&self, message_id: &str, _timeout: Duration) -> Result<Value> {
        if message_id == "msg-1" {
            Ok(json!({"result": 42}))
        } else {
            Err(Error::Driver(format!("no response for {message_id}")))
        }
    }
}

struct MockPage {
    state: Arc<MockState>,
}

#[async_trait::async_trait]
impl Page for MockPage {
    fn page_id(&self) -> String {
        self.state.page_id.clone()
    }

    async fn data(&self) -> Result<Map<String, Value>> {
        Ok(self.state.page_data.lock().unwrap().clone())
    }

    async fn set_data(&self, key: &str, value: Value) -> Result<Map<String, Value>> {
        let mut data = self.state.page_data.lock().unwrap();
        data.insert(key.to_string(), value);
        Ok(data.clone())
    }

    async fn wxml(&self) -> Result<String> {
        Ok(self.state.wxml.clone())
    }

    async fn scroll_to(&self, top: f64, duration: f64) -> Result<()> {
        self.state.record(format!("scroll_to {top} {duration}"));
        Ok(())
    }

    async fn call_method(&self, method: &str, params: &Value) -> Result<Value> {
        self.state.record(format!("call_method {method} {params}"));
        Ok(json!({"called": method}))
    }

    async fn element(&self, selector: &str) -> Result<Box<dyn Element>> {
        if selector == "#missing" {
            return Err(Error::Driver(format!("element not found: {selector}")));
        }
        Ok(Box::new(MockElement {
            selector: selector.to_string(),
            state: self.state.clone(),
        }))
    }
}

struct MockElement {
    selector: String,
    state: Arc<MockState>,
}

#[async_trait::async_trait]
impl Element for MockElement {
    async fn tap(&self) -> Result<()> {
        self.state.record(format!("tap {}", self.selector));
        Ok(())
    }

    async fn long_press(&self) -> Result<()> {
        self.state.record(format!("long_press {}", self.selector));
        Ok(())
    }

    async fn move_to(&self, left: f64, top: f64) -> Result<()> {
        self.state.record(format!("move {} {left} {top}", self.selector));
        Ok(())
    }

    async fn input(&self, text: &str) -> Result<()> {
        self.state.record(format!("input {} {text}", self.selector));
        Ok(())
    }

    async fn switch(&self) -> Result<()> {
        self.state.record(format!("switch {}", self.selector));
        Ok(())
    }

    async fn slide_to(&self, value: f64) -> Result<()> {
        self.state.record(format!("slide_to {} {value}", self.selector));
        Ok(())
    }

    async fn pick(&self, option: &str) -> Result<()> {
        self.state.record(format!("pick {} {option}", self.selector));
        Ok(())
    }
}

/// A throwaway project directory with a manifest declaring `pages/home/home`
/// and `pages/profile/profile` as tab pages.
pub fn project_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = json!({
        "pages": ["pages/home/home", "pages/profile/profile", "pages/settings/settings"],
        "tabBar": {
            "list": [
                {"pagePath": "pages/home/home", "text": "Home"},
                {"pagePath": "pages/profile/profile", "text": "Profile"},
            ],
        },
    });
    std::fs::write(
        dir.path().join("app.json"),
        serde_json::to_vec_pretty(&manifest).expect("manifest json"),
    )
    .expect("write app.json");
    dir
}

/// Router over a fresh mock driver, with an open session on `project`.
pub async fn open_router(project: &Path, format: ScreenshotFormat) -> (Arc<MockState>, CommandRouter) {
    std::env::set_var(miniapp_mcp::driver::DEV_TOOL_ENV, "/usr/bin/true");
    let state = Arc::new(MockState::default());
    let driver = Arc::new(MockDriver::with_state(state.clone()));
    let router = CommandRouter::with_screenshot_format(driver, format);
    let reply = router
        .dispatch(&command("open", json!({"path": project.to_str().unwrap()})))
        .await
        .expect("open");
    assert_eq!(reply, miniapp_mcp::Reply::Message("Started".into()));
    (state, router)
}

/// Build a command from a name and a JSON object of arguments.
pub fn command(name: &str, arguments: Value) -> Command {
    match arguments {
        Value::Object(map) => Command::with_arguments(name, map),
        Value::Null => Command::new(name),
        other => panic!("arguments must be an object, got {other}"),
    }
}
