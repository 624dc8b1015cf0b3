//! Capability interface to the external automation driver.
//!
//! The driver controls the miniprogram under test through the developer
//! tool; this crate only translates commands onto it. Everything here is a
//! trait so the adapter can be embedded with any driver implementation (a
//! devtools bridge in production, a scripted double in tests).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Fixed developer-tool CLI location on macOS.
const DEV_TOOL_PATH_MACOS: &str = "/Applications/wechatwebdevtools.app/Contents/MacOS/cli";

/// Fixed developer-tool CLI location on Windows.
const DEV_TOOL_PATH_WINDOWS: &str = "C:/Program Files (x86)/Tencent/微信web开发者工具/cli.bat";

/// Environment override for non-standard developer-tool installs.
pub const DEV_TOOL_ENV: &str = "MINIAPP_DEV_TOOL";

/// Resolve the developer-tool CLI path: the [`DEV_TOOL_ENV`] override if
/// set, otherwise the fixed install location of the host OS.
///
/// Only macOS and Windows installs exist; anywhere else is an error rather
/// than a guess.
pub fn dev_tool_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(DEV_TOOL_ENV) {
        return Ok(PathBuf::from(path));
    }
    if cfg!(target_os = "macos") {
        Ok(PathBuf::from(DEV_TOOL_PATH_MACOS))
    } else if cfg!(target_os = "windows") {
        Ok(PathBuf::from(DEV_TOOL_PATH_WINDOWS))
    } else {
        Err(Error::UnsupportedPlatform)
    }
}

/// Configuration handed to the driver when opening a project.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Miniprogram project directory.
    pub project_path: PathBuf,
    /// Developer-tool CLI executable.
    pub dev_tool_path: PathBuf,
    /// Driver log verbosity, e.g. "error".
    pub debug_mode: String,
}

impl LaunchConfig {
    /// Config for the given project with the host's developer tool and the
    /// default "error" debug mode.
    pub fn for_project(project_path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            project_path: project_path.into(),
            dev_tool_path: dev_tool_path()?,
            debug_mode: "error".into(),
        })
    }
}

/// Entry point of the driver: launches one automation session per project.
#[async_trait::async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Start the developer tool for the project and connect to it.
    async fn launch(&self, config: LaunchConfig) -> Result<Box<dyn AppSession>>;
}

/// One live automation session bound to an open project.
#[async_trait::async_trait]
pub trait AppSession: Send + Sync {
    /// System information of the device/simulator under test.
    async fn system_info(&self) -> Result<Value>;

    /// Shut the developer tool down.
    async fn shutdown(&self) -> Result<()>;

    /// Navigate to the home page.
    async fn go_home(&self) -> Result<()>;

    /// Navigate to a page, keeping the current page on the stack.
    async fn navigate_to(&self, path: &str, query: &str) -> Result<()>;

    /// Navigate back to the previous page.
    async fn navigate_back(&self) -> Result<()>;

    /// Switch to a tab-bar page.
    async fn switch_tab(&self, path: &str) -> Result<()>;

    /// Replace the current page with another one.
    async fn redirect_to(&self, path: &str, query: &str) -> Result<()>;

    /// Close all pages and open the given one.
    async fn relaunch(&self, path: &str, query: &str) -> Result<()>;

    /// Paths of all pages declared by the project.
    async fn all_pages_path(&self) -> Result<Vec<String>>;

    /// Handle to the page currently on top of the stack.
    async fn current_page(&self) -> Result<Box<dyn Page>>;

    /// Capture a screenshot of the current page to `path`.
    async fn screen_shot(&self, path: &Path) -> Result<()>;

    /// Inject a script; returns the message id to collect the result with.
    async fn evaluate(&self, code: &str, params: &Value) -> Result<String>;

    /// Wait up to `timeout` for the async result keyed by `message_id`.
    async fn async_response(&self, message_id: &str, timeout: Duration) -> Result<Value>;
}

/// One page of the miniprogram.
#[async_trait::async_trait]
pub trait Page: Send + Sync {
    /// Driver-assigned page identifier.
    fn page_id(&self) -> String;

    /// The page's data mapping.
    async fn data(&self) -> Result<Map<String, Value>>;

    /// Merge one key into the page's data mapping; returns the merged map.
    async fn set_data(&self, key: &str, value: Value) -> Result<Map<String, Value>>;

    /// Raw markup of the page, with the style block appended by the driver.
    async fn wxml(&self) -> Result<String>;

    /// Scroll the page to `top` over `duration` milliseconds.
    async fn scroll_to(&self, top: f64, duration: f64) -> Result<()>;

    /// Call a method defined on the page instance.
    async fn call_method(&self, method: &str, params: &Value) -> Result<Value>;

    /// Look an element up by selector.
    async fn element(&self, selector: &str) -> Result<Box<dyn Element>>;
}

/// One element located on a page.
#[async_trait::async_trait]
pub trait Element: Send + Sync {
    /// Tap the element.
    async fn tap(&self) -> Result<()>;

    /// Long-press the element.
    async fn long_press(&self) -> Result<()>;

    /// Touch-move gesture to the given coordinates.
    async fn move_to(&self, left: f64, top: f64) -> Result<()>;

    /// Type text into the element.
    async fn input(&self, text: &str) -> Result<()>;

    /// Toggle the element's switch state.
    async fn switch(&self) -> Result<()>;

    /// Slide the element to a value.
    async fn slide_to(&self, value: f64) -> Result<()>;

    /// Pick an option of the element.
    async fn pick(&self, option: &str) -> Result<()>;
}
