//! Command router: maps `(session state, Command)` onto driver calls.
//!
//! The router is transport-agnostic. Bindings decode their wire format into
//! a [`Command`], call [`CommandRouter::dispatch`], and encode the returned
//! result into their own envelope. All protocol, session-state and driver
//! faults come back as `Err` values carrying a human-readable message;
//! nothing here panics on bad input.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::catalog::ToolName;
use crate::driver::{AppSession, AutomationDriver, Element, LaunchConfig};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::protocol::Command;

/// Bounded wait for an asynchronous `evaluate` result.
const EVALUATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Success payload of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Human-readable message.
    Message(String),
    /// Inline base64-encoded PNG.
    Image {
        /// Base64 payload.
        data: String,
    },
}

impl Reply {
    /// Create a message reply.
    pub fn message(text: impl Into<String>) -> Self {
        Reply::Message(text.into())
    }
}

/// How `screen_shot` reports its capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenshotFormat {
    /// Leave the PNG on disk and report its path.
    #[default]
    SavedPath,
    /// Base64-encode the PNG, delete the file, return the bytes inline.
    Inline,
}

/// The live session plus the project it was opened for.
struct ActiveSession {
    session: Box<dyn AppSession>,
    project_path: PathBuf,
}

/// Typed accessors over a command's argument map.
///
/// Missing required keys surface as `Error::MissingArgument` naming the
/// field; present-but-wrong-shaped values as `Error::InvalidArgument`.
struct Args<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    fn str(&self, name: &'static str) -> Result<&'a str> {
        match self.map.get(name) {
            None | Some(Value::Null) => Err(Error::MissingArgument(name)),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(Error::InvalidArgument {
                name,
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    fn str_or(&self, name: &'static str, default: &'a str) -> Result<&'a str> {
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(Error::InvalidArgument {
                name,
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    fn f64(&self, name: &'static str) -> Result<f64> {
        match self.map.get(name) {
            None | Some(Value::Null) => Err(Error::MissingArgument(name)),
            Some(value) => value.as_f64().ok_or_else(|| Error::InvalidArgument {
                name,
                reason: format!("expected a number, got {value}"),
            }),
        }
    }

    fn value(&self, name: &'static str) -> Result<&'a Value> {
        self.map.get(name).ok_or(Error::MissingArgument(name))
    }

    /// Optional parameter object; absent or null becomes an empty mapping
    /// so the driver never sees a null.
    fn params_or_empty(&self, name: &'static str) -> Value {
        match self.map.get(name) {
            None | Some(Value::Null) => json!({}),
            Some(value) => value.clone(),
        }
    }
}

/// Transport-agnostic dispatcher over the automation driver.
pub struct CommandRouter {
    driver: Arc<dyn AutomationDriver>,
    screenshots: ScreenshotFormat,
    state: RwLock<Option<ActiveSession>>,
}

impl CommandRouter {
    /// Router that reports screenshots by saved path (socket presentation).
    pub fn new(driver: Arc<dyn AutomationDriver>) -> Self {
        Self::with_screenshot_format(driver, ScreenshotFormat::SavedPath)
    }

    /// Router that returns screenshots as inline base64 payloads
    /// (HTTP and stdio presentation).
    pub fn with_inline_screenshots(driver: Arc<dyn AutomationDriver>) -> Self {
        Self::with_screenshot_format(driver, ScreenshotFormat::Inline)
    }

    /// Router with an explicit screenshot format.
    pub fn with_screenshot_format(
        driver: Arc<dyn AutomationDriver>,
        screenshots: ScreenshotFormat,
    ) -> Self {
        Self {
            driver,
            screenshots,
            state: RwLock::new(None),
        }
    }

    /// Whether a session is currently open.
    pub async fn has_session(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Execute one command and produce exactly one result.
    pub async fn dispatch(&self, command: &Command) -> Result<Reply> {
        let tool = ToolName::parse(&command.name)?;
        let args = Args::new(&command.arguments);
        tracing::debug!(tool = %tool, "dispatching command");

        match tool {
            ToolName::Open => self.open(&args).await,
            ToolName::Shutdown => self.shutdown().await,
            _ => {
                let guard = self.state.read().await;
                let active = guard.as_ref().ok_or(Error::NoSession)?;
                self.run(tool, &args, active).await
            }
        }
    }

    async fn open(&self, args: &Args<'_>) -> Result<Reply> {
        let path = args.str("path")?;
        let config = LaunchConfig::for_project(path)?;
        let project_path = config.project_path.clone();

        tracing::info!(project = %project_path.display(), "opening project");
        let session = self.driver.launch(config).await?;

        let mut guard = self.state.write().await;
        if guard.is_some() {
            tracing::warn!("replacing previously active session");
        }
        *guard = Some(ActiveSession {
            session,
            project_path,
        });
        Ok(Reply::message("Started"))
    }

    async fn shutdown(&self) -> Result<Reply> {
        let mut guard = self.state.write().await;
        let active = guard.take().ok_or(Error::NoSession)?;
        active.session.shutdown().await?;
        tracing::info!("session shut down");
        Ok(Reply::message("Shutdown"))
    }

    async fn run(&self, tool: ToolName, args: &Args<'_>, active: &ActiveSession) -> Result<Reply> {
        let session = active.session.as_ref();
        match tool {
            ToolName::Open | ToolName::Shutdown => unreachable!("handled in dispatch"),

            ToolName::GetSystemInfo => {
                let info = session.system_info().await?;
                Ok(Reply::message(serde_json::to_string_pretty(&info)?))
            }

            ToolName::ScreenShot => self.screen_shot(active).await,

            ToolName::GetAllPagesPath => {
                let pages = session.all_pages_path().await?;
                json_fence(&pages)
            }
            ToolName::GetAllPagesPathAndMethod => {
                let pages = session.all_pages_path().await?;
                let manifest = Manifest::load(&active.project_path)?;
                let listing: Vec<Value> = pages
                    .iter()
                    .map(|page| {
                        json!({
                            "path": format!("/{page}"),
                            "method": manifest.navigate_method(page).as_str(),
                        })
                    })
                    .collect();
                json_fence(&listing)
            }
            ToolName::GetNavigateMethodOfPage => {
                let path = args.str("path")?;
                let manifest = Manifest::load(&active.project_path)?;
                Ok(Reply::message(manifest.navigate_method(path).as_str()))
            }

            ToolName::GoHome => {
                session.go_home().await?;
                Ok(Reply::message("Go home"))
            }
            ToolName::NavigateTo => {
                session
                    .navigate_to(args.str("path")?, args.str_or("query", "")?)
                    .await?;
                Ok(Reply::message("Navigate to"))
            }
            ToolName::NavigateBack => {
                session.navigate_back().await?;
                Ok(Reply::message("Navigate back"))
            }
            ToolName::SwitchTab => {
                session.switch_tab(args.str("path")?).await?;
                Ok(Reply::message("Switch tab"))
            }
            ToolName::RedirectTo => {
                session
                    .redirect_to(args.str("path")?, args.str_or("query", "")?)
                    .await?;
                Ok(Reply::message("Redirect to"))
            }
            ToolName::Relaunch => {
                session
                    .relaunch(args.str("path")?, args.str_or("query", "")?)
                    .await?;
                Ok(Reply::message("Relaunch"))
            }

            ToolName::Evaluate => {
                let code = args.str("code")?;
                let params = args.params_or_empty("params");
                let message_id = session.evaluate(code, &params).await?;
                let result = session.async_response(&message_id, EVALUATE_TIMEOUT).await?;
                Ok(Reply::message(format!("Evaluate, Result: {result}")))
            }
            ToolName::CallMethod => {
                let method = args.str("method")?;
                let params = args.params_or_empty("params");
                let page = session.current_page().await?;
                let result = page.call_method(method, &params).await?;
                Ok(Reply::message(format!("Call method, Result: {result}")))
            }
            ToolName::PageScrollTo => {
                let top = args.f64("top")?;
                let duration = args.f64("duration")?;
                let page = session.current_page().await?;
                page.scroll_to(top, duration).await?;
                Ok(Reply::message(format!(
                    "Page scroll to, Top: {top}, Duration: {duration}"
                )))
            }
            ToolName::PageGetWxml => {
                let page = session.current_page().await?;
                let raw = page.wxml().await?;
                let (markup, style) = split_wxml(&raw);
                Ok(Reply::message(format!(
                    "```xml\n{markup}```\n\n```css\n{style}```"
                )))
            }
            ToolName::PageGetData => {
                let page = session.current_page().await?;
                json_fence(&page.data().await?)
            }
            ToolName::PageSetData => {
                let key = args.str("key")?;
                let value = args.value("value")?.clone();
                let page = session.current_page().await?;
                let merged = page.set_data(key, value).await?;
                json_fence(&merged)
            }

            ToolName::Tap => {
                self.element(session, args).await?.tap().await?;
                Ok(Reply::message("Tap"))
            }
            ToolName::LongPress => {
                self.element(session, args).await?.long_press().await?;
                Ok(Reply::message("Long press"))
            }
            ToolName::Move => {
                let top = args.f64("top")?;
                let left = args.f64("left")?;
                self.element(session, args).await?.move_to(left, top).await?;
                Ok(Reply::message(format!("Move to, Top: {top}, Left: {left}")))
            }
            ToolName::Input => {
                let text = args.str("text")?;
                self.element(session, args).await?.input(text).await?;
                Ok(Reply::message(format!("Input, Text: {text}")))
            }
            ToolName::Switch => {
                self.element(session, args).await?.switch().await?;
                Ok(Reply::message("Switch"))
            }
            ToolName::SlideTo => {
                let value = args.f64("value")?;
                self.element(session, args).await?.slide_to(value).await?;
                Ok(Reply::message(format!("Slide to, Value: {value}")))
            }
            ToolName::Pick => {
                let option = args.str("option")?;
                self.element(session, args).await?.pick(option).await?;
                Ok(Reply::message(format!("Pick, Option: {option}")))
            }
        }
    }

    async fn element(&self, session: &dyn AppSession, args: &Args<'_>) -> Result<Box<dyn Element>> {
        let selector = args.str("selector")?;
        let page = session.current_page().await?;
        page.element(selector).await
    }

    async fn screen_shot(&self, active: &ActiveSession) -> Result<Reply> {
        let page = active.session.current_page().await?;
        let output = active
            .project_path
            .join("screenshots")
            .join(format!("{}_screen_shot.png", page.page_id()));

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // A stale capture at the target path would make the driver refuse
        // or silently keep old pixels.
        if output.is_file() {
            std::fs::remove_file(&output)?;
        }

        active.session.screen_shot(&output).await?;

        match self.screenshots {
            ScreenshotFormat::SavedPath => Ok(Reply::message(format!(
                "Screenshot, Path: {}",
                output.display()
            ))),
            ScreenshotFormat::Inline => {
                let bytes = std::fs::read(&output)?;
                let data = BASE64.encode(bytes);
                std::fs::remove_file(&output)?;
                Ok(Reply::Image { data })
            }
        }
    }
}

/// Markup/style split of a raw wxml document: the driver appends the page's
/// style block after the last closing tag.
fn split_wxml(raw: &str) -> (String, String) {
    let Some(last_tag) = raw.rfind("</") else {
        return (raw.to_string(), String::new());
    };
    let (markup, rest) = raw.split_at(last_tag);
    let Some(end) = rest.find('>') else {
        return (raw.to_string(), String::new());
    };
    let mut markup = markup.to_string();
    markup.push_str(&rest[..=end]);
    (markup, rest[end + 1..].to_string())
}

fn json_fence<T: serde::Serialize>(value: &T) -> Result<Reply> {
    Ok(Reply::message(format!(
        "```json\n{}```",
        serde_json::to_string_pretty(value)?
    )))
}
