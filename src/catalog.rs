//! Canonical tool catalog.
//!
//! One closed enumeration of operations and one ordered list of
//! definitions. Every binding advertises this catalog; the stdio MCP
//! binding presents names with the [`TOOL_PREFIX`] while the socket and
//! HTTP bindings use the bare names. The router accepts both spellings.

use serde_json::json;

use crate::error::{Error, Result};
use crate::protocol::ToolDefinition;

/// Fixed name prefix used by the stdio MCP binding.
pub const TOOL_PREFIX: &str = "miniapp_";

/// Closed enumeration of every invocable operation.
///
/// Each variant has exactly one dispatch arm in the router and exactly one
/// entry in [`tool_definitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ToolName {
    Open,
    GetSystemInfo,
    Shutdown,
    ScreenShot,
    GetAllPagesPath,
    GetAllPagesPathAndMethod,
    GetNavigateMethodOfPage,
    GoHome,
    NavigateTo,
    NavigateBack,
    SwitchTab,
    RedirectTo,
    Relaunch,
    Evaluate,
    CallMethod,
    PageScrollTo,
    PageGetWxml,
    PageGetData,
    PageSetData,
    Tap,
    LongPress,
    Move,
    Input,
    Switch,
    SlideTo,
    Pick,
}

impl ToolName {
    /// Every operation, in catalog order.
    pub const ALL: [ToolName; 26] = [
        ToolName::Open,
        ToolName::GetSystemInfo,
        ToolName::Shutdown,
        ToolName::ScreenShot,
        ToolName::GetAllPagesPath,
        ToolName::GetAllPagesPathAndMethod,
        ToolName::GetNavigateMethodOfPage,
        ToolName::GoHome,
        ToolName::NavigateTo,
        ToolName::NavigateBack,
        ToolName::SwitchTab,
        ToolName::RedirectTo,
        ToolName::Relaunch,
        ToolName::Evaluate,
        ToolName::CallMethod,
        ToolName::PageScrollTo,
        ToolName::PageGetWxml,
        ToolName::PageGetData,
        ToolName::PageSetData,
        ToolName::Tap,
        ToolName::LongPress,
        ToolName::Move,
        ToolName::Input,
        ToolName::Switch,
        ToolName::SlideTo,
        ToolName::Pick,
    ];

    /// Wire spelling without the transport prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::Open => "open",
            ToolName::GetSystemInfo => "get_system_info",
            ToolName::Shutdown => "shutdown",
            ToolName::ScreenShot => "screen_shot",
            ToolName::GetAllPagesPath => "get_all_pages_path",
            ToolName::GetAllPagesPathAndMethod => "get_all_pages_path_and_method",
            ToolName::GetNavigateMethodOfPage => "get_navigate_method_of_page",
            ToolName::GoHome => "go_home",
            ToolName::NavigateTo => "navigate_to",
            ToolName::NavigateBack => "navigate_back",
            ToolName::SwitchTab => "switch_tab",
            ToolName::RedirectTo => "redirect_to",
            ToolName::Relaunch => "relaunch",
            ToolName::Evaluate => "evaluate",
            ToolName::CallMethod => "call_method",
            ToolName::PageScrollTo => "page_scroll_to",
            ToolName::PageGetWxml => "page_get_wxml",
            ToolName::PageGetData => "page_get_data",
            ToolName::PageSetData => "page_set_data",
            ToolName::Tap => "tap",
            ToolName::LongPress => "long_press",
            ToolName::Move => "move",
            ToolName::Input => "input",
            ToolName::Switch => "switch",
            ToolName::SlideTo => "slide_to",
            ToolName::Pick => "pick",
        }
    }

    /// Resolve a wire name, stripping the transport prefix if present.
    ///
    /// Matching is case-sensitive and exact; anything else is
    /// `Error::UnknownTool` carrying the name as received.
    pub fn parse(name: &str) -> Result<Self> {
        let bare = name.strip_prefix(TOOL_PREFIX).unwrap_or(name);
        ToolName::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == bare)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn selector_property() -> serde_json::Value {
    json!({"type": "string", "description": "CSS selector or XPath expression"})
}

fn definition(tool: ToolName) -> ToolDefinition {
    let (description, input_schema) = match tool {
        ToolName::Open => (
            "Open a miniprogram project in the developer tool",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Project path"},
                },
                "required": ["path"],
            }),
        ),
        ToolName::GetSystemInfo => (
            "Get system info",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::Shutdown => (
            "Shutdown the developer tool",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::ScreenShot => (
            "Take a screenshot of the current page",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::GetAllPagesPath => (
            "Get paths of all pages",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::GetAllPagesPathAndMethod => (
            "Get paths of all pages and navigate method of each page",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::GetNavigateMethodOfPage => (
            "Get navigate method of a page",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Page path"},
                },
                "required": ["path"],
            }),
        ),
        ToolName::GoHome => (
            "Go to the home page",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::NavigateTo => (
            "Navigate to a page. Please get path of all pages before using this tool.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Page path"},
                    "query": {"type": "string", "description": "Query parameters"},
                },
                "required": ["path"],
            }),
        ),
        ToolName::NavigateBack => (
            "Navigate back to the previous page",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::SwitchTab => (
            "Switch to a tab. Please get path of all pages before using this tool.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Page path"},
                },
                "required": ["path"],
            }),
        ),
        ToolName::RedirectTo => (
            "Redirect to a page",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Page path"},
                    "query": {"type": "string", "description": "Query parameters"},
                },
                "required": ["path"],
            }),
        ),
        ToolName::Relaunch => (
            "Close all pages and open a new one",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Page path"},
                    "query": {"type": "string", "description": "Query parameters"},
                },
                "required": ["path"],
            }),
        ),
        ToolName::Evaluate => (
            "Evaluate a JavaScript(es5) code in the miniprogram context",
            json!({
                "type": "object",
                "properties": {
                    "code": {"type": "string", "description": "Script code"},
                    "params": {"type": "object", "description": "Script parameters"},
                },
                "required": ["code"],
            }),
        ),
        ToolName::CallMethod => (
            "Call a method of page",
            json!({
                "type": "object",
                "properties": {
                    "method": {"type": "string", "description": "Method name"},
                    "params": {"type": "object", "description": "Method parameters"},
                },
                "required": ["method"],
            }),
        ),
        ToolName::PageScrollTo => (
            "Scroll to the specified position of a page",
            json!({
                "type": "object",
                "properties": {
                    "top": {"type": "number", "description": "Scroll to the top"},
                    "duration": {"type": "number", "description": "Scroll duration"},
                },
                "required": ["top", "duration"],
            }),
        ),
        ToolName::PageGetWxml => (
            "Get DOM structure of a page",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::PageGetData => (
            "Get data of a page",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolName::PageSetData => (
            "Set data of a page",
            json!({
                "type": "object",
                "properties": {
                    "key": {"type": "string", "description": "Key of data"},
                    "value": {"description": "Value of data"},
                },
                "required": ["key", "value"],
            }),
        ),
        ToolName::Tap => (
            "Tap an element",
            json!({
                "type": "object",
                "properties": {"selector": selector_property()},
                "required": ["selector"],
            }),
        ),
        ToolName::LongPress => (
            "Long press an element",
            json!({
                "type": "object",
                "properties": {"selector": selector_property()},
                "required": ["selector"],
            }),
        ),
        ToolName::Move => (
            "Perform a touch-move gesture on an element",
            json!({
                "type": "object",
                "properties": {
                    "selector": selector_property(),
                    "top": {"type": "number", "description": "Move to the top coordinate"},
                    "left": {"type": "number", "description": "Move to the left coordinate"},
                },
                "required": ["selector", "top", "left"],
            }),
        ),
        ToolName::Input => (
            "Input text to an element",
            json!({
                "type": "object",
                "properties": {
                    "selector": selector_property(),
                    "text": {"type": "string", "description": "Text to input"},
                },
                "required": ["selector", "text"],
            }),
        ),
        ToolName::Switch => (
            "Change the switch status of an element",
            json!({
                "type": "object",
                "properties": {"selector": selector_property()},
                "required": ["selector"],
            }),
        ),
        ToolName::SlideTo => (
            "Slide to the specified position of an element",
            json!({
                "type": "object",
                "properties": {
                    "selector": selector_property(),
                    "value": {"type": "number", "description": "Slide value"},
                },
                "required": ["selector", "value"],
            }),
        ),
        ToolName::Pick => (
            "Pick an option of an element",
            json!({
                "type": "object",
                "properties": {
                    "selector": selector_property(),
                    "option": {"type": "string", "description": "Option value"},
                },
                "required": ["selector", "option"],
            }),
        ),
    };

    ToolDefinition {
        name: tool.as_str().into(),
        description: description.into(),
        input_schema,
    }
}

/// The ordered catalog with bare names (socket and HTTP presentation).
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::ALL.iter().map(|tool| definition(*tool)).collect()
}

/// The ordered catalog with prefixed names (stdio MCP presentation).
pub fn prefixed_tool_definitions() -> Vec<ToolDefinition> {
    tool_definitions()
        .into_iter()
        .map(|mut def| {
            def.name = format!("{TOOL_PREFIX}{}", def.name);
            def
        })
        .collect()
}
