//! Project manifest (`app.json`) reading.
//!
//! The manifest's `tabBar.list` decides how a page must be reached: tab-bar
//! pages only respond to `switch_tab`, everything else to `navigate_to`.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// How a page has to be navigated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateMethod {
    /// Page is in the tab bar.
    SwitchTab,
    /// Regular page.
    NavigateTo,
}

impl NavigateMethod {
    /// The tool name that performs this navigation.
    pub fn as_str(self) -> &'static str {
        match self {
            NavigateMethod::SwitchTab => "switch_tab",
            NavigateMethod::NavigateTo => "navigate_to",
        }
    }
}

impl std::fmt::Display for NavigateMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct AppManifest {
    #[serde(rename = "tabBar", default)]
    tab_bar: Option<TabBar>,
}

#[derive(Debug, Deserialize)]
struct TabBar {
    #[serde(default)]
    list: Vec<TabBarEntry>,
}

#[derive(Debug, Deserialize)]
struct TabBarEntry {
    #[serde(rename = "pagePath")]
    page_path: String,
}

/// Tab-bar page list of one project, loaded from its manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    tab_pages: Vec<String>,
}

impl Manifest {
    /// Load the manifest from `<project>/app.json`.
    ///
    /// A project without a `tabBar` section has no tab pages.
    pub fn load(project_path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(project_path.join("app.json"))?;
        let manifest: AppManifest = serde_json::from_str(&raw)?;
        let tab_pages = manifest
            .tab_bar
            .map(|bar| bar.list.into_iter().map(|entry| entry.page_path).collect())
            .unwrap_or_default();
        Ok(Self { tab_pages })
    }

    /// Classify one page path.
    pub fn navigate_method(&self, path: &str) -> NavigateMethod {
        if self.tab_pages.iter().any(|page| page == path) {
            NavigateMethod::SwitchTab
        } else {
            NavigateMethod::NavigateTo
        }
    }
}
