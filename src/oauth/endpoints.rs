/// Graph API version every endpoint is pinned to.
pub const GRAPH_VERSION: &str = "v18.0";

/// Permissions requested in the authorization dialog.
pub const SCOPES: &[&str] = &[
    "pages_show_list",
    "pages_read_engagement",
    "instagram_basic",
    "instagram_manage_insights",
];

/// Base URLs of the Facebook dialog and Graph API hosts.
///
/// The defaults are the only production values; other bases exist so that
/// library callers can point the client at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEndpoints {
    dialog_base: String,
    graph_base: String,
}

impl Default for GraphEndpoints {
    fn default() -> Self {
        Self {
            dialog_base: format!("https://www.facebook.com/{GRAPH_VERSION}"),
            graph_base: format!("https://graph.facebook.com/{GRAPH_VERSION}"),
        }
    }
}

impl GraphEndpoints {
    /// Serve both the dialog and the Graph API from one base URL.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            dialog_base: base.clone(),
            graph_base: base,
        }
    }

    pub fn authorize(&self) -> String {
        format!("{}/dialog/oauth", self.dialog_base)
    }

    pub fn access_token(&self) -> String {
        format!("{}/oauth/access_token", self.graph_base)
    }

    pub fn my_pages(&self) -> String {
        format!("{}/me/accounts", self.graph_base)
    }

    /// Any Graph node or edge, e.g. `node("123/media")`.
    pub fn node(&self, path: &str) -> String {
        format!("{}/{}", self.graph_base, path.trim_start_matches('/'))
    }
}
