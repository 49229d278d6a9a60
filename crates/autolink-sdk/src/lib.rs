pub mod link;

pub use link::Autolink;

/// Plugin id the autolink plugin registers its HTTP routes under.
pub const AUTOLINK_PLUGIN_ID: &str = "mattermost-autolink";

/// Path of the link management endpoint, relative to the plugin root.
pub const LINK_API_PATH: &str = "/api/v1/link";

/// Query parameter carrying the link name on delete and get requests.
pub const AUTOLINK_NAME_QUERY_PARAM: &str = "autolinkName";
