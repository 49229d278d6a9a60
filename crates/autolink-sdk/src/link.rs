use serde::{Deserialize, Serialize};

/// A pattern-to-template rewrite rule as stored by the autolink plugin.
///
/// Field names follow the plugin's JSON encoding. Missing fields decode to
/// their zero value and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct Autolink {
    pub name: String,
    pub disabled: bool,
    pub pattern: String,
    pub template: String,
    pub scope: Option<Vec<String>>,
    pub word_match: bool,
    pub disable_non_word_prefix: bool,
    pub disable_non_word_suffix: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub process_bot_posts: bool,
}

impl Autolink {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            template: template.into(),
            ..Self::default()
        }
    }

    /// Restricts the link to the given `team/channel` scopes.
    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }
}
