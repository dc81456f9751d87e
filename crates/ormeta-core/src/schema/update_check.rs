use serde::Deserialize;

/// Optimistic concurrency policy for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateCheck {
    /// Always compare the original value before updating
    #[default]
    Always,

    /// Never compare
    Never,

    /// Compare only when the member's value has changed
    WhenChanged,
}

impl UpdateCheck {
    pub fn is_never(self) -> bool {
        matches!(self, UpdateCheck::Never)
    }
}
