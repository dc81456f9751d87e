use serde::Deserialize;

/// When a database-assigned value is read back into the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoSync {
    /// Resolved by the builder from the member's roles. Never observed on a
    /// built member.
    #[default]
    Default,

    /// Read back after both insert and update
    Always,

    /// Never read back
    Never,

    /// Read back after insert only
    OnInsert,

    /// Read back after update only
    OnUpdate,
}

impl AutoSync {
    /// Resolves [`AutoSync::Default`] for a member with the given roles.
    ///
    /// A database generated primary key is read back on insert, any other
    /// generated or version member always, everything else never. Explicit
    /// policies are returned unchanged.
    pub fn resolve(self, primary_key: bool, db_generated: bool, version: bool) -> AutoSync {
        match self {
            AutoSync::Default if db_generated && primary_key => AutoSync::OnInsert,
            AutoSync::Default if db_generated || version => AutoSync::Always,
            AutoSync::Default => AutoSync::Never,
            explicit => explicit,
        }
    }

    pub fn on_insert(self) -> bool {
        matches!(self, AutoSync::Always | AutoSync::OnInsert)
    }

    pub fn on_update(self) -> bool {
        matches!(self, AutoSync::Always | AutoSync::OnUpdate)
    }
}
