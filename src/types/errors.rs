use std::fmt;

// === BookmarkError ===

/// Errors related to bookmark storage operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    NotFound(String),
    /// The target group was not found.
    GroupNotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::GroupNotFound(id) => write!(f, "Group not found: {}", id),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

// === GroupError ===

/// Errors related to group storage operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupError {
    /// Group with the given ID was not found.
    NotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::NotFound(id) => write!(f, "Group not found: {}", id),
            GroupError::DatabaseError(msg) => write!(f, "Group database error: {}", msg),
        }
    }
}

impl std::error::Error for GroupError {}

// === WidgetError ===

/// Errors related to widget storage operations.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// The owning bookmark was not found.
    BookmarkNotFound(String),
    /// Failed to encode or decode the widget config.
    SerializationError(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::BookmarkNotFound(id) => write!(f, "Bookmark not found: {}", id),
            WidgetError::SerializationError(msg) => {
                write!(f, "Widget config serialization error: {}", msg)
            }
            WidgetError::DatabaseError(msg) => write!(f, "Widget database error: {}", msg),
        }
    }
}

impl std::error::Error for WidgetError {}

// === MutationError ===

/// Errors surfaced by the mutation API to its callers (forms, drag handlers).
#[derive(Debug, Clone, PartialEq)]
pub enum MutationError {
    /// The referenced bookmark, group or widget does not exist.
    NotFound(String),
    /// A group reassignment named a group that does not exist.
    GroupNotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::NotFound(what) => write!(f, "not found: {}", what),
            MutationError::GroupNotFound(id) => write!(f, "group not found: {}", id),
            MutationError::DatabaseError(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for MutationError {}

impl From<BookmarkError> for MutationError {
    fn from(err: BookmarkError) -> Self {
        match err {
            BookmarkError::NotFound(id) => MutationError::NotFound(format!("bookmark {}", id)),
            BookmarkError::GroupNotFound(id) => MutationError::GroupNotFound(id),
            BookmarkError::DatabaseError(msg) => MutationError::DatabaseError(msg),
        }
    }
}

impl From<GroupError> for MutationError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::NotFound(id) => MutationError::NotFound(format!("group {}", id)),
            GroupError::DatabaseError(msg) => MutationError::DatabaseError(msg),
        }
    }
}

impl From<WidgetError> for MutationError {
    fn from(err: WidgetError) -> Self {
        match err {
            WidgetError::BookmarkNotFound(id) => {
                MutationError::NotFound(format!("bookmark {}", id))
            }
            WidgetError::SerializationError(msg) | WidgetError::DatabaseError(msg) => {
                MutationError::DatabaseError(msg)
            }
        }
    }
}

impl From<rusqlite::Error> for MutationError {
    fn from(err: rusqlite::Error) -> Self {
        MutationError::DatabaseError(err.to_string())
    }
}

// === LayoutError ===

/// Errors related to the optimistic client layout state.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// No tile with the given ID is held in local state.
    TileNotFound(String),
    /// The backing mutation call failed.
    Mutation(MutationError),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::TileNotFound(id) => write!(f, "Tile not found in layout: {}", id),
            LayoutError::Mutation(err) => write!(f, "Layout mutation failed: {}", err),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Mutation(err) => Some(err),
            LayoutError::TileNotFound(_) => None,
        }
    }
}

impl From<MutationError> for LayoutError {
    fn from(err: MutationError) -> Self {
        LayoutError::Mutation(err)
    }
}

// === SeedError ===

/// Errors raised while importing the seed file. Never surfaced past the importer.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedError {
    /// The seed file could not be read.
    Io(String),
    /// The seed file is not valid YAML for the expected shape.
    Parse(String),
    /// A seed entry failed validation.
    Validation(String),
    /// The store could not be reached.
    StoreNotReady(String),
    /// Database operation failed mid-import.
    DatabaseError(String),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Io(msg) => write!(f, "Seed file I/O error: {}", msg),
            SeedError::Parse(msg) => write!(f, "Seed file parse error: {}", msg),
            SeedError::Validation(msg) => write!(f, "Seed validation error: {}", msg),
            SeedError::StoreNotReady(msg) => write!(f, "Store not ready: {}", msg),
            SeedError::DatabaseError(msg) => write!(f, "Seed database error: {}", msg),
        }
    }
}

impl std::error::Error for SeedError {}

// === HealthError ===

/// Errors from the container runtime lookup. Always degraded to `unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthError {
    /// The container runtime could not be reached.
    Unreachable(String),
    /// The runtime has no container with the given name.
    ContainerNotFound(String),
    /// The runtime answered with something we could not interpret.
    Protocol(String),
}

impl fmt::Display for HealthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthError::Unreachable(msg) => write!(f, "Container runtime unreachable: {}", msg),
            HealthError::ContainerNotFound(name) => write!(f, "Container not found: {}", name),
            HealthError::Protocol(msg) => write!(f, "Container runtime protocol error: {}", msg),
        }
    }
}

impl std::error::Error for HealthError {}

// === SettingsError ===

/// Errors related to persisted dashboard settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The provided settings value is invalid.
    InvalidValue(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
            SettingsError::DatabaseError(msg) => {
                write!(f, "Settings database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === StoreError ===

/// Errors related to the store handle lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The handle has been closed (or never opened).
    Closed,
    /// Opening the database failed.
    OpenFailed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Closed => write!(f, "Store is closed"),
            StoreError::OpenFailed(msg) => write!(f, "Failed to open store: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// === ConfigError ===

/// Errors raised while resolving the process configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be used.
    InvalidValue { key: String, value: String },
    /// The container runtime endpoint uses an unsupported scheme.
    UnsupportedEndpoint(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
            ConfigError::UnsupportedEndpoint(endpoint) => {
                write!(f, "Unsupported container runtime endpoint: {}", endpoint)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
