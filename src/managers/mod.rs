// Dashboard state managers
// Managers own the entity store tables (bookmarks, groups, widgets) and the client layout state.

pub mod bookmark_manager;
pub mod group_manager;
pub mod layout_state;
pub mod widget_manager;
