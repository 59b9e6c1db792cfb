//! Unit tests for the entity store managers (bookmarks, groups, widgets).
//!
//! These tests exercise CRUD operations through the manager traits, using an
//! in-memory SQLite database.

use onedashboard::database::Database;
use onedashboard::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use onedashboard::managers::group_manager::{GroupManager, GroupManagerTrait};
use onedashboard::managers::widget_manager::{WidgetManager, WidgetManagerTrait};
use onedashboard::types::bookmark::{BookmarkPatch, NewBookmark};
use onedashboard::types::errors::{BookmarkError, GroupError, WidgetError};
use onedashboard::types::group::{GroupLayoutPatch, NewGroup};
use onedashboard::types::layout::GridRect;
use onedashboard::types::widget::NewWidget;
use serde_json::json;

/// Helper: fresh in-memory database.
fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

fn group(db: &Database, name: &str) -> String {
    GroupManager::new(db.connection())
        .create_group(
            &NewGroup { name: name.to_string(), icon: None },
            GridRect::group_default(),
        )
        .unwrap()
        .id
}

/// A created bookmark is readable with the rect it was created at.
#[test]
fn test_create_and_get_bookmark() {
    let db = setup();
    let mut mgr = BookmarkManager::new(db.connection());

    let mut input = NewBookmark::new("Plex", "https://plex.local");
    input.icon = Some("dh-plex".to_string());
    input.container = Some("plex".to_string());
    let created = mgr.create_bookmark(&input, GridRect::new(2, 3, 4, 2)).unwrap();

    let fetched = mgr.get_bookmark(&created.id).unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.rect(), GridRect { x: 2, y: 3, w: 4, h: 2 });
    assert_eq!(fetched.group_id, None);
    assert!(!fetched.icon_only);
}

/// Unknown ids read as `None`, not as an error.
#[test]
fn test_get_missing_bookmark_is_none() {
    let db = setup();
    let mgr = BookmarkManager::new(db.connection());
    assert!(mgr.get_bookmark("nope").unwrap().is_none());
}

/// The natural key lookup matches on both name and url.
#[test]
fn test_find_by_natural_key() {
    let db = setup();
    let mut mgr = BookmarkManager::new(db.connection());
    let a = mgr
        .create_bookmark(&NewBookmark::new("Sonarr", "https://sonarr.local"), GridRect::bookmark_default())
        .unwrap();

    assert_eq!(
        mgr.find_by_natural_key("Sonarr", "https://sonarr.local").unwrap().map(|b| b.id),
        Some(a.id)
    );
    assert!(mgr.find_by_natural_key("Sonarr", "https://other.local").unwrap().is_none());
}

/// Patches only touch the fields they carry; `Some(None)` clears nullable fields.
#[test]
fn test_update_bookmark_partial_fields() {
    let db = setup();
    let mut mgr = BookmarkManager::new(db.connection());
    let mut input = NewBookmark::new("Radarr", "https://radarr.local");
    input.subtext = Some("movies".to_string());
    let b = mgr.create_bookmark(&input, GridRect::bookmark_default()).unwrap();

    let patch = BookmarkPatch {
        name: Some("Radarr 4K".to_string()),
        subtext: Some(None),
        icon_only: Some(true),
        ..BookmarkPatch::default()
    };
    let updated = mgr.update_bookmark(&b.id, &patch).unwrap();

    assert_eq!(updated.name, "Radarr 4K");
    assert_eq!(updated.url, "https://radarr.local");
    assert_eq!(updated.subtext, None);
    assert!(updated.icon_only);
    assert_eq!(updated.rect(), b.rect());
    assert_eq!(mgr.get_bookmark(&b.id).unwrap().unwrap(), updated);
}

/// Layout values below the floor are clamped on write.
#[test]
fn test_update_bookmark_clamps_layout() {
    let db = setup();
    let mut mgr = BookmarkManager::new(db.connection());
    let b = mgr
        .create_bookmark(&NewBookmark::new("A", "https://a.test"), GridRect::bookmark_default())
        .unwrap();

    let patch = BookmarkPatch { x: Some(-3), y: Some(-1), w: Some(0), h: Some(-7), ..BookmarkPatch::default() };
    let updated = mgr.update_bookmark(&b.id, &patch).unwrap();
    assert_eq!(updated.rect(), GridRect { x: 0, y: 0, w: 1, h: 1 });
}

#[test]
fn test_update_missing_bookmark_fails() {
    let db = setup();
    let mut mgr = BookmarkManager::new(db.connection());
    let err = mgr.update_bookmark("ghost", &BookmarkPatch::size(2, 2)).unwrap_err();
    assert_eq!(err, BookmarkError::NotFound("ghost".to_string()));
}

/// Assigning to a group that does not exist is rejected and nothing changes.
#[test]
fn test_update_to_missing_group_fails() {
    let db = setup();
    let mut mgr = BookmarkManager::new(db.connection());
    let b = mgr
        .create_bookmark(&NewBookmark::new("A", "https://a.test"), GridRect::bookmark_default())
        .unwrap();

    let err = mgr.update_bookmark(&b.id, &BookmarkPatch::group(Some("nope"))).unwrap_err();
    assert_eq!(err, BookmarkError::GroupNotFound("nope".to_string()));
    assert_eq!(mgr.get_bookmark(&b.id).unwrap().unwrap().group_id, None);
}

/// Root and group listings partition the bookmarks.
#[test]
fn test_list_bookmarks_by_container() {
    let db = setup();
    let gid = group(&db, "Media");
    let mut mgr = BookmarkManager::new(db.connection());

    let a = mgr
        .create_bookmark(&NewBookmark::new("A", "https://a.test"), GridRect::bookmark_default())
        .unwrap();
    let b = mgr
        .create_bookmark(&NewBookmark::new("B", "https://b.test"), GridRect::bookmark_default())
        .unwrap();
    mgr.update_bookmark(&b.id, &BookmarkPatch::group(Some(&gid))).unwrap();

    let root: Vec<String> = mgr.list_bookmarks(None).unwrap().into_iter().map(|b| b.id).collect();
    let in_group: Vec<String> = mgr.list_bookmarks(Some(&gid)).unwrap().into_iter().map(|b| b.id).collect();
    assert_eq!(root, vec![a.id]);
    assert_eq!(in_group, vec![b.id]);
    assert_eq!(mgr.list_all_bookmarks().unwrap().len(), 2);
}

/// Releasing a group detaches its bookmarks and moves them to the origin, keeping size.
#[test]
fn test_release_group() {
    let db = setup();
    let gid = group(&db, "Media");
    let mut mgr = BookmarkManager::new(db.connection());

    let b = mgr
        .create_bookmark(&NewBookmark::new("B", "https://b.test"), GridRect::new(0, 0, 3, 5))
        .unwrap();
    mgr.update_bookmark(
        &b.id,
        &BookmarkPatch { group_id: Some(Some(gid.clone())), x: Some(2), y: Some(4), ..BookmarkPatch::default() },
    )
    .unwrap();

    let released = mgr.release_group(&gid).unwrap();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].group_id, None);
    assert_eq!(released[0].rect(), GridRect { x: 0, y: 0, w: 3, h: 5 });

    let stored = mgr.get_bookmark(&b.id).unwrap().unwrap();
    assert_eq!(stored.group_id, None);
    assert_eq!(stored.rect(), released[0].rect());
}

#[test]
fn test_delete_bookmark_reports_existence() {
    let db = setup();
    let mut mgr = BookmarkManager::new(db.connection());
    let b = mgr
        .create_bookmark(&NewBookmark::new("A", "https://a.test"), GridRect::bookmark_default())
        .unwrap();
    assert!(mgr.delete_bookmark(&b.id).unwrap());
    assert!(!mgr.delete_bookmark(&b.id).unwrap());
}

// ─── Groups ───

#[test]
fn test_group_layout_update_and_list_order() {
    let db = setup();
    let first = group(&db, "First");
    let second = group(&db, "Second");
    let mut mgr = GroupManager::new(db.connection());

    let updated = mgr
        .update_layout(&first, &GroupLayoutPatch { x: Some(5), w: Some(0), ..GroupLayoutPatch::default() })
        .unwrap();
    assert_eq!(updated.rect(), GridRect { x: 5, y: 0, w: 1, h: 4 });

    let ids: Vec<String> = mgr.list_groups().unwrap().into_iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![first, second]);
}

#[test]
fn test_update_missing_group_layout_fails() {
    let db = setup();
    let mut mgr = GroupManager::new(db.connection());
    let err = mgr.update_layout("ghost", &GroupLayoutPatch::size(2, 2)).unwrap_err();
    assert_eq!(err, GroupError::NotFound("ghost".to_string()));
}

/// A group that still owns bookmarks cannot be removed until they are released.
#[test]
fn test_delete_group_with_members_is_blocked() {
    let db = setup();
    let gid = group(&db, "Media");
    let mut bookmarks = BookmarkManager::new(db.connection());
    let b = bookmarks
        .create_bookmark(&NewBookmark::new("A", "https://a.test"), GridRect::bookmark_default())
        .unwrap();
    bookmarks.update_bookmark(&b.id, &BookmarkPatch::group(Some(&gid))).unwrap();

    let mut groups = GroupManager::new(db.connection());
    assert!(groups.delete_group(&gid).is_err());

    bookmarks.release_group(&gid).unwrap();
    assert!(groups.delete_group(&gid).unwrap());
}

// ─── Widgets ───

#[test]
fn test_widget_add_list_and_type_check() {
    let db = setup();
    let mut bookmarks = BookmarkManager::new(db.connection());
    let b = bookmarks
        .create_bookmark(&NewBookmark::new("qB", "https://qb.local"), GridRect::bookmark_default())
        .unwrap();

    let mut widgets = WidgetManager::new(db.connection());
    let mut input = NewWidget::new("qbittorrent");
    input.config.insert("title".to_string(), json!("Downloads"));
    let w = widgets.add_widget(&b.id, &input).unwrap();

    let listed = widgets.list_widgets(&b.id).unwrap();
    assert_eq!(listed, vec![w]);
    assert_eq!(listed[0].config["title"], json!("Downloads"));
    assert!(widgets.has_widget_type(&b.id, "qbittorrent").unwrap());
    assert!(!widgets.has_widget_type(&b.id, "weather").unwrap());
}

#[test]
fn test_widget_on_missing_bookmark_fails() {
    let db = setup();
    let mut widgets = WidgetManager::new(db.connection());
    let err = widgets.add_widget("ghost", &NewWidget::new("qbittorrent")).unwrap_err();
    assert_eq!(err, WidgetError::BookmarkNotFound("ghost".to_string()));
}

/// Deleting a bookmark row cascades to its widgets.
#[test]
fn test_widgets_cascade_with_bookmark() {
    let db = setup();
    let mut bookmarks = BookmarkManager::new(db.connection());
    let b = bookmarks
        .create_bookmark(&NewBookmark::new("qB", "https://qb.local"), GridRect::bookmark_default())
        .unwrap();
    let mut widgets = WidgetManager::new(db.connection());
    widgets.add_widget(&b.id, &NewWidget::new("qbittorrent")).unwrap();

    bookmarks.delete_bookmark(&b.id).unwrap();
    let remaining: i32 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM widgets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}
