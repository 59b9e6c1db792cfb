//! Property-based tests for the Seed Importer.
//!
//! Arbitrary seed files are serialized to YAML and imported into a fresh store.
//! A repeated import must be a no-op, and layout changes made after the first
//! import must survive any number of re-imports.

use onedashboard::database::Database;
use onedashboard::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use onedashboard::services::mutation_api::MutationApi;
use onedashboard::services::seed_importer::SeedImporter;
use onedashboard::types::bookmark::BookmarkPatch;
use onedashboard::types::layout::GridRect;
use onedashboard::types::seed::{ImportReport, SeedBookmark, SeedFile, SeedWidget};
use proptest::prelude::*;
use serde_json::Map;

fn arb_widget() -> impl Strategy<Value = SeedWidget> {
    prop_oneof![Just("qbittorrent"), Just("weather"), Just("clock")].prop_map(|t| SeedWidget {
        widget_type: t.to_string(),
        config: Map::new(),
    })
}

fn arb_entry() -> impl Strategy<Value = SeedBookmark> {
    (
        "[A-Z][a-z]{2,10}",
        "[a-z]{3,10}",
        proptest::option::of(prop_oneof![Just("dh-plex"), Just("mdi-home"), Just("si-docker")]),
        proptest::option::of(any::<bool>()),
        proptest::option::of("[a-z]{3,8}"),
        proptest::option::of((0i64..20, 0i64..20)),
        proptest::option::of((1i64..12, 1i64..8)),
        proptest::collection::vec(arb_widget(), 0..3),
    )
        .prop_map(|(name, host, icon, icon_only, container, pos, size, widgets)| SeedBookmark {
            name,
            url: format!("https://{}.local", host),
            icon: icon.map(str::to_string),
            icon_only,
            subtext: None,
            container,
            x: pos.map(|p| p.0),
            y: pos.map(|p| p.1),
            w: size.map(|s| s.0),
            h: size.map(|s| s.1),
            widgets,
        })
}

/// Seeds with distinct natural keys (the index is folded into the name).
fn arb_seed() -> impl Strategy<Value = SeedFile> {
    proptest::collection::vec(arb_entry(), 0..6).prop_map(|entries| SeedFile {
        bookmarks: entries
            .into_iter()
            .enumerate()
            .map(|(i, mut e)| {
                e.name = format!("{}{}", e.name, i);
                e
            })
            .collect(),
    })
}

// **Property 4: Seed idempotence**
//
// *For any* valid seed, importing it twice creates exactly one bookmark per
// entry with its declared layout, and the second pass changes nothing.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn seed_import_twice_is_noop(seed in arb_seed()) {
        let yaml = serde_yaml::to_string(&seed).expect("seed serializes");
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let importer = SeedImporter::new(db.connection());

        let first = importer.import_str(&yaml);
        prop_assert!(first.is_applied(), "first import: {:?}", first);
        let second = importer.import_str(&yaml);
        prop_assert_eq!(second, ImportReport::Applied { created: 0, updated: 0, widgets_created: 0 });

        let manager = BookmarkManager::new(db.connection());
        prop_assert_eq!(manager.list_all_bookmarks().expect("list").len(), seed.bookmarks.len());
        for entry in &seed.bookmarks {
            let stored = manager
                .find_by_natural_key(&entry.name, &entry.url)
                .expect("lookup")
                .expect("seeded bookmark exists");
            let default = GridRect::bookmark_default();
            let expected = GridRect::new(
                entry.x.map_or(default.x, |v| v as i32),
                entry.y.map_or(default.y, |v| v as i32),
                entry.w.map_or(default.w, |v| v as i32),
                entry.h.map_or(default.h, |v| v as i32),
            );
            prop_assert_eq!(stored.rect(), expected);
        }
    }
}

// **Property 5: Hand-arranged layout survives re-import**
//
// *For any* seed and any rect a user later gives each bookmark, re-importing the
// seed leaves those rects untouched.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn reimport_preserves_user_layout(
        seed in arb_seed(),
        rect in (0i32..30, 0i32..30, 1i32..10, 1i32..10),
    ) {
        let yaml = serde_yaml::to_string(&seed).expect("seed serializes");
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let importer = SeedImporter::new(db.connection());
        importer.import_str(&yaml);

        let api = MutationApi::new(db.connection());
        let (x, y, w, h) = rect;
        let ids: Vec<String> = BookmarkManager::new(db.connection())
            .list_all_bookmarks()
            .expect("list")
            .into_iter()
            .map(|b| b.id)
            .collect();
        for id in &ids {
            let patch = BookmarkPatch { x: Some(x), y: Some(y), w: Some(w), h: Some(h), ..BookmarkPatch::default() };
            api.update_bookmark(id, &patch).expect("update_bookmark");
        }

        importer.import_str(&yaml);
        importer.import_str(&yaml);

        for id in &ids {
            prop_assert_eq!(api.get_bookmark(id).expect("get").rect(), GridRect { x, y, w, h });
        }
    }
}
