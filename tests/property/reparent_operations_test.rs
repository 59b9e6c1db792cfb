//! Property-based tests for reparenting tiles between the root grid and groups.
//!
//! Random drop sequences are replayed through the layout state against a real
//! store. After every step each bookmark must live in exactly one container,
//! and the local state must match a fresh read of the store.

use onedashboard::database::Database;
use onedashboard::managers::layout_state::{DropOutcome, LayoutState, Placement};
use onedashboard::services::mutation_api::MutationApi;
use onedashboard::types::bookmark::NewBookmark;
use onedashboard::types::dashboard::DashboardSnapshot;
use onedashboard::types::group::NewGroup;
use onedashboard::types::layout::GridRect;
use proptest::prelude::*;

const BOOKMARKS: usize = 4;
const GROUPS: usize = 3;

/// One drag end: which bookmark, and where it lands (`None` = root grid).
fn arb_drops() -> impl Strategy<Value = Vec<(usize, Option<usize>)>> {
    proptest::collection::vec(
        (0..BOOKMARKS, proptest::option::of(0..GROUPS)),
        1..16,
    )
}

/// Every bookmark id in the snapshot, in whichever container holds it.
fn all_ids(snapshot: &DashboardSnapshot) -> Vec<String> {
    snapshot
        .bookmarks
        .iter()
        .chain(snapshot.groups.iter().flat_map(|g| g.bookmarks.iter()))
        .map(|t| t.id().to_string())
        .collect()
}

/// `(container, bookmark id, rect)` for every tile, sorted, so comparisons ignore
/// ordering and timestamps.
fn placements(snapshot: &DashboardSnapshot) -> Vec<(Option<String>, String, GridRect)> {
    let mut out: Vec<_> = snapshot
        .bookmarks
        .iter()
        .map(|t| (None, t.id().to_string(), t.bookmark.rect()))
        .chain(snapshot.groups.iter().flat_map(|g| {
            g.bookmarks
                .iter()
                .map(move |t| (Some(g.id().to_string()), t.id().to_string(), t.bookmark.rect()))
        }))
        .collect();
    out.sort_by(|a, b| a.1.cmp(&b.1));
    out
}

// **Property 3: Exclusive placement**
//
// *For any* drop sequence, each bookmark appears exactly once across the root
// collection and all group collections, lands where it was dropped at the grid
// origin, and the store agrees with the local state.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn drops_keep_placement_exclusive_and_persisted(drops in arb_drops()) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let mut api = MutationApi::new(db.connection());

        let bookmark_ids: Vec<String> = (0..BOOKMARKS)
            .map(|i| {
                api.create_bookmark(&NewBookmark::new(&format!("B{}", i), &format!("https://b{}.test", i)))
                    .expect("create_bookmark should succeed")
                    .id
            })
            .collect();
        let group_ids: Vec<String> = (0..GROUPS)
            .map(|i| {
                api.create_group(&NewGroup { name: format!("G{}", i), icon: None })
                    .expect("create_group should succeed")
                    .id
            })
            .collect();

        let mut state = LayoutState::from_snapshot(api.load_dashboard().expect("load_dashboard"));
        state.set_edit(true);

        for (bi, target) in drops {
            let bid = &bookmark_ids[bi];
            let over = target.map(|gi| format!("grp:{}", group_ids[gi]));
            let expected = match target {
                Some(gi) => Placement::InGroup(group_ids[gi].clone()),
                None => Placement::Root,
            };
            let before = state.placement(bid);

            let outcome = state
                .handle_drop(&format!("bk:{}", bid), over.as_deref(), &mut api)
                .expect("handle_drop should succeed");

            if before.as_ref() == Some(&expected) {
                prop_assert_eq!(outcome, DropOutcome::Unchanged { bookmark_id: bid.clone() });
            } else {
                prop_assert_eq!(outcome, DropOutcome::Moved { bookmark_id: bid.clone(), to: expected.clone() });
                let tile = state.tile(bid).expect("moved tile is present");
                prop_assert_eq!((tile.bookmark.x, tile.bookmark.y), (0, 0));
            }
            prop_assert_eq!(state.placement(bid), Some(expected));

            let mut ids = all_ids(&state.snapshot());
            ids.sort();
            let mut expected_ids = bookmark_ids.clone();
            expected_ids.sort();
            prop_assert_eq!(ids, expected_ids, "each bookmark lives in exactly one container");
        }

        let stored = api.load_dashboard().expect("load_dashboard");
        prop_assert_eq!(placements(&stored), placements(&state.snapshot()));
    }
}
