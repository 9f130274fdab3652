use std::collections::BTreeMap;
use std::hash::Hasher;

use botc_setup::{Distribution, SavedState, SelAction, distribution_for_count};
use twox_hash::XxHash64;

const TABLE_HASH: u64 = 0x3bae_bae3_855b_3252;

#[test]
fn base_distribution_table_snapshot_stable() {
    let snapshot: BTreeMap<usize, Distribution> =
        (4..=16).map(|n| (n, distribution_for_count(n))).collect();
    let canonical = serde_json::to_string_pretty(&snapshot).unwrap();
    let digest = snapshot_hash(canonical.as_bytes());
    assert_eq!(
        digest, TABLE_HASH,
        "base distribution table changed\n{canonical}"
    );
}

#[test]
fn saved_state_reads_browser_shape() {
    let json = r#"{
        "scriptTitle": "Trouble Brewing",
        "numPlayers": 9,
        "ranking": ["imp", "chef", "baron"],
        "selection": ["imp", "baron"]
    }"#;
    let state: SavedState = serde_json::from_str(json).unwrap();
    assert_eq!(state.num_players, 9);
    assert_eq!(state.ranking.position("baron"), Some(2));

    let without_title: SavedState =
        serde_json::from_str(r#"{"numPlayers": 5, "ranking": [], "selection": []}"#).unwrap();
    assert!(without_title.script_title.is_empty());
}

#[test]
fn actions_roundtrip_through_json() {
    let actions = vec![
        SelAction::toggle("imp"),
        SelAction::deselect("imp"),
        SelAction::set_all(["chef", "imp"]),
        SelAction::Clear,
    ];
    let json = serde_json::to_string(&actions).unwrap();
    let parsed: Vec<SelAction> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, actions);
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}
