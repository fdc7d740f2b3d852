use super::leaf::ds64::Ds64Leaf;
use super::leaf::vlc::VlcLeaf;
use super::leaf::LeafContainer;
use super::{BpConfig, BpTree};

use pretty_assertions::assert_eq;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

fn small_config() -> BpConfig {
    // deliberately tiny so a few dozen insertions exercise several levels
    // of splitting and merging
    BpConfig::new(4, 4).unwrap()
}

#[test]
fn insert_builds_up_and_stays_consistent() {
    let mut tree: BpTree<Ds64Leaf> = BpTree::new(small_config(), false);
    let mut oracle: Vec<u64> = Vec::new();

    for i in 0..200u64 {
        let pos = (i as usize * 7) % (oracle.len() + 1);
        tree.insert(pos, i);
        oracle.insert(pos, i);
        tree.verify_counts();
        assert_eq!(tree.size(), oracle.len());
    }

    for (i, &v) in oracle.iter().enumerate() {
        assert_eq!(tree.at(i), v);
    }
}

#[test]
fn remove_shrinks_back_down_to_empty() {
    let mut tree: BpTree<Ds64Leaf> = BpTree::new(small_config(), false);
    let mut oracle: Vec<u64> = Vec::new();

    for i in 0..150u64 {
        tree.insert(oracle.len(), i);
        oracle.push(i);
    }

    let mut counter = 0usize;
    while !oracle.is_empty() {
        counter = counter.wrapping_add(11);
        let pos = counter % oracle.len();
        let expected = oracle.remove(pos);
        let got = tree.remove(pos);
        assert_eq!(got, expected);
        tree.verify_counts();
        assert_eq!(tree.size(), oracle.len());
    }

    assert!(tree.is_empty());
}

#[test]
fn sum_deque_tracks_prefix_sums_through_inserts_and_removes() {
    let mut tree: BpTree<VlcLeaf> = BpTree::new(small_config(), true).with_weight_fn(|v| v);
    let mut oracle: Vec<u64> = Vec::new();

    for i in 0..120u64 {
        let pos = (i as usize * 5) % (oracle.len() + 1);
        let v = i % 37;
        tree.insert(pos, v);
        oracle.insert(pos, v);
    }
    tree.verify_counts();
    tree.verify_sums();

    let mut removed = 0;
    while removed < 40 && !oracle.is_empty() {
        let pos = (removed * 9) % oracle.len();
        oracle.remove(pos);
        tree.remove(pos);
        removed += 1;
    }
    tree.verify_counts();
    tree.verify_sums();
    assert_eq!(tree.size(), oracle.len());
}

#[test]
fn build_matches_one_at_a_time_insertion() {
    let values: Vec<u64> = (0..500).map(|i| i * 3 % 97).collect();
    let built = BpTree::<Ds64Leaf>::build(small_config(), false, |_| 0, &values);

    let mut inserted: BpTree<Ds64Leaf> = BpTree::new(small_config(), false);
    for (i, &v) in values.iter().enumerate() {
        inserted.insert(i, v);
    }

    assert_eq!(built.size(), inserted.size());
    for i in 0..values.len() {
        assert_eq!(built.at(i), inserted.at(i));
    }
}

#[test]
fn store_and_load_roundtrip() {
    let values: Vec<u64> = (0..300).map(|i| (i * 13) % 251).collect();
    let tree = BpTree::<Ds64Leaf>::build(small_config(), false, |_| 0, &values);

    let bytes = tree.store();
    let loaded = BpTree::<Ds64Leaf>::load(&bytes, |_| 0).expect("load");

    assert_eq!(loaded.size(), tree.size());
    for i in 0..values.len() {
        assert_eq!(loaded.at(i), tree.at(i));
    }
}

#[quickcheck]
fn insert_then_at_matches_naive_vec(ops: Vec<(u8, u64)>) -> TestResult {
    let mut tree: BpTree<Ds64Leaf> = BpTree::new(small_config(), false);
    let mut oracle: Vec<u64> = Vec::new();

    for (raw_pos, value) in ops {
        let pos = if oracle.is_empty() {
            0
        } else {
            raw_pos as usize % (oracle.len() + 1)
        };
        tree.insert(pos, value);
        oracle.insert(pos, value);
    }

    if tree.size() != oracle.len() {
        return TestResult::failed();
    }
    for (i, &v) in oracle.iter().enumerate() {
        if tree.at(i) != v {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}
