//! Integration tests for the temporal path engine.

use rivus::paths::{
    fastest, fastest_pairwise, fastest_shortest, foremost, foremost_from, foremost_pairwise,
    shortest, shortest_fastest, shortest_foremost, shortest_from,
};
use rivus::{SegmentedNode, StreamGraph};

/// Scenario B: nodes A(0), B(1), C(2); A-B on [0,3), B-C on [4,6).
fn scenario_b() -> StreamGraph {
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![0, 10], vec![0, 10]],
        vec![(0, 1), (1, 2)],
        vec![vec![0, 3], vec![4, 6]],
    )
    .unwrap();
    sg.check_integrity().unwrap();
    sg
}

#[test]
fn test_scenario_b() {
    let sg = scenario_b();
    // Earliest arrival respects the gap at B
    assert_eq!(foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), Some(6));
    assert_eq!(shortest(&sg, 0u32, 2u32, None).unwrap(), Some(2));
}

#[test]
fn test_scenario_b_with_direct_link() {
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![0, 10], vec![0, 10]],
        vec![(0, 1), (1, 2), (0, 2)],
        vec![vec![0, 3], vec![4, 6], vec![0, 1]],
    )
    .unwrap();
    assert_eq!(foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), Some(1));
    assert_eq!(shortest(&sg, 0u32, 2u32, None).unwrap(), Some(1));
}

#[test]
fn test_all_six_metrics_on_a_chain() {
    let sg = scenario_b();

    assert_eq!(foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), Some(6));
    assert_eq!(shortest_foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), Some((6, 2)));
    // Board A-B at its end (t=3), delivered at C at 6
    assert_eq!(fastest(&sg, 0u32, 2u32, None).unwrap(), Some(3));
    assert_eq!(shortest_fastest(&sg, 0u32, 2u32, None).unwrap(), Some((3, 2)));
    assert_eq!(shortest(&sg, 0u32, 2u32, None).unwrap(), Some(2));
    assert_eq!(fastest_shortest(&sg, 0u32, 2u32, None).unwrap(), Some((2, 3)));
}

#[test]
fn test_secondary_criteria_never_change_the_primary() {
    let sg = StreamGraph::from_parts(
        (0, 20),
        vec![vec![0, 20], vec![0, 20], vec![0, 20], vec![0, 20]],
        vec![(0, 1), (1, 3), (0, 2), (2, 3), (0, 3)],
        vec![
            vec![1, 3],
            vec![4, 6],
            vec![2, 8],
            vec![9, 12],
            vec![10, 15],
        ],
    )
    .unwrap();
    for source in 0..4u32 {
        for dest in 0..4u32 {
            let fo = foremost(&sg, source, dest, Some(0)).unwrap();
            let sfo = shortest_foremost(&sg, source, dest, Some(0)).unwrap();
            assert_eq!(fo, sfo.map(|(a, _)| a), "{source}->{dest}");

            let fa = fastest(&sg, source, dest, None).unwrap();
            let sfa = shortest_fastest(&sg, source, dest, None).unwrap();
            assert_eq!(fa, sfa.map(|(d, _)| d), "{source}->{dest}");

            let sp = shortest(&sg, source, dest, None).unwrap();
            let fsp = fastest_shortest(&sg, source, dest, None).unwrap();
            assert_eq!(sp, fsp.map(|(h, _)| h), "{source}->{dest}");
        }
    }
}

#[test]
fn test_waiting_is_bounded_by_presence() {
    // B leaves at 3 and returns at 12; a traveler arriving on the first
    // occurrence is stranded when it ends
    let sg = StreamGraph::from_parts(
        (0, 20),
        vec![vec![0, 20], vec![0, 3, 12, 20], vec![0, 20]],
        vec![(0, 1), (1, 2)],
        vec![vec![0, 2], vec![14, 16]],
    )
    .unwrap();
    sg.check_integrity().unwrap();
    assert_eq!(foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), None);

    // Restricting the source to B's second occurrence still reaches C
    let second = SegmentedNode::new(12, 20, 1);
    assert_eq!(foremost(&sg, second, 2u32, None).unwrap(), Some(16));
}

#[test]
fn test_explicit_start_time_excludes_earlier_occurrences() {
    let sg = scenario_b();
    // Starting after A-B has closed leaves no way off A
    assert_eq!(foremost(&sg, 0u32, 2u32, Some(4)).unwrap(), None);
    assert_eq!(foremost(&sg, 0u32, 1u32, Some(2)).unwrap(), Some(3));
}

#[test]
fn test_single_source_maps_skip_unreachable() {
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![0, 10], vec![0, 10]],
        vec![(0, 1)],
        vec![vec![2, 5]],
    )
    .unwrap();
    let from_a = foremost_from(&sg, 0u32, Some(0)).unwrap();
    assert_eq!(from_a.len(), 2);
    assert_eq!(from_a[&1], 5);
    assert!(!from_a.contains_key(&2));

    let hops = shortest_from(&sg, 0u32, None).unwrap();
    assert_eq!(hops[&0], 0);
    assert_eq!(hops[&1], 1);
}

#[test]
fn test_pairwise_tables() {
    let sg = scenario_b();
    let fo = foremost_pairwise(&sg).unwrap();
    // Without an explicit start, A departs at its first presence
    assert_eq!(fo[&(0, 2)], 6);
    assert_eq!(fo[&(1, 2)], 6);
    assert!(!fo.contains_key(&(2, 0)));

    let fa = fastest_pairwise(&sg).unwrap();
    assert_eq!(fa[&(0, 0)], 0);
    assert_eq!(fa[&(0, 2)], 3);
    // B boards B-C at its end and is delivered the same instant
    assert_eq!(fa[&(1, 2)], 0);
}

#[test]
fn test_queries_against_empty_presence_node() {
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![]],
        vec![],
        vec![],
    )
    .unwrap();
    assert_eq!(foremost(&sg, 1u32, 0u32, None).unwrap(), None);
    assert_eq!(foremost(&sg, 0u32, 1u32, None).unwrap(), None);
}
