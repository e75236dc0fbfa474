//! Integration tests for the connectivity engines.

use rivus::algo::dag::max_clique_membership;
use rivus::algo::{stable, strong, weak};
use rivus::{CondensationDag, Interval, SegmentedNode, StreamGraph};

/// Two nodes present on [0,10), one link on [2,5).
fn scenario_a() -> StreamGraph {
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![0, 10]],
        vec![(0, 1)],
        vec![vec![2, 5]],
    )
    .unwrap();
    sg.check_integrity().unwrap();
    sg
}

#[test]
fn test_scenario_a_wcc() {
    let wcc = weak::weakly_connected_components(&scenario_a()).unwrap();
    assert_eq!(wcc.len(), 1);
    assert_eq!(
        wcc[0].cluster(),
        &[SegmentedNode::new(0, 10, 0), SegmentedNode::new(0, 10, 1)]
    );
    // Bare-cluster view of the same partition
    let bare = rivus::algo::clusters(&wcc);
    assert_eq!(bare, vec![wcc[0].cluster().to_vec()]);
}

#[test]
fn test_scenario_a_wbcc() {
    let wbcc = weak::weakly_bounded_connected_components(&scenario_a()).unwrap();
    assert_eq!(wbcc.len(), 5);

    let connected: Vec<_> = wbcc.iter().filter(|c| c.len() == 2).collect();
    assert_eq!(connected.len(), 1);
    assert_eq!(
        connected[0].cluster(),
        &[SegmentedNode::new(2, 5, 0), SegmentedNode::new(2, 5, 1)]
    );

    let mut singletons: Vec<SegmentedNode> = wbcc
        .iter()
        .filter(|c| c.len() == 1)
        .map(|c| c.cluster()[0])
        .collect();
    singletons.sort();
    assert_eq!(
        singletons,
        vec![
            SegmentedNode::new(0, 2, 0),
            SegmentedNode::new(0, 2, 1),
            SegmentedNode::new(5, 10, 0),
            SegmentedNode::new(5, 10, 1),
        ]
    );
}

#[test]
fn test_wbcc_partitions_wcc() {
    // A richer stream: a chain with a presence gap and an idle node
    let sg = StreamGraph::from_parts(
        (0, 30),
        vec![
            vec![0, 30],
            vec![0, 12, 15, 30],
            vec![0, 30],
            vec![5, 25],
        ],
        vec![(0, 1), (1, 2), (2, 3)],
        vec![vec![2, 6], vec![16, 20], vec![21, 24]],
    )
    .unwrap();
    sg.check_integrity().unwrap();

    let wcc = weak::weakly_connected_components(&sg).unwrap();
    let wbcc = weak::weakly_bounded_connected_components(&sg).unwrap();

    // Every WBCC cluster sits inside exactly one WCC cluster
    for fine in &wbcc {
        let homes: Vec<usize> = wcc
            .iter()
            .enumerate()
            .filter(|(_, coarse)| {
                fine.cluster().iter().all(|piece| {
                    coarse.cluster().iter().any(|m| {
                        m.node == piece.node && m.interval().contains(&piece.interval())
                    })
                })
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(homes.len(), 1, "cluster {fine:?} must have one home");
    }

    // The WBCC pieces of each WCC cluster reconstruct it exactly
    let total_fine: u64 = wbcc
        .iter()
        .flat_map(|c| c.cluster().iter())
        .map(|m| m.interval().duration())
        .sum();
    let total_coarse: u64 = wcc
        .iter()
        .flat_map(|c| c.cluster().iter())
        .map(|m| m.interval().duration())
        .sum();
    assert_eq!(total_fine, total_coarse);
}

#[test]
fn test_wcc_dfs_union_find_identical() {
    let sg = StreamGraph::from_parts(
        (0, 30),
        vec![vec![0, 30], vec![0, 10, 20, 30], vec![0, 30], vec![0, 30]],
        vec![(0, 1), (1, 2), (2, 3)],
        vec![vec![2, 6], vec![22, 26], vec![1, 3]],
    )
    .unwrap();
    let dfs = weak::weakly_connected_components(&sg).unwrap();
    let uf = weak::weakly_connected_components_union_find(&sg).unwrap();
    assert_eq!(dfs, uf);
}

#[test]
fn test_isolated_node_does_not_crash_components() {
    // Node 2 never has a link; it must come out as its own component
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![0, 10], vec![3, 7]],
        vec![(0, 1)],
        vec![vec![2, 5]],
    )
    .unwrap();
    let wcc = weak::weakly_connected_components(&sg).unwrap();
    assert_eq!(wcc.len(), 2);
    assert!(wcc
        .iter()
        .any(|c| c.cluster() == [SegmentedNode::new(3, 7, 2)]));
}

#[test]
fn test_stable_components_batch_windows() {
    let sg = scenario_a();
    let windows = stable::stable_windows(&sg);
    assert_eq!(
        windows,
        vec![
            Interval::new(0, 2),
            Interval::new(2, 5),
            Interval::new(5, 10)
        ]
    );
    let stcc = stable::stable_connected_components(&sg);
    // 2 + 1 + 2 clusters across the three windows
    assert_eq!(stcc.len(), 5);
}

#[test]
fn test_strong_components_and_dag() {
    let sg = scenario_a();
    let scc = strong::strongly_connected_components(&sg).unwrap();
    assert_eq!(scc.len(), 5);

    let dag = CondensationDag::build(&sg).unwrap();
    assert_eq!(dag.len(), 5);
    assert_eq!(dag.times(), Interval::new(0, 10));

    let pair = dag
        .nodes()
        .iter()
        .find(|n| n.nodes.len() == 2)
        .expect("pair cluster over the link window");
    assert_eq!(pair.window, Interval::new(2, 5));
    assert_eq!(dag.predecessors(pair.id).len(), 2);
    assert_eq!(dag.successors(pair.id).len(), 2);
}

#[test]
fn test_condensation_respects_weak_separation() {
    // Two independent pairs never share a cluster
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![0, 10], vec![0, 10], vec![0, 10]],
        vec![(0, 1), (2, 3)],
        vec![vec![1, 4], vec![2, 6]],
    )
    .unwrap();
    let dag = CondensationDag::build(&sg).unwrap();
    for node in dag.nodes() {
        let crosses = node.nodes.iter().any(|&n| n <= 1)
            && node.nodes.iter().any(|&n| n >= 2);
        assert!(!crosses);
    }
}

#[test]
fn test_k_core_and_cliques_on_clique_stream() {
    // A 4-clique on [0,4), decaying to a triangle on [4,8)
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10]; 4],
        vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
        vec![
            vec![0, 8],
            vec![0, 8],
            vec![0, 4],
            vec![0, 8],
            vec![0, 4],
            vec![0, 4],
        ],
    )
    .unwrap();
    let dag = CondensationDag::build(&sg).unwrap();

    let core3 = dag.k_core(&sg, 3).unwrap();
    assert_eq!(core3.len(), 4);
    assert!(core3.contains(&SegmentedNode::new(0, 4, 3)));

    let core2 = dag.k_core(&sg, 2).unwrap();
    assert!(core2.contains(&SegmentedNode::new(0, 8, 0)));

    let cliques = dag.all_cliques(&sg).unwrap();
    assert!(cliques[&4]
        .iter()
        .any(|(w, members)| *w == Interval::new(0, 4) && members == &vec![0, 1, 2, 3]));

    let membership = max_clique_membership(&cliques);
    assert_eq!(membership[&SegmentedNode::new(0, 4, 0)], 4);
    assert_eq!(membership[&SegmentedNode::new(4, 8, 0)], 3);
}

#[test]
fn test_link_end_does_not_survive_node_departure() {
    // Node 0 departs at 5, exactly when its link ends. The tie-break must
    // order LinkEnd before NodeEnd.
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 5], vec![0, 10]],
        vec![(0, 1)],
        vec![vec![2, 5]],
    )
    .unwrap();
    sg.check_integrity().unwrap();

    let events = sg.events();
    let at_five: Vec<rivus::EventKind> = events
        .iter()
        .filter(|e| e.time() == 5)
        .map(rivus::Event::kind)
        .collect();
    assert_eq!(
        at_five,
        vec![rivus::EventKind::LinkEnd, rivus::EventKind::NodeEnd]
    );

    // The sweep consumes the same order without stranding the link
    let scc = strong::strongly_connected_components(&sg).unwrap();
    assert!(scc
        .iter()
        .any(|c| c.times == Interval::new(2, 5) && c.len() == 2));
}

#[test]
fn test_stable_dag_merges_same_node_set() {
    // Composition changes at every window boundary here, so contraction
    // finds no chain to merge and the stable DAG equals the condensation
    let sg = StreamGraph::from_parts(
        (0, 10),
        vec![vec![0, 10], vec![0, 10]],
        vec![(0, 1)],
        vec![vec![2, 8]],
    )
    .unwrap();
    let dag = CondensationDag::build(&sg).unwrap();
    let stable = dag.stable_dag();
    assert_eq!(stable.len(), dag.len());
}
