//! Waypoint graph: nodes grouped into containers, edges discovered by sight

use crate::game_logic::debug::SearchDebugger;
use crate::game_logic::errors::{NavError, NavResult};
use crate::pathfinding::visibility::{VisibilityQuery, classify_hits};
use bevy::prelude::*;
use derive_more::Display;
use pathfinding::prelude::bfs_reach;
use std::collections::{HashMap, HashSet};

/// Stable identity of a waypoint node (arena index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("#{_0}")]
pub struct WaypointId(u32);

impl WaypointId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Container grouping sibling waypoints; edges never cross groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("group{_0}")]
pub struct GroupId(u32);

impl GroupId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Cost of travelling one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCost {
    /// Straight-line length of the segment
    pub g: f32,
    /// Obstructions crossed by the segment
    pub h: u32,
    /// The destination waypoint was the only thing the ray touched
    pub direct: bool,
}

impl EdgeCost {
    /// Priority used by the planner when this edge is relaxed
    pub fn priority(&self) -> f32 {
        self.g + self.h as f32
    }
}

#[derive(Debug, Clone)]
pub struct WaypointNode {
    pub id: WaypointId,
    pub group: GroupId,
    pub name: String,
    pub position: Vec3,
    cost_map: HashMap<WaypointId, EdgeCost>,
}

impl WaypointNode {
    pub fn cost_map(&self) -> &HashMap<WaypointId, EdgeCost> {
        &self.cost_map
    }

    pub fn cost_to(&self, other: WaypointId) -> Option<EdgeCost> {
        self.cost_map.get(&other).copied()
    }

    /// Edges in ascending neighbor order, so that callers iterate deterministically
    pub fn edges(&self) -> Vec<(WaypointId, EdgeCost)> {
        let mut edges: Vec<_> = self.cost_map.iter().map(|(id, cost)| (*id, *cost)).collect();
        edges.sort_by_key(|(id, _)| *id);
        edges
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaypointGraph {
    nodes: Vec<WaypointNode>,
    groups: Vec<String>,
    revision: u64,
}

impl WaypointGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes whenever a node is added or any cost map is rewritten
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add_group(&mut self, name: impl Into<String>) -> GroupId {
        self.groups.push(name.into());
        GroupId(self.groups.len() as u32 - 1)
    }

    pub fn group_name(&self, group: GroupId) -> Option<&str> {
        self.groups.get(group.index()).map(String::as_str)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Place a node. Its edges are not built until `build_edges` runs.
    pub fn add_node(
        &mut self,
        group: GroupId,
        name: impl Into<String>,
        position: Vec3,
    ) -> NavResult<WaypointId> {
        if group.index() >= self.groups.len() {
            return Err(NavError::UnknownGroup { group });
        }

        let id = WaypointId(self.nodes.len() as u32);
        self.nodes.push(WaypointNode {
            id,
            group,
            name: name.into(),
            position,
            cost_map: HashMap::new(),
        });
        self.revision += 1;
        Ok(id)
    }

    pub fn node(&self, id: WaypointId) -> Option<&WaypointNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[WaypointNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn position(&self, id: WaypointId) -> Option<Vec3> {
        self.node(id).map(|node| node.position)
    }

    pub fn name(&self, id: WaypointId) -> &str {
        self.node(id).map(|node| node.name.as_str()).unwrap_or("<unknown>")
    }

    pub fn find_by_name(&self, name: &str) -> Option<WaypointId> {
        self.nodes.iter().find(|node| node.name == name).map(|node| node.id)
    }

    pub fn group_members(&self, group: GroupId) -> impl Iterator<Item = WaypointId> + '_ {
        self.nodes
            .iter()
            .filter(move |node| node.group == group)
            .map(|node| node.id)
    }

    pub fn cost(&self, from: WaypointId, to: WaypointId) -> Option<EdgeCost> {
        self.node(from).and_then(|node| node.cost_to(to))
    }

    /// Discover the edges of `id` by casting a ray to every sibling.
    ///
    /// Returns the number of edges written. A node without siblings ends up
    /// with an empty cost map and is reported at warn level.
    pub fn build_edges(&mut self, id: WaypointId, query: &impl VisibilityQuery) -> NavResult<usize> {
        let node = self.node(id).ok_or(NavError::UnknownWaypoint { id })?;
        let origin = node.position;
        let group = node.group;

        let siblings: Vec<(WaypointId, Vec3)> = self
            .nodes
            .iter()
            .filter(|other| other.group == group && other.id != id)
            .map(|other| (other.id, other.position))
            .collect();

        let mut cost_map = HashMap::with_capacity(siblings.len());
        for (sibling, target) in siblings {
            let offset = target - origin;
            let g = offset.length();

            // Coincident nodes have no direction to cast along
            if g <= f32::EPSILON {
                cost_map.insert(
                    sibling,
                    EdgeCost {
                        g,
                        h: 0,
                        direct: true,
                    },
                );
                continue;
            }

            let hits = query.cast_all(origin, offset / g, g);
            let class = classify_hits(&hits);
            cost_map.insert(
                sibling,
                EdgeCost {
                    g,
                    h: class.obstructions,
                    direct: class.direct,
                },
            );
        }

        let edge_count = cost_map.len();
        let node = &mut self.nodes[id.index()];
        node.cost_map = cost_map;
        self.revision += 1;

        if edge_count == 0 {
            warn!(
                "Waypoint {name} ({id}) has no siblings in {group}; search cannot leave it",
                name = self.name(id),
                group = group
            );
        } else {
            SearchDebugger::log_edge_costs(self, id);
        }

        Ok(edge_count)
    }

    /// Drop the edges of a node so a later rebuild can rediscover them
    pub fn invalidate(&mut self, id: WaypointId) -> NavResult<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(NavError::UnknownWaypoint { id })?;
        node.cost_map.clear();
        self.revision += 1;
        Ok(())
    }

    /// Rebuild every node of one group, returning the total edge count
    pub fn rebuild_group(&mut self, group: GroupId, query: &impl VisibilityQuery) -> NavResult<usize> {
        if group.index() >= self.groups.len() {
            return Err(NavError::UnknownGroup { group });
        }
        let members: Vec<WaypointId> = self.group_members(group).collect();
        let mut total = 0;
        for id in members {
            total += self.build_edges(id, query)?;
        }
        Ok(total)
    }

    pub fn rebuild_all(&mut self, query: &impl VisibilityQuery) -> NavResult<usize> {
        let mut total = 0;
        for index in 0..self.nodes.len() {
            total += self.build_edges(WaypointId(index as u32), query)?;
        }
        debug!(
            "Rebuilt waypoint graph: {nodes} nodes, {edges} edges",
            nodes = self.nodes.len(),
            edges = total
        );
        Ok(total)
    }

    /// Nodes whose cost map is empty
    pub fn isolated_nodes(&self) -> Vec<WaypointId> {
        self.nodes
            .iter()
            .filter(|node| node.cost_map.is_empty())
            .map(|node| node.id)
            .collect()
    }

    /// Report a node that construction left without edges
    pub fn check_connected(&self, id: WaypointId) -> NavResult<()> {
        let node = self.node(id).ok_or(NavError::UnknownWaypoint { id })?;
        if node.cost_map.is_empty() {
            return Err(NavError::NoSiblings { id });
        }
        Ok(())
    }

    /// Every node reachable from `start` by following cost maps, `start` included
    pub fn reachable_from(&self, start: WaypointId) -> HashSet<WaypointId> {
        if !self.contains(start) {
            return HashSet::new();
        }
        bfs_reach(start, |id| {
            self.node(*id)
                .map(|node| node.cost_map.keys().copied().collect::<Vec<_>>())
                .unwrap_or_default()
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::visibility::{HitTag, VisibilityHit};

    struct OpenSpace;

    impl VisibilityQuery for OpenSpace {
        fn cast_all(&self, _: Vec3, _: Vec3, _: f32) -> Vec<VisibilityHit> {
            Vec::new()
        }
    }

    /// Every ray crosses one wall and then the destination
    struct SingleWall;

    impl VisibilityQuery for SingleWall {
        fn cast_all(&self, _: Vec3, _: Vec3, max_distance: f32) -> Vec<VisibilityHit> {
            vec![
                VisibilityHit::new(100, HitTag::Obstruction, max_distance * 0.5),
                VisibilityHit::new(1, HitTag::Waypoint, max_distance),
            ]
        }
    }

    fn triangle() -> (WaypointGraph, [WaypointId; 3]) {
        let mut graph = WaypointGraph::new();
        let group = graph.add_group("maze");
        let a = graph.add_node(group, "a", Vec3::ZERO).unwrap();
        let b = graph.add_node(group, "b", Vec3::new(3.0, 0.0, 0.0)).unwrap();
        let c = graph.add_node(group, "c", Vec3::new(0.0, 0.0, 4.0)).unwrap();
        (graph, [a, b, c])
    }

    #[test]
    fn test_one_entry_per_sibling_without_self_edge() {
        let (mut graph, [a, b, c]) = triangle();
        let written = graph.build_edges(a, &OpenSpace).unwrap();

        assert_eq!(written, 2);
        let node = graph.node(a).unwrap();
        assert_eq!(node.cost_map().len(), 2);
        assert!(node.cost_to(a).is_none());
        assert!((node.cost_to(b).unwrap().g - 3.0).abs() < 1e-5);
        assert!((node.cost_to(c).unwrap().g - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_obstructed_edges_keep_true_distance() {
        let (mut graph, [a, b, c]) = triangle();
        graph.build_edges(b, &SingleWall).unwrap();

        let cost = graph.cost(b, c).unwrap();
        assert!((cost.g - 5.0).abs() < 1e-5);
        assert_eq!(cost.h, 1);
        assert!(!cost.direct);
        assert_eq!(cost.priority(), cost.g + 1.0);
        assert!(graph.cost(b, a).is_some());
    }

    #[test]
    fn test_edges_do_not_cross_groups() {
        let mut graph = WaypointGraph::new();
        let north = graph.add_group("north");
        let south = graph.add_group("south");
        let a = graph.add_node(north, "a", Vec3::ZERO).unwrap();
        let b = graph.add_node(south, "b", Vec3::X).unwrap();

        assert_eq!(graph.build_edges(a, &OpenSpace).unwrap(), 0);
        assert!(graph.cost(a, b).is_none());
        assert_eq!(graph.isolated_nodes(), vec![a, b]);
        assert!(matches!(
            graph.check_connected(a),
            Err(NavError::NoSiblings { .. })
        ));
    }

    #[test]
    fn test_coincident_nodes_are_direct_neighbors() {
        let mut graph = WaypointGraph::new();
        let group = graph.add_group("stack");
        let a = graph.add_node(group, "a", Vec3::ONE).unwrap();
        let b = graph.add_node(group, "b", Vec3::ONE).unwrap();

        graph.build_edges(a, &SingleWall).unwrap();
        let cost = graph.cost(a, b).unwrap();
        assert_eq!(cost.g, 0.0);
        assert!(cost.direct);
    }

    #[test]
    fn test_invalidate_and_rebuild_bump_revision() {
        let (mut graph, [a, _, _]) = triangle();
        let placed = graph.revision();

        graph.build_edges(a, &OpenSpace).unwrap();
        assert!(graph.revision() > placed);

        let built = graph.revision();
        graph.invalidate(a).unwrap();
        assert!(graph.revision() > built);
        assert!(graph.node(a).unwrap().cost_map().is_empty());

        let edges = graph.rebuild_all(&OpenSpace).unwrap();
        assert_eq!(edges, 6);
        assert!(graph.isolated_nodes().is_empty());
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let (mut graph, _) = triangle();
        let missing = WaypointId::new(42);
        assert!(matches!(
            graph.build_edges(missing, &OpenSpace),
            Err(NavError::UnknownWaypoint { .. })
        ));
        assert!(matches!(
            graph.add_node(GroupId(9), "x", Vec3::ZERO),
            Err(NavError::UnknownGroup { .. })
        ));
    }

    #[test]
    fn test_reachable_from_follows_cost_maps() {
        let (mut graph, [a, b, c]) = triangle();
        graph.build_edges(a, &OpenSpace).unwrap();

        let reach = graph.reachable_from(a);
        assert!(reach.contains(&a) && reach.contains(&b) && reach.contains(&c));

        // b has no edges of its own yet
        assert_eq!(graph.reachable_from(b).len(), 1);
        assert!(graph.reachable_from(WaypointId::new(99)).is_empty());
    }

    #[test]
    fn test_find_by_name() {
        let (graph, [_, b, _]) = triangle();
        assert_eq!(graph.find_by_name("b"), Some(b));
        assert_eq!(graph.find_by_name("zzz"), None);
        assert_eq!(graph.name(b), "b");
    }
}
