use std::collections::HashMap;

use ahash::{AHashMap, AHashSet};
use geo::{Coord, LineString};

use crate::source::{HighwayTag, RoadEdge};

/// A raw OSM way: node ids with their coordinates (same length) and tags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsmWay {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub coords: Vec<Coord<f64>>,
    pub tags: HashMap<String, String>,
}

impl OsmWay {
    fn tag(&self, key: &str) -> Option<&str> { self.tags.get(key).map(String::as_str) }

    /// Direction of travel: Some(true) forward only, Some(false) backward only, None both ways.
    fn oneway(&self) -> Option<bool> {
        match self.tag("oneway") {
            Some("yes" | "true" | "1") => Some(true),
            Some("-1" | "reverse") => Some(false),
            _ if self.tag("junction") == Some("roundabout") => Some(true),
            _ => None,
        }
    }
}

/// One directed node-to-node step of a way.
#[derive(Clone, Copy, Debug)]
struct Segment<'a> {
    from: i64,
    to: i64,
    way_id: i64,
    highway: &'a str,
    oneway: bool,
}

/// Directed multigraph of way segments.
struct RoadGraph<'a> {
    coords: AHashMap<i64, Coord<f64>>,
    segments: Vec<Segment<'a>>,
    outgoing: AHashMap<i64, Vec<usize>>,
    incoming: AHashMap<i64, Vec<usize>>,
}

impl<'a> RoadGraph<'a> {
    /// Two-way roads get a segment per direction; reverse one-ways are flipped.
    fn from_ways(ways: &'a [OsmWay]) -> Self {
        let mut coords = AHashMap::new();
        let mut segments = Vec::new();

        for way in ways {
            let Some(highway) = way.tag("highway") else { continue };
            if way.nodes.len() != way.coords.len() || way.coords.len() < 2 { continue }

            coords.extend(way.nodes.iter().copied().zip(way.coords.iter().copied()));
            let oneway = way.oneway();
            for pair in way.nodes.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let segment = |from, to| Segment { from, to, way_id: way.id, highway, oneway: oneway.is_some() };
                match oneway {
                    Some(true) => segments.push(segment(a, b)),
                    Some(false) => segments.push(segment(b, a)),
                    None => {
                        segments.push(segment(a, b));
                        segments.push(segment(b, a));
                    }
                }
            }
        }

        Self::from_segments(coords, segments)
    }

    fn from_segments(coords: AHashMap<i64, Coord<f64>>, segments: Vec<Segment<'a>>) -> Self {
        let mut outgoing: AHashMap<i64, Vec<usize>> = AHashMap::new();
        let mut incoming: AHashMap<i64, Vec<usize>> = AHashMap::new();
        for (i, segment) in segments.iter().enumerate() {
            outgoing.entry(segment.from).or_default().push(i);
            incoming.entry(segment.to).or_default().push(i);
        }
        Self { coords, segments, outgoing, incoming }
    }

    #[inline]
    fn out_of(&self, node: i64) -> &[usize] { self.outgoing.get(&node).map_or(&[], Vec::as_slice) }

    #[inline]
    fn into_node(&self, node: i64) -> &[usize] { self.incoming.get(&node).map_or(&[], Vec::as_slice) }

    /// Keep only the segments of the largest weakly connected component.
    fn largest_component(self) -> Self {
        let mut index: AHashMap<i64, usize> = AHashMap::new();
        for segment in &self.segments {
            for node in [segment.from, segment.to] {
                let next = index.len();
                index.entry(node).or_insert(next);
            }
        }

        let mut sets = DisjointSets::new(index.len());
        for segment in &self.segments {
            sets.union(index[&segment.from], index[&segment.to]);
        }

        let mut sizes: AHashMap<usize, usize> = AHashMap::new();
        for &i in index.values() { *sizes.entry(sets.find(i)).or_default() += 1 }
        let Some(largest) = sizes.iter()
            .max_by_key(|&(root, size)| (*size, std::cmp::Reverse(*root)))
            .map(|(&root, _)| root)
        else { return self };

        let kept: Vec<_> = self.segments.iter().copied()
            .filter(|segment| sets.find(index[&segment.from]) == largest)
            .collect();
        if kept.len() < self.segments.len() {
            log::debug!("[network] dropped {} segments outside the largest component", self.segments.len() - kept.len());
        }
        Self::from_segments(self.coords, kept)
    }

    /// A node ends a merged edge unless traffic simply passes through it: exactly two
    /// distinct neighbours, joined by two segments (one-way) or four (two-way).
    fn is_endpoint(&self, node: i64) -> bool {
        let (out, into) = (self.out_of(node), self.into_node(node));
        if out.is_empty() || into.is_empty() { return true }

        let neighbors: AHashSet<i64> = out.iter().map(|&i| self.segments[i].to)
            .chain(into.iter().map(|&i| self.segments[i].from))
            .collect();
        if neighbors.contains(&node) { return true }

        let degree = out.len() + into.len();
        !(neighbors.len() == 2 && (degree == 2 || degree == 4))
    }

    /// Follow segments from `first` until an endpoint, marking them used.
    fn walk(&self, first: usize, endpoints: &AHashSet<i64>, used: &mut [bool]) -> Vec<usize> {
        let mut path = vec![first];
        used[first] = true;

        let mut current = self.segments[first];
        while !endpoints.contains(&current.to) {
            let next = self.out_of(current.to).iter().copied()
                .find(|&i| !used[i] && self.segments[i].to != current.from);
            let Some(next) = next else { break };

            used[next] = true;
            path.push(next);
            current = self.segments[next];
        }
        path
    }

    fn edge(&self, path: &[usize]) -> Option<RoadEdge> {
        let first = self.segments[*path.first()?];

        let mut highways: Vec<&str> = Vec::new();
        let mut coords = vec![*self.coords.get(&first.from)?];
        for &i in path {
            let segment = self.segments[i];
            if !highways.contains(&segment.highway) { highways.push(segment.highway) }
            coords.push(*self.coords.get(&segment.to)?);
        }

        let highway = match highways.as_slice() {
            [single] => HighwayTag::from(*single),
            many => HighwayTag::from(many),
        };
        Some(RoadEdge { way_id: first.way_id, highway, geometry: LineString::from(coords), oneway: first.oneway })
    }
}

/// Union-find over dense node indices.
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(len: usize) -> Self { Self { parent: (0..len).collect() } }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b { self.parent[b.max(a)] = a.min(b) }
    }
}

/// Turn ways into a simplified drive graph.
///
/// Ways become directed segments (both directions for two-way roads), and only the
/// largest weakly connected component is kept. Segments are then merged into edges
/// between endpoints: nodes where roads meet, end, or change direction rules. A merged
/// edge spanning several `highway` values carries all of them, in order of appearance.
/// Closed loops without any endpoint stay as single segments.
pub fn simplify_ways(ways: &[OsmWay]) -> Vec<RoadEdge> {
    let graph = RoadGraph::from_ways(ways).largest_component();

    let endpoints: AHashSet<i64> = graph.segments.iter()
        .flat_map(|segment| [segment.from, segment.to])
        .filter(|&node| graph.is_endpoint(node))
        .collect();

    let mut used = vec![false; graph.segments.len()];
    let mut edges = Vec::new();
    for i in 0..graph.segments.len() {
        if used[i] || !endpoints.contains(&graph.segments[i].from) { continue }
        let path = graph.walk(i, &endpoints, &mut used);
        edges.extend(graph.edge(&path));
    }

    for i in 0..graph.segments.len() {
        if !used[i] { edges.extend(graph.edge(&[i])) }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn way(id: i64, nodes: &[i64], tags: &[(&str, &str)]) -> OsmWay {
        OsmWay {
            id,
            nodes: nodes.to_vec(),
            coords: nodes.iter().map(|&n| Coord { x: n as f64, y: 0.0 }).collect(),
            tags: tags.iter().map(|&(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn splits_at_junctions() {
        let ways = [
            way(1, &[1, 2, 3, 4, 5], &[("highway", "primary"), ("oneway", "yes")]),
            way(2, &[3, 10], &[("highway", "residential"), ("oneway", "yes")]),
        ];
        let edges = simplify_ways(&ways);

        let primary: Vec<_> = edges.iter().filter(|e| e.way_id == 1).collect();
        assert_eq!(primary.len(), 2);
        assert_eq!(primary[0].geometry.0.len(), 3); // 1-2-3
        assert_eq!(primary[1].geometry.0.len(), 3); // 3-4-5
        assert_eq!(edges.iter().filter(|e| e.way_id == 2).count(), 1);
        assert!(edges.iter().all(|e| e.oneway));
    }

    #[test]
    fn two_way_roads_yield_both_directions() {
        let edges = simplify_ways(&[way(7, &[1, 2, 3], &[("highway", "tertiary")])]);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].geometry.0.len(), 3);
        assert_eq!(edges[0].geometry.0.first(), edges[1].geometry.0.last());
        assert_eq!(edges[0].highway, HighwayTag::from("tertiary"));
        assert!(!edges[0].oneway);
    }

    #[test]
    fn roundabouts_and_reverse_oneways_are_single_edges() {
        let edges = simplify_ways(&[
            way(1, &[1, 2, 3], &[("highway", "primary"), ("junction", "roundabout")]),
            way(2, &[3, 4, 5], &[("highway", "primary"), ("oneway", "-1")]),
        ]);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].geometry.0[0], Coord { x: 5.0, y: 0.0 });
        assert_eq!(edges[1].geometry.0.last(), Some(&Coord { x: 3.0, y: 0.0 }));
    }

    #[test]
    fn chains_across_ways_merge_with_all_highway_values() {
        let edges = simplify_ways(&[
            way(1, &[1, 2, 3], &[("highway", "primary"), ("oneway", "yes")]),
            way(2, &[3, 4, 5], &[("highway", "secondary"), ("oneway", "yes")]),
        ]);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].highway, HighwayTag::from(&["primary", "secondary"][..]));
        assert_eq!(edges[0].geometry.0.len(), 5);
        assert_eq!(edges[0].way_id, 1);
    }

    #[test]
    fn two_way_chains_merge_per_direction() {
        let edges = simplify_ways(&[
            way(1, &[1, 2, 3], &[("highway", "residential")]),
            way(2, &[3, 4], &[("highway", "residential")]),
        ]);

        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.geometry.0.len() == 4));
        assert!(edges.iter().all(|e| e.highway == HighwayTag::from("residential")));
    }

    #[test]
    fn direction_change_ends_an_edge() {
        let edges = simplify_ways(&[
            way(1, &[1, 2, 3], &[("highway", "primary")]),
            way(2, &[3, 4, 5], &[("highway", "primary"), ("oneway", "yes")]),
        ]);
        // 1-2-3 in both directions, then 3-4-5 one way.
        assert_eq!(edges.len(), 3);
        assert_eq!(edges.iter().filter(|e| e.oneway).count(), 1);
    }

    #[test]
    fn only_the_largest_component_is_kept() {
        let edges = simplify_ways(&[
            way(1, &[1, 2, 3], &[("highway", "primary")]),
            way(2, &[3, 4, 5], &[("highway", "primary"), ("oneway", "yes")]),
            way(3, &[100, 101], &[("highway", "residential")]),
        ]);

        assert!(!edges.is_empty());
        assert!(edges.iter().all(|e| e.way_id != 3));
    }

    #[test]
    fn closed_loops_without_endpoints_are_kept_as_segments() {
        let edges = simplify_ways(&[way(1, &[1, 2, 3, 1], &[("highway", "residential"), ("oneway", "yes")])]);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.geometry.0.len() == 2));
    }

    #[test]
    fn untagged_and_degenerate_ways_are_skipped() {
        let edges = simplify_ways(&[
            way(1, &[1, 2], &[("name", "no highway")]),
            way(2, &[3], &[("highway", "primary")]),
        ]);
        assert!(edges.is_empty());
    }
}
