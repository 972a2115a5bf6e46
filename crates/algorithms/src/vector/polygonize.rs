//! Polygonization of a noded line arrangement
//!
//! Reconstructs the atomic faces of the planar subdivision implied by a
//! noded segment collection. Half-edges at each node are sorted by angle;
//! following the clockwise-most continuation from each edge traces every
//! face boundary exactly once. Counter-clockwise cycles are bounded faces;
//! the clockwise outer cycle of a connected component nested inside a face
//! of another component becomes a hole of that face.

use geo::{Contains, Coord, Line, LineString, Point, Polygon};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::vector::noding::snap_key;

/// Cycles with shoelace area below this are traversal artifacts, not faces.
const MIN_FACE_AREA: f64 = 1e-10;

/// Rebuild all atomic faces of the arrangement.
///
/// Input is expected to be noded (no two segments crossing away from their
/// endpoints); [`crate::vector::noded_arrangement`] produces such input.
/// Faces come out in deterministic edge-discovery order.
pub fn polygonize(lines: &[Line<f64>]) -> Vec<Polygon<f64>> {
    let graph = PlanarGraph::build(lines);
    let cycles = graph.trace_cycles();
    assemble_faces(cycles)
}

struct PlanarGraph {
    coords: Vec<Coord<f64>>,
    /// Half-edge h: origin/target node ids; twin is h ^ 1
    half_origin: Vec<usize>,
    half_target: Vec<usize>,
    /// Outgoing half-edges per node, sorted by direction angle
    outgoing: Vec<Vec<usize>>,
    /// Position of each half-edge within its origin node's outgoing list
    pos_in_node: Vec<usize>,
    /// Connected-component root per node
    component: Vec<usize>,
}

struct Cycle {
    /// Closed coordinate ring (first == last)
    ring: Vec<Coord<f64>>,
    /// Shoelace signed area; positive means counter-clockwise
    area: f64,
    component: usize,
}

impl PlanarGraph {
    fn build(lines: &[Line<f64>]) -> Self {
        let mut node_ids: HashMap<(i64, i64), usize> = HashMap::new();
        let mut coords: Vec<Coord<f64>> = Vec::new();
        let mut node_of = |c: Coord<f64>, coords: &mut Vec<Coord<f64>>| -> usize {
            let key = snap_key(c);
            *node_ids.entry(key).or_insert_with(|| {
                coords.push(c);
                coords.len() - 1
            })
        };

        let mut half_origin = Vec::new();
        let mut half_target = Vec::new();
        let mut edge_keys: HashSet<(usize, usize)> = HashSet::new();
        let mut parent: Vec<usize> = Vec::new();

        for line in lines {
            let u = node_of(line.start, &mut coords);
            let v = node_of(line.end, &mut coords);
            if u == v {
                continue;
            }
            let key = (u.min(v), u.max(v));
            if !edge_keys.insert(key) {
                continue;
            }
            half_origin.push(u);
            half_target.push(v);
            half_origin.push(v);
            half_target.push(u);

            while parent.len() < coords.len() {
                let next = parent.len();
                parent.push(next);
            }
            union(&mut parent, u, v);
        }
        while parent.len() < coords.len() {
            let next = parent.len();
            parent.push(next);
        }

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); coords.len()];
        for h in 0..half_origin.len() {
            outgoing[half_origin[h]].push(h);
        }
        let angle = |h: usize| -> f64 {
            let o = coords[half_origin[h]];
            let t = coords[half_target[h]];
            (t.y - o.y).atan2(t.x - o.x)
        };
        for list in &mut outgoing {
            list.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
        }
        let mut pos_in_node = vec![0usize; half_origin.len()];
        for list in &outgoing {
            for (pos, &h) in list.iter().enumerate() {
                pos_in_node[h] = pos;
            }
        }

        let component = (0..coords.len()).map(|n| find(&mut parent, n)).collect();

        Self {
            coords,
            half_origin,
            half_target,
            outgoing,
            pos_in_node,
            component,
        }
    }

    /// The face continuation of `h`: at its target node, the rotational
    /// predecessor of the twin half-edge. Keeps the face interior on the
    /// left, so bounded faces trace counter-clockwise.
    fn successor(&self, h: usize) -> usize {
        let node = self.half_target[h];
        let list = &self.outgoing[node];
        let pos = self.pos_in_node[h ^ 1];
        list[(pos + list.len() - 1) % list.len()]
    }

    fn trace_cycles(&self) -> Vec<Cycle> {
        let n_half = self.half_origin.len();
        let mut visited = vec![false; n_half];
        let mut cycles = Vec::new();

        for start in 0..n_half {
            if visited[start] {
                continue;
            }
            let mut ring = Vec::new();
            let mut h = start;
            let mut steps = 0usize;
            loop {
                visited[h] = true;
                ring.push(self.coords[self.half_origin[h]]);
                h = self.successor(h);
                steps += 1;
                if h == start || steps > n_half {
                    break;
                }
            }
            if ring.len() < 3 {
                continue;
            }
            ring.push(ring[0]);
            let area = shoelace(&ring);
            cycles.push(Cycle {
                ring,
                area,
                component: self.component[self.half_origin[start]],
            });
        }
        cycles
    }
}

fn find(parent: &mut Vec<usize>, mut n: usize) -> usize {
    while parent[n] != n {
        parent[n] = parent[parent[n]];
        n = parent[n];
    }
    n
}

fn union(parent: &mut Vec<usize>, a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[rb] = ra;
    }
}

fn shoelace(ring: &[Coord<f64>]) -> f64 {
    let mut sum = 0.0;
    for window in ring.windows(2) {
        sum += window[0].x * window[1].y - window[1].x * window[0].y;
    }
    sum / 2.0
}

/// Turn traced cycles into face polygons, assigning the outer boundary of
/// a nested component as a hole of the smallest face containing it.
fn assemble_faces(cycles: Vec<Cycle>) -> Vec<Polygon<f64>> {
    let mut shells: Vec<(Vec<Coord<f64>>, f64, usize)> = Vec::new();
    // One outer (clockwise) boundary per connected component
    let mut hulls: BTreeMap<usize, Vec<Coord<f64>>> = BTreeMap::new();
    let mut hull_area: BTreeMap<usize, f64> = BTreeMap::new();

    for cycle in cycles {
        if cycle.area > MIN_FACE_AREA {
            shells.push((cycle.ring, cycle.area, cycle.component));
        } else if cycle.area < -MIN_FACE_AREA {
            let best = hull_area.get(&cycle.component).copied().unwrap_or(0.0);
            if -cycle.area > best {
                hull_area.insert(cycle.component, -cycle.area);
                hulls.insert(cycle.component, cycle.ring);
            }
        }
    }

    let shell_polygons: Vec<Polygon<f64>> = shells
        .iter()
        .map(|(ring, _, _)| Polygon::new(LineString::from(ring.clone()), vec![]))
        .collect();

    let mut holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
    for (component, hull) in &hulls {
        let probe = Point::new(hull[0].x, hull[0].y);
        let parent = shells
            .iter()
            .enumerate()
            .filter(|(i, (_, _, shell_component))| {
                shell_component != component && shell_polygons[*i].contains(&probe)
            })
            .min_by(|(_, (_, area_a, _)), (_, (_, area_b, _))| area_a.total_cmp(area_b))
            .map(|(i, _)| i);
        if let Some(i) = parent {
            holes[i].push(LineString::from(hull.clone()));
        }
    }

    shells
        .into_iter()
        .zip(holes)
        .map(|((ring, _, _), interior)| Polygon::new(LineString::from(ring), interior))
        .collect()
}
