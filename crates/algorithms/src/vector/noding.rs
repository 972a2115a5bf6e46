//! Segment noding
//!
//! Turns a collection of boundary rings into a noded planar arrangement:
//! every segment crossing becomes an explicit vertex, collinear overlaps
//! are split at each other's endpoints, and duplicate edges collapse to
//! one. The arrangement feeds the polygonizer.
//!
//! Two-tier union: the fast path nodes all segments from both inputs in a
//! single pass under a tight per-segment split budget. If it fails with a
//! kernel error (non-finite coordinate or budget exhaustion), each ring set
//! is noded independently and the two pre-noded sets are merged under a
//! widened budget — the slower pairwise union. A second failure propagates
//! to the caller.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, LineString};
use std::collections::HashSet;
use stratagis_core::{Error, Result};
use tracing::warn;

/// Snap grid used to identify coincident vertices after splitting.
const SNAP_SCALE: f64 = 1e9;

/// Splits per segment above which the fast pass gives up.
const MAX_SPLITS_PER_SEGMENT: usize = 4096;

/// Budget multiplier for the fallback pass, which works on pre-noded
/// (shorter) segments and so may legitimately carry denser crossings.
const FALLBACK_BUDGET_FACTOR: usize = 4;

/// Quantized vertex key; coordinates closer than the snap tolerance
/// collapse to one node.
pub(crate) fn snap_key(c: Coord<f64>) -> (i64, i64) {
    (
        (c.x * SNAP_SCALE).round() as i64,
        (c.y * SNAP_SCALE).round() as i64,
    )
}

/// Flatten rings into their line segments, dropping zero-length ones.
fn ring_segments(rings: &[LineString<f64>]) -> Vec<Line<f64>> {
    rings
        .iter()
        .flat_map(|ring| ring.lines())
        .filter(|line| snap_key(line.start) != snap_key(line.end))
        .collect()
}

fn bbox_overlap(a: &Line<f64>, b: &Line<f64>) -> bool {
    a.start.x.min(a.end.x) <= b.start.x.max(b.end.x)
        && a.start.x.max(a.end.x) >= b.start.x.min(b.end.x)
        && a.start.y.min(a.end.y) <= b.start.y.max(b.end.y)
        && a.start.y.max(a.end.y) >= b.start.y.min(b.end.y)
}

/// Split every segment at its intersections with every other segment.
///
/// Output segments are deduplicated by snapped endpoint pair, so shared
/// boundaries between the two inputs collapse to single edges.
fn node_segments(segments: &[Line<f64>], budget: usize) -> Result<Vec<Line<f64>>> {
    for line in segments {
        if !(line.start.x.is_finite()
            && line.start.y.is_finite()
            && line.end.x.is_finite()
            && line.end.y.is_finite())
        {
            return Err(Error::GeometryKernel(
                "non-finite coordinate in ring arrangement".to_string(),
            ));
        }
    }

    let mut seen: HashSet<((i64, i64), (i64, i64))> = HashSet::new();
    let mut out = Vec::with_capacity(segments.len());

    for (i, line) in segments.iter().enumerate() {
        let mut cuts: Vec<Coord<f64>> = vec![line.start, line.end];
        for (j, other) in segments.iter().enumerate() {
            if i == j || !bbox_overlap(line, other) {
                continue;
            }
            match line_intersection(*line, *other) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    cuts.push(intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    cuts.push(intersection.start);
                    cuts.push(intersection.end);
                }
                None => {}
            }
            if cuts.len() > budget {
                return Err(Error::GeometryKernel(format!(
                    "noding budget exceeded: segment {} split more than {} times",
                    i, budget
                )));
            }
        }

        // Order cut points along the segment
        let dx = line.end.x - line.start.x;
        let dy = line.end.y - line.start.y;
        let len2 = dx * dx + dy * dy;
        cuts.sort_by(|p, q| {
            let tp = ((p.x - line.start.x) * dx + (p.y - line.start.y) * dy) / len2;
            let tq = ((q.x - line.start.x) * dx + (q.y - line.start.y) * dy) / len2;
            tp.total_cmp(&tq)
        });
        cuts.dedup_by_key(|c| snap_key(*c));

        for window in cuts.windows(2) {
            let (p, q) = (window[0], window[1]);
            let (kp, kq) = (snap_key(p), snap_key(q));
            if kp == kq {
                continue;
            }
            let edge_key = if kp < kq { (kp, kq) } else { (kq, kp) };
            if seen.insert(edge_key) {
                out.push(Line::new(p, q));
            }
        }
    }

    Ok(out)
}

/// Union the rings of both inputs into one noded line arrangement.
///
/// Tries the fast single-pass noding first; on a recoverable kernel error
/// falls back to noding each ring set independently and merging the two
/// pre-noded sets under a widened split budget.
pub fn noded_arrangement(
    rings_a: &[LineString<f64>],
    rings_b: &[LineString<f64>],
) -> Result<Vec<Line<f64>>> {
    let mut all = ring_segments(rings_a);
    all.extend(ring_segments(rings_b));

    match node_segments(&all, MAX_SPLITS_PER_SEGMENT) {
        Ok(lines) => Ok(lines),
        Err(Error::GeometryKernel(msg)) => {
            warn!(error = %msg, "fast noded union failed, retrying with pairwise union");
            let noded_a = node_segments(&ring_segments(rings_a), MAX_SPLITS_PER_SEGMENT)?;
            let noded_b = node_segments(&ring_segments(rings_b), MAX_SPLITS_PER_SEGMENT)?;
            let merged: Vec<Line<f64>> = noded_a.into_iter().chain(noded_b).collect();
            node_segments(&merged, MAX_SPLITS_PER_SEGMENT * FALLBACK_BUDGET_FACTOR)
        }
        Err(e) => Err(e),
    }
}
