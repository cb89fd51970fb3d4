//! Shared SAH tree builder.
//!
//! Both tree levels are built here: the bottom level over one object's
//! triangle boxes, the top level over instance world boxes. Splits are
//! chosen by the surface-area heuristic evaluated at every sorted split
//! position on every axis.

use crate::node::BvhNode;
use luma_core::common::*;
use luma_core::geometry::Bounds3;

/// Result of a tree build: the node array (root at index 0) and the
/// primitive index permutation that leaf ranges refer to.
#[derive(Debug)]
pub struct BvhBuild {
    /// Tree nodes.
    pub nodes: Vec<BvhNode>,

    /// Maps permutation slots back to original primitive indices.
    pub order: Vec<u32>,
}

/// Builds a BVH over a list of boxed items.
///
/// * `boxes`     - One bounding box per primitive.
/// * `leaf_size` - Largest primitive count kept in a single leaf.
///
/// Panics on empty input; there is no structure to build.
pub fn build_bvh(boxes: &[Bounds3], leaf_size: usize) -> BvhBuild {
    assert!(!boxes.is_empty(), "BVH build over an empty primitive list");
    let leaf_size = leaf_size.max(1);

    let mut build = BvhBuild {
        nodes: Vec::with_capacity(2 * boxes.len()),
        order: (0..boxes.len() as u32).collect(),
    };
    build_range(boxes, &mut build, 0, boxes.len(), leaf_size);

    debug!(
        "built BVH: {} primitives, {} nodes, leaf size {}",
        boxes.len(),
        build.nodes.len(),
        leaf_size
    );
    build
}

/// Recursively builds the node covering permutation slots `[start, end)`,
/// returning its index.
fn build_range(
    boxes: &[Bounds3],
    build: &mut BvhBuild,
    start: usize,
    end: usize,
    leaf_size: usize,
) -> i32 {
    let count = end - start;

    let mut bounds = Bounds3::EMPTY;
    for &i in &build.order[start..end] {
        bounds = bounds.union(&boxes[i as usize]);
    }
    let raw_area = bounds.surface_area();
    bounds.enlarge(BOX_EPSILON);

    let node_idx = build.nodes.len() as i32;
    build.nodes.push(BvhNode {
        left: -1,
        right: -1,
        start: start as u32,
        count: count as u32,
        bounds,
    });

    if count <= leaf_size {
        return node_idx;
    }

    // Evaluate every split position on every axis; sorts are keyed by
    // centroid with the original index breaking ties, keeping builds
    // deterministic for duplicate centroids.
    let mut best_cost = INFINITY;
    let mut best_axis = None;
    let mut best_offset = 0;
    let mut left_area = vec![0.0; count];
    let mut right_area = vec![0.0; count + 1];

    for axis in 0..3 {
        sort_range(boxes, &mut build.order[start..end], axis);

        let mut acc = Bounds3::EMPTY;
        for i in 0..count {
            acc = acc.union(&boxes[build.order[start + i] as usize]);
            left_area[i] = acc.surface_area();
        }
        acc = Bounds3::EMPTY;
        for i in (0..count).rev() {
            acc = acc.union(&boxes[build.order[start + i] as usize]);
            right_area[i] = acc.surface_area();
        }

        for split in 1..count {
            let cost = left_area[split - 1] * split as Float
                + right_area[split] * (count - split) as Float;
            if cost < best_cost {
                best_cost = cost;
                best_axis = Some(axis);
                best_offset = split;
            }
        }
    }

    // Degenerate ranges (overlapping centroids) where no split beats the
    // whole-range leaf become leaves.
    let leaf_cost = raw_area * count as Float;
    let axis = match best_axis {
        Some(axis) if best_cost < leaf_cost => axis,
        _ => return node_idx,
    };

    sort_range(boxes, &mut build.order[start..end], axis);
    let mid = start + best_offset;
    let left = build_range(boxes, build, start, mid, leaf_size);
    let right = build_range(boxes, build, mid, end, leaf_size);
    build.nodes[node_idx as usize].left = left;
    build.nodes[node_idx as usize].right = right;
    node_idx
}

fn sort_range(boxes: &[Bounds3], order: &mut [u32], axis: usize) {
    order.sort_unstable_by(|&a, &b| {
        let ca = boxes[a as usize].centroid()[axis];
        let cb = boxes[b as usize].centroid()[axis];
        ca.total_cmp(&cb).then(a.cmp(&b))
    });
}
