//! Tree traversal shared by both acceleration levels.

use crate::node::BvhNode;
use luma_core::geometry::Ray;
use luma_core::interaction::IntersectRecord;

/// A traversable tree level. The top and bottom levels differ only in what
/// happens at a leaf; the descent is shared as a provided method.
pub trait TraceLevel {
    /// The level's node array, root at index 0.
    fn nodes(&self) -> &[BvhNode];

    /// Notes the leaf about to be resolved in the record, so the two-phase
    /// protocol can reconstruct which leaf produced the hit.
    fn record_leaf(&self, rec: &mut IntersectRecord, leaf: i32);

    /// Resolves an exact intersection inside the leaf most recently noted
    /// in the record. Returns whether anything was hit.
    fn trace_in_detail(&self, ray: &Ray, rec: &mut IntersectRecord) -> bool;

    /// Descends the tree from `node_idx`: box-reject, delegate leaves to
    /// `trace_in_detail`, recurse into both children otherwise and keep the
    /// nearer of the two sub-hits.
    ///
    /// * `ray`      - The ray.
    /// * `node_idx` - Node to descend from.
    /// * `rec`      - Closest-hit record to update.
    fn trace_in_accel(&self, ray: &Ray, node_idx: i32, rec: &mut IntersectRecord) -> bool {
        let node = &self.nodes()[node_idx as usize];
        if !node.any_hit(ray) {
            return false;
        }
        if node.is_leaf() {
            self.record_leaf(rec, node_idx);
            return self.trace_in_detail(ray, rec);
        }

        let mut left_rec = rec.clone();
        let mut right_rec = rec.clone();
        let hit_left = self.trace_in_accel(ray, node.left, &mut left_rec);
        let hit_right = self.trace_in_accel(ray, node.right, &mut right_rec);

        if hit_left && (!hit_right || left_rec.t <= right_rec.t) {
            *rec = left_rec;
            true
        } else if hit_right {
            *rec = right_rec;
            true
        } else {
            false
        }
    }
}
