/// Spreads label heights so neighbours are at least `min_gap` apart inside `[lo, hi]`.
///
/// Input order is preserved in the output. Labels already far enough apart
/// keep their anchor heights. If the labels cannot all fit, the lowest ones
/// are pinned to `lo`.
pub fn spread_labels(anchors: &[f64], min_gap: f64, lo: f64, hi: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..anchors.len()).collect();
    order.sort_by(|&a, &b| anchors[a].total_cmp(&anchors[b]));

    let mut placed: Vec<f64> = order.iter().map(|&i| anchors[i].clamp(lo, hi)).collect();

    for i in 1..placed.len() {
        placed[i] = placed[i].max(placed[i - 1] + min_gap);
    }
    if let Some(last) = placed.last_mut() {
        *last = last.min(hi);
    }
    for i in (0..placed.len().saturating_sub(1)).rev() {
        placed[i] = placed[i].min(placed[i + 1] - min_gap);
    }
    for y in &mut placed {
        *y = y.max(lo);
    }

    let mut out = vec![0.0; anchors.len()];
    for (slot, &i) in order.iter().enumerate() {
        out[i] = placed[slot];
    }
    out
}
