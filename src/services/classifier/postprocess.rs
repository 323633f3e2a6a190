use crate::config::ScoreActivation;
use crate::models::classify_types::Category;

pub fn apply_activation(raw: &[f32], activation: ScoreActivation) -> Vec<f32> {
    match activation {
        ScoreActivation::Identity => raw.to_vec(),
        ScoreActivation::Sigmoid => raw.iter().map(|&x| 1.0 / (1.0 + (-x).exp())).collect(),
        ScoreActivation::Softmax => {
            let max_logit = raw.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            let exp_sum: f32 = raw.iter().map(|&x| (x - max_logit).exp()).sum();
            raw.iter().map(|&x| (x - max_logit).exp() / exp_sum).collect()
        }
    }
}

/// Pair scores with labels, keep those at or above `threshold`, best first,
/// at most `max_results` of them. Equal scores keep model output order.
pub fn rank_categories(
    scores: &[f32],
    labels: &[String],
    threshold: f32,
    max_results: usize,
) -> Vec<Category> {
    let mut indexed: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| !score.is_nan() && *score >= threshold)
        .collect();

    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(max_results);

    indexed
        .into_iter()
        .map(|(idx, score)| Category {
            label: labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", idx)),
            score,
        })
        .collect()
}
