use crate::warm::{hsv_to_rgb8, lab_distance, to_lab};
use palette::Lab;
use rand::prelude::*;
use rand::rngs::StdRng;
use segviz_core::{Error, Result, Stage};
use tracing::warn;

/// Largest palette for which pairwise distinctness is guaranteed.
pub const MAX_DISTINCT_COLORS: usize = 64;

/// Minimum CIE76 distance between any two colors of a palette of at most
/// [`MAX_DISTINCT_COLORS`] entries.
pub const MIN_PERCEPTUAL_DISTANCE: f32 = 10.0;

const HUE_STEPS: usize = 72;
const HUE_STEP_DEGREES: f32 = 360.0 / HUE_STEPS as f32;

// Kept inside the warm band by a margin so 8-bit quantization cannot leave it.
const SATURATION_LEVELS: [f32; 5] = [0.55, 0.6, 0.65, 0.7, 0.75];
const VALUE_LEVELS: [f32; 9] = [0.35, 0.4, 0.45, 0.5, 0.55, 0.6, 0.65, 0.7, 0.75];

const RELAXATION_STEPS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    rgb: [u8; 3],
    lab: Lab,
}

/// Generates `n` mutually distinct warm colors.
///
/// Uses a random (non-deterministic) seed. For reproducible results, use
/// [`generate_palette_seeded`] instead.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    let seed = rand::thread_rng().next_u64();
    generate_palette_seeded(n, seed)
}

/// Signed entry point for counts that arrive from untyped sources.
///
/// Fails with `InvalidArgument` for negative counts.
pub fn try_generate_palette(n: i64) -> Result<Vec<[u8; 3]>> {
    let n = usize::try_from(n).map_err(|_| {
        Error::InvalidArgument(format!("palette size must be non-negative, got {n}"))
            .in_stage(Stage::Palette)
    })?;
    Ok(generate_palette(n))
}

/// Generates `n` mutually distinct warm colors with a deterministic seed.
///
/// # Algorithm
///
/// 1. Lay a lattice of candidates over the warm band, rotated by a random
///    hue offset, and convert each to L*a*b*.
/// 2. Pick a random first candidate, then repeatedly add the candidate
///    farthest from everything picked so far (max-min selection).
/// 3. Relax: move one end of the closest pair to the candidate that
///    maximizes its nearest-neighbour distance, while that strictly helps.
///
/// For `n <= MAX_DISTINCT_COLORS` every pair ends up at least
/// [`MIN_PERCEPTUAL_DISTANCE`] apart. Larger palettes are still returned
/// in full but may repeat colors.
pub fn generate_palette_seeded(n: usize, seed: u64) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    if n > MAX_DISTINCT_COLORS {
        warn!(
            requested = n,
            max = MAX_DISTINCT_COLORS,
            "palette larger than the distinct-color bound; colors may repeat"
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let hue_offset = rng.gen_range(0.0..HUE_STEP_DEGREES);
    let candidates = warm_candidates(hue_offset);

    let first = rng.gen_range(0..candidates.len());
    let mut chosen = farthest_point_selection(&candidates, first, n);
    if n <= MAX_DISTINCT_COLORS {
        relax(&candidates, &mut chosen);
    }

    chosen.into_iter().map(|i| candidates[i].rgb).collect()
}

fn warm_candidates(hue_offset: f32) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(HUE_STEPS * SATURATION_LEVELS.len() * VALUE_LEVELS.len());
    for step in 0..HUE_STEPS {
        let hue = step as f32 * HUE_STEP_DEGREES + hue_offset;
        for &s in &SATURATION_LEVELS {
            for &v in &VALUE_LEVELS {
                let rgb = hsv_to_rgb8(hue, s, v);
                out.push(Candidate {
                    rgb,
                    lab: to_lab(rgb),
                });
            }
        }
    }
    out
}

/// Greedy max-min selection. Returns `n` candidate indices; once every
/// candidate is taken the remaining slots repeat earlier picks.
fn farthest_point_selection(candidates: &[Candidate], first: usize, n: usize) -> Vec<usize> {
    let mut chosen = Vec::with_capacity(n);
    chosen.push(first);

    let mut nearest: Vec<f32> = candidates
        .iter()
        .map(|c| lab_distance(&c.lab, &candidates[first].lab))
        .collect();

    while chosen.len() < n {
        let next = argmax(&nearest);
        chosen.push(next);
        for (d, c) in nearest.iter_mut().zip(candidates) {
            *d = d.min(lab_distance(&c.lab, &candidates[next].lab));
        }
    }
    chosen
}

fn relax(candidates: &[Candidate], chosen: &mut [usize]) {
    for _ in 0..RELAXATION_STEPS {
        let Some((i, j, worst)) = closest_pair(candidates, chosen) else {
            return;
        };
        let moved = [i, j]
            .into_iter()
            .any(|slot| try_move(candidates, chosen, slot, worst));
        if !moved {
            return;
        }
    }
}

fn closest_pair(candidates: &[Candidate], chosen: &[usize]) -> Option<(usize, usize, f32)> {
    let mut best: Option<(usize, usize, f32)> = None;
    for i in 0..chosen.len() {
        for j in (i + 1)..chosen.len() {
            let d = lab_distance(&candidates[chosen[i]].lab, &candidates[chosen[j]].lab);
            if best.map_or(true, |(_, _, b)| d < b) {
                best = Some((i, j, d));
            }
        }
    }
    best
}

/// Moves `chosen[slot]` to the candidate farthest from every other pick,
/// if that beats `current`.
fn try_move(candidates: &[Candidate], chosen: &mut [usize], slot: usize, current: f32) -> bool {
    let nearest_other = |c: &Candidate| {
        chosen
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != slot)
            .map(|(_, &other)| lab_distance(&c.lab, &candidates[other].lab))
            .fold(f32::INFINITY, f32::min)
    };

    let scores: Vec<f32> = candidates.iter().map(nearest_other).collect();
    let best = argmax(&scores);
    if scores[best] > current {
        chosen[slot] = best;
        true
    } else {
        false
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
