use crate::config::options::FrameSamples;

/// Whole-frame steps from `from` while `f < until`. Stops early once `f + 1.0` no longer
/// advances in `f64`.
fn frames(from: f64, until: f64) -> impl Iterator<Item = f64> {
    std::iter::successors(Some(from), |f| {
        let next = f + 1.0;
        (next > *f).then_some(next)
    })
    .take_while(move |f| *f < until)
}

/// Absolute evaluation instants for an inclusive frame range, produced lazily.
///
/// For every whole-frame step `i` from `start` while `i < end + 1`, each sample offset is added in
/// ascending order. `[5, 5]` with samples `{0.0, 0.5}` yields `[5.0, 5.5]`; an inverted range
/// yields nothing.
pub fn schedule(start: f64, end: f64, samples: &FrameSamples) -> impl Iterator<Item = f64> + '_ {
    frames(start, end + 1.0)
        .flat_map(move |frame| samples.as_slice().iter().map(move |s| frame + s))
}

/// Instants visited before `start` to let the host settle, one per whole frame.
///
/// Starts at `start - pre_roll` and stops strictly before `start`. Non-positive pre-roll yields
/// nothing.
pub fn preroll_frames(start: f64, pre_roll: f64) -> impl Iterator<Item = f64> {
    let from = if pre_roll > 0.0 { start - pre_roll } else { start };
    frames(from, start)
}

#[cfg(test)]
#[path = "../tests/unit/schedule.rs"]
mod tests;
