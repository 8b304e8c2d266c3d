// File: crates/pullscope-core/src/grid.rs
// Summary: Grid/tick layout helpers (evenly spaced and "nice" steps).

/// Round a raw step to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(range: f64, target_ticks: usize) -> f64 {
    let target = target_ticks.max(1) as f64;
    let raw = range.abs() / target;
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Multiples of `step` inside `[min, max]`, capped at `limit` entries.
pub fn ticks_with_step(min: f64, max: f64, step: f64, limit: usize) -> Vec<f64> {
    if !(step > 0.0) || !(max >= min) {
        return Vec::new();
    }
    let first = (min / step).ceil() * step;
    let mut out = Vec::new();
    let mut i = 0usize;
    while out.len() < limit {
        let v = first + step * i as f64;
        if v > max + step * 1e-9 { break; }
        out.push(v);
        i += 1;
    }
    out
}

/// "Nice" value ticks for a linear axis.
pub fn nice_ticks(min: f64, max: f64, target_ticks: usize) -> Vec<f64> {
    let step = nice_step(max - min, target_ticks);
    ticks_with_step(min, max, step, target_ticks.saturating_mul(3).max(2))
}
