use crate::foundation::math::lerp;
use crate::spec::model::{Animation, Layer, LinearAnimation, OrbitAnimation};
use crate::spec::props::Props;
use std::f64::consts::TAU;

/// Sample a linear track at `t` ms.
///
/// Returns `None` before the window opens, so the property keeps whatever value it already has.
/// An inverted window (`end < start`) resolves to `to` at every `t`; an empty one
/// (`end == start`) jumps to `to` at `start`.
pub fn sample_linear(anim: &LinearAnimation, t: f64) -> Option<f64> {
    if anim.end < anim.start {
        return Some(anim.to);
    }
    if t < anim.start {
        return None;
    }
    if t >= anim.end {
        return Some(anim.to);
    }
    let progress = (t - anim.start) / (anim.end - anim.start);
    Some(lerp(anim.from, anim.to, progress))
}

/// Sample an orbit track at `t` ms, returning `(x, y)`.
pub fn sample_orbit(anim: &OrbitAnimation, t: f64) -> (f64, f64) {
    let period = anim.period_ms;
    let phase = t.rem_euclid(period) / period;
    let theta = TAU * phase;
    (
        anim.center_x + anim.radius * theta.cos(),
        anim.center_y + anim.radius * theta.sin(),
    )
}

/// Resolve a layer's properties at elapsed time `t`.
///
/// Tracks are applied in list order onto a copy of `props`; a later track that writes a property
/// overrides an earlier one. Unsupported tracks leave the properties untouched.
pub fn evaluate_props(props: &Props, animations: &[Animation], t: f64) -> Props {
    let mut out = props.clone();
    for anim in animations {
        match anim {
            Animation::Linear(l) => {
                if let Some(v) = sample_linear(l, t) {
                    out.set_number(l.property.name(), v);
                }
            }
            Animation::Orbit(o) => {
                let (x, y) = sample_orbit(o, t);
                out.set_number("x", x);
                out.set_number("y", y);
            }
            Animation::Unsupported { property, .. } => {
                tracing::trace!(%property, "skipping unsupported animation track");
            }
        }
    }
    out
}

/// Resolve a layer at elapsed time `t`.
pub fn evaluate_layer(layer: &Layer, t: f64) -> Props {
    evaluate_props(&layer.props, &layer.animations, t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/evaluate.rs"]
mod tests;
