// extensions/easing.rs
//
// Interpolators: map a tween's linear progress to an eased progress.
// Pure math, no knowledge of actors or tweens.

use std::f32::consts::PI;

/// Maps linear progress `t` in [0, 1] to eased progress.
///
/// Implemented by the built-in [`Easing`] curves and by any `Fn(f32) -> f32`,
/// so games can plug in their own curves.
pub trait Interpolator: Send + Sync {
    fn interpolate(&self, t: f32) -> f32;
}

impl<F> Interpolator for F
where
    F: Fn(f32) -> f32 + Send + Sync,
{
    fn interpolate(&self, t: f32) -> f32 {
        self(t)
    }
}

/// Built-in easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Accelerate from rest.
    QuadIn,
    /// Decelerate to rest.
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineInOut,
    /// Pull back before moving.
    BackIn,
    /// Overshoot then settle.
    BackOut,
    /// Bouncy finish.
    BounceOut,
    /// Spring past the target a few times.
    ElasticOut,
}

const BACK: f32 = 1.70158;

impl Easing {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t.powi(2),
            Easing::QuadOut => out(t, |u| u.powi(2)),
            Easing::QuadInOut => in_out(t, |u| u.powi(2)),
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => out(t, |u| u.powi(3)),
            Easing::CubicInOut => in_out(t, |u| u.powi(3)),
            Easing::SineInOut => (1.0 - (PI * t).cos()) / 2.0,
            Easing::BackIn => back_in(t),
            Easing::BackOut => out(t, back_in),
            Easing::BounceOut => bounce_out(t),
            Easing::ElasticOut => elastic_out(t),
        }
    }
}

impl Interpolator for Easing {
    fn interpolate(&self, t: f32) -> f32 {
        self.apply(t)
    }
}

/// Mirror an ease-in curve into an ease-out curve.
#[inline]
fn out(t: f32, curve: impl Fn(f32) -> f32) -> f32 {
    1.0 - curve(1.0 - t)
}

/// Ease-in for the first half, ease-out for the second.
#[inline]
fn in_out(t: f32, curve: impl Fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        curve(2.0 * t) / 2.0
    } else {
        1.0 - curve(2.0 - 2.0 * t) / 2.0
    }
}

#[inline]
fn back_in(t: f32) -> f32 {
    (BACK + 1.0) * t.powi(3) - BACK * t.powi(2)
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    // (segment end, segment centre, floor) for each successive bounce
    const SEGMENTS: [(f32, f32, f32); 3] = [
        (2.0 / D, 1.5 / D, 0.75),
        (2.5 / D, 2.25 / D, 0.9375),
        (f32::INFINITY, 2.625 / D, 0.984375),
    ];

    if t < 1.0 / D {
        return N * t * t;
    }
    for (end, centre, floor) in SEGMENTS {
        if t < end {
            let u = t - centre;
            return N * u * u + floor;
        }
    }
    1.0
}

fn elastic_out(t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let period = 2.0 * PI / 3.0;
    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * period).sin() + 1.0
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate `from -> to` at linear progress `t` through `curve`.
#[inline]
pub fn ease(from: f32, to: f32, t: f32, curve: &dyn Interpolator) -> f32 {
    lerp(from, to, curve.interpolate(t))
}
