pub const PARTICLE_COUNT: usize = 100;
pub const RAIN_DROP_COUNT: usize = 80;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRanges {
    pub min_size: f64,
    pub max_size: f64,
    pub max_delay_s: f64,
    pub extra_duration_s: f64,
    pub base_duration_s: f64,
}

pub const AMBIENT: ParticleRanges = ParticleRanges {
    min_size: 1.0,
    max_size: 3.0,
    max_delay_s: 5.0,
    extra_duration_s: 5.0,
    base_duration_s: 5.0,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub size_px: f64,
    pub left_vw: f64,
    pub top_vh: f64,
    pub delay_s: f64,
    pub duration_s: f64,
}

impl Particle {
    pub fn style(&self) -> String {
        format!(
            "width: {size:.2}px; height: {size:.2}px; left: {left:.2}vw; top: {top:.2}vh; animation-delay: {delay:.2}s; animation-duration: {duration:.2}s;",
            size = self.size_px,
            left = self.left_vw,
            top = self.top_vh,
            delay = self.delay_s,
            duration = self.duration_s,
        )
    }
}

/// `random` must yield values in `[0, 1)`.
pub fn particle_field(
    count: usize,
    ranges: ParticleRanges,
    mut random: impl FnMut() -> f64,
) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            size_px: random() * (ranges.max_size - ranges.min_size) + ranges.min_size,
            left_vw: random() * 100.0,
            top_vh: random() * 100.0,
            delay_s: random() * ranges.max_delay_s,
            duration_s: random() * ranges.extra_duration_s + ranges.base_duration_s,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct RainDrop {
    pub left_vw: f64,
    pub delay_s: f64,
    pub duration_s: f64,
}

impl RainDrop {
    pub fn style(&self) -> String {
        format!(
            "left: {:.2}vw; animation-delay: {:.2}s; animation-duration: {:.2}s;",
            self.left_vw, self.delay_s, self.duration_s
        )
    }
}

pub fn rain_drops(count: usize, mut random: impl FnMut() -> f64) -> Vec<RainDrop> {
    (0..count)
        .map(|_| RainDrop {
            left_vw: random() * 100.0,
            delay_s: random() * 2.0,
            duration_s: random() * 0.5 + 0.5,
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub fn random_unit() -> f64 {
    js_sys::Math::random()
}

/// Host builds have no `Math.random`; every particle sits mid-range.
#[cfg(not(target_arch = "wasm32"))]
pub fn random_unit() -> f64 {
    0.5
}
