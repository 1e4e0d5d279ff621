//! Diverging color scale for accumulated temperature
//!
//! Values are clipped to [-4, 4] °C and rescaled to [0, 1] before lookup.
//! The ramp runs dark blue -> white -> dark red and is centred on 0.5.

use serde::{Deserialize, Serialize};

/// Lower edge of the color domain (°C)
pub const DOMAIN_MIN: f64 = -4.0;
/// Upper edge of the color domain (°C)
pub const DOMAIN_MAX: f64 = 4.0;

/// Clip to the color domain and rescale linearly to [0, 1].
pub fn normalize(value: f64) -> f64 {
    if value.is_nan() {
        return 0.5;
    }
    let clipped = value.clamp(DOMAIN_MIN, DOMAIN_MAX);
    (clipped - DOMAIN_MIN) / (DOMAIN_MAX - DOMAIN_MIN)
}

/// Inverse of `normalize` inside the domain
pub fn denormalize(t: f64) -> f64 {
    DOMAIN_MIN + t.clamp(0.0, 1.0) * (DOMAIN_MAX - DOMAIN_MIN)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex string, e.g. `#f1edec`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear blend towards `other`; `amount` 0 keeps self, 1 gives other
    pub fn blend(&self, other: Rgb8, amount: f64) -> Rgb8 {
        let a = amount.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - a) + y as f64 * a).round() as u8;
        Rgb8::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Piecewise-linear colormap over [0, 1].
#[derive(Clone, Debug)]
pub struct Colormap {
    stops: Vec<(f64, Rgb8)>,
}

impl Colormap {
    /// Build from (position, color) stops sorted by position, spanning 0 to 1.
    pub fn from_stops(stops: Vec<(f64, Rgb8)>) -> Self {
        debug_assert!(stops.len() >= 2);
        debug_assert!(stops.windows(2).all(|w| w[0].0 < w[1].0));
        Self { stops }
    }

    /// Blue-white-red ramp modelled on the oceanographic "balance" map.
    pub fn balance() -> Self {
        Self::from_stops(vec![
            (0.000, Rgb8::new(24, 28, 67)),
            (0.125, Rgb8::new(28, 60, 150)),
            (0.250, Rgb8::new(38, 110, 185)),
            (0.375, Rgb8::new(135, 168, 200)),
            (0.500, Rgb8::new(241, 237, 236)),
            (0.625, Rgb8::new(214, 152, 128)),
            (0.750, Rgb8::new(190, 82, 62)),
            (0.875, Rgb8::new(145, 28, 38)),
            (1.000, Rgb8::new(60, 9, 18)),
        ])
    }

    /// Color at position `t`, clamped to [0, 1]
    pub fn sample(&self, t: f64) -> Rgb8 {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let first = self.stops[0];
        if t <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (p0, c0) = pair[0];
            let (p1, c1) = pair[1];
            if t <= p1 {
                let local = (t - p0) / (p1 - p0);
                return c0.blend(c1, local);
            }
        }
        self.stops[self.stops.len() - 1].1
    }

    /// Color for a temperature value in °C
    pub fn color_for(&self, value: f64) -> Rgb8 {
        self.sample(normalize(value))
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::balance()
    }
}
