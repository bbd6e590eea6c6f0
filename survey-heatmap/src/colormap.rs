pub type Rgba8 = [u8; 4];

const PLASMA_STOPS: [[u8; 3]; 11] = [
    [0x0d, 0x08, 0x87],
    [0x41, 0x04, 0x9d],
    [0x6a, 0x00, 0xa8],
    [0x8f, 0x0d, 0xa4],
    [0xb1, 0x2a, 0x90],
    [0xcc, 0x47, 0x78],
    [0xe1, 0x64, 0x62],
    [0xf2, 0x84, 0x4b],
    [0xfc, 0xa6, 0x36],
    [0xfc, 0xce, 0x25],
    [0xf0, 0xf9, 0x21],
];

pub const COLORBAR_MIN: f64 = 1.0;
pub const COLORBAR_MAX: f64 = 10.0;
pub const COLORBAR_TITLE: &str = "Image count";

pub const BACKGROUND: Rgba8 = [220, 220, 220, 255];
pub const UNCOVERED: Rgba8 = [200, 200, 200, 255];
pub const OUTSIDE: Rgba8 = [0, 0, 0, 0];

pub fn normalize(value: f64) -> f64 {
    let norm = if value > 0.0 {
        value * 10.0 / 100.0
    } else {
        value / 100.0
    };
    if norm.is_nan() {
        return 0.0;
    }
    norm.clamp(0.0, 1.0)
}

pub fn plasma(t: f64) -> Rgba8 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (PLASMA_STOPS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(PLASMA_STOPS.len() - 2);
    let frac = scaled - lower as f64;
    let a = PLASMA_STOPS[lower];
    let b = PLASMA_STOPS[lower + 1];
    let lerp = |i: usize| -> u8 {
        let value = a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac;
        value.clamp(0.0, 255.0) as u8
    };
    [lerp(0), lerp(1), lerp(2), 255]
}

pub fn value_to_color(value: f64) -> Rgba8 {
    plasma(normalize(value))
}

pub fn colorbar_value(row: u32, height: u32) -> f64 {
    if height == 0 {
        return COLORBAR_MIN;
    }
    let fraction = (height - row.min(height)) as f64 / height as f64;
    COLORBAR_MIN + fraction * (COLORBAR_MAX - COLORBAR_MIN)
}
