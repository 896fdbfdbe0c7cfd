use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

/// House accent, a medium blue. Single-series charts are drawn in it.
pub const ACCENT: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);

/// The accent with most of its opacity removed, for dense scatter clouds.
pub fn accent_translucent() -> Color32 {
    ACCENT.gamma_multiply(0.35)
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sequential ramp for the correlation heatmap
// ---------------------------------------------------------------------------

/// Pale-to-deep blue ramp, blended in linear light. `t` is clamped to
/// `[0, 1]`.
pub fn sequential_blues(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let light = Srgb::new(0.87_f32, 0.92, 0.97).into_linear();
    let dark = Srgb::new(0.03_f32, 0.19, 0.42).into_linear();
    let rgb: Srgb = Srgb::from_linear(light.mix(dark, t));
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_hues() {
        assert!(generate_palette(0).is_empty());
        let palette = generate_palette(6);
        assert_eq!(palette.len(), 6);
        for pair in palette.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn blues_ramp_darkens_and_clamps() {
        let low = sequential_blues(0.0);
        let high = sequential_blues(1.0);
        assert!(low.r() > high.r());
        assert!(low.g() > high.g());
        assert_eq!(sequential_blues(-3.0), low);
        assert_eq!(sequential_blues(7.0), high);
    }
}
