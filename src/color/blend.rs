use bevy::prelude::*;

use super::{BiomeTags, ColorProvider, NO_TINT};

#[inline]
fn unpack(color: u32) -> Vec3 {
    Vec3::new(
        ((color >> 16) & 0xFF) as f32,
        ((color >> 8) & 0xFF) as f32,
        (color & 0xFF) as f32,
    )
}

#[inline]
fn pack(rgb: Vec3) -> u32 {
    let rgb = rgb.round().clamp(Vec3::ZERO, Vec3::splat(255.0));
    ((rgb.x as u32) << 16) | ((rgb.y as u32) << 8) | rgb.z as u32
}

/// Tint `original` towards `overlay` by `multiplier` (0 = original, 1 = overlay).
/// A negative multiplier returns the overlay unchanged.
pub fn blend_color(original: u32, overlay: u32, multiplier: f32) -> u32 {
    if multiplier < 0.0 {
        return overlay & 0xFFFFFF;
    }
    pack(unpack(original).lerp(unpack(overlay), multiplier))
}

/// `weight` of `a` plus `1 - weight` of `b`, per channel.
pub fn mix_colors(a: u32, b: u32, weight: f32) -> u32 {
    pack(unpack(b).lerp(unpack(a), weight))
}

/// Seasonal grass colour for a biome. Overlays of [`NO_TINT`] keep the original.
pub fn seasonal_grass_color(provider: ColorProvider, biome: &BiomeTags, original: u32) -> u32 {
    let colors = provider.colors();
    if biome.blacklisted || colors.grass_overlay == NO_TINT {
        return original;
    }
    blend_color(original, colors.grass_overlay, colors.grass_saturation)
}

pub fn seasonal_foliage_color(provider: ColorProvider, biome: &BiomeTags, original: u32) -> u32 {
    let colors = provider.colors();
    if biome.blacklisted || colors.foliage_overlay == NO_TINT {
        return original;
    }
    blend_color(original, colors.foliage_overlay, colors.foliage_saturation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::SubSeason;

    const GRASS: u32 = 0x79C05A;

    #[test]
    fn negative_multiplier_returns_overlay() {
        for original in [0x000000, 0xFFFFFF, GRASS, 0x123456] {
            assert_eq!(blend_color(original, 0xEF2121, -1.0), 0xEF2121);
        }
    }

    #[test]
    fn zero_multiplier_keeps_original() {
        assert_eq!(blend_color(GRASS, 0xAF4F4F, 0.0), GRASS);
    }

    #[test]
    fn full_multiplier_gives_overlay() {
        assert_eq!(blend_color(GRASS, 0xAF4F4F, 1.0), 0xAF4F4F);
    }

    #[test]
    fn channels_blend_independently() {
        // 0x00 -> 0xFF per channel at one half rounds to 0x80 (127.5 rounds up).
        assert_eq!(blend_color(0x00FF00, 0xFF00FF, 0.5), 0x808080);
        assert_eq!(blend_color(0x000000, 0x640000, 0.25), 0x190000);
    }

    #[test]
    fn lesser_change_mix_weights_seasonal_three_quarters() {
        // Red: 0.75 * 0xE2 + 0.25 * 0x80 = 169.5 + 32 = 201.5 -> 202
        // Green: 0.75 * 0xA2 + 0.25 * 0xA7 = 121.5 + 41.75 = 163.25 -> 163
        // Blue: 0.75 * 0x31 + 0.25 * 0x55 = 36.75 + 21.25 = 58
        let mixed = mix_colors(0xE2A231, 0x80A755, 0.75);
        assert_eq!(mixed, (202 << 16) | (163 << 8) | 58);
    }

    #[test]
    fn mix_extremes() {
        assert_eq!(mix_colors(0x112233, 0x445566, 1.0), 0x112233);
        assert_eq!(mix_colors(0x112233, 0x445566, 0.0), 0x445566);
    }

    #[test]
    fn out_of_range_multiplier_is_clamped_per_channel() {
        assert_eq!(blend_color(0x000000, 0xFFFFFF, 2.0), 0xFFFFFF);
    }

    #[test]
    fn untinted_season_keeps_original_grass() {
        let provider = ColorProvider::Standard(SubSeason::MidSummer);
        assert_eq!(seasonal_grass_color(provider, &BiomeTags::default(), GRASS), GRASS);
        assert_eq!(seasonal_foliage_color(provider, &BiomeTags::default(), GRASS), GRASS);
    }

    #[test]
    fn blacklisted_biome_keeps_original() {
        let provider = ColorProvider::Standard(SubSeason::MidAutumn);
        let tags = BiomeTags {
            blacklisted: true,
            ..default()
        };
        assert_eq!(seasonal_foliage_color(provider, &tags, GRASS), GRASS);
    }

    #[test]
    fn autumn_foliage_is_replaced() {
        let provider = ColorProvider::Standard(SubSeason::MidAutumn);
        assert_eq!(
            seasonal_foliage_color(provider, &BiomeTags::default(), GRASS),
            0xEF2121
        );
    }

    #[test]
    fn winter_grass_is_weighted() {
        let provider = ColorProvider::Standard(SubSeason::MidWinter);
        let expected = blend_color(GRASS, 0xAF4F4F, 0.45);
        assert_eq!(seasonal_grass_color(provider, &BiomeTags::default(), GRASS), expected);
        assert_ne!(expected, GRASS);
        assert_ne!(expected, 0xAF4F4F);
    }
}
