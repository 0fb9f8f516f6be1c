use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::analysis::network::NodeKind;
use crate::config::AppConfig;
use crate::data::model::HumanDevelopment;

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

/// Parse `#rrggbb` / `#rgb` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let rgb = Srgb::<u8>::from_str(hex.trim()).ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

pub fn to_hex(color: Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

// ---------------------------------------------------------------------------
// Level colours: development level → Color32
// ---------------------------------------------------------------------------

/// Colours for the four development levels plus the network accent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelColors {
    /// Ordered Very High, High, Medium, Low, as in the configuration.
    pub levels: [Color32; 4],
    pub accent: Color32,
}

impl LevelColors {
    /// Build from configuration; unparseable entries fall back to an evenly
    /// spaced palette colour.
    pub fn from_config(config: &AppConfig) -> Self {
        let fallback = generate_palette(5);
        let mut levels = [Color32::GRAY; 4];
        for (i, (slot, hex)) in levels.iter_mut().zip(&config.level_colors).enumerate() {
            *slot = parse_hex(hex).unwrap_or_else(|| {
                log::warn!("Invalid level colour '{hex}', using a generated one");
                fallback[i]
            });
        }
        let accent = parse_hex(&config.network_accent).unwrap_or(fallback[4]);
        LevelColors { levels, accent }
    }

    fn slot(level: HumanDevelopment) -> usize {
        match level {
            HumanDevelopment::VeryHigh => 0,
            HumanDevelopment::High => 1,
            HumanDevelopment::Medium => 2,
            HumanDevelopment::Low => 3,
        }
    }

    pub fn color_for(&self, level: HumanDevelopment) -> Color32 {
        self.levels[Self::slot(level)]
    }

    pub fn color_mut(&mut self, level: HumanDevelopment) -> &mut Color32 {
        &mut self.levels[Self::slot(level)]
    }

    pub fn node_color(&self, node: &NodeKind) -> Color32 {
        match node {
            NodeKind::Level(level) => self.color_for(*level),
            NodeKind::Iso(_) => self.accent,
        }
    }

    /// Legend entries (label → colour), Very High first.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        HumanDevelopment::ALL
            .iter()
            .rev()
            .map(|level| (level.to_string(), self.color_for(*level)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_configured_hex() {
        assert_eq!(parse_hex("#39B5E0"), Some(Color32::from_rgb(0x39, 0xB5, 0xE0)));
        assert_eq!(parse_hex("fff"), Some(Color32::WHITE));
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(to_hex(Color32::from_rgb(0xEA, 0x16, 0x8E)), "#EA168E");
    }

    #[test]
    fn defaults_map_levels_in_config_order() {
        let colors = LevelColors::from_config(&AppConfig::default());
        assert_eq!(
            colors.color_for(HumanDevelopment::VeryHigh),
            Color32::from_rgb(0x39, 0xB5, 0xE0)
        );
        assert_eq!(
            colors.color_for(HumanDevelopment::Low),
            Color32::from_rgb(0xF5, 0xEA, 0x5A)
        );
        assert_eq!(colors.node_color(&NodeKind::Iso("ISL".into())), colors.accent);
    }

    #[test]
    fn invalid_colour_falls_back_to_palette() {
        let mut config = AppConfig::default();
        config.level_colors[2] = "not a colour".into();
        let colors = LevelColors::from_config(&config);
        assert_eq!(colors.color_for(HumanDevelopment::Medium), generate_palette(5)[2]);
    }

    #[test]
    fn palette_is_distinct() {
        let palette = generate_palette(10);
        assert_eq!(palette.len(), 10);
        for (i, a) in palette.iter().enumerate() {
            assert!(palette[i + 1..].iter().all(|b| a != b));
        }
    }
}
