use egui::{Color32, FontId, Rounding, Stroke, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(13, 15, 38);
pub const BG_PANEL: Color32 = Color32::from_rgb(17, 20, 51);
pub const BG_HEADER: Color32 = Color32::from_rgb(24, 27, 66);
pub const BG_FIELD: Color32 = Color32::from_rgb(17, 20, 51);
pub const BG_ROW_ALT: Color32 = Color32::from_rgb(20, 23, 58);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(90, 110, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(44, 48, 96);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(62, 68, 134);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(236, 238, 250);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(174, 180, 228);
pub const TEXT_DIM: Color32 = Color32::from_rgb(110, 116, 160);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);
pub const LINK: Color32 = Color32::from_rgb(142, 161, 255);

pub const ACCENT: Color32 = Color32::from_rgb(96, 112, 240);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const TODAY_CELL: Color32 = Color32::from_rgba_premultiplied(120, 30, 30, 90);
pub const GRID_LINE: Color32 = Color32::from_rgb(32, 36, 78);
pub const WEEKEND_CELL: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 40);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const MONTH_ROW_HEIGHT: f32 = 22.0;
pub const DAY_ROW_HEIGHT: f32 = 22.0;
pub const HEADER_HEIGHT: f32 = MONTH_ROW_HEIGHT + DAY_ROW_HEIGHT;
pub const BAR_ROUNDING: f32 = 6.0;
pub const BAR_INSET: f32 = 8.0; // vertical inset so bars don't touch row edges
pub const STATUS_BAR_HEIGHT: f32 = 22.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

// ── Block color palette ──────────────────────────────────────────────────────

pub const BLOCK_COLORS: &[Color32] = &[
    Color32::from_rgb(96, 112, 240),  // Indigo
    Color32::from_rgb(52, 168, 83),   // Green
    Color32::from_rgb(171, 71, 188),  // Purple
    Color32::from_rgb(251, 140, 0),   // Orange
    Color32::from_rgb(3, 169, 244),   // Light blue
    Color32::from_rgb(229, 57, 53),   // Red
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 179, 0),   // Amber
];

/// Stable color for an event row.
pub fn block_color(event_id: i64) -> Color32 {
    BLOCK_COLORS[event_id.rem_euclid(BLOCK_COLORS.len() as i64) as usize]
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_FIELD; // TextEdit bg
    visuals.faint_bg_color = BG_ROW_ALT;
    visuals.hyperlink_color = LINK;

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(8.0);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(30, 34, 80);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_ACCENT);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(8.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(40, 45, 100);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(8.0);

    visuals.widgets.active.bg_fill = Color32::from_rgb(50, 56, 120);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    visuals.widgets.active.rounding = Rounding::same(8.0);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(10.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_ACCENT);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_color_handles_negative_ids() {
        assert_eq!(block_color(0), BLOCK_COLORS[0]);
        assert_eq!(block_color(-1), BLOCK_COLORS[BLOCK_COLORS.len() - 1]);
        assert_eq!(block_color(9), BLOCK_COLORS[1]);
    }
}
