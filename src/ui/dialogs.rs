use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Window};
use egui_phosphor::regular as icons;

use crate::app::{Selection, TimelineApp};
use crate::ui::theme;

const DETAILS_WIDTH: f32 = 380.0;

/// `dd.mm.yyyy — dd.mm.yyyy`, with `?` for a date the API did not give us.
pub fn format_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let fmt = |d: Option<NaiveDate>| {
        d.map(|d| d.format("%d.%m.%Y").to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    format!("{} — {}", fmt(start), fmt(end))
}

/// Render the details window for the selected block or event.
pub fn show_details_dialog(app: &mut TimelineApp, ctx: &Context) {
    let Some(selection) = &app.selection else {
        return;
    };

    let mut should_close = false;
    let mut open_url: Option<String> = None;

    let (title, range, description, link, extra) = match selection {
        Selection::Block(block) => (
            block.name.as_str(),
            Some(format_range(block.start_date, block.end_date)),
            block.description.as_deref(),
            block.link.as_deref(),
            None,
        ),
        Selection::Event(event) => (
            event.name.as_str(),
            None,
            event.description.as_deref(),
            event.link.as_deref(),
            Some(format!("{} blocks", event.event_blocks.len())),
        ),
    };

    Window::new(RichText::new(title).strong().size(14.0))
        .id(egui::Id::new("details_window"))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([DETAILS_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().faint_bg_color = Color32::TRANSPARENT;
            ui.add_space(4.0);

            if let Some(range) = &range {
                ui.label(RichText::new(range).color(theme::TEXT_SECONDARY));
                ui.add_space(6.0);
            }
            if let Some(extra) = &extra {
                ui.label(RichText::new(extra).size(11.0).color(theme::TEXT_DIM));
                ui.add_space(6.0);
            }

            match description.filter(|d| !d.trim().is_empty()) {
                Some(text) => {
                    ui.label(text);
                }
                None => {
                    ui.label(RichText::new("No description").italics().color(theme::TEXT_DIM));
                }
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                if let Some(url) = link.filter(|l| !l.trim().is_empty()) {
                    if ui
                        .button(format!("{} Open link", icons::LINK))
                        .on_hover_text(url)
                        .clicked()
                    {
                        open_url = Some(url.to_string());
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        should_close = true;
                    }
                });
            });
        });

    if let Some(url) = open_url {
        app.open_link(&url);
    }
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.selection = None;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 170.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Tasklane").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Events and their blocks on a calendar.");
                ui.label(RichText::new(app.config.api_base_url.as_str()).color(theme::TEXT_DIM));
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_uses_dotted_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 10);
        let end = NaiveDate::from_ymd_opt(2024, 6, 12);
        assert_eq!(format_range(start, end), "10.06.2024 — 12.06.2024");
        assert_eq!(format_range(start, None), "10.06.2024 — ?");
    }
}
