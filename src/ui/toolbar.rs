use chrono::NaiveDate;
use egui::{menu, Key, RichText, Ui};
use egui_phosphor::regular as icons;

use crate::app::{AuthStep, TimelineApp};
use crate::ui::theme;

/// Render the top menu bar with the login widgets on the right.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_header()), |ui| {
            if ui
                .button(format!("{}  Open snapshot...", icons::FOLDER_OPEN))
                .clicked()
            {
                app.open_snapshot();
                ui.close_menu();
            }
            if ui
                .button(format!("{}  Save snapshot...", icons::FLOPPY_DISK))
                .clicked()
            {
                app.save_snapshot();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .button(format!("{}  Export CSV...", icons::EXPORT))
                .clicked()
            {
                app.export_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_header()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.timeline.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.timeline.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .button(format!("{}  Reload events", icons::ARROW_CLOCKWISE))
                .clicked()
            {
                app.reload();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_header()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned login
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            show_auth(app, ui);
        });
    });
}

/// Login widgets. Laid out right to left, so the button comes first.
fn show_auth(app: &mut TimelineApp, ui: &mut Ui) {
    match app.auth.step {
        AuthStep::Done => {
            if ui
                .button(format!("{} Log out", icons::SIGN_OUT))
                .on_hover_text("Forget the stored tokens")
                .clicked()
            {
                app.logout();
            }
            ui.label(RichText::new("Admin").size(11.0).color(theme::TEXT_SECONDARY));
        }
        AuthStep::Idle | AuthStep::Sending => {
            let sending = app.auth.step == AuthStep::Sending;
            let button = ui.add_enabled(
                !sending,
                egui::Button::new(format!("{} Send code", icons::ENVELOPE_SIMPLE)),
            );
            let field = ui.add_enabled(
                !sending,
                egui::TextEdit::singleline(&mut app.auth.email)
                    .hint_text("Admin email")
                    .desired_width(180.0),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if button.clicked() || submitted {
                app.request_code();
            }
            if sending {
                ui.spinner();
            }
        }
        AuthStep::AwaitingCode | AuthStep::Verifying => {
            let verifying = app.auth.step == AuthStep::Verifying;
            let button = ui.add_enabled(
                !verifying,
                egui::Button::new(format!("{} Log in", icons::SIGN_IN)),
            );
            let field = ui.add_enabled(
                !verifying,
                egui::TextEdit::singleline(&mut app.auth.code)
                    .hint_text("Code from email")
                    .desired_width(120.0),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if button.clicked() || submitted {
                app.verify_code();
            }
            if verifying {
                ui.spinner();
            }
        }
    }
}

/// Month navigation, date jump and zoom controls above the timeline.
pub fn show_navigation(app: &mut TimelineApp, ui: &mut Ui, today: NaiveDate) {
    ui.horizontal(|ui| {
        if ui
            .button(icons::CARET_LEFT)
            .on_hover_text("Previous month")
            .clicked()
        {
            app.timeline.shift_months(-1);
        }
        if ui
            .button(format!("{} Today", icons::CALENDAR_BLANK))
            .on_hover_text("Back to the current month")
            .clicked()
        {
            app.timeline.reset_to_today();
            app.jump_date = today;
        }
        if ui
            .button(icons::CARET_RIGHT)
            .on_hover_text("Next month")
            .clicked()
        {
            app.timeline.shift_months(1);
        }

        ui.separator();
        ui.label(RichText::new("Go to").color(theme::TEXT_SECONDARY));
        let picked = ui.add(
            egui_extras::DatePickerButton::new(&mut app.jump_date).id_salt("nav_jump_date"),
        );
        if picked.changed() {
            app.timeline.jump_to(today, app.jump_date);
        }

        if let Some(layout) = app.timeline.layout() {
            ui.separator();
            ui.label(
                RichText::new(format!(
                    "{} – {}",
                    layout.window.from.format("%d.%m.%Y"),
                    layout.window.to.format("%d.%m.%Y")
                ))
                .size(11.0)
                .color(theme::TEXT_DIM),
            );
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(icons::MAGNIFYING_GLASS_PLUS)
                .on_hover_text("Zoom in")
                .clicked()
            {
                app.timeline.zoom_in();
            }
            if ui
                .button(icons::MAGNIFYING_GLASS_MINUS)
                .on_hover_text("Zoom out")
                .clicked()
            {
                app.timeline.zoom_out();
            }
        });
    });
}
