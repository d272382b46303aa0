use egui::{Frame, Margin, RichText, Rounding, Stroke, Ui};

use crate::model::Event;
use crate::ui::theme;

/// How many running events the card lists.
pub const HIGHLIGHT_LIMIT: usize = 5;

/// Names shown in the highlight card, in API order.
pub fn highlight_names(events: &[Event]) -> Vec<&str> {
    events
        .iter()
        .take(HIGHLIGHT_LIMIT)
        .map(|e| e.name.as_str())
        .collect()
}

/// Card with the events that are running right now.
pub fn show_highlights(events: &[Event], ui: &mut Ui) {
    Frame::default()
        .fill(theme::BG_HEADER)
        .stroke(Stroke::new(1.0, theme::BORDER_SUBTLE))
        .rounding(Rounding::same(10.0))
        .inner_margin(Margin::symmetric(14.0, 10.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new("Happening now")
                    .font(theme::font_header())
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
            ui.add_space(4.0);

            let names = highlight_names(events);
            if names.is_empty() {
                ui.label(
                    RichText::new("No events are running today")
                        .font(theme::font_sub())
                        .color(theme::TEXT_DIM),
                );
                return;
            }
            ui.horizontal_wrapped(|ui| {
                for name in names {
                    ui.label(
                        RichText::new(format!("• {name}"))
                            .font(theme::font_sub())
                            .color(theme::TEXT_SECONDARY),
                    );
                    ui.add_space(10.0);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64) -> Event {
        Event {
            id,
            name: format!("Event {id}"),
            description: None,
            link: None,
            event_blocks: Vec::new(),
        }
    }

    #[test]
    fn card_lists_at_most_five_in_order() {
        let events: Vec<Event> = (1..=7).map(event).collect();
        assert_eq!(
            highlight_names(&events),
            vec!["Event 1", "Event 2", "Event 3", "Event 4", "Event 5"]
        );
        assert_eq!(highlight_names(&events[..2]), vec!["Event 1", "Event 2"]);
        assert!(highlight_names(&[]).is_empty());
    }
}
