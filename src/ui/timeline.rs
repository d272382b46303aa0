use std::collections::HashSet;

use chrono::{Datelike, Locale, NaiveDate};
use egui::scroll_area::ScrollBarVisibility;
use egui::{Align2, Color32, Pos2, Rect, Rounding, ScrollArea, Sense, Stroke, Ui, Vec2};
use egui_extras::{Size, StripBuilder};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::model::timeline::{self, months_between};
use crate::model::{
    Axis, Block, CalendarLayout, Event, ScrollOffset, ScrollSync, ScrollUpdate, Surface,
};
use crate::ui::theme;

/// Extra room past the last day so the header can always follow the grid,
/// whose visible width is reduced by its vertical scroll bar.
const SCROLLBAR_ALLOWANCE: f32 = 24.0;

/// What the user asked for inside the timeline this frame.
#[derive(Debug, Clone)]
pub enum TimelineAction {
    None,
    SelectBlock(Block),
    SelectEvent(Event),
}

/// State of the timeline surface that survives between frames.
pub struct TimelineView {
    pub month_offset: i32,
    pub day_width: f32,
    layout: Option<CalendarLayout>,
    sync: ScrollSync,
    pending: Vec<ScrollUpdate>,
    /// Date to bring into view on the next layout change instead of today.
    focus: Option<NaiveDate>,
    warned_blocks: HashSet<i64>,
}

impl TimelineView {
    pub fn new(day_width: f32) -> Self {
        Self {
            month_offset: 0,
            day_width,
            layout: None,
            sync: ScrollSync::new(),
            pending: Vec::new(),
            focus: None,
            warned_blocks: HashSet::new(),
        }
    }

    pub fn layout(&self) -> Option<&CalendarLayout> {
        self.layout.as_ref()
    }

    pub fn shift_months(&mut self, delta: i32) {
        self.month_offset += delta;
    }

    /// Back to the window around today, scrolled to today.
    pub fn reset_to_today(&mut self) {
        self.month_offset = 0;
        self.focus = None;
        self.layout = None;
    }

    /// Move the window so it is centred on the month of `target`.
    pub fn jump_to(&mut self, today: NaiveDate, target: NaiveDate) {
        self.month_offset = months_between(today, target);
        self.focus = Some(target);
        self.layout = None;
    }

    pub fn zoom_in(&mut self) {
        self.day_width = timeline::zoom_in(self.day_width);
    }

    pub fn zoom_out(&mut self) {
        self.day_width = timeline::zoom_out(self.day_width);
    }

    /// Recompute the layout when its inputs changed and queue the initial scroll.
    fn ensure_layout(&mut self, today: NaiveDate, config: &AppConfig) {
        let span = config.span();
        let fresh = self
            .layout
            .as_ref()
            .is_some_and(|l| l.matches(today, self.month_offset, span, self.day_width));
        if fresh {
            return;
        }

        let layout = CalendarLayout::compute(today, self.month_offset, span, self.day_width);
        let scroll_x = match self.focus.take() {
            Some(date) if layout.window.contains(date) => {
                (layout.date_to_x(date) - config.today_inset).max(0.0)
            }
            _ => layout.initial_scroll(config.today_inset),
        };
        debug!(
            from = %layout.window.from,
            to = %layout.window.to,
            days = layout.days.len(),
            scroll_x,
            "timeline layout recomputed"
        );
        self.pending.retain(|u| u.axis != Axis::Horizontal);
        let jump = self.sync.jump_to_x(scroll_x);
        self.pending.extend(jump);
        self.layout = Some(layout);
    }

    /// Latest queued position for each axis of `surface`.
    fn take_pending(&mut self, surface: Surface) -> (Option<f32>, Option<f32>) {
        let mut x = None;
        let mut y = None;
        self.pending.retain(|update| {
            if update.surface != surface {
                return true;
            }
            match update.axis {
                Axis::Horizontal => x = Some(update.offset),
                Axis::Vertical => y = Some(update.offset),
            }
            false
        });
        (x, y)
    }

    /// Render header, sidebar and grid into the remaining space.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        events: &[Event],
        config: &AppConfig,
        today: NaiveDate,
    ) -> TimelineAction {
        self.ensure_layout(today, config);
        let Some(layout) = self.layout.take() else {
            return TimelineAction::None;
        };

        let locale = config.locale();
        let row_height = config.row_height;
        let header_pending = self.take_pending(Surface::Header);
        let sidebar_pending = self.take_pending(Surface::Sidebar);
        let grid_pending = self.take_pending(Surface::Grid);

        let mut observed: Vec<(Surface, ScrollOffset)> = Vec::with_capacity(3);
        let mut action = TimelineAction::None;
        let mut skipped: Vec<i64> = Vec::new();

        StripBuilder::new(ui)
            .size(Size::exact(theme::HEADER_HEIGHT))
            .size(Size::remainder())
            .vertical(|mut strip| {
                strip.strip(|builder| {
                    builder
                        .size(Size::exact(config.sidebar_width))
                        .size(Size::remainder())
                        .horizontal(|mut strip| {
                            strip.cell(|ui| draw_title_cell(ui, events.len()));
                            strip.cell(|ui| {
                                let mut area = ScrollArea::horizontal()
                                    .id_salt("timeline_header")
                                    .auto_shrink([false, false])
                                    .scroll_bar_visibility(ScrollBarVisibility::AlwaysHidden);
                                if let Some(x) = header_pending.0 {
                                    area = area.horizontal_scroll_offset(x);
                                }
                                let output = area.show(ui, |ui| draw_header(ui, &layout, locale));
                                observed.push((
                                    Surface::Header,
                                    ScrollOffset::new(output.state.offset.x, output.state.offset.y),
                                ));
                            });
                        });
                });
                strip.strip(|builder| {
                    builder
                        .size(Size::exact(config.sidebar_width))
                        .size(Size::remainder())
                        .horizontal(|mut strip| {
                            strip.cell(|ui| {
                                let mut area = ScrollArea::vertical()
                                    .id_salt("timeline_names")
                                    .auto_shrink([false, false])
                                    .scroll_bar_visibility(ScrollBarVisibility::AlwaysHidden);
                                if let Some(y) = sidebar_pending.1 {
                                    area = area.vertical_scroll_offset(y);
                                }
                                let output =
                                    area.show(ui, |ui| draw_sidebar(ui, events, row_height));
                                if let Some(event) = output.inner {
                                    action = TimelineAction::SelectEvent(event);
                                }
                                observed.push((
                                    Surface::Sidebar,
                                    ScrollOffset::new(output.state.offset.x, output.state.offset.y),
                                ));
                            });
                            strip.cell(|ui| {
                                let viewport = ui.available_size();
                                let mut area = ScrollArea::both()
                                    .id_salt("timeline_grid")
                                    .auto_shrink([false, false]);
                                if let Some(x) = grid_pending.0 {
                                    area = area.horizontal_scroll_offset(x);
                                }
                                if let Some(y) = grid_pending.1 {
                                    area = area.vertical_scroll_offset(y);
                                }
                                let output = area.show(ui, |ui| {
                                    draw_grid(ui, &layout, events, row_height, viewport, &mut skipped)
                                });
                                if let Some(block) = output.inner {
                                    action = TimelineAction::SelectBlock(block);
                                }
                                observed.push((
                                    Surface::Grid,
                                    ScrollOffset::new(output.state.offset.x, output.state.offset.y),
                                ));
                            });
                        });
                });
            });

        for (surface, offset) in observed {
            let updates = self.sync.observe(surface, offset);
            self.pending.extend(updates);
        }
        if !self.pending.is_empty() {
            ui.ctx().request_repaint();
        }
        for id in skipped {
            if self.warned_blocks.insert(id) {
                warn!(block_id = id, "block has no readable start/end date, not drawn");
            }
        }

        self.layout = Some(layout);
        action
    }
}

fn draw_title_cell(ui: &mut Ui, count: usize) {
    let rect = ui.available_rect_before_wrap();
    let painter = ui.painter();
    painter.rect_filled(rect, 0.0, theme::BG_HEADER);
    painter.line_segment(
        [rect.left_bottom(), rect.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    painter.text(
        Pos2::new(rect.left() + 12.0, rect.center().y),
        Align2::LEFT_CENTER,
        format!("Name ({count})"),
        theme::font_header(),
        theme::TEXT_SECONDARY,
    );
}

fn draw_header(ui: &mut Ui, layout: &CalendarLayout, locale: Locale) {
    let dw = layout.day_width;
    let width = layout.total_width() + SCROLLBAR_ALLOWANCE;
    let (response, painter) =
        ui.allocate_painter(Vec2::new(width, theme::HEADER_HEIGHT), Sense::hover());
    let origin = response.rect.min;

    painter.rect_filled(response.rect, 0.0, theme::BG_HEADER);

    // Month row
    for segment in &layout.months {
        let rect = Rect::from_min_size(
            Pos2::new(origin.x + segment.left(dw), origin.y),
            Vec2::new(segment.width(dw), theme::MONTH_ROW_HEIGHT),
        );
        painter.line_segment(
            [rect.right_top(), rect.right_bottom()],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        painter.with_clip_rect(rect).text(
            Pos2::new(rect.left() + 6.0, rect.center().y),
            Align2::LEFT_CENTER,
            segment.label(locale),
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + theme::MONTH_ROW_HEIGHT),
            Pos2::new(origin.x + width, origin.y + theme::MONTH_ROW_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    // Day row
    let day_top = origin.y + theme::MONTH_ROW_HEIGHT;
    let label_every = if dw >= 16.0 { 1 } else { 7 };
    for (i, day) in layout.days.iter().enumerate() {
        let x = origin.x + i as f32 * dw;
        let cell = Rect::from_min_size(Pos2::new(x, day_top), Vec2::new(dw, theme::DAY_ROW_HEIGHT));
        let is_today = *day == layout.today;
        if is_today {
            painter.rect_filled(cell, Rounding::same(3.0), theme::TODAY_LINE);
        }
        if i % label_every == 0 || is_today {
            let color = if is_today {
                Color32::WHITE
            } else if day.weekday().num_days_from_monday() >= 5 {
                theme::TEXT_DIM
            } else {
                theme::TEXT_SECONDARY
            };
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                day.day().to_string(),
                theme::font_sub(),
                color,
            );
        }
    }
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + theme::HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + theme::HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

/// Event names, one per row. Returns the clicked event.
fn draw_sidebar(ui: &mut Ui, events: &[Event], row_height: f32) -> Option<Event> {
    ui.spacing_mut().item_spacing = Vec2::ZERO;
    let width = ui.available_width();
    let mut clicked = None;

    if events.is_empty() {
        ui.add_space(12.0);
        ui.label(egui::RichText::new("  No events").color(theme::TEXT_DIM));
        return None;
    }

    for (i, event) in events.iter().enumerate() {
        let (rect, response) =
            ui.allocate_exact_size(Vec2::new(width, row_height), Sense::click());
        let fill = if response.hovered() {
            theme::BG_SELECTED
        } else if i % 2 == 0 {
            theme::BG_PANEL
        } else {
            theme::BG_ROW_ALT
        };
        let painter = ui.painter();
        painter.rect_filled(rect, 0.0, fill);
        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
        painter.circle_filled(
            Pos2::new(rect.left() + 12.0, rect.center().y),
            4.0,
            theme::block_color(event.id),
        );
        painter.with_clip_rect(rect.shrink(2.0)).text(
            Pos2::new(rect.left() + 24.0, rect.center().y),
            Align2::LEFT_CENTER,
            &event.name,
            theme::font_bar(),
            theme::TEXT_PRIMARY,
        );
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        if response.clicked() {
            clicked = Some(event.clone());
        }
    }

    // Room for the grid's horizontal scroll bar
    ui.add_space(SCROLLBAR_ALLOWANCE);
    clicked
}

/// Day cells, block bars and the today line. Returns the clicked block.
fn draw_grid(
    ui: &mut Ui,
    layout: &CalendarLayout,
    events: &[Event],
    row_height: f32,
    viewport: Vec2,
    skipped: &mut Vec<i64>,
) -> Option<Block> {
    let dw = layout.day_width;
    let width = layout.total_width();
    let rows_height = events.len() as f32 * row_height;
    let (response, painter) = ui.allocate_painter(
        Vec2::new(width, rows_height.max(viewport.y)),
        Sense::hover(),
    );
    let origin = response.rect.min;
    let height = response.rect.height();
    let mut clicked = None;

    painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

    // Weekend shading and day lines
    for (i, day) in layout.days.iter().enumerate() {
        let x = origin.x + i as f32 * dw;
        if day.weekday().num_days_from_monday() >= 5 {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(x, origin.y), Vec2::new(dw, height)),
                0.0,
                theme::WEEKEND_CELL,
            );
        }
        if dw >= 12.0 || day.day() == 1 {
            painter.line_segment(
                [Pos2::new(x, origin.y), Pos2::new(x, origin.y + height)],
                Stroke::new(0.5, theme::GRID_LINE),
            );
        }
    }

    if let Some(column) = layout.today_column() {
        painter.rect_filled(
            Rect::from_min_size(
                Pos2::new(origin.x + column.left, origin.y),
                Vec2::new(column.width, height),
            ),
            0.0,
            theme::TODAY_CELL,
        );
    }

    for (row, event) in events.iter().enumerate() {
        let y = origin.y + row as f32 * row_height;
        painter.line_segment(
            [
                Pos2::new(origin.x, y + row_height),
                Pos2::new(origin.x + width, y + row_height),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );

        for block in &event.event_blocks {
            let Some((start, end)) = block.dates() else {
                skipped.push(block.id);
                continue;
            };
            let span = layout.bar_span(start, end);
            if span.left >= width {
                continue;
            }
            let bar_width = span.width.min(width - span.left);
            let bar_rect = Rect::from_min_size(
                Pos2::new(origin.x + span.left, y + theme::BAR_INSET),
                Vec2::new(bar_width, row_height - theme::BAR_INSET * 2.0),
            );
            let bar_response = ui.interact(
                bar_rect,
                ui.make_persistent_id(("block-bar", event.id, block.id)),
                Sense::click(),
            );
            draw_block_bar(&painter, bar_rect, block, theme::block_color(event.id), bar_response.hovered());

            if bar_response.clicked() {
                clicked = Some(block.clone());
            }
            if bar_response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    ui.layer_id(),
                    egui::Id::new(("block-tip", event.id, block.id)),
                    |ui| {
                        ui.strong(&block.name);
                        ui.label(format!(
                            "{} → {}",
                            start.format("%d.%m.%Y"),
                            end.format("%d.%m.%Y"),
                        ));
                    },
                );
            }
        }
    }

    if let Some(column) = layout.today_column() {
        draw_today_line(&painter, origin, column.left, height);
    }

    clicked
}

fn draw_block_bar(painter: &egui::Painter, bar_rect: Rect, block: &Block, color: Color32, hovered: bool) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar_rect, rounding, color);
    // Lighter top highlight
    let highlight_rect = Rect::from_min_size(
        bar_rect.min,
        Vec2::new(bar_rect.width(), (bar_rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight_rect,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );
    if hovered {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::TEXT_SECONDARY),
        );
    }

    // Name on bar (single line, clipped to bar bounds)
    if bar_rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(block.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        painter.with_clip_rect(bar_rect).galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }
}

fn draw_today_line(painter: &egui::Painter, origin: Pos2, x_offset: f32, height: f32) {
    let x = origin.x + x_offset;
    painter.line_segment(
        [Pos2::new(x, origin.y), Pos2::new(x, origin.y + height)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WindowSpan;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_layout_queues_scroll_to_today() {
        let config = AppConfig::default();
        let mut view = TimelineView::new(config.day_width);
        view.ensure_layout(d(2024, 6, 15), &config);

        let expected = 92.0 * 24.0 - 200.0;
        assert_eq!(view.take_pending(Surface::Grid), (Some(expected), None));
        assert_eq!(view.take_pending(Surface::Header), (Some(expected), None));
        assert_eq!(view.take_pending(Surface::Grid), (None, None));
    }

    #[test]
    fn unchanged_inputs_reuse_layout() {
        let config = AppConfig::default();
        let mut view = TimelineView::new(config.day_width);
        view.ensure_layout(d(2024, 6, 15), &config);
        view.take_pending(Surface::Grid);
        view.take_pending(Surface::Header);

        view.ensure_layout(d(2024, 6, 15), &config);
        assert!(view.pending.is_empty());
    }

    #[test]
    fn month_navigation_recomputes_window() {
        let config = AppConfig::default();
        let mut view = TimelineView::new(config.day_width);
        view.shift_months(-1);
        view.ensure_layout(d(2024, 6, 15), &config);
        let layout = view.layout().unwrap();
        assert_eq!(layout.window.from, d(2024, 2, 15));
        assert_eq!(layout.window.to, d(2024, 8, 15));
        assert_eq!(layout.span, WindowSpan::default());
    }

    #[test]
    fn jump_to_scrolls_to_target_date() {
        let config = AppConfig::default();
        let mut view = TimelineView::new(config.day_width);
        view.jump_to(d(2024, 6, 15), d(2025, 1, 20));
        view.ensure_layout(d(2024, 6, 15), &config);

        let layout = view.layout().unwrap();
        assert_eq!(layout.month_offset, 7);
        assert!(layout.window.contains(d(2025, 1, 20)));
        let expected = layout.date_to_x(d(2025, 1, 20)) - 200.0;
        assert_eq!(view.take_pending(Surface::Grid), (Some(expected), None));
    }

    #[test]
    fn zoom_invalidates_layout() {
        let config = AppConfig::default();
        let mut view = TimelineView::new(config.day_width);
        view.ensure_layout(d(2024, 6, 15), &config);
        view.pending.clear();

        view.zoom_in();
        view.ensure_layout(d(2024, 6, 15), &config);
        assert!(view.layout().unwrap().day_width > 24.0);
        assert!(!view.pending.is_empty());
    }
}
