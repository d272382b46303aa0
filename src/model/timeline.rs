use chrono::{Datelike, Days, Locale, NaiveDate};

/// Smallest and largest day width reachable by zooming.
pub const MIN_DAY_WIDTH: f32 = 8.0;
pub const MAX_DAY_WIDTH: f32 = 64.0;

const ZOOM_STEP: f32 = 1.2;

/// How many months the day window reaches on each side of today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    pub months_before: u32,
    pub months_after: u32,
}

impl Default for WindowSpan {
    fn default() -> Self {
        Self {
            months_before: 3,
            months_after: 3,
        }
    }
}

/// Shift a date by whole calendar months.
///
/// A day past the end of the target month rolls over into the following
/// month (`2024-03-31` minus one month is `2024-03-02`).
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(date.day0()))))
        .unwrap_or(date)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of whole calendar months from the month of `from` to the month of `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// A half-open range of calendar days `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DayWindow {
    /// The window around `today`, shifted by `month_offset` months.
    pub fn around(today: NaiveDate, month_offset: i32, span: WindowSpan) -> Self {
        let back = month_offset - span.months_before as i32;
        let forward = month_offset + span.months_after as i32;
        Self {
            from: shift_months(today, back),
            to: shift_months(today, forward),
        }
    }

    pub fn len(&self) -> usize {
        (self.to - self.from).num_days().max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every day in the window, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.from
            .iter_days()
            .take_while(|day| *day < self.to)
            .collect()
    }

    /// Signed day index of `date`; negative before the window.
    pub fn index_of(&self, date: NaiveDate) -> i64 {
        (date - self.from).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.to
    }
}

/// One calendar month as it appears in the header strip, clipped to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSegment {
    /// First day of the calendar month (may precede the window).
    pub month: NaiveDate,
    /// Index of the first visible day within the window.
    pub first_day: usize,
    /// Number of visible days.
    pub day_count: usize,
}

impl MonthSegment {
    pub fn left(&self, day_width: f32) -> f32 {
        self.first_day as f32 * day_width
    }

    pub fn width(&self, day_width: f32) -> f32 {
        self.day_count as f32 * day_width
    }

    pub fn label(&self, locale: Locale) -> String {
        month_name(self.month.month(), locale)
    }
}

/// Split the window into calendar months. Months with no visible day are omitted.
pub fn month_segments(window: &DayWindow) -> Vec<MonthSegment> {
    let total = window.len() as i64;
    let mut segments = Vec::new();
    let mut cursor = first_of_month(window.from);

    while cursor < window.to {
        let next = shift_months(cursor, 1);
        let start_idx = window.index_of(cursor).max(0);
        let end_idx = window.index_of(next).min(total);
        if end_idx > start_idx {
            segments.push(MonthSegment {
                month: cursor,
                first_day: start_idx as usize,
                day_count: (end_idx - start_idx) as usize,
            });
        }
        if next <= cursor {
            break;
        }
        cursor = next;
    }

    segments
}

/// Horizontal placement of a bar inside the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSpan {
    pub left: f32,
    pub width: f32,
}

/// Place an item spanning `start..end` on a grid whose first column is `from`.
///
/// Items starting before the window clip to its left edge. The width never
/// drops below one day, so zero-length and inverted ranges still render.
pub fn item_span(start: NaiveDate, end: NaiveDate, from: NaiveDate, day_width: f32) -> BarSpan {
    let left = ((start - from).num_days() as f32 * day_width).max(0.0);
    let raw_right = (end - from).num_days() as f32 * day_width;
    BarSpan {
        left,
        width: (raw_right - left).max(day_width),
    }
}

/// Everything the timeline surface needs for one `(today, month_offset)` pair.
#[derive(Debug, Clone)]
pub struct CalendarLayout {
    pub today: NaiveDate,
    pub month_offset: i32,
    pub span: WindowSpan,
    pub day_width: f32,
    pub window: DayWindow,
    pub days: Vec<NaiveDate>,
    pub months: Vec<MonthSegment>,
}

impl CalendarLayout {
    pub fn compute(today: NaiveDate, month_offset: i32, span: WindowSpan, day_width: f32) -> Self {
        let window = DayWindow::around(today, month_offset, span);
        Self {
            today,
            month_offset,
            span,
            day_width,
            days: window.days(),
            months: month_segments(&window),
            window,
        }
    }

    /// True if this layout was computed for the given inputs.
    pub fn matches(&self, today: NaiveDate, month_offset: i32, span: WindowSpan, day_width: f32) -> bool {
        self.today == today
            && self.month_offset == month_offset
            && self.span == span
            && self.day_width == day_width
    }

    /// Convert a date to an x-pixel offset from the window start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        self.window.index_of(date) as f32 * self.day_width
    }

    /// Total width in pixels for the window.
    pub fn total_width(&self) -> f32 {
        self.days.len() as f32 * self.day_width
    }

    pub fn bar_span(&self, start: NaiveDate, end: NaiveDate) -> BarSpan {
        item_span(start, end, self.window.from, self.day_width)
    }

    pub fn today_offset(&self) -> f32 {
        self.date_to_x(self.today).max(0.0)
    }

    pub fn today_visible(&self) -> bool {
        self.window.contains(self.today)
    }

    /// The day column holding today, if it is inside the window.
    pub fn today_column(&self) -> Option<BarSpan> {
        self.today_visible().then(|| BarSpan {
            left: self.date_to_x(self.today),
            width: self.day_width,
        })
    }

    /// Scroll offset that puts today `inset` pixels from the left edge.
    pub fn initial_scroll(&self, inset: f32) -> f32 {
        (self.date_to_x(self.today) - inset).max(0.0)
    }
}

/// Zoom in (wider days).
pub fn zoom_in(day_width: f32) -> f32 {
    (day_width * ZOOM_STEP).min(MAX_DAY_WIDTH)
}

/// Zoom out (narrower days).
pub fn zoom_out(day_width: f32) -> f32 {
    (day_width / ZOOM_STEP).max(MIN_DAY_WIDTH)
}

/// Full month name in nominative case.
pub fn month_name(month: u32, locale: Locale) -> String {
    let idx = (month.clamp(1, 12) - 1) as usize;
    match locale {
        Locale::ru_RU => [
            "январь", "февраль", "март", "апрель", "май", "июнь", "июль", "август",
            "сентябрь", "октябрь", "ноябрь", "декабрь",
        ][idx]
            .to_string(),
        Locale::uk_UA => [
            "січень", "лютий", "березень", "квітень", "травень", "червень", "липень",
            "серпень", "вересень", "жовтень", "листопад", "грудень",
        ][idx]
            .to_string(),
        Locale::be_BY => [
            "студзень", "люты", "сакавік", "красавік", "май", "чэрвень", "ліпень",
            "жнівень", "верасень", "кастрычнік", "лістапад", "снежань",
        ][idx]
            .to_string(),
        _ => NaiveDate::from_ymd_opt(2000, idx as u32 + 1, 1)
            .map(|date| date.format_localized("%B", locale).to_string())
            .unwrap_or_default(),
    }
}
