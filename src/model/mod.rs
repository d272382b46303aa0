pub mod event;
pub mod scroll;
pub mod timeline;

pub use event::{Block, Event, EventsPayload};
pub use scroll::{Axis, ScrollOffset, ScrollSync, ScrollUpdate, Surface};
pub use timeline::{BarSpan, CalendarLayout, DayWindow, MonthSegment, WindowSpan};
