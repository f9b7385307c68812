//! Positioned frames produced by view rendering and the line builder used
//! for help and status bars.

use std::sync::Arc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::core::action::ActionType;
use crate::input::bindings::KeyBindings;
use crate::views::ViewId;

/// One rectangle of rendered content owned by a single view.
#[derive(Debug, Clone)]
pub struct Window {
    pub view_id: ViewId,
    pub area: Rect,
    pub title: Option<String>,
    pub bordered: bool,
    pub active: bool,
    pub lines: Vec<Line<'static>>,
    pub column_offset: u16,
}

impl Window {
    pub fn new(view_id: ViewId, area: Rect) -> Self {
        Self {
            view_id,
            area,
            title: None,
            bordered: false,
            active: false,
            lines: Vec::new(),
            column_offset: 0,
        }
    }

    pub fn bordered(mut self, title: impl Into<String>) -> Self {
        self.bordered = true;
        self.title = Some(title.into());
        self
    }

    /// Rows available for content once the border is accounted for.
    pub fn content_rows(&self) -> usize {
        let border = if self.bordered { 2 } else { 0 };
        usize::from(self.area.height.saturating_sub(border))
    }

    pub fn content_cols(&self) -> usize {
        let border = if self.bordered { 2 } else { 0 };
        usize::from(self.area.width.saturating_sub(border))
    }

    pub fn push_line(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }
}

impl Widget for &Window {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut paragraph =
            Paragraph::new(self.lines.clone()).scroll((0, self.column_offset));

        if self.bordered {
            let border_style = if self.active {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style);
            if let Some(title) = &self.title {
                block = block.title(title.clone());
            }
            paragraph = paragraph.block(block);
        }

        paragraph.render(area, buf);
    }
}

/// Accumulates styled spans for a single line of bar content.
pub struct LineBuilder {
    spans: Vec<Span<'static>>,
    bindings: Arc<KeyBindings>,
    view_path: Vec<ViewId>,
}

impl LineBuilder {
    pub fn new(bindings: Arc<KeyBindings>, view_path: Vec<ViewId>) -> Self {
        Self {
            spans: Vec::new(),
            bindings,
            view_path,
        }
    }

    pub fn append(&mut self, text: impl Into<String>) {
        self.spans.push(Span::raw(text.into()));
    }

    pub fn append_styled(&mut self, text: impl Into<String>, style: Style) {
        self.spans.push(Span::styled(text.into(), style));
    }

    /// Append `KEY description` for the binding that triggers `action` in
    /// the current view path. Returns false when nothing is bound.
    pub fn append_action_help(&mut self, action: ActionType, description: &str) -> bool {
        let keys = self.bindings.key_strings(action, &self.view_path);
        let Some(bound) = keys.last() else {
            return false;
        };

        if !self.spans.is_empty() {
            self.append("  ");
        }
        self.append_styled(
            bound.keystring.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        );
        self.append(format!(" {description}"));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn into_line(self) -> Line<'static> {
        Line::from(self.spans)
    }
}
