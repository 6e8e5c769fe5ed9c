use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use miqat::prayer_times::NextPrayerState;
use miqat::utils::format::{format_clock, format_countdown};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, next: &NextPrayerState, use_24h: bool) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let content: Vec<Line> = match next {
        NextPrayerState::Unavailable => vec![
            Line::from(""),
            Line::from(Span::styled("  Not available", theme::dim())),
        ],
        NextPrayerState::Upcoming(next) => {
            let name = next.slot.display_name().to_uppercase();
            let mut at = format!("  at {}", format_clock(&next.time, use_24h));
            if next.tomorrow {
                at.push_str(" tomorrow");
            }
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", name),
                    theme::gold().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(at, theme::dim())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  in  ", theme::dim()),
                    Span::styled(
                        format_countdown(&next.remaining),
                        theme::amber().add_modifier(Modifier::BOLD),
                    ),
                ]),
            ]
        }
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
