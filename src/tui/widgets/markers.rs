use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use miqat::prayer_times::compass_point;
use miqat::utils::format::format_optional_clock;

use crate::tui::theme;

pub struct Markers<'a> {
    pub sehri: Option<&'a str>,
    pub iftari: Option<&'a str>,
    pub ramadan: bool,
    pub qibla: f64,
    pub position_label: &'a str,
}

/// Sehri and Iftari, then the Qibla bearing.
pub fn render(frame: &mut Frame, area: Rect, markers: &Markers<'_>, use_24h: bool) {
    let title = if markers.ramadan { " Ramadan " } else { " Sehri · Iftari · Qibla " };
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if markers.ramadan {
            theme::amber()
        } else {
            Style::default().fg(theme::BORDER)
        })
        .style(theme::surface());

    let time_style = if markers.ramadan {
        theme::amber().add_modifier(Modifier::BOLD)
    } else {
        theme::bold()
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Sehri   ", theme::dim()),
            Span::styled(format_optional_clock(markers.sehri, use_24h), time_style),
        ]),
        Line::from(vec![
            Span::styled("  Iftari  ", theme::dim()),
            Span::styled(format_optional_clock(markers.iftari, use_24h), time_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Qibla   ", theme::dim()),
            Span::styled(
                format!("{:.1}° {}", markers.qibla, compass_point(markers.qibla)),
                theme::gold().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("  from {}", markers.position_label),
            theme::dim(),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
