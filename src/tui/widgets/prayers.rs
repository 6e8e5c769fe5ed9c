use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
};

use miqat::models::PrayerSlot;
use miqat::models::Schedule;
use miqat::models::rakat::summarize;
use miqat::utils::format::format_clock;

use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: &Schedule,
    next_slot: Option<PrayerSlot>,
    use_24h: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Prayers ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let width = if use_24h { 7 } else { 10 };

    let mut items: Vec<ListItem> = vec![ListItem::new(Line::from(vec![
        Span::styled(format!("  {:<9}", ""), theme::dim()),
        Span::styled(format!("{:<width$}", "Azan"), theme::dim()),
        Span::styled(format!("{:<width$}", "Iqamah"), theme::dim()),
        Span::styled(format!("{:<width$}", "Ends"), theme::dim()),
        Span::styled("Rakats", theme::dim()),
    ]))];

    if schedule.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "  No times available",
            theme::red(),
        ))));
    }

    items.extend(schedule.with_rakats().map(|(entry, plan)| {
        let is_next = next_slot == Some(entry.slot);
        let (marker, name_style, time_style) = if is_next {
            (
                "▶ ",
                theme::gold().add_modifier(Modifier::BOLD),
                theme::amber().add_modifier(Modifier::BOLD),
            )
        } else {
            ("  ", theme::bold(), theme::dim())
        };

        let line = Line::from(vec![
            Span::styled(marker, theme::gold()),
            Span::styled(format!("{:<9}", entry.slot.display_name()), name_style),
            Span::styled(
                format!("{:<width$}", format_clock(&entry.times.azan, use_24h)),
                theme::dim(),
            ),
            Span::styled(
                format!("{:<width$}", format_clock(&entry.times.prayer, use_24h)),
                time_style,
            ),
            Span::styled(
                format!("{:<width$}", format_clock(&entry.times.end, use_24h)),
                theme::dim(),
            ),
            Span::styled(summarize(plan), theme::dim()),
        ]);

        ListItem::new(line)
    }));

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
