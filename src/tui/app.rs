use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use rusqlite::Connection;

use miqat::board::{PrayerBoard, RefreshReport, Sources};
use miqat::config::AppConfig;
use miqat::db::{
    self,
    repository::{MasjidRepo, MasjidStore},
};
use miqat::models::StoredRecord;
use miqat::prayer_times::{
    ConfiguredLocation, NextPrayerState, RecordStore, TimingSource, qibla_bearing, timing_source,
};
use miqat::utils::hijri::{hijri_string, to_hijri};

use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::markers::Markers;
use crate::tui::widgets::{header, markers, next_prayer, prayers, statusbar};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Help,
}

/// A board rebuilt off the event loop, ready to swap in.
#[derive(Debug)]
pub struct Refreshed {
    pub board: PrayerBoard,
    pub report: RefreshReport,
}

/// Stands in for the masjid store when the worker cannot open the database.
struct NoRecords;

impl RecordStore for NoRecords {
    fn get(&self, _place_id: &str) -> Result<Option<StoredRecord>> {
        Err(anyhow!("masjid database unavailable"))
    }
}

/// Everything a refresh needs, owned so it can move to a worker thread.
struct RefreshJob {
    board: PrayerBoard,
    location: ConfiguredLocation,
    timings: Arc<dyn TimingSource + Send + Sync>,
    db_path: PathBuf,
    date: NaiveDate,
}

impl RefreshJob {
    fn run(mut self) -> Refreshed {
        let report = match db::open(&self.db_path) {
            Ok(conn) => self.refresh_with(&MasjidStore::new(&conn)),
            Err(e) => {
                warn!("could not open {}: {:#}", self.db_path.display(), e);
                self.refresh_with(&NoRecords)
            }
        };
        Refreshed {
            board: self.board,
            report,
        }
    }

    fn refresh_with(&mut self, records: &dyn RecordStore) -> RefreshReport {
        let sources = Sources {
            records,
            location: &self.location,
            timings: self.timings.as_ref(),
        };
        self.board.refresh(&sources, self.date)
    }
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub board: PrayerBoard,
    pub should_quit: bool,

    location: ConfiguredLocation,
    timings: Arc<dyn TimingSource + Send + Sync>,
    db_path: PathBuf,
    refreshing: bool,

    // Cached state (refreshed on tick/action)
    pub today: NaiveDate,
    pub hijri_str: String,
    pub ramadan: bool,
    pub place: String,
    pub next: NextPrayerState,
    pub report: Option<RefreshReport>,
}

impl App {
    pub fn new(config: AppConfig, db_path: PathBuf) -> Result<Self> {
        let today = Local::now().date_naive();
        let timings = Arc::from(timing_source(&config)?);
        let location = ConfiguredLocation::new(config.location.latitude, config.location.longitude);

        Ok(App {
            view: View::Dashboard,
            board: PrayerBoard::from_config(&config),
            place: config.location.name.clone(),
            config,
            should_quit: false,
            location,
            timings,
            db_path,
            refreshing: false,
            today,
            hijri_str: String::new(),
            ramadan: false,
            next: NextPrayerState::Unavailable,
            report: None,
        })
    }

    /// Updates the date-bound labels and starts re-resolving today's schedule.
    /// Until the refresh lands, the countdown keeps using the current schedule.
    pub fn load(&mut self, conn: &Connection, events: &Sender<Event>) {
        let now = Local::now().naive_local();
        self.today = now.date();

        let offset = self.config.display.hijri_offset;
        self.hijri_str = hijri_string(self.today, offset);
        self.ramadan = to_hijri(self.today, offset)
            .map(|day| day.is_ramadan())
            .unwrap_or(false);

        self.place = self.place_name(conn);
        self.start_refresh(events);
        self.update_next(now);
    }

    fn start_refresh(&mut self, events: &Sender<Event>) {
        if self.refreshing {
            debug!("refresh already in flight");
            return;
        }
        self.refreshing = true;

        let job = RefreshJob {
            board: self.board.clone(),
            location: self.location.clone(),
            timings: Arc::clone(&self.timings),
            db_path: self.db_path.clone(),
            date: self.today,
        };
        let tx = events.clone();
        thread::spawn(move || {
            // The loop is gone if this fails; nothing left to update.
            let _ = tx.send(Event::Refreshed(Box::new(job.run())));
        });
    }

    /// Swaps in a finished refresh. A result for a day that has since ended
    /// is still shown, and another refresh for today is started.
    pub fn apply_refresh(&mut self, refreshed: Refreshed, events: &Sender<Event>) {
        self.refreshing = false;
        let stale = refreshed.report.date != self.today;
        self.board = refreshed.board;
        self.report = Some(refreshed.report);
        self.update_next(Local::now().naive_local());
        if stale {
            self.start_refresh(events);
        }
    }

    fn place_name(&self, conn: &Connection) -> String {
        let Some(id) = self.board.selected_masjid() else {
            return self.config.location.name.clone();
        };
        match MasjidRepo::get(conn, id) {
            Ok(Some(masjid)) => masjid.name,
            Ok(None) => id.to_string(),
            Err(e) => {
                warn!("could not read masjid '{}': {:#}", id, e);
                id.to_string()
            }
        }
    }

    pub fn tick(&mut self, conn: &Connection, events: &Sender<Event>) {
        let now = Local::now().naive_local();
        if now.date() != self.today {
            self.load(conn, events);
        } else {
            self.update_next(now);
        }
    }

    fn update_next(&mut self, now: NaiveDateTime) {
        self.next = self.board.next_prayer(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection, events: &Sender<Event>) {
        // Only handle actual key presses; some terminals also send release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Dashboard => match key.code {
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('?') => self.view = View::Help,
                KeyCode::Char('r') => self.load(conn, events),
                _ => {}
            },
            View::Help => match key.code {
                KeyCode::Esc | KeyCode::Char('?') => self.view = View::Dashboard,
                _ => {}
            },
        }
    }

    fn sources_line(&self) -> String {
        let sources = match &self.report {
            None => "loading".to_string(),
            Some(report) if report.used_defaults_only() => "default times".to_string(),
            Some(report) => {
                let mut parts = Vec::new();
                if report.stored_record {
                    parts.push("masjid");
                }
                if let Some(name) = report.timing_source {
                    parts.push(name);
                }
                parts.join(" + ")
            }
        };
        let school = self.board.asr_school().display_name();
        if self.refreshing && self.report.is_some() {
            format!("{} · Asr {} · refreshing…", sources, school)
        } else {
            format!("{} · Asr {}", sources, school)
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        self.draw_dashboard(frame);
        if self.view == View::Help {
            self.draw_help_overlay(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.today, &self.hijri_str, &self.place);
        statusbar::render(frame, outer_chunks[2], &self.sources_line());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(outer_chunks[1]);

        let use_24h = self.config.display.clock_24h;
        let schedule = self.board.schedule();

        prayers::render(frame, columns[0], schedule, self.next.slot(), use_24h);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8), // next prayer
                Constraint::Min(0),    // markers
            ])
            .split(columns[1]);

        next_prayer::render(frame, right_chunks[0], &self.next, use_24h);

        let position_label = self
            .report
            .as_ref()
            .map(|r| r.position_source.label())
            .unwrap_or("default location");
        let qibla = self
            .board
            .last_position()
            .map(qibla_bearing)
            .unwrap_or_default();
        let markers = Markers {
            sehri: schedule.sehri.as_deref(),
            iftari: schedule.iftari.as_deref(),
            ramadan: self.ramadan,
            qibla,
            position_label,
        };
        markers::render(frame, right_chunks[1], &markers, use_24h);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center a help box
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(9).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [r]    ", theme::gold()),
                Span::styled("Refresh times from all sources", theme::dim()),
            ]),
            Line::from(vec![
                Span::styled("  [?]    ", theme::gold()),
                Span::styled("Toggle help", theme::dim()),
            ]),
            Line::from(vec![
                Span::styled("  [Esc]  ", theme::gold()),
                Span::styled("Quit", theme::dim()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Change masjid or settings with `miqat masjid` / `miqat settings`",
                theme::dim(),
            )),
        ];

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, db_path: PathBuf) -> Result<()> {
    let tick_ms = config.display.tick_ms.max(100);
    let mut app = App::new(config, db_path)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_ms);
    let tx = events.sender();
    app.load(&conn, &tx);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn, &tx);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Resize => {}
                Event::Tick => {
                    app.tick(&conn, &tx);
                }
                Event::Refreshed(refreshed) => {
                    app.apply_refresh(*refreshed, &tx);
                }
            }
        }
    })();

    ratatui::restore();
    result
}
