use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "miqat", version, author, about = "Prayer times for your masjid, in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and the countdown to the next prayer
    Times {
        /// Use this masjid instead of the selected one
        #[arg(long)]
        masjid: Option<String>,
        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show only the next prayer and the time left
    Next {
        /// Use this masjid instead of the selected one
        #[arg(long)]
        masjid: Option<String>,
    },
    /// Qibla bearing from your location (or the given coordinates)
    Qibla {
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
    },
    /// View or change settings; with no flags prints the current ones
    Settings {
        /// Asr school: hanafi or shafi
        #[arg(long)]
        school: Option<String>,
        /// Calculation method id (AlAdhan numbering, e.g. 1 = Karachi, 3 = MWL)
        #[arg(long)]
        method: Option<u8>,
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Display name for the location
        #[arg(long)]
        name: Option<String>,
        /// Where calculated times come from: aladhan or offline
        #[arg(long)]
        source: Option<String>,
        /// UTC offset for offline calculation, e.g. +5:30
        #[arg(long, allow_hyphen_values = true)]
        tz: Option<String>,
        /// Days to shift the Hijri date for local moon sighting
        #[arg(long, allow_hyphen_values = true)]
        hijri_offset: Option<i32>,
        /// Show times on a 24-hour clock
        #[arg(long)]
        clock_24h: Option<bool>,
    },
    /// Masjid registry and timetables
    Masjid {
        #[command(subcommand)]
        action: MasjidCommands,
    },
    /// Quran reading and listening log
    Quran {
        #[command(subcommand)]
        action: QuranCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum MasjidCommands {
    /// Add a masjid, or update one with the same id
    Add {
        /// Short id used by other commands
        id: String,
        /// Display name
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// List registered masjids
    List,
    /// Show a masjid and its stored timetable
    Show { id: String },
    /// Store a timetable value, e.g. `set jamia FajrAzan 05:10`
    Set {
        id: String,
        /// Field name such as FajrAzan, AsrPrayer, IshaEndTime, SehriTime
        field: String,
        /// HH:MM
        time: String,
    },
    /// Remove a stored timetable value
    Unset { id: String, field: String },
    /// Delete a masjid and its timetable
    Remove { id: String },
    /// Make a masjid the default; pass `none` to clear
    Select { id: String },
    /// Print a maps link with directions to the masjid
    Directions { id: String },
}

#[derive(Subcommand, Debug)]
pub enum QuranCommands {
    /// Log ayahs read today
    Read { ayahs: u32 },
    /// Log ayahs listened to today
    Listen { ayahs: u32 },
    /// Show recent activity and rewards
    Stats {
        /// How many days back to show
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Spend rewards
    Redeem { amount: u64 },
}
