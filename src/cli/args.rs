use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nooruna", version, author, about = "Daily prayer, Quran and athkar timeline in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write user, partner and location settings
    Setup(SetupArgs),
    /// Show today's prayer times and countdown to next prayer
    Times,
    /// Show today's timeline with status and completion
    Timeline {
        /// Classify as if it were this time of day (HH:MM)
        #[arg(long)]
        at: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Single click on a task: toggle, or open the reader for unread Quran/athkar
    Click {
        /// Task id (fajr, athkar-morning, baqarah, dhuhr, asr, maghrib, athkar-evening, isha, mulk)
        task: String,
    },
    /// Double click on a task: mark unread Quran/athkar as done, otherwise toggle
    DoubleClick {
        /// Task id
        task: String,
    },
    /// Swipe a task by a pixel displacement; a long enough left swipe completes it
    Swipe {
        /// Task id
        task: String,
        /// Horizontal displacement in pixels (negative is leftwards)
        #[arg(long, allow_negative_numbers = true)]
        dx: f64,
        /// Vertical displacement in pixels
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dy: f64,
    },
    /// Report Quran reading progress
    Read {
        /// Surah (baqarah, mulk, kahf)
        surah: String,
        /// Page reached
        page: i32,
        /// Mark the reading as finished
        #[arg(long)]
        done: bool,
    },
    /// Show today's progress and the last 7 days
    Stats,
    /// Show your partner's progress today
    Partner,
}

#[derive(Args, Debug, Default)]
pub struct SetupArgs {
    /// Your user id
    #[arg(long)]
    pub user: Option<String>,
    /// Partner's user id
    #[arg(long)]
    pub partner: Option<String>,
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Latitude
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,
    /// Longitude
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,
    /// Calculation method (e.g. MuslimWorldLeague, UmmAlQura, Egyptian)
    #[arg(long)]
    pub method: Option<String>,
    /// Madhab for Asr (Shafi or Hanafi)
    #[arg(long)]
    pub madhab: Option<String>,
    /// UTC offset, e.g. "+3", "5:30", "-4"
    #[arg(long, allow_hyphen_values = true)]
    pub tz: Option<String>,
    /// Start again from the defaults
    #[arg(long)]
    pub reset: bool,
}

impl SetupArgs {
    pub fn is_empty(&self) -> bool {
        self.user.is_none()
            && self.partner.is_none()
            && self.name.is_none()
            && self.lat.is_none()
            && self.method.is_none()
            && self.madhab.is_none()
            && self.tz.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["nooruna"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn swipe_accepts_negative_displacement() {
        let cli = Cli::try_parse_from(["nooruna", "swipe", "fajr", "--dx", "-150", "--dy", "-10"]).unwrap();
        match cli.command {
            Some(Commands::Swipe { task, dx, dy }) => {
                assert_eq!(task, "fajr");
                assert_eq!(dx, -150.0);
                assert_eq!(dy, -10.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn setup_needs_both_coordinates() {
        assert!(Cli::try_parse_from(["nooruna", "setup", "--lat", "31.9"]).is_err());
        let cli = Cli::try_parse_from(["nooruna", "setup", "--lat", "31.9", "--lng", "35.9"]).unwrap();
        match cli.command {
            Some(Commands::Setup(args)) => assert!(!args.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn double_click_is_kebab_case() {
        let cli = Cli::try_parse_from(["nooruna", "double-click", "mulk"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::DoubleClick { .. })));
    }
}
