//! Outward-facing renderer callback. The engine calls out with display
//! state; what happens to it (terminal, web page, test recorder) is opaque.

use chrono::{Local, TimeZone};

use crate::model::{Candidate, Station};

pub trait Renderer {
    /// The current station list and selection, for the selector display.
    fn stations(&mut self, stations: &[Station], selected: Option<&Station>);
    /// The ranked next-arrivals list.
    fn arrivals(&mut self, arrivals: &[Candidate]);
    /// The live countdown string for the top arrival ("–" when there is none).
    fn countdown(&mut self, text: &str);
    /// Human-readable connection/update status.
    fn status(&mut self, text: &str);
}

/// Countdown formatting: seconds under a minute, minutes + seconds above.
pub fn format_eta(seconds: i64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}

/// Prints engine output to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    last_countdown: String,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for ConsoleRenderer {
    fn stations(&mut self, stations: &[Station], selected: Option<&Station>) {
        println!("{} stations known", stations.len());
        if let Some(s) = selected {
            println!("selected: {} ({})", s.name, s.id);
        }
    }

    fn arrivals(&mut self, arrivals: &[Candidate]) {
        for c in arrivals {
            let when = Local
                .timestamp_millis_opt(c.departure_ms)
                .earliest()
                .map(|dt| dt.format("%H:%M:%S").to_string())
                .unwrap_or_default();
            println!(
                "  {}: {} in {} ({})",
                c.vehicle_id,
                c.title,
                format_eta(c.seconds_until),
                when
            );
        }
    }

    fn countdown(&mut self, text: &str) {
        // The countdown ticks every second; only print changes.
        if text != self.last_countdown {
            println!("next arrival in {text}");
            self.last_countdown = text.to_string();
        }
    }

    fn status(&mut self, text: &str) {
        println!("[status] {text}");
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_formatting() {
        assert_eq!(format_eta(0), "0s");
        assert_eq!(format_eta(59), "59s");
        assert_eq!(format_eta(60), "1m 0s");
        assert_eq!(format_eta(754), "12m 34s");
    }
}
