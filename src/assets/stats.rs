use std::fmt;
use std::time::Duration;

use colored::Colorize;

use crate::assets::types::EntityKind;

/// Counters for one run. Updated once per asset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStatistics {
    pub movies: usize,
    pub shows: usize,
    pub seasons: usize,
    pub episodes: usize,
    pub collections: usize,
    pub failed: usize,
    pub backed_up: usize,
    pub duration: Duration,
}

impl RunStatistics {
    /// Count an asset placed for the given entity kind.
    pub const fn record_moved(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Movie => self.movies += 1,
            EntityKind::Show => self.shows += 1,
            EntityKind::Season => self.seasons += 1,
            EntityKind::Episode => self.episodes += 1,
            EntityKind::Collection => self.collections += 1,
        }
    }

    pub const fn record_failed(&mut self) {
        self.failed += 1;
    }

    pub const fn record_backup(&mut self) {
        self.backed_up += 1;
    }

    #[must_use]
    pub const fn total_moved(&self) -> usize {
        self.movies + self.shows + self.seasons + self.episodes + self.collections
    }

    #[must_use]
    pub const fn total_processed(&self) -> usize {
        self.total_moved() + self.failed
    }

    pub fn print_summary(&self) {
        println!("{}", "\n--- Asset Summary ---".bold().magenta());
        println!("Movies:        {}", self.movies);
        println!("Shows:         {}", self.shows);
        println!("Seasons:       {}", self.seasons);
        println!("Episodes:      {}", self.episodes);
        println!("Collections:   {}", self.collections);
        println!(
            "Failed:        {}",
            if self.failed > 0 {
                self.failed.to_string().red()
            } else {
                "0".normal()
            }
        );
        println!("Backed up:     {}", self.backed_up);
        println!("Total time:    {}", crate::format_duration(self.duration));
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "movies: {}, shows: {}, seasons: {}, episodes: {}, collections: {}, failed: {}, backed up: {}",
            self.movies, self.shows, self.seasons, self.episodes, self.collections, self.failed, self.backed_up
        )
    }
}
