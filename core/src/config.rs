//! configuration for the demonstration harness.

use std::fmt;
use std::str::FromStr;

use crate::error::{DemoError, Result};

/// which scenarios to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// one writer filling the people database, one reader looking up a record.
    #[default]
    People,
    /// many readers and writers on a shared counter.
    Stress,
    /// people, then stress.
    All,
}

impl Mode {
    pub fn runs_people(&self) -> bool {
        matches!(self, Mode::People | Mode::All)
    }

    pub fn runs_stress(&self) -> bool {
        matches!(self, Mode::Stress | Mode::All)
    }
}

impl FromStr for Mode {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "people" => Ok(Mode::People),
            "stress" => Ok(Mode::Stress),
            "all" => Ok(Mode::All),
            other => Err(DemoError::InvalidConfig(format!(
                "unknown mode '{}', expected people, stress or all",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::People => write!(f, "people"),
            Mode::Stress => write!(f, "stress"),
            Mode::All => write!(f, "all"),
        }
    }
}

/// top-level configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// scenarios to run.
    pub mode: Mode,
    /// people database scenario.
    pub people: PeopleConfig,
    /// counter stress scenario.
    pub stress: StressConfig,
}

/// one writer, one reader, one people database.
#[derive(Debug, Clone)]
pub struct PeopleConfig {
    /// persons the writer adds, with SSNs "0".."writes-1".
    pub writes: usize,
    /// lookups the reader performs.
    pub lookups: usize,
    /// record id the reader looks up.
    pub lookup_id: usize,
    /// name given to every person.
    pub name: String,
    /// yield inside every critical section to provoke interleavings.
    pub yield_in_critical: bool,
}

/// reader and writer threads hammering one counter.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// reader threads.
    pub readers: usize,
    /// read cycles per reader thread.
    pub reader_cycles: usize,
    /// writer threads.
    pub writers: usize,
    /// increments per writer thread.
    pub writer_cycles: usize,
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self {
            writes: 100,
            lookups: 1000,
            lookup_id: 0,
            name: "bob".into(),
            yield_in_critical: true,
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            readers: 10,
            reader_cycles: 1000,
            writers: 2,
            writer_cycles: 100,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the scenarios to run.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// set the number of persons the writer adds.
    pub fn with_writes(mut self, writes: usize) -> Self {
        self.people.writes = writes;
        self
    }

    /// set the number of lookups the reader performs.
    pub fn with_lookups(mut self, lookups: usize) -> Self {
        self.people.lookups = lookups;
        self
    }

    /// set the record id the reader looks up.
    pub fn with_lookup_id(mut self, id: usize) -> Self {
        self.people.lookup_id = id;
        self
    }

    /// enable or disable yielding inside critical sections.
    pub fn with_yield_in_critical(mut self, enabled: bool) -> Self {
        self.people.yield_in_critical = enabled;
        self
    }

    /// set stress reader threads and cycles per thread.
    pub fn with_stress_readers(mut self, threads: usize, cycles: usize) -> Self {
        self.stress.readers = threads;
        self.stress.reader_cycles = cycles;
        self
    }

    /// set stress writer threads and cycles per thread.
    pub fn with_stress_writers(mut self, threads: usize, cycles: usize) -> Self {
        self.stress.writers = threads;
        self.stress.writer_cycles = cycles;
        self
    }

    /// resolve every setting from command-line `args`, falling back to the
    /// `SHEX_*` variable that `env` returns, then to the default.
    ///
    /// ```
    /// use shex_core::{Config, Mode};
    ///
    /// let args: Vec<String> = ["shex", "--mode", "stress"].iter().map(|s| s.to_string()).collect();
    /// let config = Config::from_sources(&args, |var| {
    ///     (var == "SHEX_WRITERS").then(|| "4".to_string())
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(config.mode, Mode::Stress);
    /// assert_eq!(config.stress.writers, 4);
    /// ```
    pub fn from_sources<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |flag: &str, var: &str| arg_value(args, flag).or_else(|| env(var));
        let number = |flag: &str, var: &str| -> Result<Option<usize>> {
            setting(flag, var)
                .map(|raw| {
                    raw.parse::<usize>().map_err(|_| {
                        DemoError::InvalidConfig(format!("{} expects a number, got '{}'", flag, raw))
                    })
                })
                .transpose()
        };

        let mut config = Config::new();

        if let Some(mode) = setting("--mode", "SHEX_MODE") {
            config = config.with_mode(mode.parse::<Mode>()?);
        }
        if let Some(n) = number("--writes", "SHEX_WRITES")? {
            config = config.with_writes(n);
        }
        if let Some(n) = number("--lookups", "SHEX_LOOKUPS")? {
            config = config.with_lookups(n);
        }
        if let Some(n) = number("--lookup-id", "SHEX_LOOKUP_ID")? {
            config = config.with_lookup_id(n);
        }
        if args.iter().any(|a| a == "--no-yield") {
            config = config.with_yield_in_critical(false);
        }

        let readers = number("--readers", "SHEX_READERS")?.unwrap_or(config.stress.readers);
        let reader_cycles =
            number("--reader-cycles", "SHEX_READER_CYCLES")?.unwrap_or(config.stress.reader_cycles);
        let writers = number("--writers", "SHEX_WRITERS")?.unwrap_or(config.stress.writers);
        let writer_cycles =
            number("--writer-cycles", "SHEX_WRITER_CYCLES")?.unwrap_or(config.stress.writer_cycles);

        Ok(config
            .with_stress_readers(readers, reader_cycles)
            .with_stress_writers(writers, writer_cycles))
    }

    pub fn validate(&self) -> Result<()> {
        if self.mode.runs_people() {
            self.people.validate()?;
        }
        if self.mode.runs_stress() {
            self.stress.validate()?;
        }
        Ok(())
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

impl PeopleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.writes == 0 {
            return Err(DemoError::InvalidConfig(
                "writes must be greater than 0".to_string(),
            ));
        }

        if self.lookups == 0 {
            return Err(DemoError::InvalidConfig(
                "lookups must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl StressConfig {
    pub fn validate(&self) -> Result<()> {
        if self.readers == 0 && self.writers == 0 {
            return Err(DemoError::InvalidConfig(
                "stress needs at least one reader or writer thread".to_string(),
            ));
        }

        Ok(())
    }

    /// final counter value once every writer has finished.
    pub fn expected_counter(&self) -> u64 {
        (self.writers * self.writer_cycles) as u64
    }
}
