//! Build context providing logging, profiling, counters and progress tracking
//!
//! Every message recorded here is also forwarded to the `log` facade, so a
//! host application sees it through its usual logger while tooling can
//! inspect the retained entries after a build.

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;
use std::time::Duration;
use web_time::Instant;

/// Log level for context messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug level messages
    Debug = 0,
    /// Informational messages
    Info = 1,
    /// Warning messages
    Warning = 2,
    /// Error messages
    Error = 3,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Timer categories of the link build stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerCategory {
    /// Whole build call
    Total,
    /// Edge extraction
    FindEdges,
    /// Rig setup, ground and action sampling
    Sampling,
    /// Link construction
    Links,
    /// Overlap filtering
    Filter,
}

/// Progress information for long-running operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    /// Current step number
    pub current: usize,
    /// Total number of steps
    pub total: usize,
}

/// Log entry containing message and metadata
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Timestamp when log was created
    pub timestamp: Instant,
    /// Log message
    pub message: String,
}

/// Accumulated duration of one timer category
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerEntry {
    /// Total time spent
    pub duration: Duration,
    /// Number of times this timer was stopped
    pub count: usize,
}

/// Counters collected during a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildCounters {
    /// Edges extracted from the contour set
    pub edges: usize,
    /// Ground samples that found walkable ground
    pub samples_with_ground: usize,
    /// Links produced by link construction
    pub links_added: usize,
    /// Links marked filtered by the overlap filter
    pub links_filtered: usize,
}

/// Context for link build operations
#[derive(Debug)]
pub struct BuildContext {
    logs: VecDeque<LogEntry>,
    active_timers: HashMap<TimerCategory, Instant>,
    timers: HashMap<TimerCategory, TimerEntry>,
    counters: BuildCounters,
    progress: Option<ProgressInfo>,
    min_log_level: LogLevel,
    enable_timing: bool,
    max_log_entries: usize,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildContext {
    /// Creates a new context with default settings
    pub fn new() -> Self {
        Self {
            logs: VecDeque::new(),
            active_timers: HashMap::new(),
            timers: HashMap::new(),
            counters: BuildCounters::default(),
            progress: None,
            min_log_level: LogLevel::Info,
            enable_timing: true,
            max_log_entries: 1000,
        }
    }

    /// Sets the minimum log level that is retained
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.min_log_level = level;
    }

    /// Enables or disables performance timing
    pub fn set_timing_enabled(&mut self, enabled: bool) {
        self.enable_timing = enabled;
    }

    /// Sets the maximum number of log entries to keep
    pub fn set_max_log_entries(&mut self, max_entries: usize) {
        self.max_log_entries = max_entries;
        while self.logs.len() > self.max_log_entries {
            self.logs.pop_front();
        }
    }

    /// Logs a debug message
    pub fn log_debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    /// Logs an info message
    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Logs a warning message
    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    /// Logs an error message
    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        let log_level: log::Level = level.into();
        log::log!(target: "navlink", log_level, "{}", message);

        if level < self.min_log_level || self.max_log_entries == 0 {
            return;
        }

        if self.logs.len() >= self.max_log_entries {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            level,
            timestamp: Instant::now(),
            message,
        });
    }

    /// Starts a timer for the given category
    pub fn start_timer(&mut self, category: TimerCategory) {
        if self.enable_timing {
            self.active_timers.insert(category, Instant::now());
        }
    }

    /// Stops a timer and accumulates the duration
    pub fn stop_timer(&mut self, category: TimerCategory) {
        if let Some(start_time) = self.active_timers.remove(&category) {
            let entry = self.timers.entry(category).or_default();
            entry.duration += start_time.elapsed();
            entry.count += 1;
        }
    }

    /// Gets the total duration recorded for a category
    pub fn timer_duration(&self, category: TimerCategory) -> Option<Duration> {
        self.timers.get(&category).map(|entry| entry.duration)
    }

    /// Gets how many times a timer was stopped
    pub fn timer_count(&self, category: TimerCategory) -> usize {
        self.timers.get(&category).map_or(0, |entry| entry.count)
    }

    /// Counters of the current build session
    pub fn counters(&self) -> &BuildCounters {
        &self.counters
    }

    /// Mutable access to the counters
    pub fn counters_mut(&mut self) -> &mut BuildCounters {
        &mut self.counters
    }

    /// Updates progress information
    pub fn set_progress(&mut self, current: usize, total: usize) {
        self.progress = Some(ProgressInfo { current, total });
    }

    /// Gets current progress information
    pub fn progress(&self) -> Option<&ProgressInfo> {
        self.progress.as_ref()
    }

    /// Retained log entries, oldest first
    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter()
    }

    /// Retained log entries of one level
    pub fn logs_by_level(&self, level: LogLevel) -> Vec<&LogEntry> {
        self.logs.iter().filter(|entry| entry.level == level).collect()
    }

    /// Resets the context (clears logs, timers, counters and progress)
    pub fn reset(&mut self) {
        self.logs.clear();
        self.active_timers.clear();
        self.timers.clear();
        self.counters = BuildCounters::default();
        self.progress = None;
    }

    /// Formats a summary of the performance timers, slowest first
    pub fn timer_summary(&self) -> String {
        let mut sorted: Vec<_> = self.timers.iter().collect();
        sorted.sort_by(|a, b| b.1.duration.cmp(&a.1.duration));

        let mut out = String::new();
        for (category, entry) in sorted {
            let ms = entry.duration.as_secs_f64() * 1000.0;
            let _ = writeln!(
                out,
                "{:12} {:8.2}ms ({} calls, avg: {:.2}ms)",
                format!("{:?}", category),
                ms,
                entry.count,
                ms / entry.count.max(1) as f64
            );
        }
        out
    }
}
