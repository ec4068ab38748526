//! Structured logging setup.
//!
//! Subsystems log through `tracing` with structured fields (`handle`,
//! `grade`, `attacker`, `kill`). This module turns a serializable
//! [`TracingConfig`] into an `EnvFilter` and installs the fmt subscriber once.
//! `RUST_LOG` takes precedence over the configured filters.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Installs tracing when added to an app
#[derive(Default)]
pub struct LoggingPlugin {
    pub config: TracingConfig,
}

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(&self.config);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Case-insensitive parse; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<(String, LogLevel)>,
    pub show_thread_ids: bool,
    pub show_targets: bool,
    pub show_file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("monster_core::content".to_string(), LogLevel::Info),
                ("monster_core::pool".to_string(), LogLevel::Info),
                ("monster_core::combat".to_string(), LogLevel::Info),
                ("monster_core::death".to_string(), LogLevel::Info),
                ("monster_core::engine".to_string(), LogLevel::Info),
                // bevy's own scheduling noise
                ("bevy_ecs".to_string(), LogLevel::Warn),
            ],
            show_thread_ids: false,
            show_targets: true,
            show_file_line: false,
        }
    }
}

impl TracingConfig {
    /// Verbose preset for soak runs and debugging a single floor
    pub fn verbose() -> Self {
        let mut config = Self::default();
        config.default_level = LogLevel::Debug;
        for (_, level) in config
            .module_filters
            .iter_mut()
            .filter(|(module, _)| module.starts_with("monster_core"))
        {
            *level = LogLevel::Debug;
        }
        config
    }

    /// Set (or replace) the level for one module path
    pub fn with_module(mut self, module: &str, level: LogLevel) -> Self {
        match self.module_filters.iter_mut().find(|(m, _)| m == module) {
            Some((_, existing)) => *existing = level,
            None => self.module_filters.push((module.to_string(), level)),
        }
        self
    }

    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{}={}", module, level.as_str()));
        }
        parts.join(",")
    }
}

static TRACING_INIT: Once = Once::new();
static TRACING_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Initialize tracing (idempotent, first call wins).
///
/// Returns `true` if a subscriber from this module is installed.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter_str = config.to_env_filter_string();
    let config = config.clone();
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_targets)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .compact();

        // another global subscriber (a host app, a test harness) may already be set
        let installed = subscriber.try_init().is_ok();
        TRACING_INSTALLED.store(installed, Ordering::Relaxed);
    });
    TRACING_INSTALLED.load(Ordering::Relaxed)
}

pub fn init_tracing_default() -> bool {
    init_tracing(&TracingConfig::default())
}

/// Entered span around a named operation; closes on drop
pub struct OperationSpan {
    _span: tracing::span::EnteredSpan,
}

impl OperationSpan {
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("operation", name);
        Self {
            _span: span.entered(),
        }
    }
}
