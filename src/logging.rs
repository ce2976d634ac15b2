//! Log filtering shared by both targets.
//!
//! Level strings use `env_logger` directive syntax (`"info"`,
//! `"heartfield_wasm::field=debug,warn"`). The host helper installs
//! `env_logger` itself; in the browser a small `log` backend writes the
//! records that pass the same filter to the console.

use env_logger::filter::{Builder, Filter};
use log::LevelFilter;

/// Parse a directive list. An empty string means `info`.
pub fn parse_filter(directives: &str) -> Filter {
    let directives = directives.trim();
    let mut builder = Builder::new();
    if directives.is_empty() {
        builder.filter_level(LevelFilter::Info);
    } else {
        builder.parse(directives);
    }
    builder.build()
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::sync::RwLock;

    use env_logger::filter::Filter;
    use log::{Level, Log, Metadata, Record};

    pub struct ConsoleLogger {
        pub filter: RwLock<Option<Filter>>,
    }

    pub static LOGGER: ConsoleLogger = ConsoleLogger {
        filter: RwLock::new(None),
    };

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            self.filter
                .read()
                .map(|f| f.as_ref().is_some_and(|f| f.enabled(metadata)))
                .unwrap_or(false)
        }

        fn log(&self, record: &Record) {
            let matches = self
                .filter
                .read()
                .map(|f| f.as_ref().is_some_and(|f| f.matches(record)))
                .unwrap_or(false);
            if !matches {
                return;
            }
            let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            let value = wasm_bindgen::JsValue::from_str(&line);
            match record.level() {
                Level::Error => web_sys::console::error_1(&value),
                Level::Warn => web_sys::console::warn_1(&value),
                Level::Info => web_sys::console::info_1(&value),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
            }
        }

        fn flush(&self) {}
    }
}

/// Install the console logger with `directives`. Safe to call on every
/// mount; only the first call installs, later calls swap the filter.
#[cfg(target_arch = "wasm32")]
pub fn init(directives: &str) {
    let filter = parse_filter(directives);
    log::set_max_level(filter.filter());
    if let Ok(mut slot) = console::LOGGER.filter.write() {
        *slot = Some(filter);
    }
    let _ = log::set_logger(&console::LOGGER);
}
