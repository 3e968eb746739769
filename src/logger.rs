use chrono::Local;
use env_logger::fmt::Color;
use log::LevelFilter;
use std::io::Write;
use std::str::FromStr;

/// Level requested through `LOG_LEVEL`, read before the rest of the config so
/// that config warnings are already printed.
pub fn level_from_env() -> Option<LevelFilter> {
    dotenv::dotenv().ok();

    dotenv::var("LOG_LEVEL")
        .ok()
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
}

pub fn init_logger(level: Option<LevelFilter>) {
    let mut bui = env_logger::builder();
    let bui = bui.format(|buf, record| {
        let dt = Local::now();

        let lvl = record.level();
        let targ = record.target();
        let msg = record.args();

        let mut level_style = buf.style();
        level_style
            .set_color(match lvl {
                log::Level::Error => Color::Red,
                log::Level::Warn => Color::Yellow,
                log::Level::Info => Color::Green,
                log::Level::Debug => Color::Blue,
                log::Level::Trace => Color::Magenta,
            })
            .set_bold(true);

        let mut date_style = buf.style();
        date_style.set_color(Color::Rgb(91, 24, 128)).set_bold(true);

        let mut target_style = buf.style();
        target_style
            .set_color(Color::Rgb(128, 24, 60))
            .set_bold(true);

        writeln!(
            buf,
            "{} {} {}: {}",
            date_style.value(dt.format("%Y-%m-%d %H:%M:%S")),
            level_style.value(lvl),
            target_style.value(targ),
            msg
        )
    });

    let level = level.unwrap_or(if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    // sqlx logs every statement at debug
    bui.filter_level(level)
        .filter_module("sqlx", LevelFilter::Warn.min(level));

    if let Err(e) = bui.try_init() {
        eprintln!("logger already initialized: {}", e);
    }
}
