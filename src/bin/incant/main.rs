//! incant - run a test signal through one effect on the default output device
//!
//! Run with: cargo run -- [delay|chorus|phaser|filter|glitch] [seconds]
//!
//! Set `RUST_LOG=debug` for per-second meter readings.

mod app;
mod source;

use color_eyre::eyre::WrapErr;
use incant_dsp::params::EffectKind;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let effect = match args.next() {
        Some(name) => name.parse::<EffectKind>().wrap_err("invalid effect argument")?,
        None => EffectKind::Chorus,
    };
    let seconds = match args.next() {
        Some(value) => value
            .parse::<f32>()
            .wrap_err_with(|| format!("invalid duration `{}`", value))?,
        None => 10.0,
    };

    app::Demo::new(effect).seconds(seconds).run()
}
