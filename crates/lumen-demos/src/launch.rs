use lumen_engine::core::App;
use lumen_engine::device::GpuInit;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::window::{Runtime, RuntimeConfig};

/// Title every lesson window opens with.
pub const WINDOW_TITLE: &str = "LearnOpenGL";

/// Sets up logging and runs `app` in an 800x600 window until it closes.
pub fn run_demo<A>(lesson: &str, app: A) -> anyhow::Result<()>
where
    A: App + 'static,
{
    init_logging(LoggingConfig::default());
    log::info!("starting lesson `{lesson}`");

    let config = RuntimeConfig {
        title: format!("{WINDOW_TITLE} - {lesson}"),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), app)
}
