use mazerun::{app, logging};

fn main() -> std::io::Result<()> {
    let _log_guard = logging::init_tracing("mazerun.log");
    tracing::info!("Starting mazerun");

    let mut stdout = std::io::stdout();
    app::setup_terminal(&mut stdout)?;
    let result = app::run(&mut stdout);
    // Restore the terminal even if the app failed
    app::restore_terminal(&mut stdout)?;

    if let Err(err) = &result {
        tracing::error!("App exited with error: {}", err);
    }
    result
}
