use std::time::{Duration, Instant};

use mazerun::{
    app::{
        player::VISUALIZE_TICK,
        session::{Difficulty, Phase, Session, SessionConfig, VisualizationMode},
    },
    logging,
    solvers::{Algorithm, SolveError},
};

/// Upper bound on virtual time per session, so a stuck session cannot spin forever.
const MAX_VIRTUAL_TIME: Duration = Duration::from_secs(3600);

/// Drive one session from the menu to completion on the virtual clock.
/// Returns the virtual time it took.
fn run_to_completion(session: &mut Session) -> Result<Duration, SolveError> {
    let started = session.now();
    session.start_game()?;
    while session.phase() != Phase::Moving {
        if session.now() - started > MAX_VIRTUAL_TIME {
            tracing::warn!("[profile] session stuck in {}", session.phase());
            return Ok(session.now() - started);
        }
        session.advance(VISUALIZE_TICK);
    }
    while session.move_ball() {}
    session.complete();
    Ok(session.now() - started)
}

fn main() {
    let _log_guard = logging::init_tracing("mazerun-profile.log");

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(1);

    let mut session = Session::new(SessionConfig {
        difficulty: Difficulty::Hard,
        mode: VisualizationMode::Step,
        seed: Some(0),
        ..SessionConfig::default()
    });

    for algorithm in Algorithm::ALL {
        session.set_algorithm(algorithm);
        let wall_clock = Instant::now();
        let mut virtual_time = Duration::ZERO;
        let mut nodes_explored = 0;
        for _ in 0..num_iters {
            session.restart();
            match run_to_completion(&mut session) {
                Ok(elapsed) => virtual_time += elapsed,
                Err(err) => {
                    eprintln!("{}: solve failed: {}", algorithm, err);
                    continue;
                }
            }
            nodes_explored += session.stats().map_or(0, |s| s.nodes_explored);
        }
        println!(
            "{}: {} runs, {:?} wall clock, {:?} virtual, {} nodes explored",
            algorithm,
            num_iters,
            wall_clock.elapsed(),
            virtual_time,
            nodes_explored
        );
    }
}
