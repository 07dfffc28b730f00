use std::time::Duration;

use crate::{
    app::{
        player::VisualizationPlayer,
        scheduler::{Scheduler, TimerId, TimerKind, Token},
    },
    generators::{Generator, PRESETS, generate_maze, load_preset},
    maze::{Grid, Maze, Position},
    solvers::{Algorithm, GridSolver, Solve, SolveError, Stats},
};

/// Pause between a step-mode solve and the start of the reveal.
pub const SOLVE_TO_VISUALIZE_DELAY: Duration = Duration::from_millis(300);
/// Pause after the final overlay is shown, before the agent starts moving.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Lifecycle of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Solving,
    Visualizing,
    Moving,
    Completed,
}

impl Phase {
    /// Whether `self -> next` is an edge of the lifecycle. `Menu` is reachable from anywhere.
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (_, Phase::Menu)
                | (Phase::Menu, Phase::Solving)
                | (Phase::Solving, Phase::Visualizing)
                | (Phase::Solving, Phase::Moving)
                | (Phase::Visualizing, Phase::Moving)
                | (Phase::Moving, Phase::Completed)
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Menu => write!(f, "menu"),
            Phase::Solving => write!(f, "solving"),
            Phase::Visualizing => write!(f, "visualizing"),
            Phase::Moving => write!(f, "moving"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Side length of the square maze generated at this difficulty.
    pub fn dimension(self) -> u16 {
        match self {
            Difficulty::Easy => 11,
            Difficulty::Medium => 15,
            Difficulty::Hard => 21,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.dimension();
        match self {
            Difficulty::Easy => write!(f, "Easy ({}x{})", n, n),
            Difficulty::Medium => write!(f, "Medium ({}x{})", n, n),
            Difficulty::Hard => write!(f, "Hard ({}x{})", n, n),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationMode {
    /// Show the whole exploration and path at once
    Instant,
    /// Reveal visited cells one tick at a time
    #[default]
    Step,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 2] = [VisualizationMode::Step, VisualizationMode::Instant];
}

impl std::fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisualizationMode::Instant => write!(f, "Instant"),
            VisualizationMode::Step => write!(f, "Step by step"),
        }
    }
}

/// User-selectable settings. They survive restarts; everything else in a session does not.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub mode: VisualizationMode,
    pub algorithm: Option<Algorithm>,
    /// Use this preset instead of a random maze
    pub preset: Option<usize>,
    /// Seed for random mazes. Each new maze uses `seed + generation`.
    pub seed: Option<u64>,
}

/// Notifications sent to subscribers after the session changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged { from: Phase, to: Phase },
    /// The grid snapshot was replaced; `version` increases on every replacement
    GridReplaced { version: u64 },
    Solved(Stats),
    SolveFailed(SolveError),
    AgentMoved(Position),
}

/// Read-only state for renderers and status panels.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub phase: Phase,
    pub grid: &'a Grid,
    pub grid_version: u64,
    pub agent: Position,
    pub stats: Option<Stats>,
    pub visualization_index: usize,
    pub path_index: usize,
    pub path_len: usize,
    pub visited_len: usize,
    pub failure: Option<&'a SolveError>,
    pub config: &'a SessionConfig,
}

type Observer = Box<dyn FnMut(&SessionEvent)>;

/// Owns the single active session: maze, solve results, playback cursors and timers.
///
/// All mutation goes through the methods below, on one thread. Timers are driven
/// by [`Session::advance`]. Every timer carries the session generation it was
/// scheduled in, and a reset bumps the generation, so a timer that outlives its
/// session does nothing when it fires.
pub struct Session {
    config: SessionConfig,
    maze: Maze,
    phase: Phase,
    path: Vec<Position>,
    visited: Vec<Position>,
    stats: Option<Stats>,
    path_index: usize,
    agent: Position,
    /// Set once the solver has run for this session
    solved: bool,
    failure: Option<SolveError>,
    generation: u64,
    grid_version: u64,
    scheduler: Scheduler,
    player: VisualizationPlayer,
    solver: Box<dyn Solve>,
    observers: Vec<Observer>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session::with_solver(config, Box::new(GridSolver))
    }

    pub fn with_solver(config: SessionConfig, solver: Box<dyn Solve>) -> Self {
        let maze = Session::build_maze(&config, 0);
        let agent = maze.start;
        Session {
            config,
            maze,
            phase: Phase::Menu,
            path: Vec::new(),
            visited: Vec::new(),
            stats: None,
            path_index: 0,
            agent,
            solved: false,
            failure: None,
            generation: 0,
            grid_version: 0,
            scheduler: Scheduler::new(),
            player: VisualizationPlayer::new(),
            solver,
            observers: Vec::new(),
        }
    }

    /// Build the maze the config asks for. A random maze that cannot be generated
    /// falls back to the first preset.
    fn build_maze(config: &SessionConfig, generation: u64) -> Maze {
        let generator = match config.preset {
            Some(index) => Generator::Preset(index),
            None => {
                let n = config.difficulty.dimension();
                Generator::RecurBacktrack {
                    width: n,
                    height: n,
                }
            }
        };
        let seed = config.seed.map(|s| s.wrapping_add(generation));
        match generate_maze(generator, seed) {
            Ok(maze) => {
                tracing::info!("[session] generated maze: {}", generator);
                maze
            }
            Err(err) => {
                tracing::warn!("[session] {}, falling back to the first preset", err);
                load_preset(0)
            }
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SessionEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, event: SessionEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn grid(&self) -> &Grid {
        &self.maze.grid
    }

    pub fn path(&self) -> &[Position] {
        &self.path
    }

    pub fn visited(&self) -> &[Position] {
        &self.visited
    }

    pub fn stats(&self) -> Option<Stats> {
        self.stats
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    pub fn visualization_index(&self) -> usize {
        self.player.cursor()
    }

    pub fn failure(&self) -> Option<&SolveError> {
        self.failure.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid_version(&self) -> u64 {
        self.grid_version
    }

    /// Virtual time of the session clock.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            phase: self.phase,
            grid: &self.maze.grid,
            grid_version: self.grid_version,
            agent: self.agent,
            stats: self.stats,
            visualization_index: self.player.cursor(),
            path_index: self.path_index,
            path_len: self.path.len(),
            visited_len: self.visited.len(),
            failure: self.failure.as_ref(),
            config: &self.config,
        }
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        tracing::debug!("[session] algorithm set to {}", algorithm);
        self.config.algorithm = Some(algorithm);
    }

    /// Takes effect on the next solve.
    pub fn set_visualization_mode(&mut self, mode: VisualizationMode) {
        tracing::debug!("[session] visualization mode set to {}", mode);
        self.config.mode = mode;
    }

    /// Switch to a random maze at the new difficulty. Resets the session.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        self.generate_maze();
    }

    /// Replace the maze with a freshly generated random one. Resets the session.
    pub fn generate_maze(&mut self) {
        self.config.preset = None;
        self.reset();
    }

    /// Replace the maze with a preset, wrapping `index` modulo the catalog. Resets the session.
    pub fn load_preset_maze(&mut self, index: usize) {
        self.config.preset = Some(index % PRESETS.len());
        self.reset();
    }

    /// Back to the menu with a new maze from the current config.
    pub fn restart(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.player.reset(&mut self.scheduler);
        self.generation += 1;

        self.maze = Session::build_maze(&self.config, self.generation);
        self.path.clear();
        self.visited.clear();
        self.stats = None;
        self.path_index = 0;
        self.agent = self.maze.start;
        self.solved = false;
        self.failure = None;

        self.bump_grid_version();
        self.transition(Phase::Menu);
        tracing::info!("[session] reset, generation {}", self.generation);
    }

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        if !from.can_advance_to(to) {
            tracing::warn!("[session] ignoring invalid transition {} -> {}", from, to);
            return;
        }
        self.phase = to;
        tracing::info!("[session] phase {} -> {}", from, to);
        self.notify(SessionEvent::PhaseChanged { from, to });
    }

    fn bump_grid_version(&mut self) {
        self.grid_version += 1;
        let version = self.grid_version;
        self.notify(SessionEvent::GridReplaced { version });
    }

    fn replace_grid(&mut self, grid: Grid) {
        self.maze.grid = grid;
        self.bump_grid_version();
    }

    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        self.scheduler.schedule_after(
            delay,
            Token {
                generation: self.generation,
                kind,
            },
        )
    }

    /// Leave the menu and solve. A no-op unless in `Menu` with an algorithm selected.
    pub fn start_game(&mut self) -> Result<(), SolveError> {
        if self.phase != Phase::Menu {
            tracing::debug!("[session] start_game ignored in phase {}", self.phase);
            return Ok(());
        }
        if self.config.algorithm.is_none() {
            tracing::debug!("[session] start_game ignored, no algorithm selected");
            return Ok(());
        }
        self.transition(Phase::Solving);
        self.solve()
    }

    /// Run the solver for the current session.
    ///
    /// Runs at most once per session: further calls are no-ops until a reset, or
    /// until a failed solve released the latch. On failure the error is kept in
    /// [`Session::failure`] and the phase stays `Solving`, so the caller can
    /// [`Session::retry_solve`] or [`Session::restart`].
    pub fn solve(&mut self) -> Result<(), SolveError> {
        if self.phase != Phase::Solving || self.solved {
            return Ok(());
        }
        let Some(algorithm) = self.config.algorithm else {
            return Ok(());
        };
        self.solved = true;
        self.failure = None;

        // The solver works on its own copy and never sees overlays
        let snapshot = self.maze.grid.without_overlays();
        let (start, end) = (self.maze.start, self.maze.end);
        let result = match self.solver.solve(algorithm, &snapshot, start, end) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("[session] {} failed: {}", algorithm, err);
                self.solved = false;
                self.failure = Some(err.clone());
                self.notify(SessionEvent::SolveFailed(err.clone()));
                return Err(err);
            }
        };

        tracing::info!(
            "[session] {} solved in {:.3}ms, {} explored, path length {}",
            algorithm,
            result.stats.solve_time_ms,
            result.stats.nodes_explored,
            result.stats.path_length
        );
        if result.path.is_empty() {
            tracing::info!("[session] no route from {} to {}", start, end);
        }
        self.stats = Some(result.stats);
        self.path = result.path;
        self.visited = result.visited;
        self.notify(SessionEvent::Solved(result.stats));

        match self.config.mode {
            VisualizationMode::Instant => {
                let grid = self
                    .maze
                    .grid
                    .with_visited(&self.visited)
                    .with_path(&self.path);
                self.replace_grid(grid);
                self.schedule(SETTLE_DELAY, TimerKind::EnterMoving);
            }
            VisualizationMode::Step => {
                self.schedule(SOLVE_TO_VISUALIZE_DELAY, TimerKind::EnterVisualizing);
            }
        }
        Ok(())
    }

    /// Try the solver again after a failure.
    pub fn retry_solve(&mut self) -> Result<(), SolveError> {
        if self.phase != Phase::Solving || self.failure.is_none() {
            return Ok(());
        }
        tracing::info!("[session] retrying solve");
        self.solve()
    }

    /// Move the session clock forward by `elapsed`, firing every timer that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some((id, token)) = self.scheduler.pop_due(until) {
            self.fire(id, token);
        }
        self.scheduler.advance_to(until);
    }

    fn fire(&mut self, id: TimerId, token: Token) {
        if token.generation != self.generation {
            tracing::debug!("[session] dropping stale {:?} timer", token.kind);
            return;
        }
        match token.kind {
            TimerKind::EnterVisualizing => {
                if self.phase == Phase::Solving {
                    self.enter_visualizing();
                }
            }
            TimerKind::VisualizeTick => {
                if self.phase == Phase::Visualizing && self.player.owns(id) {
                    self.visualize_tick();
                }
            }
            TimerKind::EnterMoving => {
                if matches!(self.phase, Phase::Solving | Phase::Visualizing) {
                    self.enter_moving();
                }
            }
        }
    }

    fn enter_visualizing(&mut self) {
        self.transition(Phase::Visualizing);
        let grid = self.maze.grid.without_overlays();
        self.replace_grid(grid);
        self.player
            .start(self.visited.len(), &mut self.scheduler, self.generation);
    }

    fn visualize_tick(&mut self) {
        if self.player.step() {
            let revealed = &self.visited[..self.player.cursor()];
            let grid = self.maze.grid.with_visited(revealed);
            self.replace_grid(grid);
            return;
        }

        // Exhausted: stop ticking, show the whole path once, then settle
        self.player.stop(&mut self.scheduler);
        let grid = self.maze.grid.with_path(&self.path);
        self.replace_grid(grid);
        self.schedule(SETTLE_DELAY, TimerKind::EnterMoving);
    }

    fn enter_moving(&mut self) {
        self.transition(Phase::Moving);
        self.path_index = 0;
        self.agent = self.maze.start;
    }

    /// Step the agent to the next cell of the path.
    ///
    /// Returns `false` without moving when not `Moving` or when the path is used up;
    /// the caller then calls [`Session::complete`].
    pub fn move_ball(&mut self) -> bool {
        if self.phase != Phase::Moving {
            return false;
        }
        let Some(&next) = self.path.get(self.path_index) else {
            return false;
        };
        self.path_index += 1;
        self.agent = next;
        self.notify(SessionEvent::AgentMoved(next));
        true
    }

    /// Finish the session once the agent has walked the whole path.
    /// Returns whether the session is now `Completed`.
    pub fn complete(&mut self) -> bool {
        if self.phase == Phase::Moving && self.path_index >= self.path.len() {
            self.transition(Phase::Completed);
        }
        self.phase == Phase::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::player::VISUALIZE_TICK,
        generators::load_preset,
        maze::Grid,
        solvers::SolveResult,
    };
    use std::{cell::RefCell, rc::Rc};

    /// Counts calls and delegates to the built-in solvers.
    struct CountingSolver {
        calls: Rc<RefCell<usize>>,
    }

    impl Solve for CountingSolver {
        fn solve(
            &self,
            algorithm: Algorithm,
            grid: &Grid,
            start: Position,
            end: Position,
        ) -> Result<SolveResult, SolveError> {
            *self.calls.borrow_mut() += 1;
            GridSolver.solve(algorithm, grid, start, end)
        }
    }

    /// Fails the first `failures` calls, then delegates.
    struct FlakySolver {
        failures: RefCell<usize>,
    }

    impl Solve for FlakySolver {
        fn solve(
            &self,
            algorithm: Algorithm,
            grid: &Grid,
            start: Position,
            end: Position,
        ) -> Result<SolveResult, SolveError> {
            let mut failures = self.failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Err(SolveError::Failed {
                    algorithm,
                    reason: "injected".to_string(),
                });
            }
            GridSolver.solve(algorithm, grid, start, end)
        }
    }

    /// Hands back a fixed result regardless of the grid.
    struct FixedSolver(SolveResult);

    impl Solve for FixedSolver {
        fn solve(
            &self,
            _: Algorithm,
            _: &Grid,
            _: Position,
            _: Position,
        ) -> Result<SolveResult, SolveError> {
            Ok(self.0.clone())
        }
    }

    fn preset_config(mode: VisualizationMode) -> SessionConfig {
        SessionConfig {
            mode,
            algorithm: Some(Algorithm::AStar),
            preset: Some(0),
            ..SessionConfig::default()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn record_phases(session: &mut Session) -> Rc<RefCell<Vec<Phase>>> {
        let phases = Rc::new(RefCell::new(Vec::new()));
        let sink = phases.clone();
        session.subscribe(move |event| {
            if let SessionEvent::PhaseChanged { to, .. } = event {
                sink.borrow_mut().push(*to);
            }
        });
        phases
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new(preset_config(VisualizationMode::Step));
        assert_eq!(session.phase(), Phase::Menu);
        assert_eq!(session.maze(), &load_preset(0));
        assert_eq!(session.agent(), Position::new(1, 1));
        assert!(session.stats().is_none());
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn test_start_without_algorithm_is_noop() {
        let mut session = Session::new(SessionConfig {
            preset: Some(0),
            ..SessionConfig::default()
        });
        assert!(session.start_game().is_ok());
        assert_eq!(session.phase(), Phase::Menu);
        assert!(session.stats().is_none());
    }

    #[test]
    fn test_instant_mode_scenario() {
        let mut session = Session::new(SessionConfig::default());
        session.load_preset_maze(0);
        assert_eq!(session.maze().start, Position::new(1, 1));
        assert_eq!(session.maze().end, Position::new(13, 13));
        session.set_algorithm(Algorithm::AStar);
        session.set_visualization_mode(VisualizationMode::Instant);

        session.start_game().unwrap();
        assert_eq!(session.phase(), Phase::Solving);
        // Overlays are committed right away
        let path_cells = session.grid().cells().filter(|c| c.is_path).count();
        assert_eq!(path_cells, session.path().len());
        assert!(session.grid().cells().any(|c| c.is_visited));

        session.advance(SETTLE_DELAY - ms(1));
        assert_eq!(session.phase(), Phase::Solving);
        session.advance(ms(1));
        assert_eq!(session.phase(), Phase::Moving);
        assert!(!session.path().is_empty());
        let stats = session.stats().unwrap();
        assert_eq!(stats.path_length, session.path().len());
    }

    #[test]
    fn test_step_mode_full_lifecycle() {
        let mut session = Session::new(preset_config(VisualizationMode::Step));
        let phases = record_phases(&mut session);
        session.start_game().unwrap();
        assert!(session.grid().cells().all(|c| !c.is_visited && !c.is_path));

        session.advance(SOLVE_TO_VISUALIZE_DELAY);
        assert_eq!(session.phase(), Phase::Visualizing);
        assert_eq!(session.visualization_index(), 0);

        let total = session.visited().len();
        for revealed in 1..=total {
            session.advance(VISUALIZE_TICK);
            assert_eq!(session.visualization_index(), revealed);
            let marked = session.grid().cells().filter(|c| c.is_visited).count();
            let distinct = session.visited()[..revealed]
                .iter()
                .collect::<std::collections::HashSet<_>>()
                .len();
            assert_eq!(marked, distinct);
            assert!(session.grid().cells().all(|c| !c.is_path));
        }

        // One more tick notices exhaustion and commits the path
        session.advance(VISUALIZE_TICK);
        assert_eq!(session.visualization_index(), total);
        assert_eq!(
            session.grid().cells().filter(|c| c.is_path).count(),
            session.path().len()
        );
        assert_eq!(session.phase(), Phase::Visualizing);
        // Only the settle timer is left
        assert_eq!(session.pending_timers(), 1);

        session.advance(SETTLE_DELAY);
        assert_eq!(session.phase(), Phase::Moving);

        let path = session.path().to_vec();
        for _ in 0..path.len() {
            assert!(session.move_ball());
        }
        assert_eq!(session.path_index(), path.len());
        assert_eq!(Some(&session.agent()), path.last());
        assert!(!session.move_ball());
        assert_eq!(Some(&session.agent()), path.last());

        assert!(session.complete());
        assert_eq!(
            *phases.borrow(),
            vec![
                Phase::Solving,
                Phase::Visualizing,
                Phase::Moving,
                Phase::Completed
            ]
        );
    }

    #[test]
    fn test_solver_runs_once_per_session() {
        let calls = Rc::new(RefCell::new(0));
        let mut session = Session::with_solver(
            preset_config(VisualizationMode::Step),
            Box::new(CountingSolver {
                calls: calls.clone(),
            }),
        );
        session.start_game().unwrap();
        session.solve().unwrap();
        session.solve().unwrap();
        session.start_game().unwrap();
        assert_eq!(*calls.borrow(), 1);

        session.restart();
        session.start_game().unwrap();
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_solver_failure_is_recoverable() {
        let mut session = Session::with_solver(
            preset_config(VisualizationMode::Instant),
            Box::new(FlakySolver {
                failures: RefCell::new(1),
            }),
        );
        let failures = Rc::new(RefCell::new(0));
        let sink = failures.clone();
        session.subscribe(move |event| {
            if matches!(event, SessionEvent::SolveFailed(_)) {
                *sink.borrow_mut() += 1;
            }
        });

        assert!(session.start_game().is_err());
        assert_eq!(session.phase(), Phase::Solving);
        assert!(session.failure().is_some());
        assert_eq!(*failures.borrow(), 1);
        assert_eq!(session.pending_timers(), 0);

        session.retry_solve().unwrap();
        assert!(session.failure().is_none());
        session.advance(SETTLE_DELAY);
        assert_eq!(session.phase(), Phase::Moving);
    }

    #[test]
    fn test_restart_cancels_pending_timers() {
        let mut session = Session::new(preset_config(VisualizationMode::Step));
        session.start_game().unwrap();
        session.advance(SOLVE_TO_VISUALIZE_DELAY + VISUALIZE_TICK * 3);
        assert_eq!(session.phase(), Phase::Visualizing);
        assert_eq!(session.visualization_index(), 3);

        session.restart();
        assert_eq!(session.phase(), Phase::Menu);
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(session.visualization_index(), 0);
        assert!(session.path().is_empty());
        assert!(session.visited().is_empty());
        assert!(session.stats().is_none());
        assert!(session.grid().cells().all(|c| !c.is_visited && !c.is_path));

        let version = session.grid_version();
        session.advance(Duration::from_secs(10));
        assert_eq!(session.phase(), Phase::Menu);
        assert_eq!(session.grid_version(), version);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut session = Session::new(preset_config(VisualizationMode::Instant));
        session.start_game().unwrap();
        // A timer from the previous generation survives a reset that forgot to cancel it
        let stale = session.schedule(SETTLE_DELAY, TimerKind::EnterMoving);
        let stale_token = Token {
            generation: session.generation(),
            kind: TimerKind::EnterMoving,
        };
        session.restart();
        session.fire(stale, stale_token);
        assert_eq!(session.phase(), Phase::Menu);

        // Same generation, wrong phase
        session.fire(
            stale,
            Token {
                generation: session.generation(),
                kind: TimerKind::VisualizeTick,
            },
        );
        assert_eq!(session.phase(), Phase::Menu);
        assert_eq!(session.visualization_index(), 0);
    }

    #[test]
    fn test_unsolvable_maze_completes_gracefully() {
        let mut session = Session::with_solver(
            preset_config(VisualizationMode::Step),
            Box::new(FixedSolver(SolveResult {
                path: Vec::new(),
                visited: vec![Position::new(1, 1), Position::new(1, 2)],
                stats: Stats {
                    solve_time_ms: 0.5,
                    nodes_explored: 2,
                    path_length: 0,
                },
            })),
        );
        session.start_game().unwrap();
        session.advance(SOLVE_TO_VISUALIZE_DELAY + VISUALIZE_TICK * 3 + SETTLE_DELAY);
        assert_eq!(session.phase(), Phase::Moving);
        assert!(session.grid().cells().all(|c| !c.is_path));
        assert!(!session.move_ball());
        assert_eq!(session.agent(), Position::new(1, 1));
        assert!(session.complete());
    }

    #[test]
    fn test_empty_exploration_skips_straight_to_path() {
        let path = vec![Position::new(1, 1), Position::new(1, 2)];
        let mut session = Session::with_solver(
            preset_config(VisualizationMode::Step),
            Box::new(FixedSolver(SolveResult {
                path: path.clone(),
                visited: Vec::new(),
                stats: Stats::default(),
            })),
        );
        session.start_game().unwrap();
        session.advance(SOLVE_TO_VISUALIZE_DELAY + VISUALIZE_TICK);
        assert_eq!(session.grid().cells().filter(|c| c.is_path).count(), 2);
        session.advance(SETTLE_DELAY);
        assert_eq!(session.phase(), Phase::Moving);
    }

    #[test]
    fn test_out_of_bounds_solver_output_is_ignored() {
        let mut session = Session::with_solver(
            preset_config(VisualizationMode::Instant),
            Box::new(FixedSolver(SolveResult {
                path: vec![Position::new(1, 1), Position::new(99, 99)],
                visited: vec![Position::new(500, 2)],
                stats: Stats::default(),
            })),
        );
        session.start_game().unwrap();
        assert_eq!(session.grid().cells().filter(|c| c.is_path).count(), 1);
        assert_eq!(session.grid().cells().filter(|c| c.is_visited).count(), 0);
    }

    #[test]
    fn test_complete_requires_exhausted_path() {
        let mut session = Session::new(preset_config(VisualizationMode::Instant));
        assert!(!session.complete());
        session.start_game().unwrap();
        session.advance(SETTLE_DELAY);
        assert!(session.move_ball());
        assert!(!session.complete());
        assert_eq!(session.phase(), Phase::Moving);
        while session.move_ball() {}
        assert!(session.complete());
        // Terminal until restart
        assert!(!session.move_ball());
        assert!(session.start_game().is_ok());
        assert_eq!(session.phase(), Phase::Completed);
        session.restart();
        assert_eq!(session.phase(), Phase::Menu);
    }

    #[test]
    fn test_phase_edges() {
        use Phase::*;
        let all = [Menu, Solving, Visualizing, Moving, Completed];
        let allowed = [
            (Menu, Solving),
            (Solving, Visualizing),
            (Solving, Moving),
            (Visualizing, Moving),
            (Moving, Completed),
        ];
        for from in all {
            for to in all {
                let expected = to == Menu || allowed.contains(&(from, to));
                assert_eq!(from.can_advance_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_reset_operations_replace_maze() {
        let mut session = Session::new(SessionConfig {
            seed: Some(1),
            ..SessionConfig::default()
        });
        assert_eq!(session.grid().width(), 15);

        session.set_difficulty(Difficulty::Hard);
        assert_eq!(session.grid().width(), 21);
        assert_eq!(session.config().preset, None);

        session.load_preset_maze(5);
        assert_eq!(session.config().preset, Some(2));
        assert_eq!(session.maze(), &load_preset(2));

        let generation = session.generation();
        session.generate_maze();
        assert_eq!(session.config().preset, None);
        assert_eq!(session.generation(), generation + 1);
        assert_eq!(session.grid().width(), 21);
    }

    #[test]
    fn test_grid_replacement_is_observable() {
        let mut session = Session::new(preset_config(VisualizationMode::Step));
        let versions = Rc::new(RefCell::new(Vec::new()));
        let sink = versions.clone();
        session.subscribe(move |event| {
            if let SessionEvent::GridReplaced { version } = event {
                sink.borrow_mut().push(*version);
            }
        });
        session.start_game().unwrap();
        session.advance(SOLVE_TO_VISUALIZE_DELAY + VISUALIZE_TICK * 2);
        let versions = versions.borrow();
        // Entering visualizing clears overlays, then one replacement per tick
        assert_eq!(versions.len(), 3);
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(session.view().grid_version, *versions.last().unwrap());
    }
}
