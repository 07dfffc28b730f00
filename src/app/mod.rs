pub mod player;
pub mod renderer;
pub mod scheduler;
pub mod session;

use std::{
    io::{Stdout, Write},
    ops::ControlFlow,
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    app::{
        renderer::Renderer,
        session::{Difficulty, Phase, Session, SessionConfig, VisualizationMode},
    },
    generators::PRESETS,
    solvers::Algorithm,
};

/// How long to wait for a key before advancing the session clock again.
const FRAME_POLL_TIMEOUT: Duration = Duration::from_millis(10);
/// Heartbeat of the agent while it walks the path.
pub const MOVE_TICK: Duration = Duration::from_millis(120);

/// Where the first maze comes from, as picked in the startup menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MazeChoice {
    Random(Difficulty),
    Preset(usize),
}

impl std::fmt::Display for MazeChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MazeChoice::Random(difficulty) => write!(f, "Random maze: {}", difficulty),
            MazeChoice::Preset(index) => write!(f, "Preset maze: {}", PRESETS[*index].name),
        }
    }
}

/// Set a panic hook to restore terminal state on panic
/// This ensures that the terminal is not left in raw mode or alternate screen on panic
fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
        hook(panic_info);
    }));
}

/// Setup terminal in raw mode and enter alternate screen
/// Also sets a panic hook to restore terminal on panic
pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
    terminal::enable_raw_mode()?;
    set_panic_hook();
    queue!(
        stdout,
        terminal::EnterAlternateScreen,
        terminal::Clear(ClearType::All),
        cursor::Hide,
        cursor::MoveTo(0, 0)
    )?;
    stdout.flush()?;
    Ok(())
}

/// Restore terminal to original state
/// Leave alternate screen and disable raw mode
pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
    queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
    stdout.flush()?;
    terminal::disable_raw_mode()?;
    Ok(())
}

/// Entry point of the interactive app
pub fn run(stdout: &mut Stdout) -> std::io::Result<()> {
    let Some(config) = ask_session_config(stdout)? else {
        return Ok(());
    };

    let mut session = Session::new(config);
    session.subscribe(|event| tracing::debug!("[app loop] session event: {:?}", event));
    game_loop(&mut session)
}

/// Ask for the maze, algorithm and visualization mode.
/// Returns None if the user cancels any menu with Esc
fn ask_session_config(stdout: &mut Stdout) -> std::io::Result<Option<SessionConfig>> {
    let maze_choices = Difficulty::ALL
        .into_iter()
        .map(MazeChoice::Random)
        .chain((0..PRESETS.len()).map(MazeChoice::Preset))
        .collect::<Vec<_>>();

    let Some(maze_choice) = select_from_menu(
        stdout,
        "Select a maze (use arrow keys and Enter, or Esc to exit):",
        &maze_choices,
    )?
    else {
        return Ok(None);
    };
    print_selection(stdout, &maze_choice)?;

    let Some(algorithm) = select_from_menu(
        stdout,
        "Select maze solving algorithm (use arrow keys and Enter, or Esc to exit):",
        &Algorithm::ALL,
    )?
    else {
        return Ok(None);
    };
    print_selection(stdout, &algorithm)?;

    let Some(mode) = select_from_menu(
        stdout,
        "Select visualization mode (use arrow keys and Enter, or Esc to exit):",
        &VisualizationMode::ALL,
    )?
    else {
        return Ok(None);
    };

    let (difficulty, preset) = match maze_choice {
        MazeChoice::Random(difficulty) => (difficulty, None),
        MazeChoice::Preset(index) => (Difficulty::default(), Some(index)),
    };
    Ok(Some(SessionConfig {
        difficulty,
        mode,
        algorithm: Some(algorithm),
        preset,
        seed: None,
    }))
}

fn print_selection(stdout: &mut Stdout, selection: &impl std::fmt::Display) -> std::io::Result<()> {
    stdout.execute(style::PrintStyledContent(
        format!("Selected: {}\r\n", selection)
            .with(Color::Green)
            .attribute(Attribute::Bold),
    ))?;
    Ok(())
}

/// Single-threaded loop: read keys, move the session clock, walk the agent, draw.
fn game_loop(session: &mut Session) -> std::io::Result<()> {
    tracing::info!("[app loop] started");
    let mut renderer = Renderer::new();
    let mut last_frame = Instant::now();
    let mut last_move = Instant::now();

    loop {
        renderer.draw(&session.view())?;

        if event::poll(FRAME_POLL_TIMEOUT)? {
            match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    if handle_key(session, key_event.code).is_break() {
                        break;
                    }
                }
                event::Event::Resize(_, _) => renderer.invalidate(),
                _ => {}
            }
        }

        let now = Instant::now();
        session.advance(now.duration_since(last_frame));
        last_frame = now;

        if session.phase() == Phase::Moving && now.duration_since(last_move) >= MOVE_TICK {
            last_move = now;
            if !session.move_ball() {
                session.complete();
            }
        }
    }

    tracing::info!("[app loop] exiting");
    Ok(())
}

/// Apply one key press to the session. Breaks when the user wants to exit.
fn handle_key(session: &mut Session, code: KeyCode) -> ControlFlow<()> {
    let in_menu = session.phase() == Phase::Menu;
    match code {
        KeyCode::Esc => {
            tracing::debug!("[app loop] Esc key pressed, exiting");
            return ControlFlow::Break(());
        }
        KeyCode::Char('r') => session.restart(),
        KeyCode::Enter => {
            let result = match session.phase() {
                Phase::Menu => session.start_game(),
                Phase::Solving => session.retry_solve(),
                _ => Ok(()),
            };
            // The failure is kept on the session and shown in the status block
            if let Err(err) = result {
                tracing::warn!("[app loop] solve failed: {}", err);
            }
        }
        KeyCode::Char('a') if in_menu => {
            let current = session.config().algorithm;
            let next = match current.and_then(|a| Algorithm::ALL.iter().position(|&b| b == a)) {
                Some(i) => Algorithm::ALL[(i + 1) % Algorithm::ALL.len()],
                None => Algorithm::ALL[0],
            };
            session.set_algorithm(next);
        }
        KeyCode::Char('m') if in_menu => {
            let next = match session.config().mode {
                VisualizationMode::Instant => VisualizationMode::Step,
                VisualizationMode::Step => VisualizationMode::Instant,
            };
            session.set_visualization_mode(next);
        }
        KeyCode::Char(c @ '1'..='3') if in_menu => {
            let index = (c as u8 - b'1') as usize;
            session.set_difficulty(Difficulty::ALL[index]);
        }
        KeyCode::Char('p') if in_menu => {
            let next = session.config().preset.map_or(0, |i| i + 1);
            session.load_preset_maze(next);
        }
        KeyCode::Char('g') if in_menu => session.generate_maze(),
        _ => {}
    }
    ControlFlow::Continue(())
}

/// Present a menu of options to the user and let them select one using arrow keys
/// Returns None if user cancels input with Esc
/// Returns Some(T) if user selects an option and presses Enter, where T is the option type
fn select_from_menu<T: std::fmt::Display + Copy>(
    stdout: &mut Stdout,
    prompt: &str,
    options: &[T],
) -> std::io::Result<Option<T>> {
    if options.is_empty() {
        return Ok(None);
    }

    // Save cursor position so we can restore / redraw
    queue!(stdout, cursor::Hide, cursor::SavePosition)?;

    let mut selected = 0;

    let selected_option = loop {
        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown)
        )?;
        stdout.queue(style::PrintStyledContent(prompt.with(Color::Yellow)))?;

        for (i, option) in options.iter().enumerate() {
            if i == selected {
                stdout.queue(style::SetAttribute(Attribute::Reverse))?;
            }
            stdout.queue(style::Print(format!("\r\n{}", option)))?;
            if i == selected {
                stdout.queue(style::SetAttribute(Attribute::NoReverse))?;
            }
        }
        stdout.queue(style::Print("\r\n"))?;
        stdout.flush()?;

        let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != event::KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Up => selected = selected.checked_sub(1).unwrap_or(options.len() - 1),
            KeyCode::Down => selected = (selected + 1) % options.len(),
            KeyCode::Enter => break Some(options[selected]),
            KeyCode::Esc => break None,
            _ => {}
        }
    };

    queue!(
        stdout,
        cursor::RestorePosition,
        terminal::Clear(ClearType::FromCursorDown),
        cursor::Show
    )?;
    stdout.flush()?;

    Ok(selected_option)
}
