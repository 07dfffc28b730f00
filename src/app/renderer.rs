use std::io::{Stdout, Write};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::{
    app::session::{Phase, SessionView},
    maze::{Cell, Position},
};

/// What was on screen last time, to skip redundant redraws.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameKey {
    grid_version: u64,
    phase: Phase,
    agent: Position,
    visualization_index: usize,
    path_index: usize,
    has_failure: bool,
}

impl FrameKey {
    fn of(view: &SessionView<'_>) -> Self {
        FrameKey {
            grid_version: view.grid_version,
            phase: view.phase,
            agent: view.agent,
            visualization_index: view.visualization_index,
            path_index: view.path_index,
            has_failure: view.failure.is_some(),
        }
    }
}

/// Paints the session grid and a status block below it.
pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    last_frame: Option<FrameKey>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Rows reserved below the grid for status text.
    pub const NUM_STATUS_ROWS: u16 = 4;

    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
            last_frame: None,
        }
    }

    /// Force a full redraw on the next frame, e.g. after a terminal resize.
    pub fn invalidate(&mut self) {
        self.last_frame = None;
    }

    fn fits(width: u16, height: u16) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        Ok(term_width >= width * Cell::CELL_WIDTH
            && term_height >= height + Renderer::NUM_STATUS_ROWS)
    }

    /// Draw the current view if anything visible changed since the last draw.
    pub fn draw(&mut self, view: &SessionView<'_>) -> std::io::Result<()> {
        let key = FrameKey::of(view);
        if self.last_frame == Some(key) {
            return Ok(());
        }
        self.last_frame = Some(key);

        let (width, height) = (view.grid.width(), view.grid.height());
        self.stdout
            .queue(terminal::Clear(ClearType::All))?
            .queue(cursor::MoveTo(0, 0))?;

        if !Renderer::fits(width, height)? {
            let msg = format!(
                "Terminal is too small for a {}x{} maze. Please resize the terminal, or press Esc to exit.",
                width, height
            );
            self.stdout.queue(style::PrintStyledContent(
                msg.with(Color::Yellow).attribute(Attribute::Bold),
            ))?;
            self.stdout.flush()?;
            return Ok(());
        }

        let show_agent = matches!(view.phase, Phase::Moving | Phase::Completed);
        for (z, row) in view.grid.rows().enumerate() {
            self.stdout.queue(cursor::MoveTo(0, z as u16))?;
            for cell in row {
                if show_agent && cell.position() == view.agent {
                    self.stdout.queue(style::PrintStyledContent(Cell::agent_glyph()))?;
                } else {
                    self.stdout.queue(style::Print(cell))?;
                }
            }
        }

        let term_width = terminal::size()?.0 as usize;
        for (i, line) in status_lines(view).iter().enumerate() {
            let (line, _) = line.unicode_truncate(term_width);
            let color = if i == 0 { Color::Cyan } else { Color::Grey };
            queue!(
                self.stdout,
                cursor::MoveTo(0, height + i as u16),
                terminal::Clear(ClearType::CurrentLine),
                style::PrintStyledContent(line.with(color))
            )?;
        }
        self.stdout.flush()?;
        Ok(())
    }
}

/// Status text shown below the maze.
pub fn status_lines(view: &SessionView<'_>) -> [String; Renderer::NUM_STATUS_ROWS as usize] {
    let config = view.config;
    let algorithm = config
        .algorithm
        .map_or_else(|| "none".to_string(), |a| a.to_string());
    let maze = match config.preset {
        Some(index) => format!("preset #{}", index),
        None => config.difficulty.to_string(),
    };
    let header = format!(
        "Phase: {} | Algorithm: {} | Mode: {} | Maze: {}",
        view.phase, algorithm, config.mode, maze
    );

    let progress = format!(
        "Visited {}/{} | Path {}/{}",
        view.visualization_index, view.visited_len, view.path_index, view.path_len
    );

    let stats = match view.stats {
        Some(stats) => format!(
            "Solve time {:.3}ms | Nodes explored {} | Path length {}",
            stats.solve_time_ms, stats.nodes_explored, stats.path_length
        ),
        None => "No solve yet".to_string(),
    };

    let hint = match (view.phase, view.failure) {
        (Phase::Solving, Some(err)) => {
            format!("Solver failed: {}. Enter: retry | r: restart | Esc: exit", err)
        }
        (Phase::Menu, _) => "Enter: start | a: algorithm | m: mode | 1/2/3: difficulty | p: preset | g: new maze | Esc: exit".to_string(),
        (Phase::Moving | Phase::Completed, _) if view.path_len == 0 => {
            "No route between start and end. r: restart | Esc: exit".to_string()
        }
        (Phase::Completed, _) => "Goal reached! r: restart | Esc: exit".to_string(),
        _ => "r: restart | Esc: exit".to_string(),
    };

    [header, progress, stats, hint]
}
