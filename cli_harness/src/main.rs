//! CLI harness for testing pool_core: an interactive terminal table and a
//! headless simulator.

mod simulate;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use pool_core::*;
use std::collections::VecDeque;
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

const FIELD_WIDTH: usize = 76;
const FIELD_HEIGHT: usize = 22;

/// Aim rotation per key press (radians)
const AIM_STEP: f32 = 0.05;
const FINE_AIM_STEP: f32 = 0.005;
const POWER_STEP: f32 = 5.0;
/// Ball-in-hand cursor movement per key press (table pixels)
const CURSOR_STEP: f32 = 10.0;

const EVENT_LOG_LEN: usize = 4;

#[derive(Parser)]
#[command(name = "cli_harness")]
#[command(about = "Terminal harness for the eight-ball pool engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play on an interactive terminal table
    Play(PlayArgs),

    /// Run computer-vs-computer matches without a display
    Simulate {
        /// Number of matches
        #[arg(long, default_value_t = 10)]
        matches: u32,

        /// AI difficulty for both sides (easy | hard)
        #[arg(long, default_value = "hard")]
        difficulty: Difficulty,

        /// Rule set (strict | casual)
        #[arg(long, default_value = "strict")]
        rules: RuleSet,

        /// Seed of the first match; later matches count up from it
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Give up on a match after this many ticks
        #[arg(long, default_value_t = 200_000)]
        max_ticks: u32,
    },
}

#[derive(Args)]
struct PlayArgs {
    /// Game mode (pvp | vs-ai)
    #[arg(long, default_value = "pvp")]
    mode: GameMode,

    /// AI difficulty (easy | hard)
    #[arg(long, default_value = "easy")]
    difficulty: Difficulty,

    /// Player one's name
    #[arg(long, default_value = "Player 1")]
    p1: String,

    /// Player two's name
    #[arg(long, default_value = "Player 2")]
    p2: String,

    /// Rule set (strict | casual)
    #[arg(long, default_value = "strict")]
    rules: RuleSet,

    /// AI random seed
    #[arg(long)]
    seed: Option<u64>,
}

impl PlayArgs {
    fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            mode: self.mode,
            difficulty: self.difficulty,
            player_names: [self.p1, self.p2],
            rules: self.rules,
            seed: self.seed.unwrap_or(defaults.seed),
            ..defaults
        }
    }
}

/// CLI application state
struct CliApp {
    game: Game,
    running: bool,
    last_tick: Instant,
    show_help: bool,
    /// Where the cue ball goes during ball in hand
    cursor: Vec2,
    /// Last rejected action
    message: Option<String>,
    events: VecDeque<String>,
}

impl CliApp {
    fn new(config: Config) -> color_eyre::Result<Self> {
        let game = Game::new(config).wrap_err("invalid game configuration")?;
        let cursor = game.config.table.cue_start;

        Ok(Self {
            game,
            running: true,
            last_tick: Instant::now(),
            show_help: true,
            cursor,
            message: None,
            events: VecDeque::with_capacity(EVENT_LOG_LEN),
        })
    }

    fn run(&mut self) -> color_eyre::Result<()> {
        enable_raw_mode().wrap_err("failed to enable raw mode")?;
        execute!(stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        let result = self.main_loop();

        execute!(stdout(), LeaveAlternateScreen, Show)?;
        disable_raw_mode().wrap_err("failed to disable raw mode")?;
        result
    }

    fn main_loop(&mut self) -> color_eyre::Result<()> {
        let frame_time = Duration::from_millis(1000 / u64::from(self.game.config.tick_hz));

        while self.running {
            self.handle_input()?;
            self.update();
            self.render()?;

            std::thread::sleep(frame_time.saturating_sub(self.last_tick.elapsed()));
        }
        Ok(())
    }

    fn handle_input(&mut self) -> color_eyre::Result<()> {
        // Process all available key events
        while poll(Duration::from_millis(0)).wrap_err("failed to poll for crossterm events")? {
            let TermEvent::Key(event) = read().wrap_err("failed to read crossterm event")? else {
                continue;
            };
            if event.kind != KeyEventKind::Press {
                continue;
            }

            match event.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => self.running = false,
                KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.running = false
                }
                KeyCode::Char('h') | KeyCode::Char('H') => self.show_help = !self.show_help,
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.game.reset_match();
                    self.events.clear();
                    self.message = None;
                }
                code if self.game.turn.cue_ball_in_hand => self.handle_placement_key(code),
                code => self.handle_aim_key(code),
            }
        }
        Ok(())
    }

    fn handle_aim_key(&mut self, code: KeyCode) {
        let cue = self.game.cue;
        match code {
            KeyCode::Left => self.game.set_aim(cue.angle - AIM_STEP, cue.power),
            KeyCode::Right => self.game.set_aim(cue.angle + AIM_STEP, cue.power),
            KeyCode::Char(',') => self.game.set_aim(cue.angle - FINE_AIM_STEP, cue.power),
            KeyCode::Char('.') => self.game.set_aim(cue.angle + FINE_AIM_STEP, cue.power),
            KeyCode::Up => self.game.set_aim(cue.angle, cue.power + POWER_STEP),
            KeyCode::Down => self.game.set_aim(cue.angle, cue.power - POWER_STEP),
            KeyCode::Char(' ') => {
                self.message = self.game.release_shot().err().map(|e| e.to_string());
            }
            _ => {}
        }
    }

    fn handle_placement_key(&mut self, code: KeyCode) {
        let table = self.game.config.table;
        let delta = match code {
            KeyCode::Left | KeyCode::Char('a') => Vec2::new(-CURSOR_STEP, 0.0),
            KeyCode::Right | KeyCode::Char('d') => Vec2::new(CURSOR_STEP, 0.0),
            KeyCode::Up | KeyCode::Char('w') => Vec2::new(0.0, -CURSOR_STEP),
            KeyCode::Down | KeyCode::Char('s') => Vec2::new(0.0, CURSOR_STEP),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.message = self
                    .game
                    .place_cue_ball(self.cursor)
                    .err()
                    .map(|e| e.to_string());
                return;
            }
            _ => return,
        };

        let r = table.ball_radius;
        let next = self.cursor + delta;
        self.cursor = Vec2::new(
            next.x.clamp(table.left + r, table.right - r),
            next.y.clamp(table.top + r, table.bottom - r),
        );
    }

    fn update(&mut self) {
        let now = Instant::now();
        let tick_time = Duration::from_millis(1000 / u64::from(self.game.config.tick_hz));

        if now.duration_since(self.last_tick) >= tick_time {
            for event in self.game.step() {
                self.log_event(event);
            }
            self.last_tick = now;
        }
    }

    fn log_event(&mut self, event: Event) {
        let names = &self.game.config.player_names;
        let line = match event {
            Event::ShotReleased { player, power, .. } => {
                format!("{} shoots at power {:.0}", names[player.index()], power)
            }
            Event::Potted(pot) => format!("Ball {} potted", self.game.balls[pot.ball_index].number),
            Event::Foul { player, foul } => format!("Foul by {}: {:?}", names[player.index()], foul),
            Event::GroupsAssigned { player_one } => {
                format!("{} takes {}", names[0], player_one)
            }
            Event::TurnEnded { next } => format!("{} to play", names[next.index()]),
            Event::MatchOver { winner, .. } => format!("{} wins!", names[winner.index()]),
        };

        if self.events.len() == EVENT_LOG_LEN {
            self.events.pop_front();
        }
        self.events.push_back(line);
    }

    fn render(&mut self) -> color_eyre::Result<()> {
        let view = self.game.view();
        let mut out = stdout();
        let mut row = 0;

        queue!(out, Clear(ClearType::All))?;

        // Header
        queue!(
            out,
            MoveTo(0, row),
            SetForegroundColor(Color::Cyan),
            Print("🎱 POOL CLI HARNESS 🎱"),
            ResetColor
        )?;
        row += 1;

        // Turn and groups
        let group_label = |g: Option<Group>| g.map_or("open".to_string(), |g| g.to_string());
        queue!(
            out,
            MoveTo(0, row),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} ({}) {}  -  {} ({}) {}   |   {} to play   |   {}",
                view.player_names[0],
                group_label(view.groups[0]),
                view.scores[0],
                view.player_names[1],
                group_label(view.groups[1]),
                view.scores[1],
                view.player_names[view.player_turn.index()],
                self.game.status_string()
            )),
            ResetColor
        )?;
        row += 1;

        row = self.render_field(&view, row)?;

        queue!(
            out,
            MoveTo(0, row),
            Print(format!(
                "Aim {:>6.1}°  Power {:>3.0}   {}",
                view.cue.angle.to_degrees(),
                view.cue.power,
                self.message.as_deref().unwrap_or("")
            ))
        )?;
        row += 1;

        for line in &self.events {
            queue!(
                out,
                MoveTo(0, row),
                SetForegroundColor(Color::Grey),
                Print(line),
                ResetColor
            )?;
            row += 1;
        }

        if self.show_help {
            self.render_help(row + 1)?;
        }

        out.flush()?;
        Ok(())
    }

    fn render_field(&self, view: &View, mut row: u16) -> color_eyre::Result<u16> {
        let table = self.game.config.table;
        let mut out = stdout();

        let mut cells = vec![vec![(' ', Color::White); FIELD_WIDTH]; FIELD_HEIGHT];
        let mut plot = |pos: Vec2, glyph: char, color: Color| {
            if let Some((x, y)) = to_cell(&table, pos) {
                cells[y][x] = (glyph, color);
            }
        };

        // Aim guide first so balls draw over it
        if let Some(prediction) = self.game.predict() {
            for point in line_points(prediction.cue_start, prediction.cue_end) {
                plot(point, '·', Color::DarkGrey);
            }
            if let Some((start, end)) = prediction.object_path {
                for point in line_points(start, end) {
                    plot(point, '·', Color::DarkYellow);
                }
            }
        }

        for pocket in table.pockets {
            plot(pocket, 'O', Color::DarkGrey);
        }

        for ball in view.balls.iter().filter(|b| b.on_table()) {
            let [r, g, b] = ball.color.rgb();
            let glyph = match ball.kind {
                BallKind::Cue => '○',
                BallKind::Stripe => '◍',
                BallKind::Solid | BallKind::Eight => '●',
            };
            let color = if ball.is_eight() {
                Color::DarkGrey
            } else {
                Color::Rgb { r, g, b }
            };
            plot(ball.pos, glyph, color);
        }

        if view.cue_ball_in_hand && !view.ai_turn {
            plot(self.cursor, '+', Color::White);
        }

        // Top border
        queue!(
            out,
            MoveTo(0, row),
            Print(format!("┌{}┐", "─".repeat(FIELD_WIDTH)))
        )?;
        row += 1;

        for line in &cells {
            queue!(out, MoveTo(0, row), Print("│"))?;
            for &(glyph, color) in line {
                queue!(out, SetForegroundColor(color), Print(glyph), ResetColor)?;
            }
            queue!(out, Print("│"))?;
            row += 1;
        }

        // Bottom border
        queue!(
            out,
            MoveTo(0, row),
            Print(format!("└{}┘", "─".repeat(FIELD_WIDTH)))
        )?;
        row += 1;

        Ok(row)
    }

    fn render_help(&self, mut row: u16) -> color_eyre::Result<()> {
        let lines = [
            "--- CONTROLS ---",
            "←/→: Aim  |  ,/.: Fine aim  |  ↑/↓: Power  |  SPACE: Shoot",
            "Ball in hand: arrows/WASD move the cursor, SPACE/ENTER places",
            "R: Reset  |  H: Toggle help  |  Q: Quit",
        ];

        for line in lines {
            queue!(
                stdout(),
                MoveTo(0, row),
                SetForegroundColor(Color::DarkGrey),
                Print(line),
                ResetColor
            )?;
            row += 1;
        }

        let view = self.game.view();
        queue!(
            stdout(),
            MoveTo(0, row),
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "Tick: {} | Phase: {:?} | Last: {:?}",
                view.tick, view.phase, view.last_outcome
            )),
            ResetColor
        )?;

        Ok(())
    }
}

/// Terminal cell for a table position, if it lies inside the rails
fn to_cell(table: &Table, pos: Vec2) -> Option<(usize, usize)> {
    let u = (pos.x - table.left) / (table.right - table.left);
    let v = (pos.y - table.top) / (table.bottom - table.top);
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return None;
    }

    let x = (u * (FIELD_WIDTH - 1) as f32).round() as usize;
    let y = (v * (FIELD_HEIGHT - 1) as f32).round() as usize;
    Some((x, y))
}

/// Evenly spaced points along a segment, roughly one per cell
fn line_points(from: Vec2, to: Vec2) -> impl Iterator<Item = Vec2> {
    let steps = (from.distance(to) / 8.0).ceil().max(1.0) as usize;
    (0..=steps).map(move |i| from.lerp(to, i as f32 / steps as f32))
}

fn run_simulation(
    matches: u32,
    difficulty: Difficulty,
    rules: RuleSet,
    seed: u64,
    max_ticks: u32,
) -> color_eyre::Result<()> {
    let started = Instant::now();
    let summary = simulate::simulate(matches, difficulty, rules, seed, max_ticks)
        .wrap_err("simulation failed")?;

    println!(
        "{} matches ({} AI, {:?} rules) in {:.2?}",
        summary.matches,
        difficulty,
        rules,
        started.elapsed()
    );
    println!("  player 1 wins: {}", summary.wins[0]);
    println!("  player 2 wins: {}", summary.wins[1]);
    println!("  unfinished:    {}", summary.unfinished);
    println!("  shots/match:   {:.1}", summary.average_shots());
    println!("  fouls:         {}", summary.fouls);
    println!("  ticks:         {}", summary.ticks);
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let args = match cli.command {
        Some(Commands::Simulate {
            matches,
            difficulty,
            rules,
            seed,
            max_ticks,
        }) => return run_simulation(matches, difficulty, rules, seed, max_ticks),
        Some(Commands::Play(args)) => args,
        None => PlayArgs {
            mode: GameMode::Pvp,
            difficulty: Difficulty::Easy,
            p1: "Player 1".to_string(),
            p2: "Player 2".to_string(),
            rules: RuleSet::Strict,
            seed: None,
        },
    };

    let mut app = CliApp::new(args.into_config())?;

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, Show);
        std::process::exit(0);
    })
    .map_err(|e| eyre!("error setting Ctrl-C handler: {}", e))?;

    app.run()
}
