use arboard::Clipboard;
use ghostrace::command_log::CommandLog;
use ghostrace::config::Config;
use ghostrace::{Cell, RaceCommand, RaceController, RaceState};
use macroquad::prelude::*;

const SIDEBAR_WIDTH: f32 = 260.0;
const MARGIN: f32 = 16.0;
const BUTTON_HEIGHT: f32 = 40.0;

const BUTTONS: [RaceCommand; 4] = [
    RaceCommand::Start,
    RaceCommand::Restart,
    RaceCommand::GenerateNewMap,
    RaceCommand::GenerateNewCherry,
];

const WALL_COLOR: Color = Color::new(70.0 / 255.0, 80.0 / 255.0, 140.0 / 255.0, 1.0);
const PANEL_BG: Color = Color::new(230.0 / 255.0, 230.0 / 255.0, 245.0 / 255.0, 1.0);
const PANEL_BORDER: Color = Color::new(180.0 / 255.0, 180.0 / 255.0, 210.0 / 255.0, 1.0);
const CHERRY_RED: Color = Color::new(220.0 / 255.0, 20.0 / 255.0, 60.0 / 255.0, 1.0);
const TEXT: Color = Color::new(50.0 / 255.0, 50.0 / 255.0, 80.0 / 255.0, 1.0);

fn ghost_color(rgb: (u8, u8, u8)) -> Color {
    Color::from_rgba(rgb.0, rgb.1, rgb.2, 255)
}

/// Window front end: lays out the sidebar and arena, forwards button presses
/// to the race controller and ticks it at the configured rate.
struct RaceView {
    race: RaceController,
    commands: Option<CommandLog>,
    background: Color,
    tick_interval: f64,
    last_tick: f64,
    tile_size: f32,
    min_tile_size: f32,
}

impl RaceView {
    fn new(config: &Config) -> Self {
        let now = get_time();
        RaceView {
            race: RaceController::from_config(config),
            commands: config.logging.enable_command_log.then(|| CommandLog::new(now)),
            background: Color::from_rgba(
                config.visual.background_r,
                config.visual.background_g,
                config.visual.background_b,
                255,
            ),
            tick_interval: config.race.tick_interval(),
            last_tick: now,
            tile_size: config.visual.tile_size,
            min_tile_size: 8.0,
        }
    }

    /// Tile size follows the window; the grid itself never changes on resize
    fn update_layout(&mut self) {
        let grid = self.race.grid();
        let avail_w = screen_width() - SIDEBAR_WIDTH - MARGIN * 3.0;
        let avail_h = screen_height() - MARGIN * 2.0 - 40.0;
        let fit = (avail_w / grid.cols as f32).min(avail_h / grid.rows as f32).floor();
        self.tile_size = fit.max(self.min_tile_size);
    }

    fn arena_origin(&self) -> (f32, f32) {
        (SIDEBAR_WIDTH + MARGIN * 2.0, MARGIN + 40.0)
    }

    fn button_rect(&self, index: usize) -> Rect {
        let top = MARGIN + 80.0 + 12.0 + 220.0 + 12.0;
        Rect::new(
            MARGIN,
            top + index as f32 * (BUTTON_HEIGHT + 10.0),
            SIDEBAR_WIDTH,
            BUTTON_HEIGHT,
        )
    }

    fn send(&mut self, command: RaceCommand) {
        let now = get_time();
        let before = self.race.state();
        let accepted = self.race.apply(command, now);
        if command == RaceCommand::Start && accepted {
            self.last_tick = now;
        }
        if let Some(log) = self.commands.as_mut() {
            log.record(now, command, before, accepted);
        }
    }

    fn handle_input(&mut self) {
        if self.race.results_visible() {
            if is_key_pressed(KeyCode::Enter) || is_mouse_button_pressed(MouseButton::Left) {
                self.race.dismiss_results();
            }
            return;
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            let (mx, my) = mouse_position();
            let clicked = (0..BUTTONS.len()).find(|&i| self.button_rect(i).contains(vec2(mx, my)));
            if let Some(i) = clicked {
                self.send(BUTTONS[i]);
            }
        }

        if is_key_pressed(KeyCode::C) {
            self.copy_to_clipboard();
        }
    }

    fn update(&mut self) {
        let now = get_time();
        if self.race.state() == RaceState::Running && now - self.last_tick >= self.tick_interval {
            self.race.tick(now);
            self.last_tick = now;
        }
    }

    fn copy_to_clipboard(&self) {
        let text = self.race.grid().to_text();
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(text) {
                    log::warn!("Failed to copy to clipboard: {}", e);
                } else {
                    log::info!("Map copied to clipboard");
                    // Keep clipboard alive for a moment so clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => log::warn!("Failed to access clipboard: {}", e),
        }
    }

    fn draw(&self) {
        clear_background(self.background);
        self.draw_sidebar();
        self.draw_arena();
        if self.race.results_visible() {
            self.draw_results();
        }
    }

    fn draw_panel(&self, rect: Rect, title: &str) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, PANEL_BG);
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, PANEL_BORDER);
        draw_text(title, rect.x + 10.0, rect.y + 22.0, 22.0, TEXT);
    }

    fn draw_sidebar(&self) {
        let now = get_time();

        let timer = Rect::new(MARGIN, MARGIN, SIDEBAR_WIDTH, 80.0);
        self.draw_panel(timer, "TIME");
        let elapsed = format!("{:.1} seconds", self.race.elapsed(now));
        draw_text(&elapsed, timer.x + 15.0, timer.y + 60.0, 30.0, BLACK);

        let ranking = Rect::new(MARGIN, timer.y + timer.h + 12.0, SIDEBAR_WIDTH, 220.0);
        self.draw_panel(ranking, "RANKING");
        if self.race.ranking().is_empty() {
            draw_text("No results yet", ranking.x + 15.0, ranking.y + 55.0, 20.0, GRAY);
        }
        for (i, entry) in self.race.ranking().iter().enumerate() {
            let y = ranking.y + 55.0 + i as f32 * 28.0;
            draw_circle(ranking.x + 22.0, y - 6.0, 8.0, ghost_color(entry.color.rgb()));
            let time = entry
                .finish_time
                .map(|t| format!("{:.2}s", t))
                .unwrap_or_else(|| "DNF".to_string());
            let line = format!("{}. {} ({}) {}", i + 1, entry.name, entry.algorithm, time);
            draw_text(&line, ranking.x + 36.0, y, 20.0, TEXT);
        }

        let (mx, my) = mouse_position();
        for (i, command) in BUTTONS.iter().enumerate() {
            let rect = self.button_rect(i);
            let hovered = rect.contains(vec2(mx, my));
            let fill = if hovered {
                Color::from_rgba(200, 200, 230, 255)
            } else {
                Color::from_rgba(220, 220, 240, 255)
            };
            draw_rectangle(rect.x, rect.y, rect.w, rect.h, fill);
            draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, PANEL_BORDER);
            let label = command.label();
            let size = measure_text(label, None, 22, 1.0);
            draw_text(
                label,
                rect.x + (rect.w - size.width) / 2.0,
                rect.y + rect.h / 2.0 + size.height / 2.0,
                22.0,
                TEXT,
            );
        }

        let status = format!("State: {}", self.race.state());
        draw_text(&status, MARGIN, self.button_rect(BUTTONS.len()).y + 20.0, 20.0, TEXT);
    }

    fn draw_arena(&self) {
        let grid = self.race.grid();
        let (ox, oy) = self.arena_origin();
        let ts = self.tile_size;

        draw_text("Ghost-Cherry Race", ox, MARGIN + 24.0, 32.0, TEXT);

        for y in 0..grid.rows {
            for x in 0..grid.cols {
                let color = match grid.get_cell(x, y) {
                    Cell::Wall => WALL_COLOR,
                    Cell::Floor => WHITE,
                };
                draw_rectangle(ox + x as f32 * ts, oy + y as f32 * ts, ts - 1.0, ts - 1.0, color);
            }
        }
        draw_rectangle_lines(ox, oy, grid.cols as f32 * ts, grid.rows as f32 * ts, 2.0, BLACK);

        let cherry = self.race.cherry().position;
        let pulse = ((get_time() * 5.0).sin() * 2.0 + 2.0) as f32;
        let (cx, cy) = (ox + (cherry.x as f32 + 0.5) * ts, oy + (cherry.y as f32 + 0.5) * ts);
        draw_circle(cx, cy, ts / 2.0 + pulse, Color::new(CHERRY_RED.r, CHERRY_RED.g, CHERRY_RED.b, 0.4));
        draw_circle(cx, cy, ts / 2.5, CHERRY_RED);

        for ghost in self.race.ghosts() {
            let pos = ghost.position();
            let color = ghost_color(ghost.color.rgb());
            draw_circle(ox + (pos.x as f32 + 0.5) * ts, oy + (pos.y as f32 + 0.5) * ts, ts / 2.2, color);
        }

        let legend_y = oy + grid.rows as f32 * ts + 24.0;
        let mut legend_x = ox;
        for ghost in self.race.ghosts() {
            draw_circle(legend_x + 8.0, legend_y - 6.0, 7.0, ghost_color(ghost.color.rgb()));
            let label = format!("{}: {}", ghost.name, ghost.algorithm_name());
            draw_text(&label, legend_x + 20.0, legend_y, 20.0, TEXT);
            legend_x += measure_text(&label, None, 20, 1.0).width + 40.0;
        }
    }

    fn draw_results(&self) {
        draw_rectangle(0.0, 0.0, screen_width(), screen_height(), Color::new(0.0, 0.0, 0.0, 0.5));

        let w = 420.0;
        let h = 90.0 + self.race.ranking().len() as f32 * 32.0;
        let rect = Rect::new((screen_width() - w) / 2.0, (screen_height() - h) / 2.0, w, h);
        self.draw_panel(rect, "RACE RESULTS");

        for (i, entry) in self.race.ranking().iter().enumerate() {
            let y = rect.y + 60.0 + i as f32 * 32.0;
            let time = entry
                .finish_time
                .map(|t| format!("{:.2} seconds", t))
                .unwrap_or_else(|| "did not finish".to_string());
            let line = format!("{}. {} ({}) - {}", i + 1, entry.name, entry.algorithm, time);
            draw_circle(rect.x + 22.0, y - 6.0, 9.0, ghost_color(entry.color.rgb()));
            draw_text(&line, rect.x + 38.0, y, 22.0, TEXT);
        }
        draw_text("Click or press Enter to close", rect.x + 10.0, rect.y + h - 12.0, 18.0, GRAY);
    }
}

#[macroquad::main("Ghost-Cherry Race")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();
    let mut view = RaceView::new(&config);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        view.update_layout();
        view.handle_input();
        view.update();
        view.draw();

        next_frame().await
    }

    if let Some(commands) = view.commands.as_ref() {
        log::info!("Command log:\n{}", commands.summary());
    }
}
