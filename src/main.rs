use std::path::Path;

use doomcaster::{
    clock::SimulationClock,
    config::{Settings, SCREEN_HEIGHT, SCREEN_WIDTH},
    player::MoveIntent,
    render::Renderer,
    score::TomlScoreStore,
    simulation::{FrameInput, GamePhase, Simulation},
    surface::{MacroquadSurface, Surface, TextAlign},
    texture::{Rgb, TextureBank, DEFAULT_TEXTURES},
};
use macroquad::{
    input::{is_key_down, is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    time::get_frame_time,
    window::{next_frame, Conf},
};
use tracing_subscriber::EnvFilter;

const SETTINGS_PATH: &str = "settings.toml";
const PREFS_PATH: &str = "game_prefs.toml";
/// Arrow-key turning, expressed in mouse pixels per frame.
const KEY_TURN_PIXELS: f32 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    MainMenu,
    Settings,
    Game,
}

struct Stage {
    screen: Screen,
    settings: Settings,
    sim: Simulation,
    renderer: Renderer,
    clock: SimulationClock,
    surface: MacroquadSurface,
    textures: &'static TextureBank,
    last_mouse_x: Option<f32>,
    shoot_latched: bool,
}

impl Stage {
    fn new() -> Self {
        let settings = Settings::load_or_default(Path::new(SETTINGS_PATH));
        let textures: &'static TextureBank = &DEFAULT_TEXTURES;
        let seed = rand::random::<u64>();
        let sim = Simulation::from_seed(seed, textures.wall_texture_count(), Box::new(TomlScoreStore::new(PREFS_PATH)));
        tracing::info!(?settings, seed, "stage ready");
        Self {
            screen: Screen::MainMenu,
            settings,
            sim,
            renderer: Renderer::new(),
            clock: SimulationClock::default(),
            surface: MacroquadSurface,
            textures,
            last_mouse_x: None,
            shoot_latched: false,
        }
    }

    fn calculate_intent() -> MoveIntent {
        let mut strafe: f32 = 0.0;
        let mut forward: f32 = 0.0;
        if is_key_down(KeyCode::W) {
            forward += 1.0;
        }
        if is_key_down(KeyCode::S) {
            forward -= 1.0;
        }
        if is_key_down(KeyCode::A) {
            strafe -= 1.0;
        }
        if is_key_down(KeyCode::D) {
            strafe += 1.0;
        }
        MoveIntent::new(strafe, forward)
    }

    fn look_delta(&mut self) -> f32 {
        let (mouse_x, _) = mouse_position();
        let mut pixels = match self.last_mouse_x {
            Some(last) => mouse_x - last,
            None => 0.0,
        };
        self.last_mouse_x = Some(mouse_x);
        if is_key_down(KeyCode::Left) {
            pixels -= KEY_TURN_PIXELS;
        }
        if is_key_down(KeyCode::Right) {
            pixels += KEY_TURN_PIXELS;
        }
        pixels * self.settings.look_sensitivity
    }

    fn update(&mut self, frame_time: f32) {
        match self.screen {
            Screen::MainMenu => {
                if is_key_pressed(KeyCode::Enter) {
                    self.sim.start_game();
                    self.clock.resume();
                    self.screen = Screen::Game;
                } else if is_key_pressed(KeyCode::O) {
                    self.screen = Screen::Settings;
                }
            }
            Screen::Settings => self.update_settings(),
            Screen::Game => self.update_game(frame_time),
        }
    }

    fn update_settings(&mut self) {
        if is_key_pressed(KeyCode::Tab) {
            self.settings.cycle_quality();
        }
        if is_key_pressed(KeyCode::LeftBracket) {
            self.settings.adjust_fov(-1);
        }
        if is_key_pressed(KeyCode::RightBracket) {
            self.settings.adjust_fov(1);
        }
        if is_key_pressed(KeyCode::Minus) {
            self.settings.adjust_sensitivity(-1);
        }
        if is_key_pressed(KeyCode::Equal) {
            self.settings.adjust_sensitivity(1);
        }
        if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Backspace) {
            self.screen = Screen::MainMenu;
        }
    }

    fn update_game(&mut self, frame_time: f32) {
        match self.sim.phase() {
            GamePhase::Defeated => {
                if is_key_pressed(KeyCode::Enter) {
                    self.screen = Screen::MainMenu;
                }
                return;
            }
            GamePhase::Paused => {
                if is_key_pressed(KeyCode::Escape) {
                    self.sim.toggle_pause();
                    self.clock.resume();
                    self.last_mouse_x = None;
                } else if is_key_pressed(KeyCode::Q) {
                    self.screen = Screen::MainMenu;
                }
                return;
            }
            GamePhase::Playing => {}
        }

        if is_key_pressed(KeyCode::Escape) {
            self.sim.toggle_pause();
            self.clock.pause();
            return;
        }
        self.shoot_latched |= is_key_pressed(KeyCode::Space) || is_mouse_button_pressed(MouseButton::Left);

        let movement = Self::calculate_intent();
        let mut look_delta = self.look_delta();
        for _ in 0..self.clock.advance(frame_time) {
            let input = FrameInput {
                movement,
                look_delta,
                shoot: std::mem::take(&mut self.shoot_latched),
                toggle_pause: false,
            };
            self.sim.tick(&input);
            look_delta = 0.0;
        }
        if look_delta != 0.0 {
            // no step ran this frame, keep the turn
            self.sim.player_mut().turn(look_delta);
        }
    }

    fn draw(&mut self) {
        let surface: &mut dyn Surface = &mut self.surface;
        match self.screen {
            Screen::MainMenu => draw_main_menu(surface, self.sim.best_score()),
            Screen::Settings => draw_settings(surface, &self.settings),
            Screen::Game => {
                self.renderer.render_frame(surface, &self.sim, &self.settings, self.textures);
                match self.sim.phase() {
                    GamePhase::Paused => draw_overlay(surface, "PAUSED", &["ESC to resume", "Q to quit to menu"], Rgb::new(10, 10, 20)),
                    GamePhase::Defeated => {
                        let score = format!("Score: {}", self.sim.score());
                        let best = format!("Best: {}", self.sim.best_score());
                        draw_overlay(surface, "YOU DIED", &[&score, &best, "ENTER to return to menu"], Rgb::new(100, 20, 20));
                    }
                    GamePhase::Playing => {}
                }
            }
        }
    }
}

fn draw_overlay(surface: &mut dyn Surface, title: &str, lines: &[&str], tint: Rgb) {
    let (w, h) = (surface.width(), surface.height());
    let mut color = tint.to_color();
    color.a = 0.75;
    surface.fill_rect(0.0, 0.0, w, h, color);
    let white = Rgb::grey(255).to_color();
    surface.draw_text(title, w / 2.0, h / 3.0, 96.0, TextAlign::Center, white);
    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(line, w / 2.0, h / 2.0 + i as f32 * 60.0, 44.0, TextAlign::Center, white);
    }
}

fn draw_main_menu(surface: &mut dyn Surface, best_score: u32) {
    let best = format!("Best: {best_score}");
    draw_overlay(surface, "DOOMCASTER", &["ENTER to play", "O for settings", &best], Rgb::new(20, 20, 30));
}

fn draw_settings(surface: &mut dyn Surface, settings: &Settings) {
    let quality = format!("Quality: {}  [TAB]", settings.quality.label());
    let fov = format!("Field of view: {:.0}  [ [ / ] ]", settings.fov_degrees);
    let sensitivity = format!("Look sensitivity: {:.3}  [ - / = ]", settings.look_sensitivity * 1000.0);
    draw_overlay(surface, "Settings", &[&quality, &fov, &sensitivity, "ESC to go back"], Rgb::new(10, 10, 20));
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Doomcaster".to_owned(),
        window_width: SCREEN_WIDTH as i32,
        window_height: SCREEN_HEIGHT as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("doomcaster=info")))
        .init();

    let mut stage = Stage::new();
    loop {
        stage.update(get_frame_time());
        stage.draw();
        next_frame().await;
    }
}
