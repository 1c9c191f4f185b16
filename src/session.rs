use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::assets::{
    Assets, LOOP_FOREVER, MSC_GAME, MSC_MENU, SND_COLLISION, SND_MOVE, SND_ORDER_COMPLETED,
    SND_ORDER_FAILED,
};
use crate::components::Direction;
use crate::delivery::DeliveryAnimation;
use crate::hud;
use crate::input::{InputEvent, InputFrame, Key};
use crate::menu::{Menu, MenuOutcome, MenuScreen};
use crate::minigame::{Minigame, MinigameOutcome};
use crate::orders::OrderBoard;
use crate::player::Player;
use crate::progress::ProgressStore;
use crate::render::{palette, Canvas};
use crate::road::Road;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    DeliveryAnimation,
    /// Reserved for a results screen; nothing transitions here yet.
    #[allow(dead_code)]
    PostGameSummary,
    ReviveMinigame,
    GameOverScreen,
}

/// Owns every game component and sequences them through [`GameState`].
pub struct Session {
    state: GameState,
    running: bool,
    progress: ProgressStore,
    orders: OrderBoard,
    assets: Assets,
    player: Player,
    road: Road,
    menu: Menu,
    delivery: DeliveryAnimation,
    minigame: Minigame,
    current_order_distance: u32,
    current_order_reward: u32,
    revive_available: bool,
    rng: StdRng,
}

impl Session {
    pub fn new(progress: ProgressStore, mut assets: Assets, mut rng: StdRng) -> Self {
        let orders = OrderBoard::new(&mut rng);
        let road = Road::new(&mut rng);
        let player = Player::new(road.lanes(), progress.current_vehicle_stats());
        let menu = Menu::new(&progress, &orders);
        assets.play_music(MSC_MENU, LOOP_FOREVER);
        Self {
            state: GameState::Menu,
            running: true,
            progress,
            orders,
            assets,
            player,
            road,
            menu,
            delivery: DeliveryAnimation::default(),
            minigame: Minigame::default(),
            current_order_distance: 0,
            current_order_reward: 0,
            revive_available: true,
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn take_bell(&self) -> bool {
        self.assets.take_bell()
    }

    pub fn handle_frame(&mut self, frame: &InputFrame) {
        for event in &frame.events {
            self.handle_event(event);
            if !self.running {
                return;
            }
        }
        if self.state == GameState::Playing {
            self.player.set_controls(frame.boost_held, frame.brake_held);
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Quit => {
                info!("quit requested");
                self.assets.stop_music();
                self.running = false;
                return;
            }
            InputEvent::KeyDown(Key::Escape) => match self.state {
                GameState::Playing => self.transition(GameState::Paused),
                GameState::Paused => self.transition(GameState::Playing),
                _ => {}
            },
            _ => {}
        }

        match self.state {
            GameState::Menu => {
                let outcome = self
                    .menu
                    .handle_event(event, &mut self.progress, &mut self.orders, &mut self.assets);
                match outcome {
                    Some(MenuOutcome::Quit) => {
                        info!("quit from menu");
                        self.assets.stop_music();
                        self.running = false;
                    }
                    Some(MenuOutcome::StartGame) => self.start_new_game(),
                    _ => {}
                }
            }
            GameState::Playing => {
                let direction = match event {
                    InputEvent::KeyDown(Key::Arrow(Direction::Left)) => -1,
                    InputEvent::KeyDown(Key::Arrow(Direction::Right)) => 1,
                    _ => return,
                };
                if self.player.move_lane(direction) {
                    debug!(lane = self.player.lane(), "lane change");
                    self.assets.play_sound(SND_MOVE);
                }
            }
            GameState::ReviveMinigame => {
                let InputEvent::KeyDown(Key::Arrow(dir)) = *event else {
                    return;
                };
                match self.minigame.handle_move(dir) {
                    Some(MinigameOutcome::Win) => {
                        info!("revive maze solved");
                        self.player.revive();
                        self.transition(GameState::Playing);
                        self.assets.play_music(MSC_GAME, LOOP_FOREVER);
                    }
                    Some(MinigameOutcome::Lose) => {
                        info!("revive maze failed");
                        self.assets.play_sound(SND_ORDER_FAILED);
                        self.end_game(false);
                    }
                    None => {}
                }
            }
            GameState::GameOverScreen => {
                let outcome = self
                    .menu
                    .handle_event(event, &mut self.progress, &mut self.orders, &mut self.assets);
                match outcome {
                    Some(MenuOutcome::StartMinigame) => {
                        self.revive_available = false;
                        self.minigame.start(&mut self.rng);
                        self.transition(GameState::ReviveMinigame);
                    }
                    Some(MenuOutcome::GoToMain) => self.return_to_menu(),
                    _ => {}
                }
            }
            GameState::Paused | GameState::DeliveryAnimation | GameState::PostGameSummary => {}
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self.state {
            GameState::Playing => {
                self.player.update(dt);
                self.road.update(dt, self.player.speed(), &mut self.rng);
                self.check_collisions();
                if self.state == GameState::Playing
                    && self.road.distance_traveled() >= f64::from(self.current_order_distance)
                {
                    self.end_game(true);
                }
            }
            GameState::ReviveMinigame => self.minigame.update(dt),
            GameState::DeliveryAnimation => {
                if self.delivery.update(dt) {
                    self.return_to_menu();
                }
            }
            GameState::Menu
            | GameState::Paused
            | GameState::PostGameSummary
            | GameState::GameOverScreen => {}
        }
    }

    /// Begins a run with the selected order and route; stays in the menu
    /// if either is missing.
    pub fn start_new_game(&mut self) {
        self.revive_available = true;
        let Some((distance, reward)) = self.orders.final_parameters() else {
            warn!("order or route not chosen, staying in menu");
            self.transition(GameState::Menu);
            return;
        };
        self.current_order_distance = distance;
        self.current_order_reward = reward;

        self.road.reset(self.orders.selected_route(), &mut self.rng);
        self.player.reset_stats(self.progress.current_vehicle_stats());

        info!(
            order = self.orders.selected_order().map(|o| o.name),
            route = ?self.road.route(),
            vehicle = self.progress.current_vehicle(),
            distance,
            reward,
            "run started"
        );
        self.transition(GameState::Playing);
        self.assets.play_music(MSC_GAME, LOOP_FOREVER);
    }

    pub fn end_game(&mut self, success: bool) {
        if success {
            info!(reward = self.current_order_reward, "order delivered");
            self.progress.add_coins(self.current_order_reward);
            self.assets.play_sound(SND_ORDER_COMPLETED);
            self.delivery.start();
            self.transition(GameState::DeliveryAnimation);
        } else {
            info!(
                traveled = self.road.distance_traveled(),
                target = self.current_order_distance,
                "order failed"
            );
            self.assets.play_sound(SND_ORDER_FAILED);
            self.transition(GameState::GameOverScreen);
            self.menu.set_screen(
                MenuScreen::GameOver { revive_available: false },
                &self.progress,
                &self.orders,
            );
            self.assets.play_music(MSC_MENU, LOOP_FOREVER);
        }
    }

    fn check_collisions(&mut self) {
        let hitbox = self.player.hitbox();
        let Some(index) = self
            .road
            .obstacles()
            .iter()
            .position(|o| o.collides_with(&hitbox))
        else {
            return;
        };
        let obstacle = self.road.remove_obstacle(index);
        self.assets.play_sound(SND_COLLISION);
        let alive = self.player.take_damage();
        debug!(kind = ?obstacle.kind, lives = self.player.lives(), "collision");
        if alive {
            return;
        }

        self.player.die();
        self.assets.play_music(MSC_MENU, LOOP_FOREVER);
        if self.revive_available {
            self.transition(GameState::GameOverScreen);
            self.menu.set_screen(
                MenuScreen::GameOver { revive_available: true },
                &self.progress,
                &self.orders,
            );
        } else {
            self.end_game(false);
        }
    }

    fn return_to_menu(&mut self) {
        self.orders.generate(&mut self.rng);
        self.menu.set_screen(MenuScreen::Main, &self.progress, &self.orders);
        self.transition(GameState::Menu);
        self.assets.play_music(MSC_MENU, LOOP_FOREVER);
    }

    fn transition(&mut self, next: GameState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, "state changed");
            self.state = next;
        }
    }

    pub fn draw(&mut self, canvas: &mut Canvas) {
        match self.state {
            GameState::Menu | GameState::GameOverScreen => {
                self.menu.draw(canvas, &self.progress, &self.orders);
            }
            GameState::Playing | GameState::Paused => {
                hud::draw_road(canvas, &self.road, &mut self.assets);
                hud::draw_player(canvas, &self.player, &mut self.assets);
                let distance_left =
                    f64::from(self.current_order_distance) - self.road.distance_traveled();
                hud::draw_hud(
                    canvas,
                    &self.player,
                    distance_left,
                    self.current_order_reward,
                    self.progress.coins(),
                    &mut self.assets,
                );
                if self.state == GameState::Paused {
                    hud::draw_pause_overlay(canvas);
                }
            }
            GameState::ReviveMinigame => self.minigame.draw(canvas),
            GameState::DeliveryAnimation => self.delivery.draw(canvas, &mut self.assets),
            GameState::PostGameSummary => canvas.clear(palette::UI_BG),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::MOVE_DELAY;
    use crate::obstacles::Obstacle;
    use crate::orders::Route;
    use crate::pathfind::find_path;
    use crate::progress::tests::temp_progress_path;
    use rand::SeedableRng;

    fn session() -> Session {
        let progress = ProgressStore::open(temp_progress_path());
        let assets = Assets::new(std::env::temp_dir().join("food_rush_no_assets"));
        Session::new(progress, assets, StdRng::seed_from_u64(42))
    }

    fn playing() -> Session {
        let mut s = session();
        s.orders.select_order(0);
        s.orders.select_route(Route::Short);
        s.start_new_game();
        assert_eq!(s.state(), GameState::Playing);
        s
    }

    fn key(key: Key) -> InputEvent {
        InputEvent::KeyDown(key)
    }

    fn obstacle_on_player(s: &mut Session, mut obstacle: Obstacle) {
        let hitbox = s.player.hitbox();
        obstacle.y = hitbox.y;
        assert!(obstacle.hitbox().overlaps(&hitbox));
        assert!(obstacle.is_passable() || obstacle.collides_with(&hitbox));
        s.road.push_obstacle(obstacle);
    }

    fn lose_all_lives(s: &mut Session) {
        let lane = s.road.lanes()[1];
        while s.player.lives() > 1 {
            s.player.take_damage();
        }
        let car = Obstacle::car(&mut s.rng, lane);
        obstacle_on_player(s, car);
        s.update(0.01);
    }

    #[test]
    fn starts_in_menu_and_stays_without_selection() {
        let mut s = session();
        assert_eq!(s.state(), GameState::Menu);
        s.start_new_game();
        assert_eq!(s.state(), GameState::Menu);
    }

    #[test]
    fn menu_shortcuts_start_a_run() {
        let mut s = session();
        for _ in 0..3 {
            s.handle_event(&key(Key::Digit(1)));
        }
        assert_eq!(s.state(), GameState::Playing);
        let (distance, reward) = Route::Short.resolve(&s.orders.available()[0]);
        assert_eq!(s.current_order_distance, distance);
        assert_eq!(s.current_order_reward, reward);
    }

    #[test]
    fn reaching_the_target_delivers_and_pays() {
        let mut s = playing();
        let coins = s.progress.coins();
        s.road.set_distance_traveled(f64::from(s.current_order_distance) - 1.0);
        s.player.set_speed(350.0);
        s.update(0.1);
        assert_eq!(s.state(), GameState::DeliveryAnimation);
        assert_eq!(s.progress.coins(), coins + s.current_order_reward);

        let mut ticks = 0;
        while s.state() == GameState::DeliveryAnimation {
            s.update(0.1);
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(s.state(), GameState::Menu);
        assert_eq!(s.menu.screen(), MenuScreen::Main);
        assert!(s.orders.selected_order().is_none());
    }

    #[test]
    fn open_manhole_is_driven_over() {
        let mut s = playing();
        let lane = s.road.lanes()[1];
        let mut hole = Obstacle::manhole(&mut s.rng, lane);
        hole.set_open_progress(1.0);
        obstacle_on_player(&mut s, hole);
        s.update(0.01);
        assert_eq!(s.player.lives(), 3);
        assert_eq!(s.road.obstacles().len(), 1);
    }

    #[test]
    fn opening_manhole_still_hurts() {
        let mut s = playing();
        let lane = s.road.lanes()[1];
        let mut hole = Obstacle::manhole(&mut s.rng, lane);
        hole.set_open_progress(0.5);
        obstacle_on_player(&mut s, hole);
        s.update(0.01);
        assert_eq!(s.player.lives(), 2);
        assert!(s.road.obstacles().is_empty());
        assert_eq!(s.state(), GameState::Playing);
    }

    #[test]
    fn grazing_a_manhole_corner_is_harmless() {
        let mut s = playing();
        let hitbox = s.player.hitbox();
        // Hole square overlaps the hitbox's top right corner only.
        let mut hole = Obstacle::manhole(&mut s.rng, hitbox.right() + 46.0);
        hole.y += hitbox.y + 3.0 - hole.hole().bottom();
        assert!(hole.hole().overlaps(&hitbox));
        s.road.push_obstacle(hole.clone());
        s.update(0.001);
        assert_eq!(s.player.lives(), 3);

        s.road.remove_obstacle(0);
        hole.y += 50.0;
        s.road.push_obstacle(hole);
        s.update(0.001);
        assert_eq!(s.player.lives(), 2);
    }

    #[test]
    fn escape_pauses_and_freezes_the_road() {
        let mut s = playing();
        s.handle_event(&key(Key::Escape));
        assert_eq!(s.state(), GameState::Paused);
        let before = s.road.distance_traveled();
        s.update(1.0);
        assert_eq!(s.road.distance_traveled(), before);
        s.handle_event(&key(Key::Escape));
        assert_eq!(s.state(), GameState::Playing);
    }

    #[test]
    fn lane_keys_only_steer_while_playing() {
        let mut s = playing();
        s.handle_event(&key(Key::Arrow(Direction::Left)));
        assert_eq!(s.player.lane(), 0);
        s.handle_event(&key(Key::Escape));
        s.handle_event(&key(Key::Arrow(Direction::Right)));
        assert_eq!(s.player.lane(), 0);
    }

    #[test]
    fn held_keys_drive_boost() {
        let mut s = playing();
        s.handle_frame(&InputFrame {
            events: Vec::new(),
            boost_held: true,
            brake_held: false,
        });
        assert!(s.player.is_boosting());
    }

    #[test]
    fn last_life_offers_a_single_revive() {
        let mut s = playing();
        lose_all_lives(&mut s);
        assert_eq!(s.state(), GameState::GameOverScreen);
        assert_eq!(s.menu.screen(), MenuScreen::GameOver { revive_available: true });
        assert!(!s.player.is_alive());

        s.handle_event(&key(Key::Digit(1)));
        assert_eq!(s.state(), GameState::ReviveMinigame);
        assert!(!s.revive_available);

        // Up from the entrance is a wall.
        s.handle_event(&key(Key::Arrow(Direction::Up)));
        assert_eq!(s.state(), GameState::GameOverScreen);
        assert_eq!(s.menu.screen(), MenuScreen::GameOver { revive_available: false });

        s.handle_event(&key(Key::Digit(1)));
        assert_eq!(s.state(), GameState::Menu);
        assert!(s.orders.selected_order().is_none());
    }

    #[test]
    fn solving_the_maze_resumes_the_run() {
        let mut s = playing();
        s.road.set_distance_traveled(500.0);
        lose_all_lives(&mut s);
        s.handle_event(&key(Key::Digit(1)));
        assert_eq!(s.state(), GameState::ReviveMinigame);

        let grid = s.minigame.grid().clone();
        let path = find_path(&grid, grid.entrance(), grid.exit()).unwrap();
        for pair in path.windows(2) {
            let dir = Direction::ALL
                .into_iter()
                .find(|d| pair[0].step(*d, grid.rows(), grid.cols()) == Some(pair[1]))
                .unwrap();
            s.handle_event(&key(Key::Arrow(dir)));
            s.update(MOVE_DELAY);
        }
        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.player.lives(), 1);
        assert!(s.player.is_alive());
        assert!(s.road.distance_traveled() >= 500.0);

        // No second revive this run.
        lose_all_lives(&mut s);
        assert_eq!(s.state(), GameState::GameOverScreen);
        assert_eq!(s.menu.screen(), MenuScreen::GameOver { revive_available: false });
    }

    #[test]
    fn quit_stops_the_session() {
        let mut s = session();
        s.handle_frame(&InputFrame {
            events: vec![InputEvent::Quit, key(Key::Digit(1))],
            ..InputFrame::default()
        });
        assert!(!s.is_running());
        assert_eq!(s.menu.screen(), MenuScreen::Main);
    }
}
