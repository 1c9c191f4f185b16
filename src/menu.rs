use tracing::{info, warn};

use crate::assets::{Assets, SND_CLICK};
use crate::components::{Point, Rect};
use crate::config::{GAME_TITLE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::input::{InputEvent, Key};
use crate::orders::{OrderBoard, Route};
use crate::progress::{ProgressStore, VEHICLES};
use crate::render::{palette, Canvas};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    Shop,
    Orders,
    Route,
    GameOver { revive_available: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    GoToOrders,
    GoToShop,
    GoToMain,
    Quit,
    Vehicle(usize),
    Order(usize),
    Route(Route),
    StartMinigame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Quit,
    StartGame,
    GoToMain,
    StartMinigame,
}

#[derive(Debug, Clone)]
struct Button {
    rect: Rect,
    label: String,
    action: MenuAction,
    disabled: bool,
    hovered: bool,
}

impl Button {
    fn new(rect: Rect, label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            rect,
            label: label.into(),
            action,
            disabled: false,
            hovered: false,
        }
    }

    fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn color(&self) -> crossterm::style::Color {
        if self.disabled {
            palette::BUTTON_DISABLED
        } else if self.hovered {
            palette::BUTTON_HOVER
        } else {
            palette::BUTTON
        }
    }
}

/// Button-driven menus: main, shop, order board, route choice and game over.
#[derive(Debug, Clone)]
pub struct Menu {
    screen: MenuScreen,
    buttons: Vec<Button>,
}

impl Menu {
    pub fn new(progress: &ProgressStore, orders: &OrderBoard) -> Self {
        let mut menu = Self {
            screen: MenuScreen::Main,
            buttons: Vec::new(),
        };
        menu.set_screen(MenuScreen::Main, progress, orders);
        menu
    }

    pub fn screen(&self) -> MenuScreen {
        self.screen
    }

    pub fn set_screen(&mut self, screen: MenuScreen, progress: &ProgressStore, orders: &OrderBoard) {
        let screen = match screen {
            MenuScreen::Route if orders.selected_order().is_none() => MenuScreen::Orders,
            other => other,
        };
        self.screen = screen;
        self.buttons = match screen {
            MenuScreen::Main => main_buttons(),
            MenuScreen::Shop => shop_buttons(progress),
            MenuScreen::Orders => order_buttons(orders),
            MenuScreen::Route => route_buttons(orders),
            MenuScreen::GameOver { revive_available } => game_over_buttons(revive_available),
        };
    }

    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        progress: &mut ProgressStore,
        orders: &mut OrderBoard,
        assets: &mut Assets,
    ) -> Option<MenuOutcome> {
        let action = match *event {
            InputEvent::PointerMoved(p) => {
                self.hover(p);
                None
            }
            InputEvent::PointerClicked(p) => {
                self.hover(p);
                self.buttons
                    .iter()
                    .find(|b| b.hovered && !b.disabled)
                    .map(|b| b.action)
            }
            InputEvent::KeyDown(Key::Digit(n)) => self.shortcut(n),
            _ => None,
        }?;
        assets.play_sound(SND_CLICK);
        self.apply(action, progress, orders)
    }

    fn hover(&mut self, p: Point) {
        for button in self.buttons.iter_mut().filter(|b| !b.disabled) {
            button.hovered = button.rect.contains(p);
        }
    }

    /// `n`-th enabled button, counting from 1.
    fn shortcut(&self, n: u8) -> Option<MenuAction> {
        let index = usize::from(n).checked_sub(1)?;
        self.buttons
            .iter()
            .filter(|b| !b.disabled)
            .nth(index)
            .map(|b| b.action)
    }

    fn apply(
        &mut self,
        action: MenuAction,
        progress: &mut ProgressStore,
        orders: &mut OrderBoard,
    ) -> Option<MenuOutcome> {
        match action {
            MenuAction::Quit => return Some(MenuOutcome::Quit),
            MenuAction::GoToMain => {
                self.set_screen(MenuScreen::Main, progress, orders);
                return Some(MenuOutcome::GoToMain);
            }
            MenuAction::GoToShop => self.set_screen(MenuScreen::Shop, progress, orders),
            MenuAction::GoToOrders => self.set_screen(MenuScreen::Orders, progress, orders),
            MenuAction::Vehicle(index) => {
                if let Some(stats) = VEHICLES.get(index) {
                    let result = if progress.owns(stats.id) {
                        progress.select_vehicle(stats.id)
                    } else {
                        progress.buy_vehicle(stats.id)
                    };
                    match result {
                        Ok(true) => info!(vehicle = stats.id, "vehicle selected"),
                        Ok(false) => {}
                        Err(err) => warn!(%err, "vehicle change rejected"),
                    }
                }
                self.set_screen(MenuScreen::Shop, progress, orders);
            }
            MenuAction::Order(index) => {
                orders.select_order(index);
                self.set_screen(MenuScreen::Route, progress, orders);
            }
            MenuAction::Route(route) => {
                orders.select_route(route);
                return Some(MenuOutcome::StartGame);
            }
            MenuAction::StartMinigame => return Some(MenuOutcome::StartMinigame),
        }
        None
    }

    pub fn draw(&self, canvas: &mut Canvas, progress: &ProgressStore, orders: &OrderBoard) {
        canvas.clear(palette::UI_BG);
        let cx = WORLD_WIDTH / 2.0;

        match self.screen {
            MenuScreen::GameOver { .. } => {
                canvas.text_centered(cx, WORLD_HEIGHT / 2.0 - 150.0, "ORDER FAILED!", palette::RED);
                canvas.text_centered(
                    cx,
                    WORLD_HEIGHT / 2.0 - 100.0,
                    &format!("Total coins: {}", progress.coins()),
                    palette::GOLD,
                );
            }
            _ => {
                canvas.text_centered(cx, 50.0, GAME_TITLE, palette::WHITE);
                let coins = format!("Coins: {}", progress.coins());
                canvas.text(WORLD_WIDTH - 260.0, 20.0, &coins, palette::GOLD);
            }
        }

        match self.screen {
            MenuScreen::Shop => {
                for (i, stats) in VEHICLES.iter().enumerate() {
                    let x = shop_start_x() + i as f32 * 300.0 + 125.0;
                    canvas.text_centered(x, 300.0, stats.name, palette::WHITE);
                    let details = format!("x{:.1} speed, {} lives", stats.speed_multiplier, stats.lives);
                    canvas.text_centered(x, 350.0, &details, palette::MAZE_PATH);
                }
            }
            MenuScreen::Orders => {
                canvas.text_centered(cx, 180.0, "Choose an order:", palette::WHITE);
            }
            MenuScreen::Route => {
                if let Some(order) = orders.selected_order() {
                    canvas.text_centered(cx, 200.0, &format!("Order: {}", order.name), palette::WHITE);
                }
            }
            MenuScreen::Main | MenuScreen::GameOver { .. } => {}
        }

        let mut shortcut = 1;
        for button in &self.buttons {
            canvas.fill_rect(button.rect, button.color());
            let label = if button.disabled {
                button.label.clone()
            } else {
                let label = format!("[{shortcut}] {}", button.label);
                shortcut += 1;
                label
            };
            let fg = if button.disabled { palette::MAZE_PATH } else { palette::WHITE };
            canvas.text_centered(button.rect.center_x(), button.rect.center_y(), &label, fg);
        }
    }
}

fn shop_start_x() -> f32 {
    WORLD_WIDTH / 2.0 - (VEHICLES.len() as f32 * 300.0 - 50.0) / 2.0
}

fn back_button(label: &str, action: MenuAction) -> Button {
    Button::new(Rect::new(WORLD_WIDTH / 2.0 - 125.0, 600.0, 250.0, 60.0), label, action)
}

fn main_buttons() -> Vec<Button> {
    let x = WORLD_WIDTH / 2.0 - 150.0;
    vec![
        Button::new(Rect::new(x, 300.0, 300.0, 70.0), "Start", MenuAction::GoToOrders),
        Button::new(Rect::new(x, 400.0, 300.0, 70.0), "Shop", MenuAction::GoToShop),
        Button::new(Rect::new(x, 500.0, 300.0, 70.0), "Quit", MenuAction::Quit),
    ]
}

fn shop_buttons(progress: &ProgressStore) -> Vec<Button> {
    let mut buttons: Vec<Button> = VEHICLES
        .iter()
        .enumerate()
        .map(|(i, stats)| {
            let owned = progress.owns(stats.id);
            let current = progress.current_vehicle() == stats.id;
            let label = if current {
                "Selected".to_string()
            } else if owned {
                "Select".to_string()
            } else {
                format!("Buy ({})", stats.price)
            };
            let disabled = current || (!owned && progress.coins() < stats.price);
            let rect = Rect::new(shop_start_x() + i as f32 * 300.0, 450.0, 250.0, 60.0);
            Button::new(rect, label, MenuAction::Vehicle(i)).disabled(disabled)
        })
        .collect();
    buttons.push(back_button("Back", MenuAction::GoToMain));
    buttons
}

fn order_buttons(orders: &OrderBoard) -> Vec<Button> {
    let mut buttons: Vec<Button> = orders
        .available()
        .iter()
        .enumerate()
        .map(|(i, order)| {
            let rect = Rect::new(WORLD_WIDTH / 2.0 - 250.0, 250.0 + i as f32 * 100.0, 500.0, 80.0);
            Button::new(rect, order.name, MenuAction::Order(i))
        })
        .collect();
    buttons.push(back_button("Back", MenuAction::GoToMain));
    buttons
}

fn route_buttons(orders: &OrderBoard) -> Vec<Button> {
    let Some(order) = orders.selected_order() else {
        return Vec::new();
    };
    let (w, h) = (450.0, 120.0);
    let mut buttons: Vec<Button> = [
        (Route::Short, WORLD_WIDTH / 2.0 - w - 20.0),
        (Route::Long, WORLD_WIDTH / 2.0 + 20.0),
    ]
    .into_iter()
    .map(|(route, x)| {
        let (distance, reward) = route.resolve(order);
        let label = format!(
            "{}: {:.1} km, {} coins",
            route.label(),
            distance as f64 / 1000.0,
            reward
        );
        Button::new(Rect::new(x, 350.0, w, h), label, MenuAction::Route(route))
    })
    .collect();
    buttons.push(back_button("To orders", MenuAction::GoToOrders));
    buttons
}

fn game_over_buttons(revive_available: bool) -> Vec<Button> {
    let (w, h) = (450.0, 90.0);
    let x = WORLD_WIDTH / 2.0 - w / 2.0;
    vec![
        Button::new(
            Rect::new(x, WORLD_HEIGHT / 2.0 - 50.0, w, h),
            "Revive (maze)",
            MenuAction::StartMinigame,
        )
        .disabled(!revive_available),
        Button::new(Rect::new(x, WORLD_HEIGHT / 2.0 + 50.0, w, h), "Menu", MenuAction::GoToMain),
    ]
}
