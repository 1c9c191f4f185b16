use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub name: &'static str,
    pub reward: u32,
    pub base_distance: u32,
}

pub const CATALOG: [Order; 6] = [
    Order { name: "Pepperoni pizza", reward: 100, base_distance: 20_000 },
    Order { name: "Philadelphia roll set", reward: 150, base_distance: 25_000 },
    Order { name: "Double cheeseburger", reward: 80, base_distance: 18_000 },
    Order { name: "Coconut cappuccino", reward: 50, base_distance: 15_000 },
    Order { name: "Chocolate cake", reward: 200, base_distance: 30_000 },
    Order { name: "Chicken wok", reward: 120, base_distance: 22_000 },
];

const OFFERED_ORDERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Short,
    Long,
}

impl Route {
    pub fn factors(self) -> (f64, f64) {
        match self {
            Route::Short => (0.7, 2.0),
            Route::Long => (1.5, 1.0),
        }
    }

    /// Distance and reward for `order` on this route, truncated to integers.
    pub fn resolve(self, order: &Order) -> (u32, u32) {
        let (distance, reward) = self.factors();
        (
            (order.base_distance as f64 * distance) as u32,
            (order.reward as f64 * reward) as u32,
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::Short => "Short",
            Route::Long => "Long",
        }
    }
}

/// The orders currently on offer and the player's pending selection.
#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    available: Vec<Order>,
    selected_order: Option<Order>,
    selected_route: Option<Route>,
}

impl OrderBoard {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut board = Self::default();
        board.generate(rng);
        board
    }

    pub fn generate(&mut self, rng: &mut impl Rng) {
        self.available = CATALOG
            .choose_multiple(rng, OFFERED_ORDERS.min(CATALOG.len()))
            .copied()
            .collect();
        self.selected_order = None;
        self.selected_route = None;
        debug!(orders = ?self.available.iter().map(|o| o.name).collect::<Vec<_>>(), "order board refreshed");
    }

    pub fn available(&self) -> &[Order] {
        &self.available
    }

    pub fn select_order(&mut self, index: usize) {
        if let Some(order) = self.available.get(index) {
            self.selected_order = Some(*order);
        }
    }

    pub fn select_route(&mut self, route: Route) {
        self.selected_route = Some(route);
    }

    pub fn selected_order(&self) -> Option<&Order> {
        self.selected_order.as_ref()
    }

    pub fn selected_route(&self) -> Option<Route> {
        self.selected_route
    }

    /// Resolved (distance, reward), or `None` until both order and route are chosen.
    pub fn final_parameters(&self) -> Option<(u32, u32)> {
        let order = self.selected_order.as_ref()?;
        let route = self.selected_route?;
        Some(route.resolve(order))
    }
}
