use crossterm::style::Color;

use crate::assets::{Assets, IMG_DELIVERY_FRAMES};
use crate::components::{Point, Rect};
use crate::config::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::render::{palette, Canvas};

pub const DURATION: f32 = 3.5;
pub const FRAME_DURATION: f32 = 0.1;
const COURIER_SIZE: (u32, u32) = (80, 80);
const HOUSE_WIDTH: f32 = 180.0;
const HOUSE_HEIGHT: f32 = 150.0;

#[derive(Debug, Clone, Default)]
pub struct DeliveryAnimation {
    timer: f32,
    active: bool,
    frame: usize,
    frame_timer: f32,
}

impl DeliveryAnimation {
    pub fn start(&mut self) {
        self.timer = DURATION;
        self.active = true;
        self.frame = 0;
        self.frame_timer = 0.0;
    }

    /// Advances the scene; returns true on the frame it finishes.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.timer -= dt;
        self.frame_timer += dt;
        if self.frame_timer >= FRAME_DURATION {
            self.frame_timer -= FRAME_DURATION;
            self.frame = (self.frame + 1) % IMG_DELIVERY_FRAMES.len();
        }
        if self.timer <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn progress(&self) -> f32 {
        (1.0 - self.timer / DURATION).clamp(0.0, 1.0)
    }

    /// Left edge of the courier: from off screen left toward the house.
    pub fn courier_x(&self) -> f32 {
        let w = COURIER_SIZE.0 as f32;
        -w + (WORLD_WIDTH + w - 200.0) * self.progress()
    }

    /// Opacity of the caption; fades in over the second half.
    pub fn text_alpha(&self) -> f32 {
        let progress = self.progress();
        if progress > 0.5 {
            ((progress - 0.5) * 2.0).min(1.0)
        } else {
            0.0
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, assets: &mut Assets) {
        if !self.active {
            return;
        }
        canvas.clear(palette::SKY);
        canvas.fill_rect(Rect::new(0.0, WORLD_HEIGHT - 200.0, WORLD_WIDTH, 200.0), palette::GRASS);
        canvas.fill_rect(Rect::new(0.0, WORLD_HEIGHT - 150.0, WORLD_WIDTH, 100.0), palette::ROAD);

        draw_house(canvas);

        let (w, h) = (COURIER_SIZE.0 as f32, COURIER_SIZE.1 as f32);
        let y = WORLD_HEIGHT - 140.0 - h / 2.0;
        let sprite = assets.image(IMG_DELIVERY_FRAMES[self.frame], Some(COURIER_SIZE));
        canvas.blit(&sprite, Rect::new(self.courier_x(), y, w, h), palette::WHITE);

        let alpha = self.text_alpha();
        if alpha > 0.0 {
            canvas.text_centered(
                WORLD_WIDTH / 2.0,
                WORLD_HEIGHT / 2.0,
                "Order delivered!",
                fade(palette::SKY, palette::WHITE, alpha),
            );
        }
    }
}

fn draw_house(canvas: &mut Canvas) {
    let x = WORLD_WIDTH - 250.0;
    let y = WORLD_HEIGHT - 300.0;
    canvas.fill_rect(Rect::new(x, y, HOUSE_WIDTH, HOUSE_HEIGHT), Color::Rgb { r: 160, g: 82, b: 45 });
    canvas.fill_polygon(
        &[
            Point::new(x - 20.0, y),
            Point::new(x + HOUSE_WIDTH + 20.0, y),
            Point::new(x + HOUSE_WIDTH / 2.0, y - 80.0),
        ],
        Color::Rgb { r: 139, g: 0, b: 0 },
    );
    canvas.fill_rect(Rect::new(x + 40.0, y + 40.0, 40.0, 40.0), Color::Rgb { r: 173, g: 216, b: 230 });
    canvas.fill_rect(Rect::new(x + 100.0, y + 70.0, 50.0, 80.0), Color::Rgb { r: 101, g: 67, b: 33 });
    canvas.fill_ellipse(Rect::new(x + 135.0, y + 105.0, 10.0, 10.0), palette::GOLD);
}

fn fade(from: Color, to: Color, t: f32) -> Color {
    match (from, to) {
        (Color::Rgb { r: r0, g: g0, b: b0 }, Color::Rgb { r: r1, g: g1, b: b1 }) => {
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            Color::Rgb {
                r: mix(r0, r1),
                g: mix(g0, g1),
                b: mix(b0, b1),
            }
        }
        _ => to,
    }
}
