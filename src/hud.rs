use crate::assets::{Assets, IMG_LIFE, IMG_MANHOLE, IMG_PLAYER};
use crate::components::{Point, Rect};
use crate::config::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::obstacles::{Obstacle, ObstacleKind, MANHOLE_SIZE};
use crate::player::{Player, MAX_ENERGY, PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::render::{palette, Canvas};
use crate::road::{Road, LINE_LENGTH, ROAD_LEFT, ROAD_WIDTH};

const PANEL_HEIGHT: f32 = 70.0;
const LIFE_SIZE: (u32, u32) = (30, 30);

pub fn draw_road(canvas: &mut Canvas, road: &Road, assets: &mut Assets) {
    canvas.clear(palette::GRASS);
    canvas.fill_rect(Rect::new(ROAD_LEFT, 0.0, ROAD_WIDTH, WORLD_HEIGHT), palette::ROAD);

    for stone in road.stones() {
        canvas.fill_ellipse(Rect::new(stone.x, stone.y, stone.width, stone.height), stone.color);
    }

    let lanes = road.lanes();
    for pair in lanes.windows(2) {
        let x = (pair[0] + pair[1]) / 2.0;
        for &y in road.line_offsets() {
            canvas.line(Point::new(x, y), Point::new(x, y + LINE_LENGTH), '┃', palette::WHITE);
        }
    }

    for obstacle in road.obstacles() {
        draw_obstacle(canvas, obstacle, assets);
    }
}

fn draw_obstacle(canvas: &mut Canvas, obstacle: &Obstacle, assets: &mut Assets) {
    match obstacle.kind {
        ObstacleKind::Car { color, .. } => {
            let body = obstacle.bounds();
            canvas.fill_rect(body, color);
            canvas.fill_rect(
                Rect::new(body.x + 10.0, body.y + 20.0, body.w - 20.0, 30.0),
                palette::SKY,
            );
        }
        ObstacleKind::Manhole { .. } => {
            canvas.fill_ellipse(obstacle.hole(), palette::BLACK);
            let (dx, dy) = obstacle.cover_offset();
            let hole = obstacle.hole();
            let cover = Rect::new(hole.x + dx, hole.y + dy, hole.w, hole.h);
            let size = MANHOLE_SIZE as u32;
            let sprite = assets.image(IMG_MANHOLE, Some((size, size)));
            canvas.fill_ellipse(cover, palette::MAZE_WALL);
            canvas.blit(&sprite, cover, palette::MAZE_PATH);
        }
    }
}

pub fn draw_player(canvas: &mut Canvas, player: &Player, assets: &mut Assets) {
    let sprite = assets.image(IMG_PLAYER, Some((PLAYER_WIDTH as u32, PLAYER_HEIGHT as u32)));
    let color = if player.is_boosting() { palette::GOLD } else { palette::WHITE };
    canvas.blit(&sprite, player.bounds(), color);
}

/// Top panel with distance, reward, coins and lives; energy bar at the bottom.
pub fn draw_hud(
    canvas: &mut Canvas,
    player: &Player,
    distance_left: f64,
    reward: u32,
    coins: u32,
    assets: &mut Assets,
) {
    canvas.fill_rect(Rect::new(0.0, 0.0, WORLD_WIDTH, PANEL_HEIGHT), palette::UI_BG);
    let km = (distance_left / 1000.0).max(0.0) as u32;
    canvas.text(20.0, 10.0, &format!("Left: {km} km"), palette::WHITE);
    canvas.text(20.0, 35.0, &format!("Reward: {reward}"), palette::GOLD);
    canvas.text(WORLD_WIDTH - 220.0, 10.0, &format!("Coins: {coins}"), palette::GOLD);

    let life = assets.image(IMG_LIFE, Some(LIFE_SIZE));
    let (w, h) = (life.size().0 as f32, life.size().1 as f32);
    for i in 0..player.max_lives() {
        let x = WORLD_WIDTH - w - 10.0 - i as f32 * (w + 5.0);
        let color = if i < player.lives() { palette::RED } else { palette::BUTTON_DISABLED };
        canvas.blit(&life, Rect::new(x, 35.0, w, h), color);
    }

    draw_bar(
        canvas,
        Rect::new(WORLD_WIDTH / 2.0 - 150.0, WORLD_HEIGHT - 40.0, 300.0, 25.0),
        player.energy() / MAX_ENERGY,
        "Energy",
    );
}

fn draw_bar(canvas: &mut Canvas, rect: Rect, percent: f32, label: &str) {
    let percent = percent.clamp(0.0, 1.0);
    canvas.fill_rect(Rect::new(rect.x - 2.0, rect.y - 2.0, rect.w + 4.0, rect.h + 4.0), palette::UI_BG);
    canvas.fill_rect(Rect::new(rect.x, rect.y, rect.w * percent, rect.h), palette::BLUE);
    canvas.text_centered(rect.center_x(), rect.center_y(), label, palette::WHITE);
}

pub fn draw_pause_overlay(canvas: &mut Canvas) {
    canvas.fill_rect(
        Rect::new(WORLD_WIDTH / 2.0 - 200.0, WORLD_HEIGHT / 2.0 - 60.0, 400.0, 120.0),
        palette::PAUSE_OVERLAY,
    );
    canvas.text_centered(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0 - 10.0, "PAUSED", palette::WHITE);
    canvas.text_centered(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0 + 30.0, "Esc to resume", palette::MAZE_PATH);
}
