use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{info, warn};

use crate::error::AssetError;

pub const IMG_PLAYER: &str = "player";
pub const IMG_MANHOLE: &str = "manhole";
pub const IMG_LIFE: &str = "life";
pub const IMG_DELIVERY_FRAMES: [&str; 2] = ["player2", "player3"];

pub const SND_MOVE: &str = "move.wav";
pub const SND_COLLISION: &str = "collision.wav";
pub const SND_ORDER_FAILED: &str = "order_failed.wav";
pub const SND_ORDER_COMPLETED: &str = "order_completed.wav";
pub const SND_CLICK: &str = "click.wav";
pub const MSC_MENU: &str = "menu_music.mp3";
pub const MSC_GAME: &str = "game_music.mp3";

pub const LOOP_FOREVER: i32 = -1;

const FALLBACK_SIZE: (u32, u32) = (50, 50);
const FALLBACK_GLYPH: char = '█';

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    art: Vec<Vec<char>>,
    size: (u32, u32),
    placeholder: bool,
}

impl Sprite {
    /// Parses art lines; trailing whitespace is kept so columns line up.
    pub fn parse(text: &str, size: (u32, u32)) -> Option<Self> {
        let mut art: Vec<Vec<char>> = text.lines().map(|l| l.chars().collect()).collect();
        while art.last().is_some_and(|row| row.iter().all(|c| c.is_whitespace())) {
            art.pop();
        }
        let width = art.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return None;
        }
        for row in &mut art {
            row.resize(width, ' ');
        }
        Some(Self {
            art,
            size,
            placeholder: false,
        })
    }

    pub fn placeholder(size: (u32, u32)) -> Self {
        Self {
            art: vec![vec![FALLBACK_GLYPH]],
            size,
            placeholder: true,
        }
    }

    pub fn width(&self) -> usize {
        self.art.first().map(Vec::len).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.art.len()
    }

    pub fn glyph(&self, x: usize, y: usize) -> char {
        self.art
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(' ')
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Loads and caches sprites and sounds from one asset directory.
/// Failures never propagate: images fall back to a placeholder and sounds
/// become no-ops.
#[derive(Debug)]
pub struct Assets {
    root: PathBuf,
    images: HashMap<(String, Option<(u32, u32)>), Rc<Sprite>>,
    sounds: HashMap<String, bool>,
    music: Option<(String, i32)>,
    bell: Cell<bool>,
    warned: HashSet<String>,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
            sounds: HashMap::new(),
            music: None,
            bell: Cell::new(false),
            warned: HashSet::new(),
        }
    }

    pub fn image(&mut self, id: &str, size: Option<(u32, u32)>) -> Rc<Sprite> {
        let key = (id.to_string(), size);
        if let Some(sprite) = self.images.get(&key) {
            return Rc::clone(sprite);
        }
        let size = size.unwrap_or(FALLBACK_SIZE);
        let sprite = match load_art(&self.root.join(format!("{id}.txt")), size) {
            Ok(sprite) => sprite,
            Err(err) => {
                self.warn_once(id, &err.to_string());
                Sprite::placeholder(size)
            }
        };
        let sprite = Rc::new(sprite);
        self.images.insert(key, Rc::clone(&sprite));
        sprite
    }

    pub fn sound(&mut self, id: &str) -> bool {
        if let Some(&available) = self.sounds.get(id) {
            return available;
        }
        let available = self.root.join(id).is_file();
        if !available {
            self.warn_once(id, "sound file not found");
        }
        self.sounds.insert(id.to_string(), available);
        available
    }

    pub fn play_sound(&mut self, id: &str) {
        if self.sound(id) {
            self.bell.set(true);
        }
    }

    pub fn play_music(&mut self, id: &str, loops: i32) {
        if !self.root.join(id).is_file() {
            self.warn_once(id, "music file not found");
            self.stop_music();
            return;
        }
        if self.music.as_ref().is_some_and(|(current, _)| current == id) {
            return;
        }
        info!(track = id, loops, "music started");
        self.music = Some((id.to_string(), loops));
    }

    pub fn stop_music(&mut self) {
        if let Some((id, _)) = self.music.take() {
            info!(track = %id, "music stopped");
        }
    }

    #[cfg(test)]
    pub fn current_music(&self) -> Option<&str> {
        self.music.as_ref().map(|(id, _)| id.as_str())
    }

    /// Returns and clears the pending bell; at most one ring per frame.
    pub fn take_bell(&self) -> bool {
        self.bell.replace(false)
    }

    fn warn_once(&mut self, id: &str, reason: &str) {
        if self.warned.insert(id.to_string()) {
            warn!(asset = id, root = %self.root.display(), reason, "asset unavailable, using fallback");
        }
    }
}

fn load_art(path: &Path, size: (u32, u32)) -> Result<Sprite, AssetError> {
    let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Sprite::parse(&text, size).ok_or_else(|| AssetError::Empty(path.to_path_buf()))
}
