//! Level decoding.
//!
//! A level is an RGBA image. Every pixel is one meter; its exact color picks
//! the [`BlockType`] placed there. Rows are scanned top to bottom, so world
//! height grows as the row index shrinks (`height = image_height - row`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy::math::Vec2;
use image::{Rgba, RgbaImage};

use crate::config::GameConfig;
use crate::error::LevelError;
use crate::objects::{
    Background, Bats, Behavior, Candycorn, GameObject, Goal, Land, LandKind, ObjectId, Orb, Player,
};
use crate::physics::PhysicsWorld;
use crate::render::SpriteBatch;

/// Block types and their palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Empty,
    PlayerSpawn,
    LandNorm,
    LandFloat,
    CandyCorn,
    Orb,
    Goal,
}

impl BlockType {
    pub const ALL: [Self; 7] = [
        Self::Empty,
        Self::PlayerSpawn,
        Self::LandNorm,
        Self::LandFloat,
        Self::CandyCorn,
        Self::Orb,
        Self::Goal,
    ];

    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::Empty => [0, 0, 0],
            Self::PlayerSpawn => [255, 255, 255],
            Self::LandNorm => [0, 255, 0],
            Self::LandFloat => [0, 255, 255],
            Self::CandyCorn => [255, 255, 0],
            Self::Orb => [255, 0, 255],
            Self::Goal => [255, 0, 0],
        }
    }

    /// Opaque pixel of this block's color.
    pub const fn pixel(self) -> Rgba<u8> {
        let [r, g, b] = self.rgb();
        Rgba([r, g, b, 255])
    }

    /// Exact match against the palette; anything not fully opaque is unknown.
    pub fn from_pixel(pixel: Rgba<u8>) -> Option<Self> {
        Self::ALL.into_iter().find(|block| block.pixel() == pixel)
    }

    fn land_kind(self) -> Option<LandKind> {
        match self {
            Self::LandNorm => Some(LandKind::Normal),
            Self::LandFloat => Some(LandKind::Floating),
            _ => None,
        }
    }
}

/// Vertical placement of single-pixel objects.
struct Placement {
    height_factor: f32,
    offset: f32,
}

impl Placement {
    fn at(&self, pixel_x: u32, base_height: f32) -> Vec2 {
        #[allow(clippy::cast_precision_loss)]
        let x = pixel_x as f32;
        Vec2::new(x, base_height * self.height_factor + self.offset)
    }
}

const PLAYER_PLACEMENT: Placement = Placement {
    height_factor: 1.0,
    offset: 0.0,
};
/// Half-size pickups hover a quarter meter above the cell floor.
const PICKUP_PLACEMENT: Placement = Placement {
    height_factor: 1.0,
    offset: 0.25,
};
const GOAL_PLACEMENT: Placement = Placement {
    height_factor: 1.0,
    offset: 0.0,
};

/// Provides the raw image of a level.
pub trait LevelSource {
    /// Name used in logs.
    fn name(&self) -> String;

    fn load_image(&self) -> Result<RgbaImage, LevelError>;
}

impl<T: LevelSource + ?Sized> LevelSource for Arc<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn load_image(&self) -> Result<RgbaImage, LevelError> {
        (**self).load_image()
    }
}

/// Level image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLevel {
    path: PathBuf,
}

impl FileLevel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LevelSource for FileLevel {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load_image(&self) -> Result<RgbaImage, LevelError> {
        let image = image::open(&self.path).map_err(|source| LevelError::Image {
            path: self.path.clone(),
            source,
        })?;
        Ok(image.to_rgba8())
    }
}

/// Level image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryLevel {
    name: String,
    image: RgbaImage,
}

impl InMemoryLevel {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Builds a level from ASCII rows, one char per pixel, top row first.
    ///
    /// `.` empty, `@` player spawn, `#` land, `=` floating land,
    /// `c` candy corn, `o` orb, `G` goal. Other chars become an
    /// unknown gray pixel. Short rows are padded with empty pixels.
    pub fn from_ascii(name: impl Into<String>, rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        let mut image = RgbaImage::from_pixel(
            u32::try_from(width).unwrap_or(u32::MAX),
            u32::try_from(height).unwrap_or(u32::MAX),
            BlockType::Empty.pixel(),
        );
        for (y, row) in (0u32..).zip(rows) {
            for (x, ch) in (0u32..).zip(row.chars()) {
                let pixel = match ch {
                    '.' => BlockType::Empty.pixel(),
                    '@' => BlockType::PlayerSpawn.pixel(),
                    '#' => BlockType::LandNorm.pixel(),
                    '=' => BlockType::LandFloat.pixel(),
                    'c' => BlockType::CandyCorn.pixel(),
                    'o' => BlockType::Orb.pixel(),
                    'G' => BlockType::Goal.pixel(),
                    _ => Rgba([128, 128, 128, 255]),
                };
                image.put_pixel(x, y, pixel);
            }
        }
        Self::new(name, image)
    }
}

impl LevelSource for InMemoryLevel {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load_image(&self) -> Result<RgbaImage, LevelError> {
        Ok(self.image.clone())
    }
}

/// All objects of one level instance.
#[derive(Debug, Clone)]
pub struct Level {
    /// Land segments in scan order.
    pub lands: Vec<Land>,
    pub candycorns: Vec<Candycorn>,
    pub orbs: Vec<Orb>,
    pub player: Player,
    pub goal: Option<Goal>,
    pub bats: Bats,
    pub background: Background,
    /// Image width in pixels, also the level length in meters.
    pub width: u32,
    pub height: u32,
}

impl Level {
    /// Reads the image from `source` and decodes it.
    pub fn load(source: &dyn LevelSource, config: &GameConfig) -> Result<Self, LevelError> {
        let image = source.load_image()?;
        let level = Self::decode(&image, config)?;
        tracing::info!(
            level = %source.name(),
            width = level.width,
            height = level.height,
            lands = level.lands.len(),
            candycorns = level.candycorns.len(),
            orbs = level.orbs.len(),
            bats = level.bats.len(),
            has_goal = level.goal.is_some(),
            "[level] loaded"
        );
        Ok(level)
    }

    /// Decodes a level image.
    ///
    /// Unknown colors are logged and skipped. A missing or repeated player
    /// spawn is an error; a repeated goal keeps the first one.
    pub fn decode(image: &RgbaImage, config: &GameConfig) -> Result<Self, LevelError> {
        let (width, height) = image.dimensions();
        let mut lands: Vec<Land> = Vec::new();
        let mut candycorns = Vec::new();
        let mut orbs = Vec::new();
        let mut goal: Option<(Goal, (u32, u32))> = None;
        let mut player: Option<(Player, (u32, u32))> = None;

        for pixel_y in 0..height {
            #[allow(clippy::cast_precision_loss)]
            let base_height = (height - pixel_y) as f32;
            for pixel_x in 0..width {
                let pixel = *image.get_pixel(pixel_x, pixel_y);
                let Some(block) = BlockType::from_pixel(pixel) else {
                    let Rgba([r, g, b, a]) = pixel;
                    tracing::warn!(x = pixel_x, y = pixel_y, r, g, b, a, "[level] unknown object");
                    continue;
                };

                match block {
                    BlockType::Empty => {}
                    BlockType::LandNorm | BlockType::LandFloat => {
                        decode_land(image, pixel_x, pixel_y, block, base_height, &mut lands);
                    }
                    BlockType::CandyCorn => {
                        candycorns.push(Candycorn::new(PICKUP_PLACEMENT.at(pixel_x, base_height)));
                    }
                    BlockType::Orb => {
                        orbs.push(Orb::new(PICKUP_PLACEMENT.at(pixel_x, base_height)));
                    }
                    BlockType::Goal => {
                        if let Some((_, first)) = &goal {
                            tracing::warn!(
                                first_x = first.0,
                                first_y = first.1,
                                x = pixel_x,
                                y = pixel_y,
                                "[level] duplicate goal ignored"
                            );
                        } else {
                            let position = GOAL_PLACEMENT.at(pixel_x, base_height);
                            goal = Some((Goal::new(position), (pixel_x, pixel_y)));
                        }
                    }
                    BlockType::PlayerSpawn => {
                        if let Some((_, first)) = player {
                            return Err(LevelError::DuplicatePlayerSpawn {
                                first,
                                second: (pixel_x, pixel_y),
                            });
                        }
                        let position = PLAYER_PLACEMENT.at(pixel_x, base_height);
                        player = Some((Player::new(position, &config.player), (pixel_x, pixel_y)));
                    }
                }
            }
        }

        let Some((player, _)) = player else {
            return Err(LevelError::MissingPlayerSpawn);
        };

        #[allow(clippy::cast_precision_loss)]
        let length = width as f32;
        let bats = Bats::new(
            length,
            player.object.position.y,
            &config.bats,
            config.rng_seed,
        );

        Ok(Self {
            lands,
            candycorns,
            orbs,
            player,
            goal: goal.map(|(goal, _)| goal),
            bats,
            background: Background::default(),
            width,
            height,
        })
    }

    /// Creates physics bodies for every object that has one.
    pub fn init_physics(&mut self, physics: &mut PhysicsWorld) {
        for (i, land) in self.lands.iter_mut().enumerate() {
            land.init_physics(physics, ObjectId::Land(i));
        }
        for (i, candycorn) in self.candycorns.iter_mut().enumerate() {
            candycorn.init_physics(physics, ObjectId::Candycorn(i));
        }
        for (i, orb) in self.orbs.iter_mut().enumerate() {
            orb.init_physics(physics, ObjectId::Orb(i));
        }
        if let Some(goal) = &mut self.goal {
            goal.init_physics(physics, ObjectId::Goal);
        }
        self.player.init_physics(physics, ObjectId::Player);
        self.bats.init_physics(physics);
    }

    pub fn update(&mut self, dt: f32, physics: &mut PhysicsWorld) {
        self.background.update(dt, physics);
        for land in &mut self.lands {
            land.update(dt, physics);
        }
        for candycorn in &mut self.candycorns {
            candycorn.update(dt, physics);
        }
        for orb in &mut self.orbs {
            orb.update(dt, physics);
        }
        if let Some(goal) = &mut self.goal {
            goal.update(dt, physics);
        }
        self.player.update(dt, physics);
        self.bats.update_player_y(self.player.object.position.y);
        self.bats.update(dt, physics);
    }

    /// Draws the level back to front.
    pub fn render(&self, batch: &mut dyn SpriteBatch) {
        self.background.render(batch);
        for land in &self.lands {
            land.render(batch);
        }
        for candycorn in &self.candycorns {
            candycorn.render(batch);
        }
        for orb in &self.orbs {
            orb.render(batch);
        }
        if let Some(goal) = &self.goal {
            goal.render(batch);
        }
        self.bats.render(batch);
        self.player.render(batch);
    }

    /// Shared object state for `id`, if it exists in this level.
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        match id {
            ObjectId::Land(i) => self.lands.get(i).map(|land| &land.object),
            ObjectId::Player => Some(&self.player.object),
            ObjectId::Candycorn(i) => self.candycorns.get(i).map(|corn| &corn.object),
            ObjectId::Orb(i) => self.orbs.get(i).map(|orb| &orb.object),
            ObjectId::Goal => self.goal.as_ref().map(|goal| &goal.object),
            ObjectId::Bat(id) => self.bats.get(id).map(|bat| &bat.object),
        }
    }

    pub fn position_of(&self, id: ObjectId) -> Option<Vec2> {
        self.object(id).map(|object| object.position)
    }
}

/// Extends or starts a land segment at a land pixel.
///
/// The first pixel of a run only marks the left edge. Each later pixel of
/// the same color adds one tile, so a run of N pixels gives length N - 1.
/// Columns outside the row never match.
fn decode_land(
    image: &RgbaImage,
    pixel_x: u32,
    pixel_y: u32,
    block: BlockType,
    base_height: f32,
    lands: &mut Vec<Land>,
) {
    let Some(kind) = block.land_kind() else {
        return;
    };
    let pixel = block.pixel();
    let same_at = |back: u32| {
        pixel_x
            .checked_sub(back)
            .is_some_and(|x| *image.get_pixel(x, pixel_y) == pixel)
    };

    if !same_at(1) {
        return;
    }
    if same_at(2) {
        if let Some(last) = lands.last_mut() {
            last.increase_length(1);
        }
    } else {
        #[allow(clippy::cast_precision_loss)]
        let position = Vec2::new(pixel_x as f32, base_height);
        lands.push(Land::new(kind, position));
    }
}
