//! Renderer interface.
//!
//! The core describes what to draw as [`Sprite`]s and text; a host backend
//! implements [`SpriteBatch`] to put them on screen.

use bevy::math::Vec2;

use crate::config::{VIEWPORT_GUI_HEIGHT, VIEWPORT_GUI_WIDTH, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::controller::WorldController;
use crate::objects::Candycorn;

/// One textured quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Atlas region key.
    pub region: &'static str,
    /// Frame index within the region's animation.
    pub frame: usize,
    pub position: Vec2,
    pub origin: Vec2,
    pub dimension: Vec2,
    pub scale: Vec2,
    /// Degrees.
    pub rotation: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Draw target implemented by the rendering backend.
pub trait SpriteBatch {
    /// Starts a pass projected through `camera`.
    fn begin(&mut self, camera: &OrthographicCamera);

    fn draw(&mut self, sprite: Sprite);

    fn draw_text(&mut self, text: &str, position: Vec2, align: TextAlign);

    fn end(&mut self);
}

/// Orthographic projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Y grows downward (GUI space).
    pub y_down: bool,
}

impl OrthographicCamera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport_width,
            viewport_height,
            y_down: false,
        }
    }

    /// Screen-space camera with the origin at the top-left corner.
    pub fn gui(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            position: Vec2::new(viewport_width / 2.0, viewport_height / 2.0),
            y_down: true,
            ..Self::new(viewport_width, viewport_height)
        }
    }
}

/// A recorded batch call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Begin(OrthographicCamera),
    Sprite(Sprite),
    Text {
        text: String,
        position: Vec2,
        align: TextAlign,
    },
    End,
}

/// Batch that records every call, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingBatch {
    pub commands: Vec<DrawCommand>,
}

impl RecordingBatch {
    pub fn sprites(&self) -> Vec<&Sprite> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Sprite(sprite) => Some(sprite),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl SpriteBatch for RecordingBatch {
    fn begin(&mut self, camera: &OrthographicCamera) {
        self.commands.push(DrawCommand::Begin(*camera));
    }

    fn draw(&mut self, sprite: Sprite) {
        self.commands.push(DrawCommand::Sprite(sprite));
    }

    fn draw_text(&mut self, text: &str, position: Vec2, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            align,
        });
    }

    fn end(&mut self) {
        self.commands.push(DrawCommand::End);
    }
}

const GUI_LIFE_REGION: &str = "pumpkin";
const GUI_ICON_SIZE: f32 = 50.0;

/// Draws a [`WorldController`] through a [`SpriteBatch`].
#[derive(Debug, Clone)]
pub struct WorldRenderer {
    camera: OrthographicCamera,
    camera_gui: OrthographicCamera,
}

impl Default for WorldRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldRenderer {
    pub fn new() -> Self {
        Self {
            camera: OrthographicCamera::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            camera_gui: OrthographicCamera::gui(VIEWPORT_GUI_WIDTH, VIEWPORT_GUI_HEIGHT),
        }
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn camera_gui(&self) -> &OrthographicCamera {
        &self.camera_gui
    }

    /// Keeps the world viewport height and widens it to the window aspect.
    #[allow(clippy::cast_precision_loss)]
    pub fn resize(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.camera.viewport_width = VIEWPORT_HEIGHT / height as f32 * width as f32;
    }

    pub fn render(&mut self, controller: &WorldController, batch: &mut dyn SpriteBatch) {
        self.render_world(controller, batch);
        self.render_gui(controller, batch);
    }

    fn render_world(&mut self, controller: &WorldController, batch: &mut dyn SpriteBatch) {
        controller.camera().apply_to(&mut self.camera);
        batch.begin(&self.camera);
        controller.level().render(batch);
        batch.end();
    }

    fn render_gui(&self, controller: &WorldController, batch: &mut dyn SpriteBatch) {
        batch.begin(&self.camera_gui);
        self.render_gui_lives(controller, batch);
        Self::render_gui_score(controller, batch);
        self.render_gui_game_over(controller, batch);
        batch.end();
    }

    fn render_gui_score(controller: &WorldController, batch: &mut dyn SpriteBatch) {
        let corner = Vec2::new(-15.0, -15.0);
        batch.draw(gui_icon(Candycorn::REGION, corner));
        batch.draw_text(
            &controller.score().to_string(),
            corner + Vec2::new(75.0, 37.0),
            TextAlign::Left,
        );
    }

    #[allow(clippy::cast_precision_loss)]
    fn render_gui_lives(&self, controller: &WorldController, batch: &mut dyn SpriteBatch) {
        let max_lives = controller.config().max_lives.max(0) as f32;
        let x = self.camera_gui.viewport_width - GUI_ICON_SIZE - max_lives * GUI_ICON_SIZE;
        for i in 0..controller.lives().max(0) {
            let offset = i as f32 * GUI_ICON_SIZE;
            batch.draw(gui_icon(GUI_LIFE_REGION, Vec2::new(x + offset, -15.0)));
        }
    }

    fn render_gui_game_over(&self, controller: &WorldController, batch: &mut dyn SpriteBatch) {
        if !controller.is_game_over() {
            return;
        }
        let center = Vec2::new(
            self.camera_gui.viewport_width / 2.0,
            self.camera_gui.viewport_height / 2.0,
        );
        batch.draw_text("GAME OVER", center, TextAlign::Center);
    }
}

/// GUI icon drawn at a third of its pixel size, mirrored for the y-down camera.
fn gui_icon(region: &'static str, position: Vec2) -> Sprite {
    Sprite {
        region,
        frame: 0,
        position,
        origin: Vec2::splat(GUI_ICON_SIZE),
        dimension: Vec2::splat(GUI_ICON_SIZE * 2.0),
        scale: Vec2::new(0.35, -0.35),
        rotation: 0.0,
        flip_x: false,
        flip_y: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::config::GameConfig;
    use crate::level::InMemoryLevel;

    fn controller() -> WorldController {
        let source = InMemoryLevel::from_ascii(
            "render",
            &["@.c.o.G.....", "############"],
        );
        WorldController::new(GameConfig::default(), Box::new(source), Box::new(NullAudio))
            .expect("level should load")
    }

    #[test]
    fn test_world_draw_order() {
        let controller = controller();
        let mut renderer = WorldRenderer::new();
        let mut batch = RecordingBatch::default();

        renderer.render(&controller, &mut batch);

        let regions: Vec<&str> = batch.sprites().iter().map(|s| s.region).collect();
        assert_eq!(regions[0], "background");
        let first_land = regions.iter().position(|r| r.starts_with("land_")).unwrap();
        let corn = regions.iter().position(|r| *r == "candycorn").unwrap();
        let orb = regions.iter().position(|r| *r == "powerup").unwrap();
        let goal = regions.iter().position(|r| *r == "goal").unwrap();
        let bat = regions.iter().position(|r| *r == "bat").unwrap();
        let player = regions.iter().position(|r| r.starts_with("jack_")).unwrap();
        assert!(first_land < corn && corn < orb && orb < goal && goal < bat && bat < player);
    }

    #[test]
    fn test_gui_shows_score_and_lives() {
        let controller = controller();
        let mut renderer = WorldRenderer::new();
        let mut batch = RecordingBatch::default();

        renderer.render(&controller, &mut batch);

        assert_eq!(batch.texts(), vec!["0"]);
        let lives = batch.sprites().iter().filter(|s| s.region == "pumpkin").count();
        assert_eq!(lives, 3);
        let passes = batch
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Begin(_)))
            .count();
        assert_eq!(passes, 2);
    }

    #[test]
    fn test_resize_keeps_height() {
        let mut renderer = WorldRenderer::new();
        renderer.resize(1600, 800);
        assert_eq!(renderer.camera().viewport_width, 10.0);
        assert_eq!(renderer.camera().viewport_height, 5.0);

        renderer.resize(1600, 0);
        assert_eq!(renderer.camera().viewport_width, 10.0);
    }
}
