use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use winit::event::WindowEvent;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use mosaic_engine::camera::Camera;
use mosaic_engine::core::{App, AppControl, FrameCtx};
use mosaic_engine::debug::{DebugDraw, DebugDrawConfig, DebugStyle, GridConfig, GridLines};
use mosaic_engine::paint::Color;
use mosaic_engine::render::{FrameBuffer, Renderer, RendererConfig};
use mosaic_engine::sprite::{Sprite, SpriteRenderer, SpriteSheet, Transform};

use crate::assets;
use crate::controls::{cursor_to_ndc, PanKeys};

/// World units per second while a pan key is held.
const PAN_SPEED: f32 = 320.0;

const TILE: f32 = 32.0;

const BACKGROUND: Color = Color::rgb(0.11, 0.12, 0.16);

/// Sheet indices (see `assets::PALETTE`).
const GRASS: usize = 0;
const DIRT: usize = 1;
const STONE: usize = 2;
const BRICK: usize = 3;
const WATER: usize = 4;
const COIN: usize = 5;
const PLAYER: usize = 6;
const ENEMY: usize = 7;

type SpriteRef = Rc<RefCell<SpriteRenderer>>;

/// GPU-backed part of the editor, built on the first frame.
struct Stage {
    framebuffer: FrameBuffer,
    sheet: SpriteSheet,
    coins: Vec<(SpriteRef, Vec2)>,
    water: Vec<SpriteRef>,
    enemy: SpriteRef,
}

/// Level-editor scene: a tile map rendered offscreen, then composited onto
/// the window with the debug grid on top.
pub struct LevelEditor {
    camera: Camera,
    screen_camera: Camera,

    world: Renderer,
    composite: Renderer,
    debug: DebugDraw,
    grid: GridLines,

    stage: Option<Stage>,

    keys: PanKeys,
    cursor: Option<(f64, f64)>,
}

impl LevelEditor {
    pub fn new() -> Self {
        Self {
            camera: Camera::new(Vec2::new(-TILE * 2.0, -TILE * 2.0)),
            screen_camera: Camera::new(Vec2::ZERO),
            world: Renderer::new(RendererConfig::default()),
            composite: Renderer::new(RendererConfig { max_batch_size: 1 }),
            debug: DebugDraw::new(DebugDrawConfig::default()),
            grid: GridLines::new(GridConfig::default()),
            stage: None,
            keys: PanKeys::default(),
            cursor: None,
        }
    }

    fn ensure_stage(&mut self, ctx: &FrameCtx<'_, '_>) -> Result<()> {
        if self.stage.is_some() {
            return Ok(());
        }

        let device = ctx.gpu.device();
        let size = ctx.gpu.size();
        let framebuffer = FrameBuffer::new(
            device,
            size.width.max(1),
            size.height.max(1),
            ctx.gpu.surface_format(),
        )
        .context("creating scene framebuffer")?;

        let sheet = assets::load_sheet(device, ctx.gpu.queue()).context("loading tile sheet")?;

        let screen = self.screen_camera.projection_size();
        let composite = SpriteRenderer::new(
            Transform::new(Vec2::ZERO, screen),
            Sprite::new(framebuffer.color_texture().clone()),
        );
        self.composite.add(Rc::new(RefCell::new(composite)));

        let stage = self.populate(framebuffer, sheet);
        log::info!(
            "level loaded: {} sprites in {} batches",
            self.world.sprite_count(),
            self.world.batch_count()
        );
        self.stage = Some(stage);
        Ok(())
    }

    fn tile(&mut self, sheet: &SpriteSheet, index: usize, cell: (i32, i32), z: i32) -> SpriteRef {
        let sprite = sheet.sprite(index).cloned().unwrap_or_default();
        let position = Vec2::new(cell.0 as f32, cell.1 as f32) * TILE;
        let r = Rc::new(RefCell::new(
            SpriteRenderer::new(Transform::new(position, Vec2::splat(TILE)), sprite).with_z_index(z),
        ));
        self.world.add(r.clone());
        r
    }

    fn populate(&mut self, framebuffer: FrameBuffer, sheet: SpriteSheet) -> Stage {
        // Backdrop: untextured blocks behind everything.
        for i in 0..12 {
            let shade = 0.18 + 0.02 * (i % 3) as f32;
            let block = SpriteRenderer::solid(
                Transform::new(Vec2::new(i as f32 * 160.0 - 320.0, 96.0), Vec2::new(150.0, 480.0)),
                Color::rgb(shade, shade, shade + 0.06),
            )
            .with_z_index(-1);
            self.world.add(Rc::new(RefCell::new(block)));
        }

        // Ground.
        for x in -6..40 {
            self.tile(&sheet, GRASS, (x, 2), 0);
            self.tile(&sheet, DIRT, (x, 1), 0);
            self.tile(&sheet, STONE, (x, 0), 0);
        }

        // Platforms.
        for (x0, y, len) in [(4, 6, 5), (12, 9, 4), (20, 6, 6), (29, 10, 3)] {
            for x in x0..x0 + len {
                self.tile(&sheet, BRICK, (x, y), 0);
            }
        }

        let water = (14..19)
            .map(|x| self.tile(&sheet, WATER, (x, 2), 1))
            .collect();

        let coins = [(6, 8), (7, 8), (13, 11), (22, 8), (24, 8), (30, 12)]
            .into_iter()
            .map(|cell| {
                let r = self.tile(&sheet, COIN, cell, 2);
                let base = r.borrow().transform().position;
                (r, base)
            })
            .collect();

        self.tile(&sheet, PLAYER, (2, 3), 3);
        let enemy = self.tile(&sheet, ENEMY, (22, 3), 3);

        Stage {
            framebuffer,
            sheet,
            coins,
            water,
            enemy,
        }
    }

    fn update(&mut self, dt: f32, elapsed: f32) {
        self.camera.position += self.keys.direction() * PAN_SPEED * dt;

        let Some(stage) = self.stage.as_ref() else { return };

        for (i, (coin, base)) in stage.coins.iter().enumerate() {
            let bob = (elapsed * 3.0 + i as f32).sin() * 4.0;
            coin.borrow_mut().set_position(*base + Vec2::new(0.0, bob));
        }

        let enemy_x = 22.0 * TILE + (elapsed * 0.8).sin() * 3.0 * TILE;
        stage
            .enemy
            .borrow_mut()
            .set_position(Vec2::new(enemy_x, 3.0 * TILE));

        // Water shimmers between white and a cool tint.
        let frame = (elapsed * 4.0) as usize;
        for (i, w) in stage.water.iter().enumerate() {
            let tint = if (frame + i) % 2 == 0 {
                Color::WHITE
            } else {
                Color::rgb(0.8, 0.85, 1.0)
            };
            w.borrow_mut().set_color(tint);
        }

        // The enemy flips to the player cell while it walks back.
        let walking_back = (elapsed * 0.8).cos() < 0.0;
        let cell = if walking_back { PLAYER } else { ENEMY };
        if let Some(sprite) = stage.sheet.sprite(cell) {
            let mut enemy = stage.enemy.borrow_mut();
            if enemy.sprite() != sprite {
                enemy.set_sprite(sprite.clone());
            }
        }
    }

    fn queue_overlay(&mut self, window_size: (u32, u32)) {
        self.debug.begin_frame();
        self.grid.update(&self.camera, &mut self.debug);

        // Hovered cell.
        if let Some(ndc) = self.cursor.and_then(|c| cursor_to_ndc(c, window_size)) {
            self.camera.view();
            let world = self.camera.screen_to_world(ndc);
            let cell = (world / TILE).floor() * TILE + Vec2::splat(TILE / 2.0);
            self.debug.add_box(
                cell,
                Vec2::splat(TILE),
                0.0,
                DebugStyle::colored(Vec3::new(1.0, 0.9, 0.2)),
            );
        }

        // Spawn marker and a rotating gizmo.
        let red = DebugStyle::colored(Vec3::new(1.0, 0.2, 0.2));
        self.debug.add_circle(Vec2::new(2.5, 3.5) * TILE, TILE * 0.75, red);
        if let Some(stage) = self.stage.as_ref() {
            let enemy = stage.enemy.borrow().transform();
            let center = enemy.position + enemy.scale / 2.0;
            let angle = enemy.position.x;
            self.debug
                .add_polygon(center, TILE, 6, angle, DebugStyle::default());
        }
    }
}

impl Default for LevelEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl App for LevelEditor {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    return AppControl::Exit;
                }
                self.keys.handle(event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::Focused(false) => self.keys.release_all(),
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Err(e) = self.ensure_stage(ctx) {
            log::error!("editor startup failed: {e:#}");
            return AppControl::Exit;
        }

        self.update(ctx.time.dt, ctx.time.elapsed);
        self.queue_overlay(ctx.window.physical_size());

        let Some(stage) = self.stage.as_ref() else {
            return AppControl::Continue;
        };
        let (world, composite, debug) = (&mut self.world, &mut self.composite, &mut self.debug);
        let (camera, screen_camera) = (&mut self.camera, &mut self.screen_camera);

        ctx.render(Color::BLACK, |rctx, surface| {
            stage.framebuffer.clear(surface.encoder, BACKGROUND);
            {
                let mut target = stage.framebuffer.bind(surface.encoder);
                world.render(rctx, &mut target, camera)?;
                debug.draw(rctx, &mut target, camera)?;
            }
            let mut target = surface.target();
            composite.render(rctx, &mut target, screen_camera)
        })
    }
}
