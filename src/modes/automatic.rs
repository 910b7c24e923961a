//! Automatic mode: the director drives the camera

use std::task::Poll;
use tracing::debug;

use super::{AppMode, KeyInput, ModeBehavior, ModeContext};

#[derive(Debug, Default)]
pub struct AutomaticMode;

impl AutomaticMode {
    pub fn new() -> Self {
        Self
    }
}

impl ModeBehavior for AutomaticMode {
    fn mode(&self) -> AppMode {
        AppMode::Automatic
    }

    fn activate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()> {
        ctx.camera.set_manual_input(false);
        ctx.director.start(ctx.now);
        Poll::Ready(())
    }

    fn deactivate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()> {
        ctx.director.stop();
        ctx.camera.set_auto_rotate(false, None);
        Poll::Ready(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut ModeContext<'_>) {
        ctx.director.tick(ctx.now, ctx.camera, ctx.registry);
    }

    fn on_key(&mut self, key: &KeyInput, ctx: &mut ModeContext<'_>) {
        if key.is_space() || key.is("n") {
            debug!(target: "modes", "skipping to next shot");
            ctx.director.force_advance();
        }
    }
}
