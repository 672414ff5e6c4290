//! # Render Device Collaborator
//!
//! Pools never talk to a graphics API directly. They issue state changes
//! and draw calls through [`RenderDevice`]; a real backend maps those to
//! its own texture/vertex binds, and [`RecordingDevice`] records them for
//! headless runs and tests.

use tessera_shared::{Argb, Mat3, Mat4};

/// Framebuffer blend equation for subsequent draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Normal,
    /// Additive blending (glows, sparks).
    Additive,
}

/// Draw-call sink consumed by entity pools.
///
/// Every sprite is a unit quad: the object transform places and sizes it,
/// the texture transform selects the sprite-sheet cell.
pub trait RenderDevice {
    /// Binds the texture of a sprite.
    fn bind_texture(&mut self, sprite: &str);
    /// Binds the vertex buffer of a mesh.
    fn bind_mesh(&mut self, mesh: &str);
    /// Sets the colour multiplied into subsequent draws.
    fn set_color_blend(&mut self, color: Argb);
    /// Sets the blend mode.
    fn set_blend_mode(&mut self, mode: BlendMode);
    /// Enables or disables depth writes.
    fn set_depth_write(&mut self, enabled: bool);
    /// Sets the texture-space transform.
    fn set_texture_transform(&mut self, transform: Mat3);
    /// Sets the object-to-world transform.
    fn set_object_transform(&mut self, transform: Mat4);
    /// Draws the bound mesh as a textured quad.
    fn draw_quad(&mut self);
    /// Switches to untextured debug-box drawing.
    fn begin_debug_boxes(&mut self);
    /// Draws a line strip of `segments` segments (a box outline is 4).
    fn draw_line_strip(&mut self, segments: u32);
}

/// One recorded device call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// `bind_texture`.
    BindTexture(String),
    /// `bind_mesh`.
    BindMesh(String),
    /// `set_color_blend`.
    ColorBlend(Argb),
    /// `set_blend_mode`.
    Blend(BlendMode),
    /// `set_depth_write`.
    DepthWrite(bool),
    /// `set_texture_transform`.
    TextureTransform(Mat3),
    /// `set_object_transform`.
    ObjectTransform(Mat4),
    /// `draw_quad`.
    Quad,
    /// `begin_debug_boxes`.
    DebugBoxes,
    /// `draw_line_strip`.
    LineStrip(u32),
}

/// Headless device that records every call in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DrawCommand>,
}

impl RecordingDevice {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of quads drawn.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Quad))
    }

    /// Number of texture binds.
    #[must_use]
    pub fn texture_binds(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::BindTexture(_)))
    }

    /// Number of mesh binds.
    #[must_use]
    pub fn mesh_binds(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::BindMesh(_)))
    }

    /// Number of commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl RenderDevice for RecordingDevice {
    fn bind_texture(&mut self, sprite: &str) {
        self.commands.push(DrawCommand::BindTexture(sprite.to_owned()));
    }

    fn bind_mesh(&mut self, mesh: &str) {
        self.commands.push(DrawCommand::BindMesh(mesh.to_owned()));
    }

    fn set_color_blend(&mut self, color: Argb) {
        self.commands.push(DrawCommand::ColorBlend(color));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.commands.push(DrawCommand::Blend(mode));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.commands.push(DrawCommand::DepthWrite(enabled));
    }

    fn set_texture_transform(&mut self, transform: Mat3) {
        self.commands.push(DrawCommand::TextureTransform(transform));
    }

    fn set_object_transform(&mut self, transform: Mat4) {
        self.commands.push(DrawCommand::ObjectTransform(transform));
    }

    fn draw_quad(&mut self) {
        self.commands.push(DrawCommand::Quad);
    }

    fn begin_debug_boxes(&mut self) {
        self.commands.push(DrawCommand::DebugBoxes);
    }

    fn draw_line_strip(&mut self, segments: u32) {
        self.commands.push(DrawCommand::LineStrip(segments));
    }
}
