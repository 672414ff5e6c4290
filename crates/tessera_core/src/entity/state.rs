//! # Entity State
//!
//! Everything one pool slot knows about its entity: transform, physics,
//! collision box, animation, render flags, lifetime and references to other
//! entities.
//!
//! ## Per-frame update
//!
//! ```text
//! forces ─► velocity ─► position (or follow anchor) ─► confinement
//!        ─► bounds centre ─► tile probe ─► lifetime ─► animation clock
//! ```
//!
//! Setters never recompute matrices. The render and collision matrices are
//! produced on demand through their [`TransformCache`]s.

use tessera_shared::constants::DEPTH_DIVISOR;
use tessera_shared::math::ortho_translation;
use tessera_shared::{Argb, Camera, Mat4, Vec3};
use tessera_tilemap::{CollisionFlags, TileGrid};

use super::animation::AnimationState;
use super::bounds::BoundingVolume;
use super::handle::{EntityHandle, EntityId};
use super::physics::ForceAccumulator;
use super::transform::{Orientation, TransformCache};
use crate::assets::AssetProvider;
use crate::error::{CoreError, CoreResult};
use crate::frame::FrameContext;
use crate::render::{BlendMode, RenderDevice};

/// Outcome of an update step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Keep the entity.
    Alive,
    /// Release the entity in this pass.
    Expired,
}

/// Position derived from another entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowTarget {
    /// Entity being followed. Never kept alive by the follower.
    pub target: EntityHandle,
    /// Offset added to the target position.
    pub offset: Vec3,
}

/// AI slot driven by archetype behaviours.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Brain {
    /// Archetype-defined state number.
    pub state: u8,
    /// Entity the AI is interested in.
    pub target: Option<EntityHandle>,
    /// Seconds spent in the current state.
    pub timer: f32,
}

impl Brain {
    /// Switches state and restarts the timer.
    pub fn transition(&mut self, state: u8) {
        self.state = state;
        self.timer = 0.0;
    }
}

/// How an entity reacts to tile contacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileResponse {
    /// Record contact flags only.
    #[default]
    Probe,
    /// Also push the entity back to the centre of its cell and stop motion
    /// into the blocked side.
    Snap,
}

#[derive(Clone, Copy, Debug, Default)]
struct TileContacts {
    enabled: bool,
    response: TileResponse,
    flags: CollisionFlags,
    on_ground: bool,
    was_on_ground: bool,
}

/// World region an entity may not leave.
#[derive(Clone, Copy, Debug, Default)]
struct Confinement {
    min: Vec3,
    max: Vec3,
    /// Clamp to `min..=max`.
    region: bool,
    /// Clamp horizontally to the camera view.
    zone: bool,
}

/// Seconds lived against a fixed duration.
///
/// Elapsed time is summed rather than counted down, and the boundary test
/// allows one rounding error of `duration` per step taken.
#[derive(Clone, Copy, Debug)]
struct Lifetime {
    duration: f32,
    elapsed: f32,
    steps: u32,
}

impl Lifetime {
    fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            steps: 0,
        }
    }

    #[inline]
    fn is_mortal(&self) -> bool {
        self.duration > 0.0
    }

    fn restart(&mut self) {
        self.elapsed = 0.0;
        self.steps = 0;
    }

    /// Adds `dt` and reports whether the duration has been used up.
    fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.steps = self.steps.saturating_add(1);
        let tolerance = self.duration * f32::EPSILON * self.steps as f32;
        self.elapsed + tolerance >= self.duration
    }

    fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new(-1.0)
    }
}

/// State of one entity slot.
#[derive(Clone, Debug)]
pub struct EntityState {
    index: u32,
    generation: u32,
    alive: bool,

    position: Vec3,
    orientation: Orientation,
    scale: Vec3,
    layer: i32,
    parallax: f32,
    velocity: Vec3,
    forces: ForceAccumulator,
    bounds: BoundingVolume,

    animation: AnimationState,
    mesh: String,
    sprite: String,

    color: Option<Argb>,
    additive: bool,
    depth_write: bool,
    visible: bool,
    debug_draw: bool,

    lifetime: Lifetime,
    follow: Option<FollowTarget>,
    brain: Brain,
    contacts: TileContacts,
    confinement: Confinement,

    render_cache: TransformCache,
    collision_cache: TransformCache,
}

impl EntityState {
    /// Creates a dead slot.
    #[must_use]
    pub fn new(index: u32) -> Self {
        let mut state = Self {
            index,
            generation: 0,
            alive: false,
            position: Vec3::ZERO,
            orientation: Orientation::default(),
            scale: Vec3::ONE,
            layer: 0,
            parallax: 0.0,
            velocity: Vec3::ZERO,
            forces: ForceAccumulator::default(),
            bounds: BoundingVolume::default(),
            animation: AnimationState::default(),
            mesh: String::new(),
            sprite: String::new(),
            color: None,
            additive: false,
            depth_write: true,
            visible: true,
            debug_draw: false,
            lifetime: Lifetime::default(),
            follow: None,
            brain: Brain::default(),
            contacts: TileContacts::default(),
            confinement: Confinement::default(),
            render_cache: TransformCache::new(),
            collision_cache: TransformCache::new(),
        };
        state.bounds.rescale(state.scale, state.position);
        state
    }

    // =========================================================================
    // LIFECYCLE (driven by the pool)
    // =========================================================================

    /// Resets the slot for a new entity and marks it alive.
    pub(crate) fn spawn(&mut self, mesh: &str, sprite: &str) {
        self.position = Vec3::ZERO;
        self.orientation = Orientation::default();
        self.scale = Vec3::ONE;
        self.layer = 0;
        self.parallax = 0.0;
        self.velocity = Vec3::ZERO;
        self.forces.clear();
        self.bounds = BoundingVolume::default();
        self.bounds.rescale(self.scale, self.position);

        self.animation.reset();
        self.animation.clear();
        self.mesh.clear();
        self.mesh.push_str(mesh);
        self.sprite.clear();
        self.sprite.push_str(sprite);

        self.color = None;
        self.additive = false;
        self.depth_write = true;
        self.visible = true;
        self.debug_draw = false;

        self.lifetime = Lifetime::default();
        self.follow = None;
        self.brain = Brain::default();
        self.contacts = TileContacts::default();
        self.confinement = Confinement::default();

        self.alive = true;
    }

    /// Marks the slot dead, drops transient state and retires the handle.
    pub(crate) fn despawn(&mut self) {
        self.alive = false;
        self.animation.clear();
        self.forces.clear();
        self.follow = None;
        self.brain = Brain::default();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Identifier of the entity currently in this slot.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        EntityId::new(self.index, self.generation)
    }

    /// Slot index.
    #[inline]
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// True between acquisition and release.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    // =========================================================================
    // TRANSFORM
    // =========================================================================

    /// World position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the entity. The collision box follows immediately.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.bounds.update_center(position);
    }

    /// Sprite size in world units.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Resizes the sprite. The collision box is re-derived from its
    /// percentages.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.bounds.rescale(scale, self.position);
    }

    /// Sets `scale.x` to a fraction of the view width and `scale.y` so that
    /// one sheet cell keeps its pixel aspect ratio.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownSprite`] when the sprite has no texture or layout.
    pub fn set_one_to_one_scale(
        &mut self,
        screen_width_fraction: f32,
        camera: &Camera,
        assets: &dyn AssetProvider,
    ) -> CoreResult<()> {
        let unknown = || CoreError::UnknownSprite(self.sprite.clone());
        let (width, height) = assets.texture_size(&self.sprite).ok_or_else(unknown)?;
        let layout = assets.sheet_layout(&self.sprite).ok_or_else(unknown)?;

        let cell_width = width as f32 / layout.columns.max(1) as f32;
        let cell_height = height as f32 / layout.rows.max(1) as f32;

        let mut scale = self.scale;
        scale.x = camera.fov_x * screen_width_fraction;
        scale.y = scale.x * cell_height / cell_width;
        self.set_scale(scale);
        Ok(())
    }

    /// Euler angles in degrees.
    #[inline]
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Sets all three angles.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Rotation about X, degrees.
    pub fn set_pitch(&mut self, pitch: f32) {
        self.orientation.pitch = pitch;
    }

    /// Rotation about Y, degrees.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.orientation.yaw = yaw;
    }

    /// Rotation about Z, degrees.
    pub fn set_roll(&mut self, roll: f32) {
        self.orientation.roll = roll;
    }

    /// Manual depth layer. Higher layers draw behind lower ones.
    #[inline]
    #[must_use]
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Sets the depth layer.
    pub fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    /// Fraction of the camera motion added to the on-screen position.
    #[inline]
    #[must_use]
    pub fn parallax(&self) -> f32 {
        self.parallax
    }

    /// Sets the parallax factor.
    pub fn set_parallax(&mut self, parallax: f32) {
        self.parallax = parallax;
    }

    /// Position in orthographic render space, ignoring the camera.
    #[must_use]
    pub fn ortho_position(&self) -> Vec3 {
        ortho_translation(self.position, 0.0, self.layer)
    }

    fn flip(&self, mut scale: Vec3) -> Vec3 {
        if self.animation.flip_horizontal() {
            scale.x = -scale.x;
        }
        if self.animation.flip_vertical() {
            scale.y = -scale.y;
        }
        scale
    }

    /// Object-to-world matrix of the sprite quad.
    pub fn render_transform(&mut self, camera: &Camera) -> Mat4 {
        let scale = self.flip(self.scale);
        let translation =
            ortho_translation(self.position, camera.parallax_offset(self.parallax), self.layer);
        self.render_cache
            .recompute_if_stale(self.orientation, scale, translation)
    }

    /// Object-to-world matrix of the collision box outline.
    pub fn collision_transform(&mut self, camera: &Camera) -> Mat4 {
        let half = self.bounds.half_extent();
        let scale = self.flip(Vec3::new(half.x * 2.0, half.y * 2.0, 0.0));
        let center = self.bounds.center();
        let translation = Vec3::new(
            center.x + camera.parallax_offset(self.parallax),
            center.y + center.z / 2.0,
            self.position.z / DEPTH_DIVISOR - self.layer as f32,
        );
        self.collision_cache
            .recompute_if_stale(self.orientation, scale, translation)
    }

    /// Memo behind [`EntityState::render_transform`].
    #[must_use]
    pub fn render_cache(&self) -> &TransformCache {
        &self.render_cache
    }

    /// Memo behind [`EntityState::collision_transform`].
    #[must_use]
    pub fn collision_cache(&self) -> &TransformCache {
        &self.collision_cache
    }

    // =========================================================================
    // COLLISION BOX
    // =========================================================================

    /// Collision box.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    /// Defines the collision box as fractions (`-1..1`) of the sprite
    /// half-size on each axis.
    pub fn set_bounds_percentage(
        &mut self,
        x_min: f32,
        x_max: f32,
        y_min: f32,
        y_max: f32,
        z_min: f32,
        z_max: f32,
    ) {
        self.bounds.set_percentages(
            Vec3::new(x_min, y_min, z_min),
            Vec3::new(x_max, y_max, z_max),
            self.scale,
            self.position,
        );
    }

    /// True when the collision boxes of two entities overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.bounds.overlaps(&other.bounds)
    }

    // =========================================================================
    // PHYSICS
    // =========================================================================

    /// Velocity in world units per second.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Replaces the velocity.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Adds to the velocity immediately.
    pub fn add_velocity(&mut self, delta: Vec3) {
        self.velocity += delta;
    }

    /// Queues a force for the next physics step.
    pub fn add_force(&mut self, force: Vec3) {
        self.forces.push(force);
    }

    /// Forces waiting for the next physics step.
    #[must_use]
    pub fn pending_forces(&self) -> &[Vec3] {
        self.forces.pending()
    }

    // =========================================================================
    // LIFETIME
    // =========================================================================

    /// Gives the entity `seconds` to live. Zero or less means immortal.
    pub fn set_lifetime(&mut self, seconds: f32) {
        self.lifetime = Lifetime::new(seconds);
    }

    /// Restarts the lifetime from its full duration.
    pub fn reset_lifetime(&mut self) {
        self.lifetime.restart();
    }

    /// Seconds left, or `None` for an immortal entity.
    #[must_use]
    pub fn lifetime_remaining(&self) -> Option<f32> {
        self.lifetime
            .is_mortal()
            .then(|| self.lifetime.remaining())
    }

    /// Elapsed share of the lifetime in `[0, 1]`; 0 for an immortal entity.
    #[must_use]
    pub fn lifetime_fraction(&self) -> f32 {
        if !self.lifetime.is_mortal() {
            return 0.0;
        }
        (self.lifetime.elapsed / self.lifetime.duration).clamp(0.0, 1.0)
    }

    // =========================================================================
    // REFERENCES
    // =========================================================================

    /// Makes the position track another entity plus an offset.
    pub fn set_follow(&mut self, target: EntityHandle, offset: Vec3) {
        self.follow = Some(FollowTarget { target, offset });
    }

    /// Stops following; the entity integrates its velocity again.
    pub fn clear_follow(&mut self) {
        self.follow = None;
    }

    /// Current follow target.
    #[must_use]
    pub fn follow(&self) -> Option<FollowTarget> {
        self.follow
    }

    /// AI slot.
    #[must_use]
    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    /// Mutable AI slot.
    pub fn brain_mut(&mut self) -> &mut Brain {
        &mut self.brain
    }

    /// Points the AI at another entity.
    pub fn set_target(&mut self, target: Option<EntityHandle>) {
        self.brain.target = target;
    }

    // =========================================================================
    // TILE CONTACTS
    // =========================================================================

    /// Enables grid probing during update.
    pub fn set_tile_collision(&mut self, enabled: bool, response: TileResponse) {
        self.contacts.enabled = enabled;
        self.contacts.response = response;
    }

    /// True when grid probing is enabled.
    #[must_use]
    pub fn is_tile_collision_enabled(&self) -> bool {
        self.contacts.enabled
    }

    /// Sides touching a collidable cell after the last update.
    #[must_use]
    pub fn tile_flags(&self) -> CollisionFlags {
        self.contacts.flags
    }

    /// Standing on a collidable cell.
    #[must_use]
    pub fn is_on_ground(&self) -> bool {
        self.contacts.on_ground
    }

    /// Not standing on anything.
    #[must_use]
    pub fn is_in_air(&self) -> bool {
        !self.contacts.on_ground
    }

    /// Touched ground this frame after being airborne the previous one.
    #[must_use]
    pub fn has_landed(&self) -> bool {
        self.contacts.on_ground && !self.contacts.was_on_ground
    }

    /// Probes the grid at the collision box and applies the tile response.
    pub fn update_tile_contacts(&mut self, grid: &TileGrid) {
        let center = self.bounds.center();
        let extent = self.bounds.half_extent() * 2.0;
        let flags = grid.probe(center.x, center.y, extent.x.abs(), extent.y.abs());

        self.contacts.was_on_ground = self.contacts.on_ground;
        self.contacts.on_ground = flags.contains(CollisionFlags::BOTTOM);
        self.contacts.flags = flags;

        if self.contacts.response == TileResponse::Snap && !flags.is_empty() {
            self.snap_out_of(flags);
        }
    }

    fn snap_out_of(&mut self, flags: CollisionFlags) {
        let center = self.bounds.center();
        let offset = self.bounds.center_offset();
        let mut position = self.position;

        let blocked_x = (flags.contains(CollisionFlags::LEFT) && self.velocity.x < 0.0)
            || (flags.contains(CollisionFlags::RIGHT) && self.velocity.x > 0.0);
        if blocked_x {
            position.x = TileGrid::snap_to_cell_center(center.x) - offset.x;
            self.velocity.x = 0.0;
        }

        let blocked_y = (flags.contains(CollisionFlags::BOTTOM) && self.velocity.y < 0.0)
            || (flags.contains(CollisionFlags::TOP) && self.velocity.y > 0.0);
        if blocked_y {
            position.y = TileGrid::snap_to_cell_center(center.y) - offset.y;
            self.velocity.y = 0.0;
        }

        self.set_position(position);
    }

    // =========================================================================
    // CONFINEMENT
    // =========================================================================

    /// Sets the world region the entity is kept inside while the region is
    /// active. Corners may be given in any order.
    pub fn set_bounding_region(&mut self, min: Vec3, max: Vec3) {
        self.confinement.min = min.min(max);
        self.confinement.max = min.max(max);
    }

    /// Turns clamping to the bounding region on or off.
    pub fn set_bounding_active(&mut self, active: bool) {
        self.confinement.region = active;
    }

    /// Turns clamping to the camera's horizontal view on or off.
    pub fn set_zone_bounding_active(&mut self, active: bool) {
        self.confinement.zone = active;
    }

    /// Lower corner of the bounding region.
    #[must_use]
    pub fn bounding_min(&self) -> Vec3 {
        self.confinement.min
    }

    /// Upper corner of the bounding region.
    #[must_use]
    pub fn bounding_max(&self) -> Vec3 {
        self.confinement.max
    }

    /// True when the position is clamped to the bounding region.
    #[must_use]
    pub fn is_bounding_active(&self) -> bool {
        self.confinement.region
    }

    /// True when the position is clamped to the camera view.
    #[must_use]
    pub fn is_zone_bounding_active(&self) -> bool {
        self.confinement.zone
    }

    /// Height within the bounding region in `[0, 1]`, 0 at the bottom
    /// edge. A region with no height reports 0.
    #[must_use]
    pub fn current_region_y(&self) -> f32 {
        let span = self.confinement.max.y - self.confinement.min.y;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.position.y - self.confinement.min.y) / span).clamp(0.0, 1.0)
    }

    /// Applies the active confinements, stopping motion into an edge.
    fn confine(&mut self, camera: &Camera) {
        let Confinement {
            min,
            max,
            region,
            zone,
        } = self.confinement;

        if region {
            clamp_axis(&mut self.position.x, &mut self.velocity.x, min.x, max.x);
            clamp_axis(&mut self.position.y, &mut self.velocity.y, min.y, max.y);
        }

        if zone {
            let reach = (camera.fov_x - self.scale.x.abs() / 2.0).max(0.0);
            let offset = camera.parallax_offset(self.parallax);
            let centre = camera.position.x - offset;
            clamp_axis(
                &mut self.position.x,
                &mut self.velocity.x,
                centre - reach,
                centre + reach,
            );
        }
    }

    // =========================================================================
    // VISUALS
    // =========================================================================

    /// Mesh key.
    #[must_use]
    pub fn mesh(&self) -> &str {
        &self.mesh
    }

    /// Replaces the mesh key.
    pub fn set_mesh(&mut self, mesh: &str) {
        self.mesh.clear();
        self.mesh.push_str(mesh);
    }

    /// Sprite key.
    #[must_use]
    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    /// Replaces the sprite key. The texture transform is rebuilt on next
    /// render.
    pub fn set_sprite(&mut self, sprite: &str) {
        self.sprite.clear();
        self.sprite.push_str(sprite);
        self.animation.mark_dirty();
    }

    /// Colour multiplied into the sprite, if any.
    #[must_use]
    pub fn color(&self) -> Option<Argb> {
        self.color
    }

    /// Sets or clears colour modulation.
    pub fn set_color(&mut self, color: Option<Argb>) {
        self.color = color;
    }

    /// Switches between additive and normal blending.
    pub fn set_additive_blend(&mut self, additive: bool) {
        self.additive = additive;
    }

    /// True when drawn with additive blending.
    #[must_use]
    pub fn is_additive(&self) -> bool {
        self.additive
    }

    /// Enables or disables depth writes.
    pub fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    /// True when the entity writes depth.
    #[must_use]
    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    /// Shows or hides the entity regardless of the camera.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Draws the collision box in debug passes.
    pub fn set_debug_draw(&mut self, enabled: bool) {
        self.debug_draw = enabled;
    }

    /// True when the collision box is drawn in debug passes.
    #[must_use]
    pub fn debug_draw(&self) -> bool {
        self.debug_draw
    }

    /// Visible flag set and horizontally within the camera view.
    ///
    /// Only X is culled; the view is assumed to cover the level height.
    #[must_use]
    pub fn is_visible(&self, camera: &Camera) -> bool {
        if !self.visible {
            return false;
        }
        let screen_x = self.position.x + camera.parallax_offset(self.parallax);
        (screen_x - camera.position.x).abs() + self.scale.x <= camera.fov_x * 2.0
    }

    // =========================================================================
    // ANIMATION
    // =========================================================================

    /// Animation state.
    #[must_use]
    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Plays an animation of the entity's sprite. An empty `id` stops
    /// animating.
    ///
    /// Returns `false` and changes nothing when the animation is unknown.
    pub fn set_animation(
        &mut self,
        id: &str,
        frame_seconds: f32,
        looping: bool,
        assets: &dyn AssetProvider,
    ) -> bool {
        self.animation
            .set(id, frame_seconds, looping, &self.sprite, assets)
    }

    /// Plays the sprite's default animation.
    pub fn set_default_animation(&mut self, assets: &dyn AssetProvider) -> bool {
        self.animation.set_default(&self.sprite, assets)
    }

    /// Jumps to a frame of the current animation.
    pub fn set_animation_frame(&mut self, frame: u32) {
        self.animation.set_frame(frame);
    }

    /// Freezes or resumes the animation.
    pub fn pause_animation(&mut self, paused: bool) {
        self.animation.pause(paused);
    }

    /// Mirrors the sprite horizontally.
    pub fn set_flip_horizontal(&mut self, flip: bool) {
        self.animation.set_flip_horizontal(flip);
    }

    /// Mirrors the sprite vertically.
    pub fn set_flip_vertical(&mut self, flip: bool) {
        self.animation.set_flip_vertical(flip);
    }

    /// True when `id` is playing.
    #[must_use]
    pub fn is_current_animation(&self, id: &str) -> bool {
        self.animation.is_current(id)
    }

    /// True when a one-shot animation reached its last frame.
    #[must_use]
    pub fn is_animation_finished(&self) -> bool {
        self.animation.is_finished()
    }

    /// True once `fraction` of the animation frames have been shown.
    #[must_use]
    pub fn is_animation_fraction_finished(&self, fraction: f32) -> bool {
        self.animation.is_fraction_finished(fraction)
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Advances the entity by one frame.
    ///
    /// `anchor` is the resolved position of the follow target, or `None`
    /// when the entity integrates its own velocity.
    pub fn update(&mut self, frame: &FrameContext<'_>, anchor: Option<Vec3>) -> Lifecycle {
        let dt = frame.dt;

        self.forces.integrate(dt, &mut self.velocity);

        match (self.follow, anchor) {
            (Some(follow), Some(anchor)) => self.position = anchor + follow.offset,
            _ => self.position += self.velocity * dt,
        }
        self.confine(&frame.camera);
        self.bounds.update_center(self.position);

        if self.contacts.enabled {
            self.update_tile_contacts(frame.grid);
        }

        if self.lifetime.is_mortal() && self.lifetime.advance(dt) {
            return Lifecycle::Expired;
        }

        self.animation.advance(dt);
        Lifecycle::Alive
    }

    /// Sets the blend state shared by a run of entities with one mesh.
    pub fn apply_render_mode(&self, device: &mut dyn RenderDevice) {
        if self.color.is_none() {
            device.set_color_blend(Argb::WHITE);
        }
        device.set_blend_mode(if self.additive {
            BlendMode::Additive
        } else {
            BlendMode::Normal
        });
        device.set_depth_write(self.depth_write);
    }

    /// Draws the sprite quad. Texture and mesh must already be bound.
    pub fn render(&mut self, device: &mut dyn RenderDevice, frame: &FrameContext<'_>) {
        if let Some(color) = self.color {
            device.set_color_blend(color);
        }
        let texture = self.animation.texture_transform(&self.sprite, frame.assets);
        device.set_texture_transform(texture);
        device.set_object_transform(self.render_transform(&frame.camera));
        device.draw_quad();
    }

    /// Draws the collision box outline.
    pub fn render_debug(&mut self, device: &mut dyn RenderDevice, camera: &Camera) {
        device.set_object_transform(self.collision_transform(camera));
        device.draw_line_strip(4);
    }
}

/// Clamps `value` to `lo..=hi` and zeroes `velocity` when it pushed past
/// the edge it was clamped to.
fn clamp_axis(value: &mut f32, velocity: &mut f32, lo: f32, hi: f32) {
    if *value < lo {
        *value = lo;
        *velocity = velocity.max(0.0);
    } else if *value > hi {
        *value = hi;
        *velocity = velocity.min(0.0);
    }
}
