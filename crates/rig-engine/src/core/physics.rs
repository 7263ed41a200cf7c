use glam::Vec2;
use rapier2d::prelude::*;
use thiserror::Error;

use crate::core::collision::CollisionFilter;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn vec2_to_point(v: Vec2) -> nalgebra::Point2<f32> {
    nalgebra::Point2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn point_to_vec2(p: &nalgebra::Point2<f32>) -> Vec2 {
    Vec2::new(p.x, p.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Failures while turning a [`BodyDesc`] into a rigid body.
#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    #[error("body description has no colliders")]
    NoColliders,

    /// Rapier could not build a convex hull from the given points.
    #[error("collider {index} is degenerate (collinear or coincident points)")]
    DegenerateCollider { index: usize },

    #[error("rotational inertia {inertia} about the overridden mass center is not positive")]
    DegenerateInertia { inertia: f32 },
}

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for one collider (fixture) of a body, in body-local space.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderDesc {
    Cuboid { half_width: f32, half_height: f32 },
    ConvexPolygon { points: Vec<Vec2> },
}

impl ColliderDesc {
    /// An axis-aligned box of the given full width and height.
    pub fn rect(width: f32, height: f32) -> Self {
        ColliderDesc::Cuboid {
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    fn build_collider(&self) -> Option<ColliderBuilder> {
        match self {
            ColliderDesc::Cuboid { half_width, half_height } => {
                Some(ColliderBuilder::cuboid(*half_width, *half_height))
            }
            ColliderDesc::ConvexPolygon { points } => {
                let points: Vec<_> = points.iter().map(|p| vec2_to_point(*p)).collect();
                ColliderBuilder::convex_hull(&points)
            }
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub colliders: Vec<ColliderDesc>,
    pub density: f32,
    pub filter: CollisionFilter,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Replaces the mass center computed from the colliders.
    pub center_of_mass: Option<Vec2>,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            colliders: vec![collider],
            density: 1.0,
            filter: CollisionFilter::default(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            center_of_mass: None,
        }
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            ..Self::dynamic(collider)
        }
    }

    /// Attach another collider to the same body.
    pub fn with_collider(mut self, collider: ColliderDesc) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    /// Density shared by every collider of the body.
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Set the angular damping (rotation decay). Higher values slow rotation faster.
    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }

    /// Override the local mass center. Rotational inertia about the body
    /// origin is kept, so inertia about the new center shrinks by `m·|c|²`.
    pub fn with_center_of_mass(mut self, center: Vec2) -> Self {
        self.center_of_mass = Some(center);
        self
    }
}

/// Handle to a rigid body in the physics simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
}

/// Handle to a joint in the physics simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointHandle(pub(crate) ImpulseJointHandle);

/// Description of a joint to create between two bodies.
#[derive(Debug, Clone, Copy)]
pub enum JointDesc {
    /// Hinge around the anchor points. With `limits`, the relative angle
    /// of body B to body A is constrained to `[lower, upper]`.
    Revolute {
        anchor_a: Vec2,
        anchor_b: Vec2,
        limits: Option<[f32; 2]>,
    },
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single, easy-to-use struct.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    /// Top-down scenes use `Vec2::ZERO`.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body with all of its colliders.
    pub fn create_body(&mut self, desc: &BodyDesc) -> Result<PhysicsBody, PhysicsError> {
        if desc.colliders.is_empty() {
            return Err(PhysicsError::NoColliders);
        }

        let builders = desc
            .colliders
            .iter()
            .enumerate()
            .map(|(index, c)| {
                c.build_collider()
                    .ok_or(PhysicsError::DegenerateCollider { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(vec2_to_na(desc.velocity))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping);

        // With an overridden center the whole mass distribution is carried by
        // the body and the colliders become massless.
        let mut collider_density = desc.density;
        if let Some(center) = desc.center_of_mass {
            let computed = builders
                .iter()
                .map(|b| b.shape.mass_properties(desc.density))
                .reduce(|a, b| a + b)
                .ok_or(PhysicsError::NoColliders)?;
            rb = rb.additional_mass_properties(override_center(computed, center)?);
            collider_density = 0.0;
        }

        let body_handle = self.bodies.insert(rb.build());

        for builder in builders {
            let collider = builder
                .density(collider_density)
                .collision_groups(desc.filter.to_interaction_groups())
                .build();
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);
        }

        if let Some(rb) = self.bodies.get_mut(body_handle) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }

        Ok(PhysicsBody { body_handle })
    }

    /// Remove a body, its colliders and any joint attached to it.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advance the simulation by one fixed step and clear accumulated forces.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // Rapier keeps user forces across steps; forces here last one tick.
        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
    }

    // -- Forces --

    /// Apply a force at the center of mass (continuous, cleared after each step).
    pub fn apply_force(&mut self, body: &PhysicsBody, force: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.add_force(vec2_to_na(force), true);
        }
    }

    /// Apply an instantaneous impulse at the center of mass.
    pub fn apply_impulse(&mut self, body: &PhysicsBody, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse(vec2_to_na(impulse), true);
        }
    }

    /// Apply an instantaneous angular impulse.
    pub fn apply_angular_impulse(&mut self, body: &PhysicsBody, impulse: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_torque_impulse(impulse, true);
        }
    }

    /// Force accumulated on the body since the last step.
    pub fn applied_force(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(&rb.user_force()))
            .unwrap_or(Vec2::ZERO)
    }

    // -- Queries --

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_angular_velocity(&mut self, body: &PhysicsBody, angvel: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_angvel(angvel, true);
        }
    }

    pub fn angular_velocity(&self, body: &PhysicsBody) -> f32 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.angvel())
            .unwrap_or(0.0)
    }

    pub fn mass(&self, body: &PhysicsBody) -> f32 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.mass())
            .unwrap_or(0.0)
    }

    /// Rotational inertia about the center of mass.
    pub fn inertia(&self, body: &PhysicsBody) -> f32 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.mass_properties().local_mprops.principal_inertia())
            .unwrap_or(0.0)
    }

    /// Mass center in body-local coordinates.
    pub fn local_center_of_mass(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| point_to_vec2(&rb.mass_properties().local_mprops.local_com))
            .unwrap_or(Vec2::ZERO)
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Rotate a body-local direction into world space.
    pub fn world_vector(&self, body: &PhysicsBody, local: Vec2) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(&(rb.rotation() * vec2_to_na(local))))
            .unwrap_or(local)
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of colliders in the simulation.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    // -- Joint methods --

    /// Create a joint between two bodies. Returns a handle for later mutation or removal.
    pub fn create_joint(
        &mut self,
        body_a: &PhysicsBody,
        body_b: &PhysicsBody,
        desc: &JointDesc,
    ) -> JointHandle {
        let handle = match desc {
            JointDesc::Revolute { anchor_a, anchor_b, limits } => {
                let mut builder = RevoluteJointBuilder::new()
                    .local_anchor1(vec2_to_point(*anchor_a))
                    .local_anchor2(vec2_to_point(*anchor_b));
                if let Some(limits) = limits {
                    builder = builder.limits(*limits);
                }
                self.impulse_joints
                    .insert(body_a.body_handle, body_b.body_handle, builder.build(), true)
            }
        };
        JointHandle(handle)
    }

    /// Remove a joint from the simulation.
    pub fn remove_joint(&mut self, handle: JointHandle) {
        self.impulse_joints.remove(handle.0, true);
    }

    /// Number of joints in the simulation.
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    /// Rotation of body B relative to body A, in `(-π, π]`.
    pub fn joint_angle(&self, handle: JointHandle) -> f32 {
        self.impulse_joints
            .get(handle.0)
            .and_then(|joint| {
                let rb1 = self.bodies.get(joint.body1)?;
                let rb2 = self.bodies.get(joint.body2)?;
                Some(rb1.rotation().rotation_to(rb2.rotation()).angle())
            })
            .unwrap_or(0.0)
    }

    /// Replace the angular limit range of a revolute joint and wake its bodies.
    pub fn set_joint_limits(&mut self, handle: JointHandle, lower: f32, upper: f32) {
        let Some(joint) = self.impulse_joints.get_mut(handle.0) else {
            return;
        };
        joint.data.set_limits(JointAxis::AngX, [lower, upper]);
        // A sleeping pair would ignore the new lock.
        let bodies = [joint.body1, joint.body2];
        for body in bodies {
            if let Some(rb) = self.bodies.get_mut(body) {
                rb.wake_up(true);
            }
        }
    }

    /// Current `(lower, upper)` angular limits, if the joint has any.
    pub fn joint_limits(&self, handle: JointHandle) -> Option<(f32, f32)> {
        let joint = self.impulse_joints.get(handle.0)?;
        joint
            .data
            .limits(JointAxis::AngX)
            .map(|limits| (limits.min, limits.max))
    }
}

/// Move the mass center to `center` while keeping the inertia about the body origin.
fn override_center(props: MassProperties, center: Vec2) -> Result<MassProperties, PhysicsError> {
    let mass = props.mass();
    let com = point_to_vec2(&props.local_com);
    let origin_inertia = props.principal_inertia() + mass * com.length_squared();
    let inertia = origin_inertia - mass * center.length_squared();
    if inertia <= 0.0 {
        return Err(PhysicsError::DegenerateInertia { inertia });
    }
    Ok(MassProperties::new(vec2_to_point(center), mass, inertia))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
