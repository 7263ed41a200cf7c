use std::ops::{BitAnd, BitOr, BitOrAssign};

use rapier2d::prelude::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

/// Collision category bits. Combine with `|` to build masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionCategory(pub u32);

impl CollisionCategory {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub const PLAYER: Self = Self(1);
    pub const ENEMY: Self = Self(1 << 1);

    pub const TILE: Self = Self(1 << 2);

    pub const ITEM: Self = Self(1 << 3);
    pub const PROJECTILE: Self = Self(1 << 4);

    pub const VEHICLE: Self = Self(1 << 5);
    pub const WHEEL: Self = Self(1 << 6);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share at least one bit.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    fn to_group(self) -> Group {
        Group::from_bits_truncate(self.0)
    }
}

impl BitOr for CollisionCategory {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CollisionCategory {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CollisionCategory {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Membership plus the set of categories a collider is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub category: CollisionCategory,
    pub mask: CollisionCategory,
}

impl CollisionFilter {
    pub const fn new(category: CollisionCategory, mask: CollisionCategory) -> Self {
        Self { category, mask }
    }

    /// Chassis fixtures: hit by players, tiles, enemies and projectiles, never by wheels.
    pub fn vehicle() -> Self {
        Self::new(
            CollisionCategory::VEHICLE,
            CollisionCategory::PLAYER
                | CollisionCategory::TILE
                | CollisionCategory::ENEMY
                | CollisionCategory::PROJECTILE,
        )
    }

    pub fn wheel() -> Self {
        Self::new(
            CollisionCategory::WHEEL,
            CollisionCategory::PLAYER | CollisionCategory::PROJECTILE,
        )
    }

    /// Two filters collide only if each one's mask admits the other's category.
    pub fn allows(&self, other: &CollisionFilter) -> bool {
        self.mask.intersects(other.category) && other.mask.intersects(self.category)
    }

    pub(crate) fn to_interaction_groups(self) -> InteractionGroups {
        InteractionGroups::new(self.category.to_group(), self.mask.to_group())
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::new(CollisionCategory::ALL, CollisionCategory::ALL)
    }
}
