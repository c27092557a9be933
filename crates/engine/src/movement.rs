use crate::world::{Rect, Vec2};

/// Collision box inset within an actor's sprite, relative to its top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub offset: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    /// Square of `side` centred in a sprite of `sprite_size`.
    pub fn centered_square(sprite_size: Vec2, side: f32) -> Self {
        Self {
            offset: Vec2::new(
                sprite_size.x * 0.5 - side * 0.5,
                sprite_size.y * 0.5 - side * 0.5,
            ),
            size: Vec2::new(side, side),
        }
    }

    pub fn at(&self, position: Vec2) -> Rect {
        Rect::new(
            position.x + self.offset.x,
            position.y + self.offset.y,
            self.size.x,
            self.size.y,
        )
    }
}

/// Axis-separated AABB resolution: move on X, push the hitbox out of any
/// overlapping obstacle against the direction of travel, then repeat on Y
/// from the corrected position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementResolver {
    pub speed: f32,
}

impl MovementResolver {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// `position` is the sprite's top-left, `sprite_size` its full size (the
    /// obstacle query runs around the sprite centre). `direction` is
    /// normalized here.
    pub fn step<F>(
        &self,
        position: Vec2,
        sprite_size: Vec2,
        hitbox: &Hitbox,
        direction: Vec2,
        dt: f32,
        mut obstacles_near: F,
    ) -> Vec2
    where
        F: FnMut(Vec2) -> Vec<Rect>,
    {
        let direction = direction.normalized();
        let center = |pos: Vec2| pos.add(sprite_size.scale(0.5));
        let mut pos = position;

        pos.x += direction.x * dt * self.speed;
        for obstacle in obstacles_near(center(pos)) {
            if !hitbox.at(pos).overlaps(&obstacle) {
                continue;
            }
            if direction.x > 0.0 {
                pos.x = obstacle.x - hitbox.size.x - hitbox.offset.x;
            } else if direction.x < 0.0 {
                pos.x = obstacle.right() - hitbox.offset.x;
            }
        }

        pos.y += direction.y * dt * self.speed;
        for obstacle in obstacles_near(center(pos)) {
            if !hitbox.at(pos).overlaps(&obstacle) {
                continue;
            }
            if direction.y > 0.0 {
                pos.y = obstacle.y - hitbox.size.y - hitbox.offset.y;
            } else if direction.y < 0.0 {
                pos.y = obstacle.bottom() - hitbox.offset.y;
            }
        }

        pos
    }
}
