//! Kinematic body shared by the player and every physics object.
//!
//! A [`Body`] separates its visual rectangle (`position` + `size`) from its
//! collision rectangle (`position + hitbox_offset` + `hitbox_size`). All
//! collision code works on the [`Hitbox`], never on the visual bounds.

use glam::Vec2;

/// Axis-aligned collision rectangle in world space (Y-down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Which side of the other rectangle a hitbox is touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Resting on top of the other rectangle.
    Above,
    /// Pressing into the other rectangle from underneath.
    Below,
    /// Pressing into the other rectangle's left side.
    Left,
    /// Pressing into the other rectangle's right side.
    Right,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Whether the vertical extents of the two rectangles overlap.
    pub fn overlaps_vertically(&self, other: &Hitbox) -> bool {
        self.top() < other.bottom() && self.bottom() > other.top()
    }

    /// Penetration depth along each axis, or `None` if not overlapping.
    pub fn penetration(&self, other: &Hitbox) -> Option<Vec2> {
        if !self.overlaps(other) {
            return None;
        }
        let x = self.right().min(other.right()) - self.left().max(other.left());
        let y = self.bottom().min(other.bottom()) - self.top().max(other.top());
        Some(Vec2::new(x, y))
    }

    /// Which side of `other` this hitbox touches, resolved along the axis of
    /// least penetration. `None` if the rectangles don't overlap.
    pub fn contact_with(&self, other: &Hitbox) -> Option<Contact> {
        let depth = self.penetration(other)?;
        let delta = self.center() - other.center();
        let contact = if depth.y < depth.x {
            if delta.y < 0.0 { Contact::Above } else { Contact::Below }
        } else if delta.x < 0.0 {
            Contact::Left
        } else {
            Contact::Right
        };
        Some(contact)
    }
}

/// Replace non-finite components with the matching component of `fallback`.
/// Returns `true` if anything was replaced.
pub fn sanitize_vec2(v: &mut Vec2, fallback: Vec2) -> bool {
    let mut replaced = false;
    if !v.x.is_finite() {
        v.x = fallback.x;
        replaced = true;
    }
    if !v.y.is_finite() {
        v.y = fallback.y;
        replaced = true;
    }
    replaced
}

/// Position, velocity and hitbox of a simulated rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top-left of the visual rectangle, in world units.
    pub position: Vec2,
    /// World units per second.
    pub velocity: Vec2,
    /// Visual size. Not used for collision.
    pub size: Vec2,
    /// Offset of the hitbox from `position`.
    pub hitbox_offset: Vec2,
    /// Hitbox dimensions; both components are always > 0.
    pub hitbox_size: Vec2,
    /// Set by whichever collision pass last resolved a downward contact.
    pub is_on_ground: bool,
}

impl Body {
    /// Body whose hitbox covers its whole visual rectangle.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        let size = positive_size(size);
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            hitbox_offset: Vec2::ZERO,
            hitbox_size: size,
            is_on_ground: false,
        }
    }

    /// Shrink the hitbox to `size` at `offset` inside the visual rectangle.
    pub fn with_hitbox(mut self, offset: Vec2, size: Vec2) -> Self {
        self.hitbox_offset = offset;
        self.hitbox_size = positive_size(size);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn hitbox(&self) -> Hitbox {
        let origin = self.position + self.hitbox_offset;
        Hitbox::new(origin.x, origin.y, self.hitbox_size.x, self.hitbox_size.y)
    }

    /// Move the body so its hitbox's top-left sits at `(x, y)`.
    pub fn set_hitbox_origin(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y) - self.hitbox_offset;
    }

    /// Move the body so its hitbox's bottom edge sits at `y`.
    pub fn set_hitbox_bottom(&mut self, y: f32) {
        self.position.y = y - (self.hitbox_offset.y + self.hitbox_size.y);
    }

    /// Move the body so its hitbox's top edge sits at `y`.
    pub fn set_hitbox_top(&mut self, y: f32) {
        self.position.y = y - self.hitbox_offset.y;
    }

    /// Move the body so its hitbox's right edge sits at `x`.
    pub fn set_hitbox_right(&mut self, x: f32) {
        self.position.x = x - (self.hitbox_offset.x + self.hitbox_size.x);
    }

    /// Move the body so its hitbox's left edge sits at `x`.
    pub fn set_hitbox_left(&mut self, x: f32) {
        self.position.x = x - self.hitbox_offset.x;
    }

    /// Write a position, rejecting non-finite components.
    pub fn set_position(&mut self, position: Vec2) {
        let mut p = position;
        if sanitize_vec2(&mut p, self.position) {
            log::warn!("rejected non-finite position {:?}", position);
        }
        self.position = p;
    }

    /// Write a velocity, zeroing non-finite components.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        let mut v = velocity;
        if sanitize_vec2(&mut v, Vec2::ZERO) {
            log::warn!("rejected non-finite velocity {:?}", velocity);
        }
        self.velocity = v;
    }

    pub fn collides_with(&self, other: &Body) -> bool {
        self.hitbox().overlaps(&other.hitbox())
    }
}

fn positive_size(size: Vec2) -> Vec2 {
    let clamp = |v: f32| if v.is_finite() && v > 0.0 { v } else { 1.0 };
    Vec2::new(clamp(size.x), clamp(size.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hitbox_uses_offset_not_visual_bounds() {
        let body = Body::new(Vec2::new(100.0, 50.0), Vec2::new(64.0, 64.0))
            .with_hitbox(Vec2::new(27.0, 30.0), Vec2::new(10.0, 35.0));
        let hb = body.hitbox();
        assert_eq!(hb.left(), 127.0);
        assert_eq!(hb.top(), 80.0);
        assert_eq!(hb.right(), 137.0);
        assert_eq!(hb.bottom(), 115.0);
    }

    #[test]
    fn snapping_edges_moves_position() {
        let mut body = Body::new(Vec2::ZERO, Vec2::new(16.0, 16.0))
            .with_hitbox(Vec2::new(2.0, 4.0), Vec2::new(12.0, 12.0));
        body.set_hitbox_bottom(48.0);
        assert_eq!(body.hitbox().bottom(), 48.0);
        body.set_hitbox_right(80.0);
        assert_eq!(body.hitbox().right(), 80.0);
        body.set_hitbox_left(10.0);
        assert_eq!(body.hitbox().left(), 10.0);
        body.set_hitbox_top(20.0);
        assert_eq!(body.hitbox().top(), 20.0);
    }

    #[test]
    fn zero_hitbox_size_is_clamped_positive() {
        let body = Body::new(Vec2::ZERO, Vec2::new(0.0, -4.0));
        assert!(body.hitbox_size.x > 0.0 && body.hitbox_size.y > 0.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Hitbox::new(0.0, 0.0, 16.0, 16.0);
        let b = Hitbox::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.overlaps(&b));
        assert!(a.penetration(&b).is_none());
    }

    #[test]
    fn contact_picks_axis_of_least_penetration() {
        let floor = Hitbox::new(0.0, 100.0, 64.0, 16.0);
        let landing = Hitbox::new(20.0, 86.0, 10.0, 16.0);
        assert_eq!(landing.contact_with(&floor), Some(Contact::Above));

        let wall = Hitbox::new(50.0, 0.0, 16.0, 64.0);
        let from_left = Hitbox::new(40.0, 20.0, 12.0, 20.0);
        assert_eq!(from_left.contact_with(&wall), Some(Contact::Left));
        let from_right = Hitbox::new(64.0, 20.0, 12.0, 20.0);
        assert_eq!(from_right.contact_with(&wall), Some(Contact::Right));

        let ceiling_bump = Hitbox::new(20.0, 112.0, 10.0, 16.0);
        assert_eq!(ceiling_bump.contact_with(&floor), Some(Contact::Below));
    }

    #[test]
    fn non_finite_writes_are_rejected() {
        let mut body = Body::new(Vec2::new(5.0, 6.0), Vec2::ONE);
        body.set_position(Vec2::new(f32::NAN, 9.0));
        assert_eq!(body.position, Vec2::new(5.0, 9.0));
        body.set_velocity(Vec2::new(3.0, f32::INFINITY));
        assert_eq!(body.velocity, Vec2::new(3.0, 0.0));
    }
}
