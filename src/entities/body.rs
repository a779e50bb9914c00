//! Axis-aligned boxes and the sweep-move primitive every moving entity uses.
//!
//! World coordinates are whole units with the origin at the top-left of the
//! playfield and y growing downward. Requested displacements are truncated
//! toward zero before they are resolved, so boxes always sit on the unit grid
//! and flush contact between two boxes is an exact equality.

use super::group::Group;

/// Axis-aligned rectangle, top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
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

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// True iff the two boxes share interior area. Boxes that only touch
    /// along an edge do not overlap, which lets a body rest flush on a block.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Either vertical edge of `self` lies inside the horizontal span of
    /// `other`, edges inclusive.
    fn edge_within_span(&self, other: &Rect) -> bool {
        let within = |edge: f32| other.left() <= edge && edge <= other.right();
        within(self.left()) || within(self.right())
    }
}

/// Anything with a bounding box.
pub trait Bounded {
    fn bounds(&self) -> Rect;
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// A collection of boxes a body can collide with.
pub trait Obstacles {
    fn boxes(&self) -> impl Iterator<Item = Rect> + '_;

    fn any_overlap(&self, rect: &Rect) -> bool {
        self.boxes().any(|b| b.overlaps(rect))
    }
}

impl<B: Bounded> Obstacles for [B] {
    fn boxes(&self) -> impl Iterator<Item = Rect> + '_ {
        self.iter().map(Bounded::bounds)
    }
}

impl<B: Bounded> Obstacles for Vec<B> {
    fn boxes(&self) -> impl Iterator<Item = Rect> + '_ {
        self.iter().map(Bounded::bounds)
    }
}

impl<B: Bounded> Obstacles for Group<B> {
    fn boxes(&self) -> impl Iterator<Item = Rect> + '_ {
        self.values().map(Bounded::bounds)
    }
}

/// Position and bounding box of an entity. The box is the only stored
/// geometry, so the position can never drift away from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    rect: Rect,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x.trunc(), y.trunc(), width, height),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> (f32, f32) {
        (self.rect.x, self.rect.y)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.rect.x = x.trunc();
        self.rect.y = y.trunc();
    }

    /// Would the box overlap any obstacle after moving by (dx, dy)?
    pub fn colliding_at<O: Obstacles + ?Sized>(&self, dx: f32, dy: f32, obstacles: &O) -> bool {
        obstacles.any_overlap(&self.rect.translated(dx, dy))
    }

    /// Moves by the largest part of (dx, dy) that does not end inside an
    /// obstacle. The vertical axis is resolved first by stepping one unit
    /// back toward zero until the box is clear, then the horizontal axis the
    /// same way with the resolved vertical offset applied. Returns the
    /// displacement that was actually applied.
    ///
    /// Cost is linear in the size of the displacement; this is not continuous
    /// collision detection.
    pub fn sweep_move<O: Obstacles + ?Sized>(
        &mut self,
        dx: f32,
        dy: f32,
        obstacles: &O,
    ) -> (f32, f32) {
        let mut dy = dy.trunc();
        while dy != 0.0 && self.colliding_at(0.0, dy, obstacles) {
            dy -= dy.signum();
        }

        let mut dx = dx.trunc();
        while dx != 0.0 && self.colliding_at(dx, dy, obstacles) {
            dx -= dx.signum();
        }

        self.rect = self.rect.translated(dx, dy);
        (dx, dy)
    }

    /// Some obstacle's top edge is exactly at this body's bottom edge and the
    /// two overlap horizontally.
    pub fn on_ground<O: Obstacles + ?Sized>(&self, obstacles: &O) -> bool {
        self.on_ground_at(0.0, obstacles)
    }

    /// Would the body still be standing on something after moving `dx`
    /// sideways?
    pub fn on_ground_at<O: Obstacles + ?Sized>(&self, dx: f32, obstacles: &O) -> bool {
        let moved = self.rect.translated(dx.trunc(), 0.0);
        obstacles
            .boxes()
            .any(|b| b.top() == moved.bottom() && moved.edge_within_span(&b))
    }

    /// Mirror of [`Body::on_ground`] against the body's top edge.
    pub fn hitting_ceiling<O: Obstacles + ?Sized>(&self, obstacles: &O) -> bool {
        obstacles
            .boxes()
            .any(|b| b.bottom() == self.rect.top() && self.rect.edge_within_span(&b))
    }

    pub fn overlaps_any<O: Obstacles + ?Sized>(&self, obstacles: &O) -> bool {
        obstacles.any_overlap(&self.rect)
    }
}

impl Bounded for Body {
    fn bounds(&self) -> Rect {
        self.rect
    }
}
