use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Degrees,
    Radians,
}

impl AngleUnit {
    fn to_radians(self, angle: f32) -> f32 {
        match self {
            AngleUnit::Degrees => angle.to_radians(),
            AngleUnit::Radians => angle,
        }
    }

    fn from_radians(self, radians: f32) -> f32 {
        match self {
            AngleUnit::Degrees => radians.to_degrees(),
            AngleUnit::Radians => radians,
        }
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction. A zero vector normalizes to zero.
    pub fn normalize(self) -> Vec2 {
        let length = self.length();
        if length == 0.0 {
            return Vec2::ZERO;
        }
        self / length
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product.
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn mul_components(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x * other.x, self.y * other.y)
    }

    pub fn abs(self) -> Vec2 {
        Vec2::new(self.x.abs(), self.y.abs())
    }

    /// Projection onto `axis`. Projecting onto a zero axis yields zero.
    pub fn project(self, axis: Vec2) -> Vec2 {
        let axis_length_squared = axis.length_squared();
        if axis_length_squared == 0.0 {
            return Vec2::ZERO;
        }
        axis * (self.dot(axis) / axis_length_squared)
    }

    pub fn angle(self, unit: AngleUnit) -> f32 {
        unit.from_radians(self.y.atan2(self.x))
    }

    pub fn rotate(self, angle: f32, unit: AngleUnit) -> Vec2 {
        let (sin, cos) = unit.to_radians(angle).sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Unclamped linear interpolation: `t` outside `[0, 1]` extrapolates.
    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        Vec2::new(lerp(self.x, target.x, t), lerp(self.y, target.y, t))
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle stored as top-left position plus size.
///
/// Width and height may be negative while a rect is being assembled; every
/// query below works on the [`Rect::abs`] form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    /// Smallest rect enclosing every point, or `None` for an empty set.
    pub fn aabb<I>(points: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        self.position() + self.size() / 2.0
    }

    pub fn area(&self) -> f32 {
        let rect = self.abs();
        rect.width * rect.height
    }

    pub fn abs(&self) -> Rect {
        let mut rect = *self;
        if rect.width < 0.0 {
            rect.x += rect.width;
            rect.width = -rect.width;
        }
        if rect.height < 0.0 {
            rect.y += rect.height;
            rect.height = -rect.height;
        }
        rect
    }

    pub fn grow(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Strict containment: points on an edge are outside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let rect = self.abs();
        point.x > rect.x && point.x < rect.right() && point.y > rect.y && point.y < rect.bottom()
    }

    /// Strict containment: `other` must not touch any edge of `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        let outer = self.abs();
        let inner = other.abs();
        inner.x > outer.x
            && inner.right() < outer.right()
            && inner.y > outer.y
            && inner.bottom() < outer.bottom()
    }

    /// Pointer hit test over the half-open area `[x, right) x [y, bottom)`.
    pub fn hit_test(&self, point: Vec2) -> bool {
        let rect = self.abs();
        point.x >= rect.x && point.x < rect.right() && point.y >= rect.y && point.y < rect.bottom()
    }

    /// Minimum translation depth along each axis, or `None` when the rects do
    /// not overlap. The sign points from `other` towards `self`.
    pub fn intersection_depth(&self, other: &Rect) -> Option<Vec2> {
        let a = self.abs();
        let b = other.abs();
        let half_a = a.size() / 2.0;
        let half_b = b.size() / 2.0;
        let distance = a.center() - b.center();
        let min_distance = half_a + half_b;

        if distance.x.abs() >= min_distance.x || distance.y.abs() >= min_distance.y {
            return None;
        }

        let depth_x = if distance.x > 0.0 {
            min_distance.x - distance.x
        } else {
            -min_distance.x - distance.x
        };
        let depth_y = if distance.y > 0.0 {
            min_distance.y - distance.y
        } else {
            -min_distance.y - distance.y
        };
        Some(Vec2::new(depth_x, depth_y))
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let a = self.abs();
        let b = other.abs();
        let left = a.x.max(b.x);
        let top = a.y.max(b.y);
        let right = a.right().min(b.right());
        let bottom = a.bottom().min(b.bottom());
        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Fraction of `self`'s area covered by `other`, in `[0, 1]`.
    pub fn overlap_ratio(&self, other: &Rect) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        match self.intersection(other) {
            Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}
