use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// Two-component float vector used for canvas-space positions and sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Two-component integer vector used for source-image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

pub const fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2 { x, y }
}

pub const fn ivec2(x: i32, y: i32) -> IVec2 {
    IVec2 { x, y }
}

impl Vec2 {
    pub const ZERO: Vec2 = vec2(0.0, 0.0);
    pub const ONE: Vec2 = vec2(1.0, 1.0);

    pub fn splat(v: f32) -> Self {
        vec2(v, v)
    }

    pub fn min_elem(self) -> f32 {
        self.x.min(self.y)
    }

    pub fn max(self, other: Vec2) -> Vec2 {
        vec2(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Componentwise floor into integer pixel coordinates.
    pub fn floor_to_ivec(self) -> IVec2 {
        ivec2(self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let d = self - other;
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

impl IVec2 {
    pub const ZERO: IVec2 = ivec2(0, 0);
    pub const ONE: IVec2 = ivec2(1, 1);

    pub fn min(self, other: IVec2) -> IVec2 {
        ivec2(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: IVec2) -> IVec2 {
        ivec2(self.x.max(other.x), self.y.max(other.y))
    }

    /// Clamps each axis into `[lo, hi]` of the matching axis.
    pub fn clamp(self, lo: IVec2, hi: IVec2) -> IVec2 {
        ivec2(self.x.clamp(lo.x, hi.x), self.y.clamp(lo.y, hi.y))
    }

    pub fn as_vec2(self) -> Vec2 {
        vec2(self.x as f32, self.y as f32)
    }
}

impl From<IVec2> for Vec2 {
    fn from(v: IVec2) -> Self {
        v.as_vec2()
    }
}

impl From<egui::Vec2> for Vec2 {
    fn from(v: egui::Vec2) -> Self {
        vec2(v.x, v.y)
    }
}

impl From<Vec2> for egui::Vec2 {
    fn from(v: Vec2) -> Self {
        egui::vec2(v.x, v.y)
    }
}

macro_rules! impl_indexing {
    ($ty:ty, $elem:ty) => {
        impl Index<usize> for $ty {
            type Output = $elem;

            fn index(&self, axis: usize) -> &$elem {
                match axis {
                    0 => &self.x,
                    1 => &self.y,
                    _ => panic!("axis {axis} out of range for a 2D vector"),
                }
            }
        }

        impl IndexMut<usize> for $ty {
            fn index_mut(&mut self, axis: usize) -> &mut $elem {
                match axis {
                    0 => &mut self.x,
                    1 => &mut self.y,
                    _ => panic!("axis {axis} out of range for a 2D vector"),
                }
            }
        }
    };
}

impl_indexing!(Vec2, f32);
impl_indexing!(IVec2, i32);

macro_rules! impl_componentwise {
    ($ty:ident, $elem:ty, $ctor:ident) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                $ctor(self.x + rhs.x, self.y + rhs.y)
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                $ctor(self.x - rhs.x, self.y - rhs.y)
            }
        }

        impl Mul for $ty {
            type Output = $ty;
            fn mul(self, rhs: $ty) -> $ty {
                $ctor(self.x * rhs.x, self.y * rhs.y)
            }
        }

        impl Div for $ty {
            type Output = $ty;
            fn div(self, rhs: $ty) -> $ty {
                $ctor(self.x / rhs.x, self.y / rhs.y)
            }
        }

        impl Mul<$elem> for $ty {
            type Output = $ty;
            fn mul(self, rhs: $elem) -> $ty {
                $ctor(self.x * rhs, self.y * rhs)
            }
        }

        impl Div<$elem> for $ty {
            type Output = $ty;
            fn div(self, rhs: $elem) -> $ty {
                $ctor(self.x / rhs, self.y / rhs)
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ctor(-self.x, -self.y)
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, rhs: $ty) {
                *self = *self + rhs;
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, rhs: $ty) {
                *self = *self - rhs;
            }
        }

        impl MulAssign<$elem> for $ty {
            fn mul_assign(&mut self, rhs: $elem) {
                *self = *self * rhs;
            }
        }
    };
}

impl_componentwise!(Vec2, f32, vec2);
impl_componentwise!(IVec2, i32, ivec2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_aliases_named_components() {
        let mut v = vec2(3.0, 4.0);
        assert_eq!(v[0], v.x);
        assert_eq!(v[1], v.y);
        v[1] = 7.5;
        assert_eq!(v.y, 7.5);

        let mut p = ivec2(-2, 9);
        p[0] += 5;
        assert_eq!(p, ivec2(3, 9));
    }

    #[test]
    fn floor_rounds_toward_negative_infinity() {
        assert_eq!(vec2(10.9, -0.1).floor_to_ivec(), ivec2(10, -1));
    }

    #[test]
    fn clamp_is_per_axis() {
        let p = ivec2(-4, 250).clamp(IVec2::ZERO, ivec2(100, 200));
        assert_eq!(p, ivec2(0, 200));
    }

    #[test]
    fn componentwise_division_matches_scalar_math() {
        let r = vec2(50.0, 25.0) / vec2(100.0, 50.0) * vec2(8.0, 4.0);
        assert_eq!(r, vec2(4.0, 2.0));
    }
}
