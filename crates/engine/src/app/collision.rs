use super::units::{Game, Vec2};

/// Axis-aligned rectangle in game units. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x: Game,
    pub y: Game,
    pub width: Game,
    pub height: Game,
}

impl Rectangle {
    pub const fn new(x: Game, y: Game, width: Game, height: Game) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn centered_on(center: Vec2, width: Game, height: Game) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    pub fn left(&self) -> Game {
        self.x
    }

    pub fn right(&self) -> Game {
        self.x + self.width
    }

    pub fn top(&self) -> Game {
        self.y
    }

    pub fn bottom(&self) -> Game {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn collides_with(&self, other: &Rectangle) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// Anything that can deal or take damage exposes a volume recomputed from its
/// current position on every call.
pub trait DamageVolume {
    fn damage_volume(&self) -> Rectangle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_does_not_collide() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.collides_with(&b));

        let below = Rectangle::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.collides_with(&below));
    }

    #[test]
    fn one_unit_overlap_collides() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(9.0, 0.0, 10.0, 10.0);
        assert!(a.collides_with(&b));
    }

    #[test]
    fn enemy_and_player_volumes_overlap() {
        let enemy = Rectangle::new(95.0, 95.0, 10.0, 10.0);
        let player = Rectangle::new(100.0, 100.0, 10.0, 10.0);
        assert!(enemy.collides_with(&player));
    }

    #[test]
    fn horizontal_overlap_alone_is_not_enough() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, 40.0, 10.0, 10.0);
        assert!(!a.collides_with(&b));
    }

    #[test]
    fn containment_collides() {
        let outer = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rectangle::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.collides_with(&inner));
    }

    #[test]
    fn collision_is_symmetric() {
        let rects = [
            Rectangle::new(0.0, 0.0, 10.0, 10.0),
            Rectangle::new(10.0, 0.0, 10.0, 10.0),
            Rectangle::new(9.0, 9.0, 2.0, 2.0),
            Rectangle::new(-5.0, -5.0, 4.0, 30.0),
            Rectangle::new(3.0, 3.0, 0.0, 0.0),
            Rectangle::new(0.0, 10.0, 10.0, 10.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(a.collides_with(b), b.collides_with(a), "a={a:?} b={b:?}");
            }
        }
    }

    #[test]
    fn centered_rectangle_has_expected_bounds() {
        let rect = Rectangle::centered_on(Vec2::new(100.0, 100.0), 10.0, 10.0);
        assert_eq!(rect, Rectangle::new(95.0, 95.0, 10.0, 10.0));
        assert_eq!(rect.center(), Vec2::new(100.0, 100.0));
    }
}
