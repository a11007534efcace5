//! Canvas geometry of the sandbox, in canvas units (pixels of the reference window).
use crate::sandbox::token::Side;
use crate::sandbox::variant::Variant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }
}

/// Area around a token's anchor that reacts to the pointer: `x-left < px < x+right`,
/// `y-up < py < y+down`, strict on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub left: f32,
    pub right: f32,
    pub up: f32,
    pub down: f32,
}

impl HitBox {
    pub fn contains(&self, anchor: (f32, f32), point: (f32, f32)) -> bool {
        anchor.0 - self.left < point.0
            && point.0 < anchor.0 + self.right
            && anchor.1 - self.up < point.1
            && point.1 < anchor.1 + self.down
    }
}

impl Default for HitBox {
    fn default() -> Self {
        HitBox {
            left: 50.0,
            right: 100.0,
            up: 20.0,
            down: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub lhs_box: Rect,
    pub rhs_box: Rect,
    pub lhs_label_at: (f32, f32),
    pub rhs_label_at: (f32, f32),
    pub equals_at: (f32, f32),
    pub solution_at: (f32, f32),
    pub history_origin: (f32, f32),
    pub history_spacing: f32,
    pub hit_box: HitBox,
    /// anchor of the first token slot
    pub token_origin: (f32, f32),
    /// horizontal distance between token slots
    pub token_spacing: f32,
    /// horizontal offset of the remainder token from its coefficient
    pub rest_offset: f32,
}

impl Layout {
    pub fn for_variant(variant: Variant) -> Layout {
        let (width, height, rhs_x, history_y) = match variant {
            Variant::Whole | Variant::Split => (1000.0, 600.0, 550.0, 400.0),
            Variant::Functions => (1200.0, 800.0, 750.0, 500.0),
        };
        let (token_origin, token_spacing) = match variant {
            Variant::Whole => ((200.0, 200.0), 150.0),
            Variant::Split => ((150.0, 200.0), 150.0),
            Variant::Functions => ((150.0, 200.0), 180.0),
        };
        Layout {
            width,
            height,
            lhs_box: Rect::new(50.0, 150.0, 400.0, 200.0),
            rhs_box: Rect::new(rhs_x, 150.0, 400.0, 200.0),
            lhs_label_at: (200.0, 120.0),
            rhs_label_at: (rhs_x + 150.0, 120.0),
            equals_at: (Self::midline_of(width) - 20.0, 230.0),
            solution_at: (20.0, 60.0),
            history_origin: (20.0, history_y),
            history_spacing: 30.0,
            hit_box: HitBox::default(),
            token_origin,
            token_spacing,
            rest_offset: 60.0,
        }
    }

    fn midline_of(width: f32) -> f32 {
        (width / 2.0).floor()
    }

    /// x coordinate separating the two sides (integer half of the width)
    pub fn midline(&self) -> f32 {
        Self::midline_of(self.width)
    }

    /// Side a token dropped at horizontal position `x` belongs to
    pub fn side_at(&self, x: f32) -> Side {
        if x < self.midline() { Side::Lhs } else { Side::Rhs }
    }

    /// Anchor of the token in slot `slot`
    pub fn slot_position(&self, slot: usize) -> (f32, f32) {
        (
            self.token_origin.0 + slot as f32 * self.token_spacing,
            self.token_origin.1,
        )
    }

    /// Anchor of the remainder token paired with slot `slot`
    pub fn rest_position(&self, slot: usize) -> (f32, f32) {
        let (x, y) = self.slot_position(slot);
        (x + self.rest_offset, y)
    }

    /// Anchor of the `line`-th visible history entry
    pub fn history_line(&self, line: usize) -> (f32, f32) {
        (
            self.history_origin.0,
            self.history_origin.1 + line as f32 * self.history_spacing,
        )
    }

    /// A drop point inside the box of `side`, spread by `index` so tokens do not overlap
    pub fn drop_point(&self, side: Side, index: usize, y: f32) -> (f32, f32) {
        let rect = match side {
            Side::Lhs => self.lhs_box,
            Side::Rhs => self.rhs_box,
        };
        let x = rect.x + 40.0 + (index % 5) as f32 * 70.0;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_per_variant() {
        let small = Layout::for_variant(Variant::Split);
        assert_eq!(small.midline(), 500.0);
        assert_eq!(small.rhs_box.x, 550.0);
        assert_eq!(small.rhs_label_at, (700.0, 120.0));
        assert_eq!(small.history_line(1), (20.0, 430.0));
        let large = Layout::for_variant(Variant::Functions);
        assert_eq!(large.midline(), 600.0);
        assert_eq!(large.rhs_box.x, 750.0);
        assert_eq!(large.rhs_label_at, (900.0, 120.0));
        assert_eq!(large.history_origin, (20.0, 500.0));
        assert_eq!(large.equals_at, (580.0, 230.0));
    }

    #[test]
    fn test_slots() {
        assert_eq!(Layout::for_variant(Variant::Whole).slot_position(2), (500.0, 200.0));
        assert_eq!(Layout::for_variant(Variant::Split).rest_position(1), (360.0, 200.0));
        assert_eq!(Layout::for_variant(Variant::Functions).slot_position(1), (330.0, 200.0));
    }

    #[test]
    fn test_side_at_midline() {
        let layout = Layout::for_variant(Variant::Whole);
        assert_eq!(layout.side_at(499.0), Side::Lhs);
        assert_eq!(layout.side_at(500.0), Side::Rhs);
    }

    #[test]
    fn test_hit_box_is_strict() {
        let hit = HitBox::default();
        let anchor = (200.0, 200.0);
        assert!(hit.contains(anchor, (151.0, 181.0)));
        assert!(hit.contains(anchor, (299.0, 239.0)));
        assert!(!hit.contains(anchor, (150.0, 200.0)));
        assert!(!hit.contains(anchor, (200.0, 240.0)));
    }

    #[test]
    fn test_drop_point_lands_on_requested_side() {
        for variant in [Variant::Whole, Variant::Split, Variant::Functions] {
            let layout = Layout::for_variant(variant);
            for index in 0..10 {
                let (x, _) = layout.drop_point(Side::Rhs, index, 200.0);
                assert_eq!(layout.side_at(x), Side::Rhs);
                let (x, _) = layout.drop_point(Side::Lhs, index, 200.0);
                assert_eq!(layout.side_at(x), Side::Lhs);
            }
        }
    }
}
