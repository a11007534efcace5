//! Render-agnostic description of one frame of the canvas.
use crate::sandbox::layout::Rect;
use crate::sandbox::token::{Side, TokenId};

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub at: (f32, f32),
}

impl TextItem {
    pub fn new(text: impl Into<String>, at: (f32, f32)) -> Self {
        TextItem {
            text: text.into(),
            at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SideBox {
    pub side: Side,
    pub rect: Rect,
    pub label: TextItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSprite {
    pub id: TokenId,
    pub label: String,
    pub at: (f32, f32),
    pub side: Side,
    pub dragging: bool,
}

/// Everything a front end has to draw, in canvas units.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub boxes: Vec<SideBox>,
    pub equals: TextItem,
    pub tokens: Vec<TokenSprite>,
    pub solution: Option<TextItem>,
    pub history: Vec<TextItem>,
}
