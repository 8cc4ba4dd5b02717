//! Placement math for fitting an image into a target surface.
//!
//! Two policies cover every preview layer:
//!
//! - [`FitPolicy::Cover`]: scale-to-fill; exactly one axis equals the container
//!   and the other overflows (clipped at draw time), centered.
//! - [`FitPolicy::ContainNoUpscale`]: scale-to-fit within a height budget,
//!   never above intrinsic size, centered on both axes.

/// Height fraction the preview grants the foreground layer.
pub const FOREGROUND_HEIGHT_BUDGET: f32 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Placement of one image within a target surface.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FitPolicy {
    Cover,
    ContainNoUpscale { height_budget: f32 },
}

/// Computes where `intrinsic` lands inside `container` under `policy`.
///
/// Degenerate (zero or negative) sizes produce an empty rect rather than
/// NaN/infinite coordinates.
pub fn compute_fit(container: Size, intrinsic: Size, policy: FitPolicy) -> LayoutRect {
    if container.is_degenerate() || intrinsic.is_degenerate() {
        return LayoutRect::default();
    }

    match policy {
        FitPolicy::Cover => {
            let scale = (container.width / intrinsic.width)
                .max(container.height / intrinsic.height);
            let width = intrinsic.width * scale;
            let height = intrinsic.height * scale;
            LayoutRect {
                x: (container.width - width) / 2.0,
                y: (container.height - height) / 2.0,
                width,
                height,
            }
        }
        FitPolicy::ContainNoUpscale { height_budget } => {
            let budget = container.height * height_budget.max(0.0);
            let height = budget.min(intrinsic.height);
            let width = height * (intrinsic.width / intrinsic.height);
            LayoutRect {
                x: (container.width - width) / 2.0,
                y: (container.height - height) / 2.0,
                width,
                height,
            }
        }
    }
}
