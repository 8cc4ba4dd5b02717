//! Picblend previews, compares and composes two raster images client-side: a
//! subject ("foreground") photo and an optional background, plus the composite
//! a remote processing service produces from them.
//!
//! # Component overview
//!
//! 1. **Composition engine** (`fit`, `composite`, `render`): stateless layout
//!    and drawing — fit an image into a surface under a policy, layer the two
//!    inputs in fixed z-order, export the surface as a lossless PNG.
//! 2. **Comparison slider** (`slider`): the reveal control clipping one image
//!    against another by pointer position; a pure state machine fed unified
//!    mouse/touch events.
//! 3. **Session orchestrator** (`session`): owns the image slots and the
//!    single in-flight submission to the remote service (`remote`), and
//!    drives the composition engine for previews.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single control thread**: all session mutation happens through named
//!   transition functions in response to discrete events; the two suspending
//!   operations (image decode, the remote call) resume via `begin`/`finish`
//!   pairs with stale-completion suppression.
//! - **Straight-alpha RGBA8** surfaces end to end, exported as-is to PNG.
#![forbid(unsafe_code)]

mod composite;
mod encoded;
mod error;
mod export;
mod fit;
mod handle;
mod remote;
mod render;
mod session;
mod slider;

pub use composite::{Rgba8, over, over_in_place};
pub use encoded::EncodedImage;
pub use error::{PicblendError, PicblendResult};
pub use export::{
    COMPOSITE_FILENAME, FINAL_IMAGE_FILENAME, SUBJECT_ONLY_FILENAME, write_encoded,
    write_surface_png,
};
pub use fit::{FOREGROUND_HEIGHT_BUDGET, FitPolicy, LayoutRect, Size, compute_fit};
pub use handle::{ImageHandle, LoadTicket, Provenance, Slot, SlotInstall};
pub use remote::{GENERIC_PROCESS_ERROR, HttpProcessService, ProcessService, SubmitRequest};
pub use render::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, Surface, render_preview};
pub use session::{InputSlot, LoadOutcome, ResultBundle, ResultView, Session, SessionPhase};
pub use slider::{
    CaptureChange, CompareSlider, PointerEvent, PointerId, SliderLayout, SliderState,
    WidgetBounds,
};
