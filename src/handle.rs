use std::sync::Arc;

use crate::encoded::EncodedImage;
use crate::error::{PicblendError, PicblendResult};

/// Where a handle's pixels came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Provenance {
    /// Selected from the local filesystem.
    LocalFile,
    /// Returned by the remote processing service.
    RemoteResult,
}

/// An owned, decoded bitmap: straight-alpha RGBA8, row-major, tightly packed.
///
/// The original encoded bytes are retained alongside the pixels so a selection
/// can be submitted to the remote service without a re-encode pass.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
    source: Arc<Vec<u8>>,
    provenance: Provenance,
}

impl ImageHandle {
    /// Decodes `bytes` as any raster format `image` supports.
    pub fn decode(bytes: Vec<u8>, provenance: Provenance) -> PicblendResult<Self> {
        let dyn_img = image::load_from_memory(&bytes)
            .map_err(|e| PicblendError::decode(format!("decode image from memory: {e}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba.into_raw()),
            source: Arc::new(bytes),
            provenance,
        })
    }

    pub fn from_encoded(encoded: &EncodedImage, provenance: Provenance) -> PicblendResult<Self> {
        Self::decode(encoded.as_bytes().to_vec(), provenance)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// The encoded bytes this handle was decoded from.
    pub fn source_bytes(&self) -> Arc<Vec<u8>> {
        self.source.clone()
    }

    #[cfg(test)]
    pub(crate) fn pixel_buffer(&self) -> Arc<Vec<u8>> {
        self.rgba8.clone()
    }
}

/// Proof that a load was issued for a slot; carries the sequence number used
/// to discard completions that are no longer the latest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
}

/// Outcome of handing a completed load back to its slot.
#[derive(Debug, PartialEq, Eq)]
pub enum SlotInstall {
    /// The handle was installed; the evicted prior handle (if any) has been
    /// released.
    Installed,
    /// A newer load was issued after this one; the completion was dropped and
    /// the slot is unchanged.
    Stale,
}

/// A named position holding at most one live [`ImageHandle`].
///
/// Replacement always evicts the prior handle exactly once. Loads are
/// asynchronous, so each issued load gets a monotonically increasing sequence
/// number and only the latest one may install its result.
#[derive(Debug, Default)]
pub struct Slot {
    handle: Option<ImageHandle>,
    latest_seq: u64,
}

impl Slot {
    /// Registers an in-flight load and invalidates every earlier ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_seq += 1;
        LoadTicket {
            seq: self.latest_seq,
        }
    }

    /// Installs a completed load, unless a newer load has been issued since.
    pub fn finish(&mut self, ticket: LoadTicket, handle: ImageHandle) -> SlotInstall {
        if ticket.seq != self.latest_seq {
            return SlotInstall::Stale;
        }
        self.handle = Some(handle);
        SlotInstall::Installed
    }

    /// Whether `ticket` still refers to the most recently issued load.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.seq == self.latest_seq
    }

    /// Releases the live handle, if any, and invalidates in-flight loads.
    pub fn clear(&mut self) {
        self.latest_seq += 1;
        self.handle = None;
    }

    pub fn get(&self) -> Option<&ImageHandle> {
        self.handle.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.handle.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_reports_dimensions_and_keeps_source_bytes() {
        let bytes = png_bytes(3, 2, [10, 20, 30, 255]);
        let handle = ImageHandle::decode(bytes.clone(), Provenance::LocalFile).unwrap();

        assert_eq!(handle.width(), 3);
        assert_eq!(handle.height(), 2);
        assert_eq!(handle.rgba8().len(), 3 * 2 * 4);
        assert_eq!(handle.source_bytes().as_slice(), bytes.as_slice());
        assert_eq!(handle.provenance(), Provenance::LocalFile);
    }

    #[test]
    fn decode_rejects_non_image_bytes() {
        let result = ImageHandle::decode(b"not an image".to_vec(), Provenance::LocalFile);
        assert!(matches!(result, Err(crate::PicblendError::Decode(_))));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut slot = Slot::default();
        let older = slot.begin_load();
        let newer = slot.begin_load();

        let first = ImageHandle::decode(png_bytes(1, 1, [0, 0, 0, 255]), Provenance::LocalFile)
            .unwrap();
        let second = ImageHandle::decode(png_bytes(2, 2, [0, 0, 0, 255]), Provenance::LocalFile)
            .unwrap();

        // The newer load completes first, then the slower older one arrives.
        assert_eq!(slot.finish(newer, second), SlotInstall::Installed);
        assert_eq!(slot.finish(older, first), SlotInstall::Stale);
        assert_eq!(slot.get().unwrap().width(), 2);
    }

    #[test]
    fn replacement_releases_the_prior_handle_exactly_once() {
        let mut slot = Slot::default();
        let first = ImageHandle::decode(png_bytes(1, 1, [1, 2, 3, 255]), Provenance::LocalFile)
            .unwrap();
        let probe = first.pixel_buffer();
        assert_eq!(std::sync::Arc::strong_count(&probe), 2);

        let t = slot.begin_load();
        slot.finish(t, first);
        assert_eq!(std::sync::Arc::strong_count(&probe), 2);

        let second = ImageHandle::decode(png_bytes(1, 1, [4, 5, 6, 255]), Provenance::LocalFile)
            .unwrap();
        let t = slot.begin_load();
        slot.finish(t, second);

        // Only the probe still references the replaced pixels.
        assert_eq!(std::sync::Arc::strong_count(&probe), 1);
    }

    #[test]
    fn clear_invalidates_in_flight_loads() {
        let mut slot = Slot::default();
        let ticket = slot.begin_load();
        slot.clear();

        let handle = ImageHandle::decode(png_bytes(1, 1, [0, 0, 0, 255]), Provenance::LocalFile)
            .unwrap();
        assert_eq!(slot.finish(ticket, handle), SlotInstall::Stale);
        assert!(!slot.is_set());
    }
}
