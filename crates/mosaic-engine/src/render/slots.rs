/// Per-frame regions of one GPU buffer.
///
/// `Queue::write_buffer` lands at submit time, ahead of every pass recorded
/// for that frame, so each draw of a frame reads from its own region. Regions
/// are handed out in call order and recycled when the frame number changes.
/// Each region remembers the data generation last written to it.
#[derive(Debug)]
pub(crate) struct FrameSlots {
    stride: u64,
    written: Vec<Option<u64>>,
    generation: u64,
    frame: Option<u64>,
    cursor: usize,
}

/// Region handed to one draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct SlotClaim {
    /// Byte offset of the region.
    pub offset: u64,
    /// The region holds older data and must be written.
    pub upload: bool,
    /// Capacity doubled; the buffer must be reallocated at
    /// [`FrameSlots::buffer_size`].
    pub grew: bool,
}

impl FrameSlots {
    /// `size` bytes per region, rounded up to `alignment`.
    pub(crate) fn new(size: u64, alignment: u64, capacity: usize) -> Self {
        let alignment = alignment.max(1);
        Self {
            stride: size.max(1).div_ceil(alignment) * alignment,
            written: vec![None; capacity.max(1)],
            generation: 0,
            frame: None,
            cursor: 0,
        }
    }

    pub(crate) fn stride(&self) -> u64 {
        self.stride
    }

    pub(crate) fn capacity(&self) -> usize {
        self.written.len()
    }

    pub(crate) fn buffer_size(&self) -> u64 {
        self.stride * self.written.len() as u64
    }

    /// Next region of `frame`. `changed` says the data differs from the last
    /// claim's.
    pub(crate) fn claim(&mut self, frame: u64, changed: bool) -> SlotClaim {
        if self.frame != Some(frame) {
            self.frame = Some(frame);
            self.cursor = 0;
        }
        if changed {
            self.generation += 1;
        }

        let slot = self.cursor;
        self.cursor += 1;

        let grew = slot >= self.written.len();
        if grew {
            // A fresh buffer holds nothing yet.
            let capacity = (self.written.len() * 2).max(slot + 1);
            self.written = vec![None; capacity];
        }

        let upload = self.written[slot] != Some(self.generation);
        self.written[slot] = Some(self.generation);

        SlotClaim {
            offset: slot as u64 * self.stride,
            upload,
            grew,
        }
    }
}
