use std::collections::HashMap;

/// Bounds on retained scratch pixmaps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfacePoolOpts {
    pub(crate) max_bytes: usize,
    pub(crate) max_per_size: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024,
            max_per_size: 4,
        }
    }
}

fn byte_len(w: u16, h: u16) -> usize {
    usize::from(w) * usize::from(h) * 4
}

/// Scratch pixmaps for masks and glyph layers, reused across draws of the same size.
///
/// Borrowed pixmaps come back cleared to transparent.
#[derive(Default)]
pub(crate) struct SurfacePool {
    opts: SurfacePoolOpts,
    free: HashMap<(u16, u16), Vec<vello_cpu::Pixmap>>,
    retained_bytes: usize,
    allocations: u64,
}

impl SurfacePool {
    pub(crate) fn borrow(&mut self, w: u16, h: u16) -> vello_cpu::Pixmap {
        if let Some(mut p) = self.free.get_mut(&(w, h)).and_then(Vec::pop) {
            self.retained_bytes -= byte_len(w, h);
            p.data_as_u8_slice_mut().fill(0);
            return p;
        }
        self.allocations += 1;
        tracing::trace!(w, h, allocations = self.allocations, "allocating scratch pixmap");
        vello_cpu::Pixmap::new(w, h)
    }

    pub(crate) fn release(&mut self, pixmap: vello_cpu::Pixmap) {
        let size = (pixmap.width(), pixmap.height());
        let bytes = byte_len(size.0, size.1);
        if self.retained_bytes + bytes > self.opts.max_bytes {
            return;
        }
        let slot = self.free.entry(size).or_default();
        if slot.len() < self.opts.max_per_size {
            slot.push(pixmap);
            self.retained_bytes += bytes;
        }
    }

    #[cfg(test)]
    fn retained(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }
}
