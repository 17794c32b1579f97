/// Download progress accounting

/// Bytes between log lines when the image size is unknown
const UNKNOWN_SIZE_STEP: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTracker {
    total: Option<usize>,
    written: usize,
    last_step: usize,
}

impl ProgressTracker {
    pub fn new(total: Option<usize>) -> Self {
        Self {
            total: total.filter(|&t| t > 0),
            written: 0,
            last_step: 0,
        }
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn percent(&self) -> Option<u8> {
        self.total
            .map(|total| ((self.written.min(total) * 100) / total) as u8)
    }

    /// Record `n` more bytes. Returns true when a new reporting step was
    /// crossed (every 10 %, or every 64 KiB without a known size).
    pub fn advance(&mut self, n: usize) -> bool {
        self.written += n;

        let step = match self.percent() {
            Some(p) => p as usize / 10,
            None => self.written / UNKNOWN_SIZE_STEP,
        };

        if step > self.last_step {
            self.last_step = step;
            true
        } else {
            false
        }
    }
}
