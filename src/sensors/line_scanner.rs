// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line-camera scan sequencing.
//!
//! The linear camera shifts out one analog pixel per clock. A scan starts with a start-of-
//! integration (SI) pulse, then every pixel clock tick triggers one ADC conversion and every
//! conversion-complete event stores one binarized pixel. Once the whole line has been read the
//! frame waits in [`ScanState::Evaluating`] until the control tick takes it.
//!
//! ```text
//!   Idle --(prev count reached length)--> Scanning --(cursor == length)--> Evaluating
//!    ^                                                                        |
//!    +------------------------------- take_frame() ---------------------------+
//! ```

use log::trace;

use crate::config::ScanConfig;

/// Slots in the pixel buffer. Scans may use up to this many.
pub const BUFFER_CAPACITY: usize = 132;

/// One binarized camera sample.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pixel {
    /// Dark tape.
    Line,
    /// Bright floor.
    Background,
}

/// Fixed-capacity frame of binarized pixels with a write cursor.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    pixels: [Pixel; BUFFER_CAPACITY],
    cursor: usize,
}

impl PixelBuffer {
    pub const fn new() -> Self {
        Self {
            pixels: [Pixel::Background; BUFFER_CAPACITY],
            cursor: 0,
        }
    }

    /// Build a buffer from a slice of pixels, cursor after the last one.
    pub fn from_pixels(src: &[Pixel]) -> Self {
        let mut buf = Self::new();
        for &p in src.iter().take(BUFFER_CAPACITY) {
            buf.push(p);
        }
        buf
    }

    /// Append a pixel at the cursor. Returns false if the buffer is full.
    pub fn push(&mut self, pixel: Pixel) -> bool {
        if self.cursor >= BUFFER_CAPACITY {
            return false;
        }
        self.pixels[self.cursor] = pixel;
        self.cursor += 1;
        true
    }

    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Number of pixels written this cycle.
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Pixel at `index`, `None` beyond the written range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Pixel> {
        if index < self.cursor {
            Some(self.pixels[index])
        } else {
            None
        }
    }

    /// Written pixels.
    #[inline]
    pub fn as_slice(&self) -> &[Pixel] {
        &self.pixels[..self.cursor]
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Acquisition state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScanState {
    Idle,
    Scanning,
    Evaluating,
}

/// What the pixel clock handler must do after a tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScanAction {
    None,
    /// Pulse SI, arm the SI toggle timer and emit the scan-start marker.
    StartIntegration,
    /// Start one ADC conversion.
    TriggerConversion,
    /// The last pixel has been stored; the frame is ready for evaluation.
    FrameReady,
}

/// Scan state machine and its pixel buffer.
pub struct LineScanner {
    state: ScanState,
    buffer: PixelBuffer,
    scan_length: usize,
    threshold: u16,
    /// Pixel count of the previous cycle. Starts "complete" so the first tick opens a scan.
    last_count: usize,
    frames: u32,
}

impl LineScanner {
    pub fn new(cfg: &ScanConfig) -> Self {
        let scan_length = cfg.scan_length.min(BUFFER_CAPACITY);
        Self {
            state: ScanState::Idle,
            buffer: PixelBuffer::new(),
            scan_length,
            threshold: cfg.threshold_raw(),
            last_count: scan_length,
            frames: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.buffer.len()
    }

    /// Completed frames since power-up.
    #[inline]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Binarize a raw 16-bit sample.
    #[inline]
    pub fn binarize(&self, sample: u16) -> Pixel {
        if sample <= self.threshold {
            Pixel::Line
        } else {
            Pixel::Background
        }
    }

    /// Pixel clock tick.
    pub fn on_pixel_tick(&mut self) -> ScanAction {
        match self.state {
            ScanState::Idle => {
                if self.last_count >= self.scan_length {
                    self.buffer.reset();
                    self.state = ScanState::Scanning;
                    trace!("scan: start");
                    ScanAction::StartIntegration
                } else {
                    ScanAction::None
                }
            }
            ScanState::Scanning => {
                if self.buffer.len() < self.scan_length {
                    ScanAction::TriggerConversion
                } else {
                    self.state = ScanState::Evaluating;
                    self.last_count = self.buffer.len();
                    self.frames = self.frames.wrapping_add(1);
                    ScanAction::FrameReady
                }
            }
            ScanState::Evaluating => ScanAction::None,
        }
    }

    /// ADC conversion-complete event. Samples outside a scan are dropped.
    pub fn on_conversion_complete(&mut self, sample: u16) {
        if self.state != ScanState::Scanning || self.buffer.len() >= self.scan_length {
            return;
        }
        let pixel = self.binarize(sample);
        self.buffer.push(pixel);
    }

    /// Hand over the completed frame and return to idle.
    pub fn take_frame(&mut self) -> Option<&PixelBuffer> {
        if self.state != ScanState::Evaluating {
            return None;
        }
        self.state = ScanState::Idle;
        Some(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARK: u16 = 10_000;
    const BRIGHT: u16 = 60_000;

    fn scanner() -> LineScanner {
        LineScanner::new(&ScanConfig::default())
    }

    fn run_scan(scanner: &mut LineScanner, sample: impl Fn(usize) -> u16) {
        assert_eq!(scanner.on_pixel_tick(), ScanAction::StartIntegration);
        let mut i = 0;
        loop {
            match scanner.on_pixel_tick() {
                ScanAction::TriggerConversion => {
                    scanner.on_conversion_complete(sample(i));
                    i += 1;
                }
                ScanAction::FrameReady => break,
                other => panic!("unexpected action {:?}", other),
            }
        }
    }

    #[test]
    fn first_tick_starts_integration() {
        let mut s = scanner();
        assert_eq!(s.state(), ScanState::Idle);
        assert_eq!(s.on_pixel_tick(), ScanAction::StartIntegration);
        assert_eq!(s.state(), ScanState::Scanning);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn binarizes_against_threshold() {
        let s = scanner();
        assert_eq!(s.binarize(0), Pixel::Line);
        assert_eq!(s.binarize(49_675), Pixel::Line);
        assert_eq!(s.binarize(49_676), Pixel::Background);
        assert_eq!(s.binarize(u16::MAX), Pixel::Background);
    }

    #[test]
    fn full_scan_fills_buffer_and_waits_for_evaluation() {
        let mut s = scanner();
        run_scan(&mut s, |i| if (30..40).contains(&i) { DARK } else { BRIGHT });

        assert_eq!(s.state(), ScanState::Evaluating);
        assert_eq!(s.cursor(), 130);
        assert_eq!(s.on_pixel_tick(), ScanAction::None);

        let frame = s.take_frame().unwrap();
        assert_eq!(frame.len(), 130);
        assert_eq!(frame.get(29), Some(Pixel::Background));
        assert_eq!(frame.get(30), Some(Pixel::Line));
        assert_eq!(frame.get(39), Some(Pixel::Line));
        assert_eq!(frame.get(40), Some(Pixel::Background));
        assert_eq!(frame.get(130), None);

        assert_eq!(s.state(), ScanState::Idle);
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn next_round_resets_cursor() {
        let mut s = scanner();
        run_scan(&mut s, |_| BRIGHT);
        assert!(s.take_frame().is_some());
        assert_eq!(s.on_pixel_tick(), ScanAction::StartIntegration);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn no_frame_until_scan_completes() {
        let mut s = scanner();
        s.on_pixel_tick();
        s.on_pixel_tick();
        s.on_conversion_complete(DARK);
        assert!(s.take_frame().is_none());
        assert_eq!(s.state(), ScanState::Scanning);
    }

    #[test]
    fn stray_conversions_are_dropped() {
        let mut s = scanner();
        s.on_conversion_complete(DARK);
        assert_eq!(s.cursor(), 0);

        run_scan(&mut s, |_| BRIGHT);
        s.on_conversion_complete(DARK);
        assert_eq!(s.cursor(), 130);
    }

    #[test]
    fn pixel_buffer_rejects_overflow() {
        let mut buf = PixelBuffer::new();
        for _ in 0..BUFFER_CAPACITY {
            assert!(buf.push(Pixel::Line));
        }
        assert!(!buf.push(Pixel::Line));
        assert_eq!(buf.len(), BUFFER_CAPACITY);
    }
}
