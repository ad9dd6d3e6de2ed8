// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::pixel::Frame;

/// Decoded frames in display order, each paired with its display duration.
///
/// Delays are in animation ticks (one tick is one time-base unit of the
/// stream's animation header). Frames and delays can only be added together,
/// so `frames().len() == delays().len()` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Animation {
    frames: Vec<Frame>,
    delays: Vec<u32>,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
            delays: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, frame: Frame, delay: u32) {
        self.frames.push(frame);
        self.delays.push(delay);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Consume the animation, keeping only frame 0.
    pub fn into_first(self) -> Option<Frame> {
        self.frames.into_iter().next()
    }

    pub fn into_parts(self) -> (Vec<Frame>, Vec<u32>) {
        (self.frames, self.delays)
    }

    /// Frames paired with their delays, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&Frame, u32)> {
        self.frames.iter().zip(self.delays.iter().copied())
    }

    /// Sum of all delays in ticks.
    pub fn total_ticks(&self) -> u64 {
        self.delays.iter().map(|&d| d as u64).sum()
    }
}
