//! Frame list parsing

use animvox_core::{Error, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ascending, duplicate-free list of frame numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameList {
    frames: Vec<i32>,
}

impl FrameList {
    /// Parse a comma-separated list such as `"1,10,20"`.
    ///
    /// Whitespace around entries is ignored. Frames are sorted and duplicates
    /// dropped. An empty list or any entry that is not an integer is
    /// [`Error::InvalidFrameList`].
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidFrameList {
            input: input.to_string(),
            reason,
        };

        if input.trim().is_empty() {
            return Err(invalid("no frames given".to_string()));
        }

        let frames: Vec<i32> = input
            .split(',')
            .map(str::trim)
            .map(|entry| {
                entry
                    .parse::<i32>()
                    .map_err(|e| invalid(format!("{:?} is not a frame number: {}", entry, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_frames(frames))
    }

    pub fn from_frames(frames: impl IntoIterator<Item = i32>) -> Self {
        Self {
            frames: frames.into_iter().sorted_unstable().dedup().collect(),
        }
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.frames.iter().copied()
    }
}

impl FromStr for FrameList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FrameList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frames.iter().join(","))
    }
}
