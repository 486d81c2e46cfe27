//! The transcript: what the terminal has printed so far

use crate::data::Tone;

/// Identifies an output region, stable across clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(u64);

/// Handle for updating a line in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineHandle {
    region: RegionId,
    index: usize,
}

/// What the core needs from a screen
pub trait DisplaySink {
    fn open_region(&mut self, tone: Tone) -> RegionId;
    fn set_tone(&mut self, region: RegionId, tone: Tone);
    fn append_line(&mut self, region: RegionId, text: &str) -> LineHandle;
    fn update_line(&mut self, handle: LineHandle, text: &str);
    fn clear(&mut self);
    fn scroll_to_latest(&mut self);
}

/// A block of output produced by one command or event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: RegionId,
    pub tone: Tone,
    pub lines: Vec<String>,
}

/// In-memory display sink rendered by the TUI
#[derive(Debug, Clone)]
pub struct Transcript {
    regions: Vec<Region>,
    next_id: u64,
    /// Lines scrolled back from the bottom; 0 follows the latest output
    pub scroll_back: usize,
    max_regions: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            next_id: 0,
            scroll_back: 0,
            max_regions: 500,
        }
    }

    fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    /// Every line with its region's tone, oldest first
    pub fn lines(&self) -> impl Iterator<Item = (Tone, &str)> {
        self.regions
            .iter()
            .flat_map(|r| r.lines.iter().map(move |l| (r.tone, l.as_str())))
    }

    pub fn line_count(&self) -> usize {
        self.regions.iter().map(|r| r.lines.len()).sum()
    }

    /// True if any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|(_, l)| l.contains(needle))
    }

    pub fn last_line(&self) -> Option<&str> {
        self.regions
            .iter()
            .rev()
            .find_map(|r| r.lines.last())
            .map(String::as_str)
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll_back = (self.scroll_back + amount).min(self.line_count());
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(amount);
    }
}

impl DisplaySink for Transcript {
    fn open_region(&mut self, tone: Tone) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        self.regions.push(Region {
            id,
            tone,
            lines: Vec::new(),
        });
        if self.regions.len() > self.max_regions {
            self.regions.remove(0);
        }
        id
    }

    fn set_tone(&mut self, region: RegionId, tone: Tone) {
        if let Some(r) = self.region_mut(region) {
            r.tone = tone;
        }
    }

    fn append_line(&mut self, region: RegionId, text: &str) -> LineHandle {
        let index = match self.region_mut(region) {
            Some(r) => {
                r.lines.push(text.to_string());
                r.lines.len() - 1
            }
            None => 0,
        };
        LineHandle { region, index }
    }

    fn update_line(&mut self, handle: LineHandle, text: &str) {
        // Handles into cleared regions go nowhere
        if let Some(line) = self
            .region_mut(handle.region)
            .and_then(|r| r.lines.get_mut(handle.index))
        {
            line.clear();
            line.push_str(text);
        }
    }

    fn clear(&mut self) {
        self.regions.clear();
        self.scroll_back = 0;
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_back = 0;
    }
}
