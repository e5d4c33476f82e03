//! # Page Break Decisions
//!
//! Verdicts, bump results and the per-node break rules, plus the
//! orphan/widow arithmetic shared by every kind that splits by lines or rows.

use crate::design::DesignElement;
use crate::error::DesignError;

/// How a drafted node relates to the current page's body box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakVerdict {
    /// Fits entirely.
    ThisPage,
    /// Fits partially; `page_split_index` marks the first unit that moves.
    Split,
    /// Does not fit at all and moves whole to the next page.
    Overflow,
    /// An unsplittable part (e.g. a list bullet) does not fit, so the whole
    /// node moves.
    NewPage,
}

impl BreakVerdict {
    pub fn moves_whole(&self) -> bool {
        matches!(self, BreakVerdict::Overflow | BreakVerdict::NewPage)
    }
}

/// Outcome of forcing a split point forward when nothing fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpResult {
    Bumped,
    /// The node already has a split point that keeps content on this page.
    Unnecessary,
    /// The node cannot be divided; it has to be placed whole.
    Impossible,
}

/// Break policy attached to every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBreakRules {
    /// Start this node on a fresh page unless it is already the first
    /// content of its page.
    pub new_page: bool,
    /// Move this node together with a wholly-overflowing successor.
    pub keep_with_next: bool,
    /// Minimum lines/rows on each side of a split.
    pub min_lines: usize,
}

impl Default for PageBreakRules {
    fn default() -> Self {
        Self {
            new_page: false,
            keep_with_next: false,
            min_lines: 1,
        }
    }
}

impl PageBreakRules {
    pub fn from_element(el: &DesignElement) -> Result<Self, DesignError> {
        let min_lines = match el.get_u32("minLines")? {
            Some(0) => return Err(el.error("minLines must be at least 1")),
            Some(n) => n as usize,
            None => 1,
        };
        Ok(Self {
            new_page: el.flag("newPage")?,
            keep_with_next: el.flag("keepWithNext")?,
            min_lines,
        })
    }
}

/// Given how many of `total` units fit, choose how many stay on this page so
/// that at least `min_lines` units end up on each side. `None` means the
/// node cannot be split and has to move whole.
pub fn adjust_split(fit: usize, total: usize, min_lines: usize) -> Option<usize> {
    let min = min_lines.max(1);
    if fit == 0 || fit >= total {
        return None;
    }

    // too few units would stay behind (orphans)
    if fit < min {
        return None;
    }

    // too few units would move (widows): pull some back
    let remaining = total - fit;
    if remaining < min {
        let adjusted = fit.saturating_sub(min - remaining);
        if adjusted < min {
            return None;
        }
        return Some(adjusted);
    }

    Some(fit)
}
