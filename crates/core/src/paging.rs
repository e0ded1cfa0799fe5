//! Page-window computation for pagination controls.
//!
//! A listing renders at most 5 clickable page buttons. The window slides
//! with the current page and, when it ends well short of the final page,
//! an ellipsis plus the final page number is shown as a jump shortcut.

/// The set of page numbers to render as pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Consecutive page numbers to show as buttons.
    pub pages: Vec<u32>,
    /// Final page shown after an ellipsis, when the window ends more than
    /// two pages short of it.
    pub jump_to_last: Option<u32>,
}

impl PageWindow {
    /// Compute the window for `current` within `total_pages`.
    ///
    /// `current` must already be within `[1, total_pages]`; both values are
    /// treated as at least 1.
    #[must_use]
    pub fn compute(total_pages: u32, current: u32) -> Self {
        let total_pages = total_pages.max(1);
        let current = current.clamp(1, total_pages);

        let first = if total_pages <= 5 || current <= 3 {
            1
        } else if current >= total_pages - 2 {
            total_pages - 4
        } else {
            current - 2
        };
        let last = (first + 4).min(total_pages);

        let jump_to_last = (total_pages > 5 && last < total_pages - 2).then_some(total_pages);

        Self {
            pages: (first..=last).collect(),
            jump_to_last,
        }
    }
}
