/// Horizontal layout parameters handed to every cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowLayout {
    /// Width of one indentation level.
    pub indentation_width: u32,
    /// Width of the expand/collapse control.
    pub toggle_size: u32,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RowLayout {
    pub const DEFAULT: Self = Self {
        indentation_width: 27,
        toggle_size: 19,
    };

    pub const fn new(indentation_width: u32, toggle_size: u32) -> Self {
        Self {
            indentation_width,
            toggle_size,
        }
    }

    /// Width of one indentation step. A step always fits the toggle control.
    pub fn indent_step(&self) -> u32 {
        self.indentation_width.max(self.toggle_size)
    }

    /// Leading inset of a row's content: one step per depth level, plus one when the row shows
    /// a toggle.
    pub fn leading_indent(&self, depth: usize, shows_toggle: bool) -> u32 {
        let steps = u32::try_from(depth)
            .unwrap_or(u32::MAX)
            .saturating_add(u32::from(shows_toggle));
        steps.saturating_mul(self.indent_step())
    }
}
