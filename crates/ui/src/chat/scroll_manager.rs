use gpui::{Pixels, ScrollHandle, px};

/// Near-bottom distance used to resume follow mode.
const AUTO_FOLLOW_RESUME_THRESHOLD: Pixels = px(24.);
/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// Tracks whether the message list should keep following the newest message.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    pending_scroll_to_bottom: bool,
    pending_jump: Option<usize>,
    follow_bottom: bool,
    last_scroll_offset: Pixels,
    last_max_offset: Pixels,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            pending_scroll_to_bottom: false,
            pending_jump: None,
            follow_bottom: true,
            last_scroll_offset: Pixels::ZERO,
            last_max_offset: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    pub fn is_following_bottom(&self) -> bool {
        self.follow_bottom
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.pending_jump = None;
        self.follow_bottom = true;
    }

    /// New messages pull the list to the tail unless a jump is still waiting to be applied.
    pub fn request_scroll_for_new_message(&mut self) {
        if self.pending_jump.is_none() {
            self.request_scroll_to_bottom();
        }
    }

    pub fn request_scroll_to_bottom_if_following(&mut self) {
        if self.pending_jump.is_none() && (self.follow_bottom || self.was_near_bottom()) {
            self.pending_scroll_to_bottom = true;
        }
    }

    /// Scrolls a specific row into view and pauses follow mode so reveal ticks do not pull it away.
    pub fn request_jump(&mut self, index: usize) {
        self.pending_jump = Some(index);
        self.pending_scroll_to_bottom = false;
        self.follow_bottom = false;
    }

    pub fn update_follow_state(&mut self) {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;
        let offset_delta = f32::from(offset) - f32::from(self.last_scroll_offset);
        let max_delta = (f32::from(max_offset) - f32::from(self.last_max_offset)).abs();
        let content_size_changed = max_delta > SCROLL_DELTA_EPSILON;
        let user_scrolled_up = offset_delta > SCROLL_DELTA_EPSILON && !content_size_changed;
        let user_scrolled_down = offset_delta < -SCROLL_DELTA_EPSILON && !content_size_changed;

        if self.pending_scroll_to_bottom
            || (content_size_changed && self.pending_jump.is_none() && self.was_near_bottom())
        {
            self.follow_bottom = true;
        } else if self.follow_bottom {
            if user_scrolled_up {
                self.follow_bottom = false;
            }
        } else if user_scrolled_down && self.is_near_bottom() {
            self.follow_bottom = true;
        }

        self.last_scroll_offset = offset;
        self.last_max_offset = max_offset;
    }

    /// Hands queued scroll requests to the handle; they resolve during the next layout.
    pub fn apply_pending_scroll(&mut self) -> bool {
        if let Some(index) = self.pending_jump.take() {
            self.scroll_handle.scroll_to_item(index);
            self.pending_scroll_to_bottom = false;
            return true;
        }

        let should_scroll = self.pending_scroll_to_bottom;
        if should_scroll {
            self.scroll_handle.scroll_to_bottom();
        }

        self.pending_scroll_to_bottom = false;
        should_scroll
    }

    fn is_near_bottom(&self) -> bool {
        let max_offset = self.scroll_handle.max_offset().height;
        if max_offset <= Pixels::ZERO {
            return true;
        }

        // Scrolling down makes the y offset negative, so `offset + max` approaches 0 at the tail.
        let offset = self.scroll_handle.offset().y;
        (offset + max_offset).abs() <= AUTO_FOLLOW_RESUME_THRESHOLD
    }

    fn was_near_bottom(&self) -> bool {
        let max_offset = self.last_max_offset;
        if max_offset <= Pixels::ZERO {
            return true;
        }

        let offset = self.last_scroll_offset;
        (offset + max_offset).abs() <= AUTO_FOLLOW_RESUME_THRESHOLD
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_pauses_follow_until_bottom_is_requested() {
        let mut manager = ScrollManager::new();
        assert!(manager.is_following_bottom());

        manager.request_jump(3);
        assert!(!manager.is_following_bottom());
        manager.request_scroll_to_bottom_if_following();
        assert!(manager.apply_pending_scroll());

        manager.request_scroll_to_bottom();
        assert!(manager.is_following_bottom());
        assert!(manager.apply_pending_scroll());
        assert!(!manager.apply_pending_scroll());
    }

    #[test]
    fn new_message_keeps_a_queued_jump() {
        let mut manager = ScrollManager::new();
        manager.request_jump(2);
        manager.request_scroll_for_new_message();
        assert!(!manager.is_following_bottom());
        assert!(manager.apply_pending_scroll());
        assert!(!manager.apply_pending_scroll());

        manager.request_scroll_for_new_message();
        assert!(manager.is_following_bottom());
        assert!(manager.apply_pending_scroll());
    }
}
