use glam::Vec2;

/// Input gathered between two ticks. Movement intent persists until changed;
/// everything else is consumed by the tick that reads it.
#[derive(Debug, Default)]
pub struct InputState {
    pub forward: f32,
    pub strafe: f32,
    /// Accumulated look change, `x` = pitch and `y` = yaw, in degrees.
    pub look_delta: Vec2,
    pub scroll_delta: f32,
    jump: bool,
    break_block: bool,
    place_block: bool,
    selected_slot: Option<usize>,
}

impl InputState {
    pub fn set_movement(&mut self, forward: f32, strafe: f32) {
        self.forward = forward.clamp(-1.0, 1.0);
        self.strafe = strafe.clamp(-1.0, 1.0);
    }

    pub fn stop(&mut self) {
        self.forward = 0.0;
        self.strafe = 0.0;
    }

    pub fn add_look_delta(&mut self, pitch: f32, yaw: f32) {
        self.look_delta += Vec2::new(pitch, yaw);
    }

    pub fn add_scroll(&mut self, delta: f32) {
        self.scroll_delta += delta;
    }

    pub fn request_jump(&mut self) {
        self.jump = true;
    }

    pub fn request_break(&mut self) {
        self.break_block = true;
    }

    pub fn request_place(&mut self) {
        self.place_block = true;
    }

    pub fn select_slot(&mut self, slot: usize) {
        self.selected_slot = Some(slot);
    }

    pub fn consume_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump)
    }

    pub fn consume_break(&mut self) -> bool {
        std::mem::take(&mut self.break_block)
    }

    pub fn consume_place(&mut self) -> bool {
        std::mem::take(&mut self.place_block)
    }

    pub fn consume_selected_slot(&mut self) -> Option<usize> {
        self.selected_slot.take()
    }

    pub fn clear_frame(&mut self) {
        self.look_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}
