// Web front-end tuning constants

// Pointer drag to orbit (radians per CSS pixel)
pub const ORBIT_RADIANS_PER_PX: f32 = 0.005;

// Wheel zoom: dolly factor is exp(delta_y * this)
pub const WHEEL_DOLLY_RATE: f32 = 0.001;

// Scene clear colour
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

// DOM hooks
pub const FPS_COUNTER_ID: &str = "fps-counter";
pub const FPS_EVENT: &str = "fps-update";
