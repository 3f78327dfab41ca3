// Shared tuning constants for the spine, audio envelope and deformation field.
// Runtime-tunable groups start from these values via their `Default` impls.

// Spine chain
pub const SPINE_LENGTH: f32 = 50.0; // axial span covered by the chain
pub const SPINE_POINTS: usize = 20; // also the shader-side array capacity
pub const SPRING_STIFFNESS: f32 = 100.0;
pub const SPRING_DAMPING: f32 = 4.0;
pub const POINT_MASS: f32 = 1.0; // interior points; endpoints are pinned
pub const LINEAR_DAMPING: f32 = 0.5; // fraction of velocity lost per second
pub const FORCE_GAIN: f32 = 500.0; // impulse magnitude per unit of audio level
pub const FORCE_FALLOFF_RADIUS: usize = 2; // neighbours reached each side
pub const FORCE_AXIAL_JITTER: f32 = 0.2; // keeps impulses mostly transverse
pub const MAX_POINT_SPEED: f32 = 60.0; // units/sec clamp after each sub-step

// Fixed-step integration
pub const FIXED_STEP_SEC: f64 = 1.0 / 60.0;
pub const MAX_SUBSTEPS: u32 = 3;

// Audio envelope
pub const ENVELOPE_ATTACK: f32 = 0.5;
pub const ENVELOPE_DECAY: f32 = 0.1;
pub const AUDIO_NOISE_FLOOR: f32 = 0.01; // below this no force or bounce
pub const ANALYSER_FFT_SIZE: u32 = 256;
pub const PLAY_X_SENTINEL: f32 = -9999.0;
pub const PLAY_X_VALID_ABOVE: f32 = -9000.0;

// Deformation field
pub const SOUP_FREQUENCY: f32 = 2.0;
pub const SOUP_SPEED: f32 = 0.5;
pub const SOUP_AMPLITUDE: f32 = 3.0;
pub const SOUP_PHASE_Y: f32 = 100.0;
pub const SOUP_PHASE_Z: f32 = 200.0;
pub const BOUNCE_RADIUS: f32 = 3.0; // zero influence beyond this axial distance
pub const BOUNCE_GAIN: f32 = 8.0;
pub const PLAY_GLOW_RANGE: f32 = 5.0;

// Uniform smoothing
pub const SCALAR_SMOOTHING: f32 = 0.2;
pub const PALETTE_SMOOTHING: f32 = 0.1;
pub const PALETTE_LEN: usize = 6;

// Control surface
pub const DIST_NEAR_MIN: f32 = 2.0;
pub const DIST_NEAR_SPAN: f32 = 148.0;
pub const DIST_FAR_RATIO: f32 = 1.5;
pub const XOR_DENSITY_FLOOR: f32 = 0.008;
pub const XOR_KNEE: f32 = 33.0; // slider value where the curve turns exponential
pub const XOR_THRESHOLD_MIN: f32 = 0.005;

// Camera framing
pub const CAMERA_FOV_DEG: f32 = 50.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 2000.0;
pub const CAMERA_FIT_MARGIN: f32 = 1.4;
pub const CAMERA_FIT_DIR: [f32; 3] = [1.0, 0.6, 1.0];
pub const PAN_REFERENCE_HEIGHT: f32 = 15.0; // pan slider units span this model height

// Performance monitor
pub const FPS_WINDOW_MS: f64 = 250.0;
pub const FPS_FRAME_MS: f64 = 16.66;
