pub mod camera;
pub mod cli;
pub mod coordinator;
pub mod loaders;
pub mod math;
pub mod options;
pub mod orbit;
pub mod physics;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod transition;

pub use coordinator::{Coordinator, InputCommand, LAPTOP_POSE, MONITOR_POSE};
pub use transition::{TransitionController, ViewPose, DEFAULT_POSE};
