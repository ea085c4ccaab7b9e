pub mod free_camera;

pub use free_camera::Camera;
