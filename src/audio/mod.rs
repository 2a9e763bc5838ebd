pub mod clip;
pub mod convert;
pub mod frame;

pub use clip::AudioClip;
pub use frame::AudioFrame;
