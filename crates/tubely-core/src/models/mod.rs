pub mod media;
pub mod storage;
pub mod video;

pub use media::{MediaProfile, Orientation, ASPECT_RATIO_TOLERANCE};
pub use storage::{InvalidReference, StorageReference};
pub use video::{Video, VideoResponse};
