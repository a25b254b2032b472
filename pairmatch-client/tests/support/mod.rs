pub mod mock_media;

pub use mock_media::MockMedia;
