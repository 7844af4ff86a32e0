pub mod gains;
pub mod info;
pub mod init;
pub mod remove_silence;
pub mod render_frame;
pub mod validate;
