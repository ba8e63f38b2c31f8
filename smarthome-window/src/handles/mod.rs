mod window_handle;

pub use window_handle::*;
