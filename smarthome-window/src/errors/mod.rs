mod notify;

pub use notify::NotifyError;
