pub mod http;
pub mod task;
pub mod work;
