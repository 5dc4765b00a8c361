pub mod ip;

pub use ip::{ClientIpPolicy, resolve_subject_ip};
