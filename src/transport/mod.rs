pub mod traits;
pub mod udp;

pub use traits::CommandSender;
pub use udp::UdpSender;
