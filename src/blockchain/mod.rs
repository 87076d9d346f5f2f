pub mod rpc_client;
pub mod decoder;
pub mod block_processor;
pub mod block_monitor;

pub use rpc_client::{RpcClient, RpcGateway};
pub use decoder::{decode_block, decode_block_number, format_block_number};
pub use block_processor::{BlockProcessor, filter_for_address};
pub use block_monitor::{BlockMonitor, BlockMonitorConfig, PollOutcome};
