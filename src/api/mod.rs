pub mod http;

pub use http::{
    router, ApiServer, AppState, CurrentBlockResponse, ErrorResponse, MessageResponse,
    SubscribeRequest, TransactionsResponse, get_current_block, get_transactions, subscribe,
};
