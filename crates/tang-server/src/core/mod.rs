//! Protocol validation shared by the endpoint handlers

mod validation;

pub use validation::{
    authorize_exchange_key, constant_time_eq, validate_client_key, ClientKeyRequest,
    ExchangeKeyError, MAX_COORDINATE_LEN,
};
