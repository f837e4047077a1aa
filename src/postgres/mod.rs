//! Postgres Frontend and Backend Protocol
//!
//! Docs here mostly quoted from the official postgres documentation.
//!
//! ## Messaging Overview
//!
//! All communication is through a stream of messages. The first byte of a
//! message identifies the message type, and the next four bytes specify the
//! length of the rest of the message (this length count includes itself,
//! but not the message-type byte). The remaining contents of the message are
//! determined by the message type.
//!
//! ```text
//! ┏━━━━┳━━━━━━━━━━━━━━━━━━━┳━━━━━━┓
//! ┃ Ty ┃       Length      ┃ Body ┃
//! ┣━━━━╋━━━━━━━━━━━━━━━━━━━╋━━━━━━┫
//! ┃ u8 ┃        u32        ┃ [u8] ┃
//! ┣━━━━╋━━━━━━━━━━━━━━━━━━━╋━━━━━━┫
//! ┃ 5A ┃ 00 | 00 | 00 | 05 ┃  49  ┃
//! ┗━━━━┻━━━━━━━━━━━━━━━━━━━┻━━━━━━┛
//! ```
//!
//! For historical reasons, the very first message sent by the client (the
//! startup message) has no initial message-type byte, and neither do the
//! SSL request and cancel request messages.
//!
//! <https://www.postgresql.org/docs/current/protocol-overview.html>

mod format;
mod fields;

pub mod frontend;
pub mod backend;

mod error;

pub use format::FormatCode;
pub use fields::ErrorFieldType;

pub use frontend::FrontendMessage;
pub use backend::{
    Authentication, BackendKeyData, BackendMessage, FieldDescription, TransactionStatus,
};

pub use error::{ProtocolError, SqlError, SqlErrorKind};
