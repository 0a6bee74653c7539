//! # Broadside
//!
//! Matchmaking and match-flow server for two-player naval battle games.
//!
//! Broadside pairs anonymous connections, walks each pair through ship
//! placement, battle and regame negotiation, keeps a live list of open
//! games for everyone browsing, and unwinds a pairing cleanly when either
//! side drops. Boards are never seen by the server: the side that was
//! shot at computes the result and the server relays it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use broadside::prelude::*;
//!
//! # async fn start() -> Result<(), BroadsideError> {
//! let server = BroadsideServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::BroadsideError;
pub use server::{BroadsideServer, BroadsideServerBuilder};

/// Everything needed to run a server or talk to one in tests.
pub mod prelude {
    pub use crate::{
        BroadsideError, BroadsideServer, BroadsideServerBuilder, ServerConfig,
    };
    pub use broadside_lobby::{
        FailureCause, LobbyConfig, LobbyError, LobbyHandle, LobbySnapshot,
        Phase, PlayerSummary,
    };
    pub use broadside_protocol::{
        AckValue, ClientEvent, Codec, Coords, Envelope, HostEntry, HostId,
        JsonCodec, ProtocolError, RelayId, ServerEvent, ShotResult,
    };
    pub use broadside_transport::{ConnectionId, TransportError};
}
