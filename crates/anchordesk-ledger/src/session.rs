//! Wallet session and network binding.
//!
//! Client-signed submissions must be bound to the expected external network
//! before anything is signed. The signing agent lives outside backend
//! control; it is modeled as an injected capability rather than ambient
//! global state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric identifier of an external network (chain id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full network definition, registered with the signing agent when the
/// network is unknown to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Chain id the session must be bound to.
    pub chain_id: NetworkId,
    /// Human-readable network name.
    pub name: String,
    /// Native currency symbol.
    pub currency_symbol: String,
    /// RPC endpoints.
    pub rpc_urls: Vec<String>,
    /// Block explorer URL.
    pub explorer_url: String,
}

/// Errors surfaced while binding the session to a network.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No signing agent is available on the caller's execution context.
    #[error("no wallet session available")]
    WalletUnavailable,
    /// The user declined the switch or registration request.
    #[error("request declined by user: {0}")]
    Declined(String),
    /// The agent does not know the requested network.
    #[error("network {0} is unknown to the signing agent")]
    UnknownNetwork(NetworkId),
    /// Any other agent-reported failure.
    #[error("signing agent error: {0}")]
    Agent(String),
}

/// Capability handle onto the user's signing agent.
pub trait WalletSession {
    /// Network the session is currently bound to.
    fn active_network(&self) -> Result<NetworkId, SessionError>;

    /// Asks the agent to switch to the given network.
    fn switch_network(&self, network: NetworkId) -> Result<(), SessionError>;

    /// Registers a network definition with the agent.
    fn register_network(&self, profile: &NetworkProfile) -> Result<(), SessionError>;
}

/// Ensures the session is bound to `profile.chain_id` before any signed
/// submission is attempted.
///
/// Already bound → Ok. Otherwise a switch is requested; if the agent
/// reports the network unknown, the full definition is registered and the
/// switch retried exactly once. Every other failure (user declines, agent
/// absent) propagates as a typed error and no submission may proceed.
pub fn ensure_network(
    session: &dyn WalletSession,
    profile: &NetworkProfile,
) -> Result<(), SessionError> {
    if session.active_network()? == profile.chain_id {
        return Ok(());
    }

    match session.switch_network(profile.chain_id) {
        Ok(()) => Ok(()),
        Err(SessionError::UnknownNetwork(_)) => {
            tracing::info!(network = %profile.chain_id, "registering network with signing agent");
            session.register_network(profile)?;
            session.switch_network(profile.chain_id)
        }
        Err(err) => Err(err),
    }
}
