//! Error types for switch configuration and controller registration

use thiserror::Error;

use ovs_odl_types::SharedTypeError;

/// Main error type for agent operations
#[derive(Debug, Error)]
pub enum OvsOdlError {
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Switch configuration error: {0}")]
    SwitchConfiguration(#[from] SwitchConfigurationError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures talking to the SDN controller's management API
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Failures of the local switch tooling
#[derive(Debug, Error)]
pub enum SwitchConfigurationError {
    #[error("Command '{command}' exited with {exit_code:?}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures resolving local host facts
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("No address found on network {network}")]
    NoAddressOnNetwork { network: String },

    #[error("No local interface carries MAC {mac}")]
    UnknownMac { mac: String },

    #[error("Unable to determine hostname: {message}")]
    Hostname { message: String },

    #[error("Failed to query {what}: {message}")]
    Query { what: String, message: String },

    #[error("Invalid inventory data: {0}")]
    Invalid(#[from] SharedTypeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err: OvsOdlError = SwitchConfigurationError::CommandFailed {
            command: "ovs-vsctl del-manager".to_string(),
            exit_code: Some(1),
            stderr: "database connection failed".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Switch configuration error: Command 'ovs-vsctl del-manager' exited with Some(1): database connection failed"
        );

        let err: OvsOdlError = InventoryError::NoAddressOnNetwork {
            network: "10.1.1.0/24".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Inventory error: No address found on network 10.1.1.0/24"
        );
    }
}
