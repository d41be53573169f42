//! Client configuration types and builders.

use std::time::Duration;

use hzwire_core::HzError;

/// Default cluster name.
const DEFAULT_CLUSTER_NAME: &str = "dev";
/// Default client instance name.
const DEFAULT_CLIENT_NAME: &str = "hzwire-client";
/// Default subscribe/unsubscribe round-trip timeout.
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(120);
/// Default capacity of the subscription notification channel.
const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Configuration error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for HzError {
    fn from(err: ConfigError) -> Self {
        HzError::Configuration(err.message)
    }
}

/// Settings for event subscriptions.
#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    operation_timeout: Duration,
    notification_capacity: usize,
    include_values: bool,
}

impl SubscriptionConfig {
    /// Creates a new subscription configuration builder.
    pub fn builder() -> SubscriptionConfigBuilder {
        SubscriptionConfigBuilder::new()
    }

    /// Returns the timeout applied to every subscribe and unsubscribe round-trip.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Returns the capacity of the state notification channel.
    pub fn notification_capacity(&self) -> usize {
        self.notification_capacity
    }

    /// Returns whether new subscriptions ask for values by default.
    pub fn include_values(&self) -> bool {
        self.include_values
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            include_values: true,
        }
    }
}

/// Builder for `SubscriptionConfig`.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionConfigBuilder {
    operation_timeout: Option<Duration>,
    notification_capacity: Option<usize>,
    include_values: Option<bool>,
}

impl SubscriptionConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the subscribe/unsubscribe round-trip timeout.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Sets the capacity of the state notification channel.
    pub fn notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = Some(capacity);
        self
    }

    /// Sets whether new subscriptions ask for values by default.
    pub fn include_values(mut self, include: bool) -> Self {
        self.include_values = Some(include);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `operation_timeout` is zero
    /// - `notification_capacity` is zero
    pub fn build(self) -> Result<SubscriptionConfig, ConfigError> {
        let operation_timeout = self.operation_timeout.unwrap_or(DEFAULT_OPERATION_TIMEOUT);
        if operation_timeout.is_zero() {
            return Err(ConfigError::new("operation_timeout must be non-zero"));
        }

        let notification_capacity = self
            .notification_capacity
            .unwrap_or(DEFAULT_NOTIFICATION_CAPACITY);
        if notification_capacity == 0 {
            return Err(ConfigError::new("notification_capacity must be non-zero"));
        }

        Ok(SubscriptionConfig {
            operation_timeout,
            notification_capacity,
            include_values: self.include_values.unwrap_or(true),
        })
    }
}

/// Main client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    cluster_name: String,
    client_name: String,
    labels: Vec<String>,
    smart_routing: bool,
    credentials: Vec<u8>,
    subscription: SubscriptionConfig,
}

impl ClientConfig {
    /// Creates a new client configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the cluster name.
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Returns the client instance name.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Returns the client labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns whether the client talks to every member.
    ///
    /// Only transports read this. Subscriptions live on a single connection
    /// and always ask for cluster-wide events.
    pub fn smart_routing(&self) -> bool {
        self.smart_routing
    }

    /// Returns the opaque credentials token.
    pub fn credentials(&self) -> &[u8] {
        &self.credentials
    }

    /// Returns the subscription configuration.
    pub fn subscription(&self) -> &SubscriptionConfig {
        &self.subscription
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            labels: Vec::new(),
            smart_routing: true,
            credentials: Vec::new(),
            subscription: SubscriptionConfig::default(),
        }
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    cluster_name: Option<String>,
    client_name: Option<String>,
    labels: Vec<String>,
    smart_routing: Option<bool>,
    credentials: Option<Vec<u8>>,
    subscription: SubscriptionConfigBuilder,
}

impl ClientConfigBuilder {
    /// Creates a new client configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cluster name.
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Sets the client instance name.
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Adds a label.
    pub fn add_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Enables or disables smart routing.
    pub fn smart_routing(mut self, enabled: bool) -> Self {
        self.smart_routing = Some(enabled);
        self
    }

    /// Sets the opaque credentials token.
    pub fn credentials(mut self, token: impl Into<Vec<u8>>) -> Self {
        self.credentials = Some(token.into());
        self
    }

    /// Configures subscription settings using a builder function.
    pub fn subscription<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SubscriptionConfigBuilder) -> SubscriptionConfigBuilder,
    {
        self.subscription = f(self.subscription);
        self
    }

    /// Builds the client configuration, returning an error if validation fails.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let cluster_name = self
            .cluster_name
            .unwrap_or_else(|| DEFAULT_CLUSTER_NAME.to_string());

        if cluster_name.is_empty() {
            return Err(ConfigError::new("cluster_name must not be empty"));
        }

        let subscription = self.subscription.build()?;

        Ok(ClientConfig {
            cluster_name,
            client_name: self
                .client_name
                .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            labels: self.labels,
            smart_routing: self.smart_routing.unwrap_or(true),
            credentials: self.credentials.unwrap_or_default(),
            subscription,
        })
    }
}
